//! Desktop session discovery
//!
//! Resolves which desktop user the daemon acts on behalf of, plus the
//! account details (uid, home) and claude binary location the launcher
//! needs. These lookups run once at startup.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use nix::unistd::{Uid, User};

/// The resolved desktop session the daemon launches into
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub user: String,
    pub uid: Uid,
    pub home: PathBuf,
}

impl SessionInfo {
    /// Look up a user in the account database.
    ///
    /// A missing account is a startup error: the uid is required to drop
    /// privilege and derive the session bus address, so there is nothing
    /// useful the daemon could do with a guessed home directory.
    pub fn lookup(user: &str) -> Result<Self> {
        let entry = User::from_name(user)
            .with_context(|| format!("Account lookup failed for '{}'", user))?
            .ok_or_else(|| anyhow!("User '{}' not found in the account database", user))?;

        Ok(Self {
            user: user.to_string(),
            uid: entry.uid,
            home: entry.dir,
        })
    }
}

/// Detect the logged-in desktop user.
///
/// `SUDO_USER` wins when the daemon was started via sudo; otherwise the
/// first regular account loginctl reports is taken. Falls back to root,
/// which at least keeps the daemon running on headless systems.
pub fn detect_user() -> String {
    if let Ok(user) = std::env::var("SUDO_USER") {
        if !user.is_empty() {
            return user;
        }
    }

    if let Some(user) = first_session_user() {
        return user;
    }

    "root".to_string()
}

/// First regular account (uid >= 1000) in loginctl's user list.
fn first_session_user() -> Option<String> {
    let output = Command::new("loginctl")
        .args(["list-users", "--no-legend"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        let mut parts = line.split_whitespace();
        let (Some(uid), Some(name)) = (parts.next(), parts.next()) else {
            continue;
        };

        if uid.parse::<u32>().map(|u| u >= 1000).unwrap_or(false) {
            return Some(name.to_string());
        }
    }

    None
}

/// Find the claude binary in common install locations.
///
/// Checks the per-user install paths first, then system-wide ones, then the
/// user's own PATH via `which`. When everything fails, the per-user default
/// location is returned as the best guess; the spawn will surface the
/// missing binary.
pub fn detect_claude_path(session: &SessionInfo) -> PathBuf {
    for path in candidate_paths(&session.home) {
        if is_executable(&path) {
            return path;
        }
    }

    if let Some(path) = which_claude(&session.user) {
        return path;
    }

    session.home.join(".local/bin/claude")
}

/// Install locations to probe, most specific first.
fn candidate_paths(home: &Path) -> [PathBuf; 4] {
    [
        home.join(".local/bin/claude"),
        home.join(".claude/local/claude"),
        PathBuf::from("/usr/local/bin/claude"),
        PathBuf::from("/usr/bin/claude"),
    ]
}

fn is_executable(path: &Path) -> bool {
    path.is_file()
        && std::fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

/// Ask the user's own shell environment where claude lives.
fn which_claude(user: &str) -> Option<PathBuf> {
    let output = Command::new("sudo")
        .args(["-u", user, "which", "claude"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_paths_order() {
        let paths = candidate_paths(Path::new("/home/user"));
        assert_eq!(paths[0], PathBuf::from("/home/user/.local/bin/claude"));
        assert_eq!(paths[1], PathBuf::from("/home/user/.claude/local/claude"));
        assert_eq!(paths[2], PathBuf::from("/usr/local/bin/claude"));
        assert_eq!(paths[3], PathBuf::from("/usr/bin/claude"));
    }

    #[test]
    fn test_is_executable_requires_exec_bit() {
        let dir = tempfile::tempdir().unwrap();

        let script = dir.path().join("claude");
        std::fs::write(&script, "#!/bin/sh\n").unwrap();

        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o644);
        std::fs::set_permissions(&script, perms.clone()).unwrap();
        assert!(!is_executable(&script));

        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        assert!(is_executable(&script));
    }

    #[test]
    fn test_is_executable_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_executable(dir.path()));
    }

    #[test]
    fn test_lookup_unknown_user_fails() {
        let result = SessionInfo::lookup("no-such-user-keylaunch");
        assert!(result.is_err());
    }
}
