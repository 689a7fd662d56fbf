//! Terminal session launching
//!
//! Builds the terminal-specific command line and spawns it as the desktop
//! user, detached from the daemon. The daemon typically runs as root, so
//! the spawn goes through `sudo -u <user> env ...` to drop privilege and
//! hand the child the session environment it needs.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use nix::unistd::Uid;

/// Terminal emulators with distinct working-directory argument shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Kitty,
    Alacritty,
    GnomeTerminal,
}

impl TerminalKind {
    /// Map a configured terminal name onto a known argument shape.
    ///
    /// Unknown names get the gnome-terminal shape, the common default on
    /// GNOME desktops.
    pub fn from_name(name: &str) -> Self {
        match name {
            "kitty" => TerminalKind::Kitty,
            "alacritty" => TerminalKind::Alacritty,
            _ => TerminalKind::GnomeTerminal,
        }
    }
}

/// Everything needed to spawn one terminal session
///
/// Fully determined at startup except `working_dir`, which varies per
/// activation.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub terminal: TerminalKind,
    pub executable: PathBuf,
    pub working_dir: PathBuf,
    pub user: String,
    pub uid: Uid,
    pub display: String,
}

impl LaunchSpec {
    /// Terminal-specific argument vector, program name first.
    fn terminal_argv(&self) -> Vec<String> {
        let dir = self.working_dir.display().to_string();
        let exe = self.executable.display().to_string();

        match self.terminal {
            TerminalKind::Kitty => {
                vec!["kitty".to_string(), "--directory".to_string(), dir, exe]
            }
            TerminalKind::Alacritty => vec![
                "alacritty".to_string(),
                "--working-directory".to_string(),
                dir,
                "-e".to_string(),
                exe,
            ],
            TerminalKind::GnomeTerminal => vec![
                "gnome-terminal".to_string(),
                format!("--working-directory={}", dir),
                "--".to_string(),
                exe,
            ],
        }
    }

    /// Session environment the spawned terminal needs to reach the desktop.
    ///
    /// The bus address follows the systemd user-session convention so the
    /// terminal can talk to a desktop session the daemon does not own.
    fn session_env(&self) -> Vec<String> {
        vec![
            format!("DISPLAY={}", self.display),
            format!(
                "DBUS_SESSION_BUS_ADDRESS=unix:path=/run/user/{}/bus",
                self.uid
            ),
        ]
    }
}

/// Spawn the terminal as the session user and return immediately.
///
/// Fire-and-forget: the child handle is dropped, the exit status is never
/// observed. The only reportable failure is the synchronous spawn error.
pub fn launch(spec: &LaunchSpec) -> Result<()> {
    let mut command = Command::new("sudo");
    command
        .arg("-u")
        .arg(&spec.user)
        .arg("env")
        .args(spec.session_env())
        .args(spec.terminal_argv());

    command
        .spawn()
        .with_context(|| format!("Failed to spawn terminal for {}", spec.user))?;

    tracing::info!(
        "Launched {} in {} as {}",
        spec.executable.display(),
        spec.working_dir.display(),
        spec.user
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(terminal: TerminalKind) -> LaunchSpec {
        LaunchSpec {
            terminal,
            executable: PathBuf::from("/usr/local/bin/claude"),
            working_dir: PathBuf::from("/home/user/projects/app"),
            user: "user".to_string(),
            uid: Uid::from_raw(1000),
            display: ":0".to_string(),
        }
    }

    #[test]
    fn test_kitty_argv_shape() {
        assert_eq!(
            spec(TerminalKind::Kitty).terminal_argv(),
            vec![
                "kitty",
                "--directory",
                "/home/user/projects/app",
                "/usr/local/bin/claude",
            ]
        );
    }

    #[test]
    fn test_alacritty_argv_shape() {
        assert_eq!(
            spec(TerminalKind::Alacritty).terminal_argv(),
            vec![
                "alacritty",
                "--working-directory",
                "/home/user/projects/app",
                "-e",
                "/usr/local/bin/claude",
            ]
        );
    }

    #[test]
    fn test_gnome_terminal_argv_shape() {
        assert_eq!(
            spec(TerminalKind::GnomeTerminal).terminal_argv(),
            vec![
                "gnome-terminal",
                "--working-directory=/home/user/projects/app",
                "--",
                "/usr/local/bin/claude",
            ]
        );
    }

    #[test]
    fn test_session_env_carries_display_and_bus() {
        let env = spec(TerminalKind::Kitty).session_env();
        assert_eq!(
            env,
            vec![
                "DISPLAY=:0",
                "DBUS_SESSION_BUS_ADDRESS=unix:path=/run/user/1000/bus",
            ]
        );
    }

    #[test]
    fn test_terminal_kind_from_name() {
        assert_eq!(TerminalKind::from_name("kitty"), TerminalKind::Kitty);
        assert_eq!(
            TerminalKind::from_name("alacritty"),
            TerminalKind::Alacritty
        );
        assert_eq!(
            TerminalKind::from_name("gnome-terminal"),
            TerminalKind::GnomeTerminal
        );
        assert_eq!(
            TerminalKind::from_name("xterm"),
            TerminalKind::GnomeTerminal
        );
    }
}
