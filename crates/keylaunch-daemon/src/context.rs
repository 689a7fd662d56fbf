//! Focused-terminal working directory inference
//!
//! Asks the X session which window has focus and parses the shell's working
//! directory out of its title. Terminal emulators conventionally append the
//! cwd after the last colon of the title ("user@host: ~/src"); that is a
//! heuristic, not a protocol, so every failure mode collapses to `None` at
//! the public boundary and callers fall back to the home directory.
//!
//! The queries run as the session user with `DISPLAY` pointed at the
//! session, because the daemon itself runs as root without an X connection.

use std::path::{Path, PathBuf};
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Window classes trusted to carry a cwd in their title.
///
/// Gating on the class avoids extracting a bogus path from an arbitrary
/// focused window (a browser tab, an editor) that happens to contain
/// colon-separated, slash-looking text.
const TERMINAL_CLASSES: &[&str] = &["terminal", "kitty", "alacritty"];

/// Trailing "<separator> <path>" segment of a terminal title
static TITLE_PATH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r":\s+(~?/.*)$").unwrap());

/// Why a resolution attempt produced no usable directory
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("window query failed to run: {0}")]
    Query(#[from] std::io::Error),

    #[error("window query exited with {status}: {stderr}")]
    QueryFailed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("focused window class {class:?} is not a terminal")]
    NotATerminal { class: String },

    #[error("no trailing path in window title")]
    NoPathInTitle,

    #[error("extracted path {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },
}

/// Outcome of a successful working-directory inference
#[derive(Debug, Clone)]
pub struct ResolvedContext {
    pub working_directory: PathBuf,
    pub source_window_title: Option<String>,
}

/// Infers the focused terminal's working directory via the window system
pub struct ContextResolver {
    user: String,
    display: String,
    home: PathBuf,
}

impl ContextResolver {
    pub fn new(user: String, display: String, home: PathBuf) -> Self {
        Self {
            user,
            display,
            home,
        }
    }

    /// Best-effort resolution of the focused terminal's cwd.
    ///
    /// Any failure — no session, missing tools, non-terminal focus, no path
    /// in the title, vanished directory — yields `None`; the caller decides
    /// the fallback.
    pub fn resolve(&self) -> Option<ResolvedContext> {
        match self.try_resolve() {
            Ok(context) => {
                tracing::debug!(
                    "Resolved cwd {} from focused terminal",
                    context.working_directory.display()
                );
                Some(context)
            }
            Err(e) => {
                tracing::debug!("Context resolution failed: {}", e);
                None
            }
        }
    }

    fn try_resolve(&self) -> Result<ResolvedContext, ContextError> {
        let window_id = self.query(&["xdotool", "getactivewindow"])?;

        let class = self
            .query(&["xprop", "-id", &window_id, "WM_CLASS"])?
            .to_lowercase();
        if !is_terminal_class(&class) {
            return Err(ContextError::NotATerminal { class });
        }

        let title = self.query(&["xdotool", "getactivewindow", "getwindowname"])?;
        let working_directory = cwd_from_title(&title, &self.home)?;

        Ok(ResolvedContext {
            working_directory,
            source_window_title: Some(title),
        })
    }

    /// Run a window-system query as the session user.
    fn query(&self, argv: &[&str]) -> Result<String, ContextError> {
        let output = Command::new("sudo")
            .arg("-u")
            .arg(&self.user)
            .arg("env")
            .arg(format!("DISPLAY={}", self.display))
            .args(argv)
            .output()?;

        if !output.status.success() {
            return Err(ContextError::QueryFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// True when the window class matches the terminal allow-list.
pub(crate) fn is_terminal_class(class: &str) -> bool {
    TERMINAL_CLASSES.iter().any(|t| class.contains(t))
}

/// Extract the trailing path segment from a window title.
pub(crate) fn title_path(title: &str) -> Option<&str> {
    TITLE_PATH_RE
        .captures(title)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Expand a leading `~` against the session user's home directory.
pub(crate) fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) => PathBuf::from(format!("{}{}", home.display(), rest)),
        None => PathBuf::from(path),
    }
}

/// Parse a window title into an existing directory.
pub(crate) fn cwd_from_title(title: &str, home: &Path) -> Result<PathBuf, ContextError> {
    let raw = title_path(title).ok_or(ContextError::NoPathInTitle)?;
    let path = expand_tilde(raw, home);

    if path.is_dir() {
        Ok(path)
    } else {
        Err(ContextError::NotADirectory { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classes_match() {
        assert!(is_terminal_class(
            "wm_class(string) = \"gnome-terminal-server\", \"gnome-terminal\""
        ));
        assert!(is_terminal_class("wm_class(string) = \"kitty\", \"kitty\""));
        assert!(is_terminal_class(
            "wm_class(string) = \"alacritty\", \"alacritty\""
        ));
        assert!(is_terminal_class("xfce4-terminal"));
    }

    #[test]
    fn test_non_terminal_classes_rejected() {
        assert!(!is_terminal_class(
            "wm_class(string) = \"navigator\", \"firefox\""
        ));
        assert!(!is_terminal_class("code"));
        assert!(!is_terminal_class(""));
    }

    #[test]
    fn test_title_path_with_tilde() {
        assert_eq!(
            title_path("user@host: ~/projects/app"),
            Some("~/projects/app")
        );
    }

    #[test]
    fn test_title_path_with_absolute_path() {
        assert_eq!(title_path("bash: /var/log"), Some("/var/log"));
    }

    #[test]
    fn test_title_without_path_segment() {
        assert_eq!(title_path("Mozilla Firefox"), None);
    }

    #[test]
    fn test_title_with_bare_tilde_does_not_match() {
        // No slash after the tilde, so there is nothing to extract; the
        // caller falls back to the home directory.
        assert_eq!(title_path("user@host:~"), None);
    }

    #[test]
    fn test_title_requires_whitespace_after_separator() {
        assert_eq!(title_path("http://example.com"), None);
    }

    #[test]
    fn test_expand_tilde() {
        let home = Path::new("/home/user");
        assert_eq!(
            expand_tilde("~/projects/app", home),
            PathBuf::from("/home/user/projects/app")
        );
        assert_eq!(expand_tilde("/var/log", home), PathBuf::from("/var/log"));
    }

    #[test]
    fn test_cwd_from_title_resolves_existing_directory() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(home.path().join("projects/app")).unwrap();

        let cwd = cwd_from_title("user@host: ~/projects/app", home.path()).unwrap();
        assert_eq!(cwd, home.path().join("projects/app"));
    }

    #[test]
    fn test_cwd_from_title_rejects_missing_directory() {
        let home = tempfile::tempdir().unwrap();

        let result = cwd_from_title("user@host: ~/does/not/exist", home.path());
        assert!(matches!(
            result,
            Err(ContextError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_cwd_from_title_rejects_file_path() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join("notes.txt"), "x").unwrap();

        let result = cwd_from_title("user@host: ~/notes.txt", home.path());
        assert!(matches!(
            result,
            Err(ContextError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_cwd_from_title_without_path_falls_through() {
        let home = tempfile::tempdir().unwrap();

        let result = cwd_from_title("user@host:~", home.path());
        assert!(matches!(result, Err(ContextError::NoPathInTitle)));
    }
}
