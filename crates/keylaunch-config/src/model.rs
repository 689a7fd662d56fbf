//! Configuration data model

/// Root configuration structure
///
/// Resolved once at startup and handed to the daemon by value; the `auto`
/// settings are replaced by discovery results before anything runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Input device to watch, or auto-discover by capability
    pub device: Setting,
    /// Terminal emulator to launch
    pub terminal: String,
    /// Path to the claude binary, or auto-discover in common locations
    pub claude_path: Setting,
    /// Desktop user to launch as, or auto-detect the logged-in user
    pub user: Setting,
    /// X display of the desktop session
    pub display: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: Setting::Auto,
            terminal: "gnome-terminal".to_string(),
            claude_path: Setting::Auto,
            user: Setting::Auto,
            display: ":0".to_string(),
        }
    }
}

/// A setting that is either pinned in the config file or discovered at startup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Setting {
    #[default]
    Auto,
    Explicit(String),
}

impl Setting {
    /// Returns the explicit value, or `None` for the `auto` sentinel.
    pub fn explicit(&self) -> Option<&str> {
        match self {
            Setting::Auto => None,
            Setting::Explicit(value) => Some(value),
        }
    }
}

impl From<&str> for Setting {
    fn from(value: &str) -> Self {
        if value == "auto" {
            Setting::Auto
        } else {
            Setting::Explicit(value.to_string())
        }
    }
}
