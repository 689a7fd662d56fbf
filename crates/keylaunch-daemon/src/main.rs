//! keylaunch daemon
//!
//! Watches a keyboard device for the Copilot key and launches a terminal
//! running Claude Code in the focused terminal's working directory, as the
//! desktop user, even though the daemon itself runs as root.

mod context;
mod device;
mod launcher;
mod monitor;
mod session;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use evdev::Key;
use tracing_subscriber::EnvFilter;

use crate::context::ContextResolver;
use crate::launcher::{LaunchSpec, TerminalKind};
use crate::monitor::KeyMonitor;
use crate::session::SessionInfo;

/// The dedicated launch key: KEY_F23 is what the Copilot key reports as on
/// current laptops.
const TRIGGER_KEY: Key = Key::KEY_F23;

#[derive(Parser, Debug)]
#[command(name = "keylaunchd")]
#[command(about = "Copilot-key launcher daemon for Claude Code")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/keylaunch/config.kdl")]
    config: String,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Expand tilde in config path
    let config_path: PathBuf = shellexpand::tilde(&args.config).into_owned().into();

    let config = keylaunch_config::load_config(&config_path)?;

    let user = match config.user.explicit() {
        Some(user) => user.to_string(),
        None => session::detect_user(),
    };
    let session = SessionInfo::lookup(&user)?;

    let claude_path = match config.claude_path.explicit() {
        Some(path) => PathBuf::from(path),
        None => session::detect_claude_path(&session),
    };

    let device_path = match config.device.explicit() {
        Some(path) => PathBuf::from(path),
        None => match device::select_device(TRIGGER_KEY)? {
            Some(path) => path,
            None => bail!(
                "No input device with {:?} found. Set an explicit device path in {}",
                TRIGGER_KEY,
                config_path.display()
            ),
        },
    };

    let terminal = TerminalKind::from_name(&config.terminal);
    let resolver = ContextResolver::new(
        session.user.clone(),
        config.display.clone(),
        session.home.clone(),
    );

    tracing::info!(
        "user={} device={} terminal={:?} claude={} display={}",
        session.user,
        device_path.display(),
        terminal,
        claude_path.display(),
        config.display
    );

    let mut key_monitor = KeyMonitor::open(&device_path, TRIGGER_KEY)?;

    key_monitor.run(|| {
        // Best-effort cwd inference; the home directory is the fallback.
        let working_dir = resolver
            .resolve()
            .map(|ctx| ctx.working_directory)
            .unwrap_or_else(|| session.home.clone());

        let spec = LaunchSpec {
            terminal,
            executable: claude_path.clone(),
            working_dir,
            user: session.user.clone(),
            uid: session.uid,
            display: config.display.clone(),
        };

        if let Err(e) = launcher::launch(&spec) {
            tracing::warn!("Failed to spawn terminal: {:#}", e);
        }
    })
}
