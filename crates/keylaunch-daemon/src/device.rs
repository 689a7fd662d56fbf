//! Input device discovery and selection
//!
//! Scans `/dev/input` for the keyboard that actually generates the trigger
//! key. Laptops commonly expose a generic "AT Translated Set 2 keyboard"
//! next to the vendor keyboard, and both can declare the same extended key
//! codes, so selection ranks candidates by name rather than taking the
//! first capable device.

use std::path::PathBuf;

use anyhow::Result;
use evdev::{Device, Key};

/// A device that declares the trigger key in its capability set
#[derive(Debug, Clone)]
pub struct DeviceCandidate {
    pub path: PathBuf,
    pub name: String,
}

/// Find the input device to monitor for the trigger key.
///
/// Returns `Ok(None)` when no device on the system declares the key.
pub fn select_device(trigger: Key) -> Result<Option<PathBuf>> {
    let candidates = scan_candidates(trigger)?;
    Ok(pick_candidate(&candidates).map(|c| c.path.clone()))
}

/// Enumerate `/dev/input/event*` and keep devices that declare `trigger`.
///
/// Nodes are visited in lexicographic path order so selection is
/// deterministic across runs with identical hardware. Nodes that cannot be
/// opened (permissions, transient I/O errors) are skipped.
fn scan_candidates(trigger: Key) -> Result<Vec<DeviceCandidate>> {
    let mut paths = Vec::new();

    for entry in std::fs::read_dir("/dev/input")? {
        let entry = entry?;
        let path = entry.path();

        // Only look at event* devices
        if !path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with("event"))
            .unwrap_or(false)
        {
            continue;
        }

        paths.push(path);
    }

    paths.sort();

    let mut candidates = Vec::new();

    for path in paths {
        let device = match Device::open(&path) {
            Ok(device) => device,
            Err(e) => {
                tracing::debug!("Could not open {}: {}", path.display(), e);
                continue;
            }
        };

        let has_trigger = device
            .supported_keys()
            .map(|keys| keys.contains(trigger))
            .unwrap_or(false);

        if has_trigger {
            let name = device.name().unwrap_or("Unknown").to_string();
            tracing::debug!("Candidate '{}' at {}", name, path.display());
            candidates.push(DeviceCandidate { path, name });
        }
    }

    Ok(candidates)
}

/// Rank capable devices and return the winner.
///
/// Preference order: a real keyboard by name (excluding the generic AT
/// emulation node), then any device named like a keyboard, then the first
/// candidate in enumeration order.
pub(crate) fn pick_candidate(candidates: &[DeviceCandidate]) -> Option<&DeviceCandidate> {
    candidates
        .iter()
        .find(|c| {
            let name = c.name.to_lowercase();
            name.contains("keyboard") && !name.contains("at translated")
        })
        .or_else(|| {
            candidates
                .iter()
                .find(|c| c.name.to_lowercase().contains("keyboard"))
        })
        .or_else(|| candidates.first())
}
