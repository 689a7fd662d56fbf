//! Blocking key-event monitor
//!
//! Owns the selected input device and turns its raw event stream into
//! activations. Only the pressed edge of the trigger key activates; key
//! repeat and release are ignored, so holding the key down produces exactly
//! one launch per physical press.

use std::path::Path;

use anyhow::{Context, Result};
use evdev::{Device, InputEvent, InputEventKind, Key};

/// Key transition states encoded in the kernel event value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    Released,
    Pressed,
    Repeated,
}

/// A decoded key event off the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: Key,
    pub transition: KeyTransition,
}

impl KeyEvent {
    /// Decode a raw input event. Non-key events yield `None`.
    pub fn from_raw(event: &InputEvent) -> Option<Self> {
        let InputEventKind::Key(code) = event.kind() else {
            return None;
        };

        let transition = match event.value() {
            0 => KeyTransition::Released,
            1 => KeyTransition::Pressed,
            2 => KeyTransition::Repeated,
            _ => return None,
        };

        Some(Self { code, transition })
    }

    /// True only for the pressed edge of the trigger key.
    pub fn activates(&self, trigger: Key) -> bool {
        self.code == trigger && self.transition == KeyTransition::Pressed
    }
}

/// Monitors a single input device for presses of the trigger key
pub struct KeyMonitor {
    device: Device,
    trigger: Key,
}

impl KeyMonitor {
    /// Open the input device at the given path for monitoring.
    pub fn open(path: &Path, trigger: Key) -> Result<Self> {
        let device = Device::open(path)
            .with_context(|| format!("Failed to open input device at {}", path.display()))?;

        tracing::info!(
            "Monitoring '{}' at {}",
            device.name().unwrap_or("Unknown"),
            path.display()
        );

        Ok(Self { device, trigger })
    }

    /// Run the blocking read loop, invoking `on_activate` for each
    /// qualifying press.
    ///
    /// `on_activate` runs to completion before the next read resumes, so
    /// activations are strictly serialized; presses arriving mid-activation
    /// are buffered by the kernel and handled afterwards. Never returns
    /// under normal operation. Returns an error when the device is lost
    /// (e.g. hot-unplugged) — there is no reconnect, the daemon exits.
    pub fn run(&mut self, mut on_activate: impl FnMut()) -> Result<()> {
        loop {
            let events = self
                .device
                .fetch_events()
                .context("Input device lost while monitoring")?;

            for event in events {
                let activated = KeyEvent::from_raw(&event)
                    .map(|key_event| key_event.activates(self.trigger))
                    .unwrap_or(false);

                if activated {
                    tracing::debug!("Trigger key pressed");
                    on_activate();
                }
            }
        }
    }
}
