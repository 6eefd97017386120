use crate::bridge::Envelope;
use crate::settings::PickerSettings;

/// Handle of a requested animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Delayed actions a session schedules for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Restore the overlay after the copy confirmation
    FlashEnd,
    /// End the session once the copy confirmation has been seen
    Deactivate,
}

/// Everything the picker reacts to, drained in order by a single dispatcher
#[derive(Debug, Clone, PartialEq)]
pub enum PickerEvent {
    KeyDown { key: String },
    KeyUp { key: String },
    PointerMove { x: f64, y: f64 },
    Click,
    Blur,

    /// A requested animation frame fired
    Frame { id: FrameId },

    /// Anything observed on the message bus, trusted or not
    Message(Envelope),

    /// A clipboard write finished
    ClipboardWritten { epoch: u64, result: std::result::Result<(), String> },

    /// A scheduled timer fired
    Timer { epoch: u64, timer: Timer },

    /// `SETTINGS_UPDATED` from the settings relay
    SettingsUpdated(PickerSettings),

    /// Stop the dispatcher
    Shutdown,
}
