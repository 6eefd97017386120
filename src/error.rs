use thiserror::Error;

/// Errors produced while driving the browser, the picker session or the settings store
#[derive(Debug, Error)]
pub enum PickerError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Failed to parse page snapshot: {0}")]
    SnapshotParseFailed(String),

    #[error("Overlay operation failed: {0}")]
    OverlayFailed(String),

    #[error("Overlay is not mounted in the page")]
    OverlayNotMounted,

    #[error("Clipboard write failed: {0}")]
    ClipboardFailed(String),

    #[error("Settings storage error: {0}")]
    SettingsStorage(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Event channel closed: {0}")]
    ChannelClosed(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, PickerError>;
