//! Browser management
//!
//! Launches or attaches to Chrome/Chromium over the DevTools Protocol and exposes the tab the
//! picker runs in.

pub mod config;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use session::BrowserSession;
