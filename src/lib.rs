//! # component-picker
//!
//! Point at any element of a running React application and copy which component rendered it,
//! with source locations for that component and its ancestors.
//!
//! The page is driven over the Chrome DevTools Protocol. An injected capture script reports the
//! framework's internal tree around the hovered element; everything else (naming, source lookup,
//! props previews, the interaction state machine and the copied text) happens in Rust.
//!
//! ## Interactive Use
//!
//! ```bash
//! # Launch a browser, open the app and pick components while holding Alt
//! cargo run -- pick http://localhost:3000
//!
//! # Resolve one coordinate and print the result as JSON
//! cargo run -- resolve http://localhost:3000 --x 120 --y 80
//! ```
//!
//! ## Library Usage
//!
//! ### One-shot resolution
//!
//! ```rust,no_run
//! use component_picker::{BrowserSession, LaunchOptions};
//!
//! # fn main() -> component_picker::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::new().headless(true))?;
//! session.navigate("http://localhost:3000")?;
//! session.wait_for_navigation()?;
//!
//! let result = session.resolve_at(120.0, 80.0)?;
//! if let Some(primary) = result.primary() {
//!     println!("{}", component_picker::picker::format_component(primary));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Formatting a resolved chain
//!
//! ```rust
//! use component_picker::{ComponentInfo, PickerSettings, SourceLocation};
//! use component_picker::picker::format_copy_text;
//!
//! let chain = vec![
//!     ComponentInfo::new("Button").with_source(SourceLocation::new("webpack-internal:///./src/Button.tsx", Some(12), None)),
//!     ComponentInfo::new("Toolbar"),
//! ];
//! let text = format_copy_text(&chain, &PickerSettings::default(), None, None, "http://localhost:3000/");
//! assert_eq!(text, "Button (src/Button.tsx:12)\n  in Toolbar");
//! ```
//!
//! ## Module Overview
//!
//! - [`fiber`]: Capture and resolution of the component chain under a coordinate
//! - [`bridge`]: Query/result protocol between the picker and the resolver
//! - [`picker`]: Interaction state machine, copy-text formatting and site policy
//! - [`overlay`]: Highlight box and tooltip
//! - [`page`]: Input hooks installed in the inspected page
//! - [`settings`]: Persisted preferences and update notifications
//! - [`runtime`]: Live wiring of all of the above against one tab
//! - [`browser`]: Browser session management and configuration
//! - [`error`]: Error types and result aliases

pub mod bridge;
pub mod browser;
pub mod clipboard;
pub mod error;
pub mod fiber;
pub mod overlay;
pub mod page;
pub mod picker;
pub mod runtime;
pub mod settings;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use error::{PickerError, Result};
pub use fiber::{ComponentInfo, QueryResult, Rect, Resolver, SourceLocation};
pub use picker::{Picker, PickerEvent};
pub use runtime::{PickerRuntime, RuntimeHandle};
pub use settings::{PickerSettings, SettingsRelay};
