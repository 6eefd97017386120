//! Interaction state machine
//!
//! The picker is inactive until the hotkey goes down on a permitted page. While active it
//! throttles pointer movement to one outstanding query per animation frame, renders each result
//! through the overlay, and copies the resolved chain on click.
//!
//! All input arrives as [`PickerEvent`]s drained in order by a single dispatcher, and all side
//! effects go through a [`PickerHost`], so the machine runs unchanged against a live tab or
//! in-memory fakes.

pub mod event;
pub mod format;
pub mod host;
pub mod machine;
pub mod policy;
pub mod session;

pub use event::{FrameId, PickerEvent, Timer};
pub use format::{clean_path, format_component, format_copy_text, preview_text};
pub use host::{ClipboardSink, HostParts, PageContext, PickerHost, Scheduler};
pub use machine::{DEACTIVATE_DELAY, FLASH_DURATION, Picker};
pub use policy::{LOCAL_DEV_HOSTS, hostname_of, is_allowed_site, is_local_dev_host};
pub use session::Session;
