//! System clipboard access
//!
//! Writes happen on a dedicated worker thread so the dispatcher never blocks on the clipboard;
//! each completion comes back as a [`PickerEvent::ClipboardWritten`] stamped with the session
//! epoch that requested it.

use crate::error::{PickerError, Result};
use crate::picker::{ClipboardSink, PickerEvent};
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use tokio::sync::mpsc;

/// Anything that can hold plain text
pub trait TextClipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// Desktop clipboard with command-line fallbacks for headless sessions
pub struct SystemClipboard {
    primary: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let primary = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                log::debug!("System clipboard unavailable, using command fallbacks: {}", e);
                None
            }
        };
        Self { primary }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl TextClipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        if let Some(primary) = self.primary.as_mut() {
            match primary.set_text(text.to_owned()) {
                Ok(()) => return Ok(()),
                Err(e) => log::debug!("Clipboard write failed, trying fallbacks: {}", e),
            }
        }

        self.primary = None;
        fallback_copy(text)
    }
}

fn fallback_copy(text: &str) -> Result<()> {
    let mut last_error = None;
    for command in FALLBACK_COMMANDS {
        match try_command_copy(command, text) {
            Ok(()) => return Ok(()),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or_else(|| PickerError::ClipboardFailed("No clipboard backend available".to_string())))
}

fn try_command_copy(command: &[&str], text: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| PickerError::ClipboardFailed("Clipboard command missing program".to_string()))?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| PickerError::ClipboardFailed(format!("Failed to spawn {}: {}", program, e)))?;

    // stdin is dropped before waiting so the child sees EOF
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };

    // Reap the child even when the write failed
    let status = child
        .wait()
        .map_err(|e| PickerError::ClipboardFailed(format!("{} did not exit cleanly: {}", program, e)));
    written.map_err(|e| PickerError::ClipboardFailed(format!("Failed to write to {}: {}", program, e)))?;
    let status = status?;
    if status.success() {
        Ok(())
    } else {
        Err(PickerError::ClipboardFailed(format!("{} exited with {}", program, status)))
    }
}

#[cfg(target_os = "macos")]
const FALLBACK_COMMANDS: &[&[&str]] = &[&["pbcopy"]];

#[cfg(all(unix, not(target_os = "macos")))]
const FALLBACK_COMMANDS: &[&[&str]] =
    &[&["wl-copy"], &["xclip", "-selection", "clipboard"], &["xsel", "--clipboard", "--input"]];

#[cfg(target_os = "windows")]
const FALLBACK_COMMANDS: &[&[&str]] = &[&["clip"]];

#[cfg(not(any(unix, target_os = "windows")))]
const FALLBACK_COMMANDS: &[&[&str]] = &[];

/// [`ClipboardSink`] that writes on a background thread
pub struct ClipboardWorker {
    jobs: Option<mpsc::UnboundedSender<(u64, String)>>,
    handle: Option<JoinHandle<()>>,
}

impl ClipboardWorker {
    /// Start the worker; completions are sent to `events`
    ///
    /// The clipboard is created on the worker thread, since platform clipboards are not always
    /// `Send`.
    pub fn spawn<F, C>(make_clipboard: F, events: mpsc::UnboundedSender<PickerEvent>) -> Result<Self>
    where
        F: FnOnce() -> C + Send + 'static,
        C: TextClipboard,
    {
        let (jobs, mut receiver) = mpsc::unbounded_channel::<(u64, String)>();
        let handle = std::thread::Builder::new()
            .name("clipboard".to_string())
            .spawn(move || {
                let mut clipboard = make_clipboard();
                while let Some((epoch, text)) = receiver.blocking_recv() {
                    let result = clipboard.copy(&text).map_err(|e| e.to_string());
                    if events.send(PickerEvent::ClipboardWritten { epoch, result }).is_err() {
                        break;
                    }
                }
                log::debug!("Clipboard worker stopped");
            })
            .map_err(|e| PickerError::ClipboardFailed(format!("Failed to start clipboard worker: {}", e)))?;

        Ok(Self { jobs: Some(jobs), handle: Some(handle) })
    }
}

impl ClipboardSink for ClipboardWorker {
    fn write_text(&mut self, epoch: u64, text: String) {
        let Some(jobs) = &self.jobs else {
            return;
        };
        if jobs.send((epoch, text)).is_err() {
            log::warn!("Clipboard worker is gone; dropping write for session {}", epoch);
        }
    }
}

impl Drop for ClipboardWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop
        self.jobs.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::warn!("Clipboard worker panicked");
        }
    }
}
