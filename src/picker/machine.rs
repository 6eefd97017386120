use crate::bridge::Envelope;
use crate::picker::event::{FrameId, PickerEvent, Timer};
use crate::picker::format::format_copy_text;
use crate::picker::host::PickerHost;
use crate::picker::policy::is_allowed_site;
use crate::picker::session::Session;
use crate::settings::PickerSettings;
use std::time::Duration;

/// How long the copy confirmation stays visible
pub const FLASH_DURATION: Duration = Duration::from_millis(200);

/// Delay between a finished clipboard write and the end of the session
pub const DEACTIVATE_DELAY: Duration = Duration::from_millis(250);

const ESCAPE_KEY: &str = "Escape";

/// Interaction state machine: inactive, or active with exactly one [`Session`]
pub struct Picker<H: PickerHost> {
    host: H,
    settings: PickerSettings,
    session: Option<Session>,
    hotkey_held: bool,
    next_epoch: u64,
}

impl<H: PickerHost> Picker<H> {
    pub fn new(host: H, settings: PickerSettings) -> Self {
        Self { host, settings, session: None, hotkey_held: false, next_epoch: 1 }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &PickerSettings {
        &self.settings
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Apply one event; returns `false` once the dispatcher should stop
    pub fn handle(&mut self, event: PickerEvent) -> bool {
        match event {
            PickerEvent::KeyDown { key } => self.on_key_down(&key),
            PickerEvent::KeyUp { key } => self.on_key_up(&key),
            PickerEvent::PointerMove { x, y } => self.on_pointer_move(x, y),
            PickerEvent::Click => self.on_click(),
            PickerEvent::Blur => {
                self.hotkey_held = false;
                self.deactivate();
            }
            PickerEvent::Frame { id } => self.on_frame(id),
            PickerEvent::Message(envelope) => self.on_message(&envelope),
            PickerEvent::ClipboardWritten { epoch, result } => self.on_clipboard_written(epoch, result),
            PickerEvent::Timer { epoch, timer } => self.on_timer(epoch, timer),
            PickerEvent::SettingsUpdated(settings) => self.on_settings_updated(settings),
            PickerEvent::Shutdown => {
                self.deactivate();
                return false;
            }
        }
        true
    }

    /// Start a session if none is active and the current page is permitted
    pub fn activate(&mut self) -> bool {
        if self.session.is_some() {
            return false;
        }

        let hostname = self.host.page().hostname();
        if !is_allowed_site(&hostname, &self.settings) {
            log::debug!("Picker not permitted on '{}'", hostname);
            return false;
        }

        if let Err(e) = self.host.page().set_capture(true) {
            log::warn!("Failed to arm page capture: {}", e);
            return false;
        }
        self.host.overlay().mount();

        let epoch = self.next_epoch;
        self.next_epoch += 1;
        self.session = Some(Session::new(epoch));
        log::debug!("Picker activated on '{}' (session {})", hostname, epoch);
        true
    }

    /// End the current session; a no-op when inactive
    pub fn deactivate(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        if let Err(e) = self.host.page().set_capture(false) {
            log::warn!("Failed to disarm page capture: {}", e);
        }
        self.host.overlay().unmount();
        if let Some(frame) = session.frame {
            self.host.scheduler().cancel_frame(frame);
        }
        log::debug!("Picker deactivated (session {})", session.epoch());
    }

    fn on_key_down(&mut self, key: &str) {
        if key == ESCAPE_KEY && self.session.is_some() {
            self.deactivate();
            return;
        }

        if self.hotkey_held || key != self.settings.hotkey {
            return;
        }
        self.hotkey_held = true;
        self.activate();
    }

    fn on_key_up(&mut self, key: &str) {
        if key != self.settings.hotkey {
            return;
        }
        self.hotkey_held = false;
        self.deactivate();
    }

    fn on_pointer_move(&mut self, x: f64, y: f64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.pointer = Some((x, y));
        if session.pending_query {
            return;
        }
        session.pending_query = true;

        let scheduler = self.host.scheduler();
        if let Some(previous) = session.frame.take() {
            scheduler.cancel_frame(previous);
        }
        session.frame = Some(scheduler.request_frame());
    }

    fn on_frame(&mut self, id: FrameId) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.frame != Some(id) {
            log::trace!("Ignoring stale frame {:?}", id);
            return;
        }
        session.frame = None;

        if let Some((x, y)) = session.pointer {
            self.host.bridge().post_query(x, y);
        }
    }

    fn on_message(&mut self, envelope: &Envelope) {
        if self.session.is_none() {
            return;
        }
        let Some(result) = self.host.bridge().accept(envelope) else {
            return;
        };

        self.host.overlay().update(&result, self.settings.parent_chain_depth as usize);
        if let Some(session) = self.session.as_mut() {
            session.pending_query = false;
            session.latest = Some(result);
        }
    }

    fn on_click(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.copying {
            return;
        }

        let Some(result) = session.latest.as_ref().filter(|r| !r.components.is_empty()) else {
            self.deactivate();
            return;
        };

        let href = self.host.page().href();
        let text =
            format_copy_text(&result.components, &self.settings, result.content.as_deref(), result.props.as_deref(), &href);
        session.copying = true;
        let epoch = session.epoch();

        log::debug!("Copying {} bytes for session {}", text.len(), epoch);
        self.host.clipboard().write_text(epoch, text);
    }

    fn on_clipboard_written(&mut self, epoch: u64, result: std::result::Result<(), String>) {
        if !self.is_current(epoch) {
            log::trace!("Ignoring clipboard completion for session {}", epoch);
            return;
        }

        match result {
            Ok(()) => {
                self.host.overlay().flash(true);
                self.host.scheduler().schedule(FLASH_DURATION, epoch, Timer::FlashEnd);
            }
            Err(e) => {
                log::warn!("Clipboard write failed: {}", e);
                self.host.overlay().notify("Could not copy component info to the clipboard");
            }
        }
        self.host.scheduler().schedule(DEACTIVATE_DELAY, epoch, Timer::Deactivate);
    }

    fn on_timer(&mut self, epoch: u64, timer: Timer) {
        if !self.is_current(epoch) {
            log::trace!("Ignoring {:?} timer for session {}", timer, epoch);
            return;
        }

        match timer {
            Timer::FlashEnd => self.host.overlay().flash(false),
            Timer::Deactivate => self.deactivate(),
        }
    }

    fn on_settings_updated(&mut self, settings: PickerSettings) {
        self.settings = settings;
        if self.session.is_none() {
            return;
        }

        let hostname = self.host.page().hostname();
        self.deactivate();
        if is_allowed_site(&hostname, &self.settings) {
            self.activate();
        } else {
            log::debug!("Picker no longer permitted on '{}'", hostname);
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.session.as_ref().is_some_and(|s| s.epoch() == epoch)
    }
}
