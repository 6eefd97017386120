//! Live picker wiring
//!
//! [`PickerRuntime`] connects a tab to the picker: page hooks and bus traffic become
//! [`PickerEvent`]s on one queue, and a single dispatcher thread drains that queue in order.

use crate::bridge::{BusBridge, Envelope, MessageBus, ResolverEndpoint, TabResolver};
use crate::clipboard::{ClipboardWorker, SystemClipboard};
use crate::error::{PickerError, Result};
use crate::overlay::CdpOverlaySurface;
use crate::page::{CdpPage, PageSignal, ensure_hooks, install_hooks};
use crate::picker::{FrameId, HostParts, Picker, PickerEvent, PickerHost, Scheduler, Timer};
use crate::settings::{SettingsRelay, SettingsUpdated};
use headless_chrome::Tab;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Approximate display refresh interval used for animation frames
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// [`Scheduler`] backed by tokio timers; fired frames and timers are sent to the event queue
pub struct TokioScheduler {
    handle: Handle,
    events: mpsc::UnboundedSender<PickerEvent>,
    frame_interval: Duration,
    frames: HashMap<FrameId, JoinHandle<()>>,
    next_frame: u64,
}

impl TokioScheduler {
    pub fn new(handle: Handle, events: mpsc::UnboundedSender<PickerEvent>, frame_interval: Duration) -> Self {
        Self { handle, events, frame_interval, frames: HashMap::new(), next_frame: 0 }
    }

    /// Number of frame requests that have neither fired nor been cancelled
    pub fn pending_frames(&self) -> usize {
        self.frames.values().filter(|task| !task.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn request_frame(&mut self) -> FrameId {
        self.frames.retain(|_, task| !task.is_finished());

        self.next_frame += 1;
        let id = FrameId(self.next_frame);
        let events = self.events.clone();
        let delay = self.frame_interval;
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(PickerEvent::Frame { id });
        });
        self.frames.insert(id, task);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if let Some(task) = self.frames.remove(&id) {
            task.abort();
        }
    }

    fn schedule(&mut self, delay: Duration, epoch: u64, timer: Timer) {
        let events = self.events.clone();
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(PickerEvent::Timer { epoch, timer });
        });
    }
}

/// Drain `events` into `picker` until shutdown or until every sender is gone
pub fn dispatch<H: PickerHost>(mut picker: Picker<H>, mut events: mpsc::UnboundedReceiver<PickerEvent>) {
    while let Some(event) = events.blocking_recv() {
        log::trace!("Dispatching {:?}", event);
        if !picker.handle(event) {
            break;
        }
    }
    picker.deactivate();
    log::debug!("Picker dispatcher stopped");
}

/// Builder for a live picker attached to one tab
pub struct PickerRuntime {
    tab: Arc<Tab>,
    relay: Arc<SettingsRelay>,
    frame_interval: Duration,
    settings_poll: Duration,
    hooks_check: Duration,
}

impl PickerRuntime {
    pub fn new(tab: Arc<Tab>, relay: Arc<SettingsRelay>) -> Self {
        Self {
            tab,
            relay,
            frame_interval: FRAME_INTERVAL,
            settings_poll: Duration::from_secs(1),
            hooks_check: Duration::from_secs(1),
        }
    }

    /// Builder method: set the animation frame interval
    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Builder method: set how often the settings store is re-read
    pub fn settings_poll(mut self, interval: Duration) -> Self {
        self.settings_poll = interval;
        self
    }

    /// Builder method: set how often the page hooks are checked after navigations
    pub fn hooks_check(mut self, interval: Duration) -> Self {
        self.hooks_check = interval;
        self
    }

    /// Wire everything up and start the dispatcher; must be called inside a tokio runtime
    pub fn start(self) -> Result<RuntimeHandle> {
        let handle = Handle::try_current().map_err(|e| PickerError::ChannelClosed(e.to_string()))?;
        let (events, receiver) = mpsc::unbounded_channel();
        let bus = MessageBus::new();
        let mut tasks = Vec::new();

        tasks.push(handle.spawn(ResolverEndpoint::new(bus.clone(), TabResolver::new(self.tab.clone())).run()));
        tasks.push(handle.spawn(forward_bus(bus.subscribe(), events.clone())));
        tasks.push(handle.spawn(forward_settings(self.relay.subscribe(), events.clone())));
        tasks.push(handle.spawn(Arc::clone(&self.relay).watch(self.settings_poll)));

        let sink_bus = bus.clone();
        let sink_events = events.clone();
        install_hooks(
            &self.tab,
            Arc::new(move |signal: PageSignal| {
                if let Some(event) = signal.route(&sink_bus) {
                    let _ = sink_events.send(event);
                }
            }),
        )?;
        tasks.push(handle.spawn(watch_hooks(self.tab.clone(), self.hooks_check)));

        let surface = CdpOverlaySurface::new(self.tab.clone());
        surface.install()?;

        let host = HostParts::new(
            CdpPage::new(self.tab.clone()),
            surface,
            TokioScheduler::new(handle.clone(), events.clone(), self.frame_interval),
            ClipboardWorker::spawn(SystemClipboard::new, events.clone())?,
            BusBridge::new(bus.clone()),
        );
        let picker = Picker::new(host, self.relay.current());

        let dispatcher = std::thread::Builder::new()
            .name("picker-dispatch".to_string())
            .spawn(move || dispatch(picker, receiver))
            .map_err(|e| PickerError::ChannelClosed(format!("Failed to start dispatcher: {}", e)))?;

        log::info!("Picker runtime started");
        Ok(RuntimeHandle { events, bus, dispatcher: Some(dispatcher), tasks })
    }
}

async fn forward_bus(mut receiver: broadcast::Receiver<Envelope>, events: mpsc::UnboundedSender<PickerEvent>) {
    loop {
        match receiver.recv().await {
            Ok(envelope) => {
                if events.send(PickerEvent::Message(envelope)).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("Picker skipped {} bus messages", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn forward_settings(
    mut receiver: broadcast::Receiver<SettingsUpdated>,
    events: mpsc::UnboundedSender<PickerEvent>,
) {
    loop {
        match receiver.recv().await {
            Ok(update) => {
                if events.send(PickerEvent::SettingsUpdated(update.settings)).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn watch_hooks(tab: Arc<Tab>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let tab = tab.clone();
        match tokio::task::spawn_blocking(move || ensure_hooks(&tab)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::debug!("Failed to refresh page hooks: {}", e),
            Err(e) => log::debug!("Hook refresh task failed: {}", e),
        }
    }
}

/// A running picker; dropping it stops the dispatcher
pub struct RuntimeHandle {
    events: mpsc::UnboundedSender<PickerEvent>,
    bus: MessageBus,
    dispatcher: Option<std::thread::JoinHandle<()>>,
    tasks: Vec<JoinHandle<()>>,
}

impl RuntimeHandle {
    /// Inject an event as if the page had produced it
    pub fn send(&self, event: PickerEvent) -> Result<()> {
        self.events.send(event).map_err(|e| PickerError::ChannelClosed(e.to_string()))
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn is_running(&self) -> bool {
        self.dispatcher.as_ref().is_some_and(|d| !d.is_finished())
    }

    /// End any active session and stop every task
    pub async fn shutdown(mut self) {
        let _ = self.events.send(PickerEvent::Shutdown);
        if let Some(dispatcher) = self.dispatcher.take() {
            match tokio::task::spawn_blocking(move || dispatcher.join()).await {
                Ok(Ok(())) => {}
                _ => log::warn!("Picker dispatcher did not stop cleanly"),
            }
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        log::info!("Picker runtime stopped");
    }
}

impl Drop for RuntimeHandle {
    fn drop(&mut self) {
        let _ = self.events.send(PickerEvent::Shutdown);
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frame_fires_once() {
        let (events, mut receiver) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(Handle::current(), events, Duration::from_millis(1));

        let id = scheduler.request_frame();
        let event = tokio::time::timeout(Duration::from_secs(5), receiver.recv()).await.unwrap().unwrap();
        assert_eq!(event, PickerEvent::Frame { id });
    }

    #[tokio::test]
    async fn test_cancelled_frame_never_fires() {
        let (events, mut receiver) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(Handle::current(), events, Duration::from_millis(20));

        let cancelled = scheduler.request_frame();
        scheduler.cancel_frame(cancelled);
        let kept = scheduler.request_frame();
        assert_ne!(cancelled, kept);

        let event = tokio::time::timeout(Duration::from_secs(5), receiver.recv()).await.unwrap().unwrap();
        assert_eq!(event, PickerEvent::Frame { id: kept });
    }

    #[tokio::test]
    async fn test_timer_carries_epoch() {
        let (events, mut receiver) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(Handle::current(), events, FRAME_INTERVAL);

        scheduler.schedule(Duration::from_millis(1), 3, Timer::Deactivate);
        let event = tokio::time::timeout(Duration::from_secs(5), receiver.recv()).await.unwrap().unwrap();
        assert_eq!(event, PickerEvent::Timer { epoch: 3, timer: Timer::Deactivate });
    }

    #[tokio::test]
    async fn test_pending_frames_counts_outstanding_requests() {
        let (events, _receiver) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(Handle::current(), events, Duration::from_secs(60));

        let first = scheduler.request_frame();
        scheduler.request_frame();
        assert_eq!(scheduler.pending_frames(), 2);

        scheduler.cancel_frame(first);
        assert_eq!(scheduler.pending_frames(), 1);
    }
}
