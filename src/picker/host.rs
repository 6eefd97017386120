use crate::bridge::Bridge;
use crate::error::Result;
use crate::overlay::{Overlay, OverlaySurface};
use crate::picker::event::{FrameId, Timer};
use crate::picker::policy::hostname_of;
use std::time::Duration;

/// The inspected page, as far as the picker needs it
pub trait PageContext {
    /// Current page URL
    fn href(&self) -> String;

    /// Hostname of the current page; empty when it has none
    fn hostname(&self) -> String {
        hostname_of(&self.href()).unwrap_or_default()
    }

    /// Arm or disarm capture-phase interception: crosshair cursor on, page clicks suppressed
    fn set_capture(&mut self, armed: bool) -> Result<()>;
}

/// Frame and timer source; completions come back as picker events
pub trait Scheduler {
    /// Request a `Frame` event at the next animation frame
    fn request_frame(&mut self) -> FrameId;

    fn cancel_frame(&mut self, id: FrameId);

    /// Deliver a `Timer` event after `delay`, stamped with `epoch`
    fn schedule(&mut self, delay: Duration, epoch: u64, timer: Timer);
}

/// Asynchronous clipboard; completion comes back as a `ClipboardWritten` event
pub trait ClipboardSink {
    fn write_text(&mut self, epoch: u64, text: String);
}

/// Everything the picker drives
pub trait PickerHost {
    type Surface: OverlaySurface;

    fn page(&mut self) -> &mut dyn PageContext;

    fn overlay(&mut self) -> &mut Overlay<Self::Surface>;

    fn scheduler(&mut self) -> &mut dyn Scheduler;

    fn clipboard(&mut self) -> &mut dyn ClipboardSink;

    fn bridge(&mut self) -> &mut dyn Bridge;
}

/// [`PickerHost`] assembled from owned parts
pub struct HostParts<P, S, T, C, B>
where
    P: PageContext,
    S: OverlaySurface,
    T: Scheduler,
    C: ClipboardSink,
    B: Bridge,
{
    pub page: P,
    pub overlay: Overlay<S>,
    pub scheduler: T,
    pub clipboard: C,
    pub bridge: B,
}

impl<P, S, T, C, B> HostParts<P, S, T, C, B>
where
    P: PageContext,
    S: OverlaySurface,
    T: Scheduler,
    C: ClipboardSink,
    B: Bridge,
{
    pub fn new(page: P, surface: S, scheduler: T, clipboard: C, bridge: B) -> Self {
        Self { page, overlay: Overlay::new(surface), scheduler, clipboard, bridge }
    }
}

impl<P, S, T, C, B> PickerHost for HostParts<P, S, T, C, B>
where
    P: PageContext,
    S: OverlaySurface,
    T: Scheduler,
    C: ClipboardSink,
    B: Bridge,
{
    type Surface = S;

    fn page(&mut self) -> &mut dyn PageContext {
        &mut self.page
    }

    fn overlay(&mut self) -> &mut Overlay<S> {
        &mut self.overlay
    }

    fn scheduler(&mut self) -> &mut dyn Scheduler {
        &mut self.scheduler
    }

    fn clipboard(&mut self) -> &mut dyn ClipboardSink {
        &mut self.clipboard
    }

    fn bridge(&mut self) -> &mut dyn Bridge {
        &mut self.bridge
    }
}
