//! Highlight box and tooltip drawn over the hovered element
//!
//! Rendering is split in two: [`render_tooltip`] and [`place_tooltip`] are pure functions of the
//! query result, and an [`OverlaySurface`] puts the result on screen. The overlay never mutates
//! the state it is given.

pub mod surface;

pub use surface::CdpOverlaySurface;

use crate::error::{PickerError, Result};
use crate::fiber::{ComponentInfo, QueryResult, Rect};
use crate::picker::format::format_location;
use serde::{Deserialize, Serialize};

/// Space between the highlighted element and the tooltip
pub const TOOLTIP_GAP: f64 = 8.0;

/// Minimum distance kept between the tooltip and the viewport's side edges
pub const VIEWPORT_MARGIN: f64 = 8.0;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Viewport-space position of the tooltip's top-left corner
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub top: f64,
    pub left: f64,
}

/// Tooltip size as laid out by the surface, plus the viewport it was laid out in
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Measurement {
    pub tooltip: Size,
    pub viewport: Size,
}

/// Everything a surface needs to draw one frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayFrame {
    pub rect: Rect,
    pub tooltip_html: String,
    pub tooltip_position: Point,
}

/// Tooltip inputs: the resolved chain, how many ancestors to list, and the props preview
#[derive(Debug, Clone, Copy)]
pub struct OverlayView<'a> {
    pub components: &'a [ComponentInfo],
    pub depth: usize,
    pub props: Option<&'a str>,
}

impl<'a> OverlayView<'a> {
    pub fn new(result: &'a QueryResult, depth: usize) -> Self {
        Self { components: &result.components, depth, props: result.props.as_deref() }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Tooltip markup; every interpolated string is escaped
///
/// Lines are separated by `\n` because the tooltip is laid out with `white-space: pre`.
pub fn render_tooltip(view: &OverlayView<'_>) -> String {
    let Some(primary) = view.components.first() else {
        return String::new();
    };

    let mut html = format!(
        r#"<span style="color:#61dafb;font-weight:bold;font-size:13px">{}</span>"#,
        escape_html(&primary.name)
    );

    if let Some(location) = format_location(primary) {
        html.push_str(&format!("\n<span style=\"color:#888;font-size:11px\">{}</span>", escape_html(&location)));
    }

    if let Some(props) = view.props.filter(|p| !p.is_empty()) {
        html.push_str(&format!("\n<span style=\"color:#777;font-size:10px\">{}</span>", escape_html(props)));
    }

    let parents: Vec<&ComponentInfo> = view.components.iter().skip(1).take(view.depth).collect();
    if !parents.is_empty() {
        html.push_str("\n<span style=\"color:#666;font-size:10px\">");
        for parent in parents {
            html.push_str(&format!("\n  in <span style=\"color:#a0a0a0\">{}</span>", escape_html(&parent.name)));
            if let Some(location) = format_location(parent) {
                html.push_str(&format!(" <span style=\"color:#666\">({})</span>", escape_html(&location)));
            }
        }
        html.push_str("</span>");
    }

    html
}

/// Position the tooltip above `rect`, or below it when above would leave the viewport
pub fn place_tooltip(rect: &Rect, tooltip: Size, viewport: Size) -> Point {
    let mut top = rect.top - tooltip.height - TOOLTIP_GAP;
    if top < 0.0 {
        top = rect.bottom() + TOOLTIP_GAP;
    }

    let mut left = rect.left;
    if left + tooltip.width > viewport.width - VIEWPORT_MARGIN {
        left = viewport.width - tooltip.width - VIEWPORT_MARGIN;
    }
    if left < VIEWPORT_MARGIN {
        left = VIEWPORT_MARGIN;
    }

    Point { top, left }
}

/// Something the overlay can be drawn on
pub trait OverlaySurface {
    /// Create the highlight and tooltip elements; calling it again is harmless
    fn mount(&mut self) -> Result<()>;

    /// Remove everything [`mount`](Self::mount) created
    fn unmount(&mut self) -> Result<()>;

    fn hide(&mut self) -> Result<()>;

    /// Lay out the tooltip with this markup and report its size
    fn measure_tooltip(&mut self, html: &str) -> Result<Measurement>;

    fn show(&mut self, frame: &OverlayFrame) -> Result<()>;

    /// Toggle the copy confirmation highlight
    fn set_flash(&mut self, on: bool) -> Result<()>;

    /// Show a short-lived notice that does not block the page
    fn notify(&mut self, message: &str) -> Result<()>;
}

/// Drives a surface from query results
///
/// Surface failures are logged and swallowed so they never interrupt pointer tracking.
pub struct Overlay<S: OverlaySurface> {
    surface: S,
    mounted: bool,
}

impl<S: OverlaySurface> Overlay<S> {
    pub fn new(surface: S) -> Self {
        Self { surface, mounted: false }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        match self.surface.mount() {
            Ok(()) => self.mounted = true,
            Err(e) => log::warn!("Failed to mount overlay: {}", e),
        }
    }

    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        if let Err(e) = self.surface.unmount() {
            log::warn!("Failed to unmount overlay: {}", e);
        }
    }

    /// Draw `result`, or hide when it has nothing to show
    pub fn update(&mut self, result: &QueryResult, depth: usize) {
        if !self.mounted {
            return;
        }

        let rect = match result.rect {
            Some(rect) if !result.components.is_empty() => rect,
            _ => {
                if let Err(e) = self.surface.hide() {
                    log::warn!("Failed to hide overlay: {}", e);
                }
                return;
            }
        };

        let tooltip_html = render_tooltip(&OverlayView::new(result, depth));
        let measured = match self.surface.measure_tooltip(&tooltip_html) {
            Err(PickerError::OverlayNotMounted) => {
                log::debug!("Overlay elements are gone from the page, mounting again");
                self.surface.mount().and_then(|()| self.surface.measure_tooltip(&tooltip_html))
            }
            other => other,
        };
        let measurement = match measured {
            Ok(measurement) => measurement,
            Err(e) => {
                log::warn!("Failed to measure tooltip: {}", e);
                return;
            }
        };

        let frame = OverlayFrame {
            rect,
            tooltip_position: place_tooltip(&rect, measurement.tooltip, measurement.viewport),
            tooltip_html,
        };
        if let Err(e) = self.surface.show(&frame) {
            log::warn!("Failed to draw overlay: {}", e);
        }
    }

    pub fn flash(&mut self, on: bool) {
        if !self.mounted {
            return;
        }
        if let Err(e) = self.surface.set_flash(on) {
            log::debug!("Failed to toggle copy flash: {}", e);
        }
    }

    pub fn notify(&mut self, message: &str) {
        if let Err(e) = self.surface.notify(message) {
            log::warn!("Failed to show notice '{}': {}", message, e);
        }
    }
}
