use crate::error::{PickerError, Result};
use crate::overlay::{Measurement, OverlayFrame, OverlaySurface};
use headless_chrome::Tab;
use serde::Serialize;
use std::sync::Arc;

const OVERLAY_SCRIPT: &str = include_str!("overlay.js");

/// [`OverlaySurface`] backed by fixed-position elements injected into the tab
pub struct CdpOverlaySurface {
    tab: Arc<Tab>,
}

impl CdpOverlaySurface {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    /// Install `window.__rcpOverlay`; a no-op when the page already has it
    pub fn install(&self) -> Result<()> {
        self.tab
            .evaluate(OVERLAY_SCRIPT, false)
            .map_err(|e| PickerError::OverlayFailed(format!("Failed to install overlay script: {}", e)))?;
        Ok(())
    }

    fn call(&self, method: &str, arg: Option<String>) -> Result<Option<serde_json::Value>> {
        // The page may have navigated since the last call, taking the script with it
        let expression = format!(
            "(function() {{ if (!window.__rcpOverlay) {{ {} }} return window.__rcpOverlay.{}({}); }})()",
            OVERLAY_SCRIPT.trim_end(),
            method,
            arg.unwrap_or_default()
        );

        let result = self
            .tab
            .evaluate(&expression, false)
            .map_err(|e| PickerError::OverlayFailed(format!("Overlay {} failed: {}", method, e)))?;
        Ok(result.value)
    }
}

fn js_arg<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| PickerError::OverlayFailed(format!("Failed to encode argument: {}", e)))
}

impl OverlaySurface for CdpOverlaySurface {
    fn mount(&mut self) -> Result<()> {
        self.call("mount", None).map(|_| ())
    }

    fn unmount(&mut self) -> Result<()> {
        self.call("unmount", None).map(|_| ())
    }

    fn hide(&mut self) -> Result<()> {
        self.call("hide", None).map(|_| ())
    }

    fn measure_tooltip(&mut self, html: &str) -> Result<Measurement> {
        // A freshly reinstalled script has no tooltip element and answers null
        let value = match self.call("measure", Some(js_arg(html)?))? {
            None | Some(serde_json::Value::Null) => return Err(PickerError::OverlayNotMounted),
            Some(value) => value,
        };

        let json_str: String = serde_json::from_value(value)
            .map_err(|e| PickerError::OverlayFailed(format!("Unexpected measurement value: {}", e)))?;

        serde_json::from_str(&json_str)
            .map_err(|e| PickerError::OverlayFailed(format!("Failed to parse measurement: {}", e)))
    }

    fn show(&mut self, frame: &OverlayFrame) -> Result<()> {
        self.call("show", Some(js_arg(frame)?)).map(|_| ())
    }

    fn set_flash(&mut self, on: bool) -> Result<()> {
        self.call("flash", Some(on.to_string())).map(|_| ())
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        self.call("notify", Some(js_arg(message)?)).map(|_| ())
    }
}
