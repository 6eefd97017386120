use crate::error::{PickerError, Result};
use crate::page::PageSignal;
use crate::picker::PageContext;
use headless_chrome::Tab;
use std::sync::Arc;

/// Runtime binding the hook script reports through
pub const BINDING_NAME: &str = "__rcpEmit";

const HOOKS_SCRIPT: &str = include_str!("hooks.js");

/// Expose the signal binding and install the hook script in the current document
///
/// The binding survives navigations; the script does not, so call [`ensure_hooks`] again after
/// the page changes.
pub fn install_hooks(tab: &Tab, sink: Arc<dyn Fn(PageSignal) + Send + Sync>) -> Result<()> {
    tab.expose_function(
        BINDING_NAME,
        Arc::new(move |payload: serde_json::Value| {
            if let Some(signal) = PageSignal::from_binding(payload) {
                sink(signal);
            }
        }),
    )
    .map_err(|e| PickerError::EvaluationFailed(format!("Failed to expose {}: {}", BINDING_NAME, e)))?;

    ensure_hooks(tab)
}

/// Install the hook script unless the document already has it
pub fn ensure_hooks(tab: &Tab) -> Result<()> {
    tab.evaluate(HOOKS_SCRIPT, false)
        .map_err(|e| PickerError::EvaluationFailed(format!("Failed to install page hooks: {}", e)))?;
    Ok(())
}

/// [`PageContext`] for a live tab
pub struct CdpPage {
    tab: Arc<Tab>,
}

impl CdpPage {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }
}

impl PageContext for CdpPage {
    fn href(&self) -> String {
        self.tab.get_url()
    }

    fn set_capture(&mut self, armed: bool) -> Result<()> {
        let expression = format!(
            "(function() {{ if (!window.__rcpHooks) {{ {} }} return window.__rcpHooks.arm({}); }})()",
            HOOKS_SCRIPT.trim_end(),
            armed
        );

        let result = self
            .tab
            .evaluate(&expression, false)
            .map_err(|e| PickerError::EvaluationFailed(format!("Failed to arm page hooks: {}", e)))?;

        match result.value.and_then(|v| v.as_bool()) {
            Some(state) if state == armed => Ok(()),
            other => Err(PickerError::EvaluationFailed(format!("Page hooks reported {:?} after arm({})", other, armed))),
        }
    }
}
