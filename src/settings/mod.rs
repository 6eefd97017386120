//! User preferences
//!
//! Settings are owned by the store and relay; the picker only ever holds a read-only copy that
//! is replaced wholesale when a `SETTINGS_UPDATED` notification arrives.

pub mod relay;
pub mod store;

pub use relay::{SettingsRelay, SettingsUpdated};
pub use store::{FileSettingsStore, MemorySettingsStore, SettingsStore};

use crate::picker::policy::is_local_dev_host;
use serde::{Deserialize, Serialize};

/// Picker preferences as persisted and broadcast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PickerSettings {
    /// Key name (as reported by `KeyboardEvent.key`) that activates the picker while held
    pub hotkey: String,

    /// Append ancestor lines to the copied text
    pub include_parent_chain: bool,

    /// Append the page URL to the copied text
    pub include_page_url: bool,

    /// Number of ancestors shown in the tooltip and copied text
    pub parent_chain_depth: u32,

    /// Exact hostnames, besides local development hosts, where the picker may activate
    pub allowed_sites: Vec<String>,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            hotkey: "Alt".to_string(),
            include_parent_chain: true,
            include_page_url: false,
            parent_chain_depth: 3,
            allowed_sites: Vec::new(),
        }
    }
}

impl PickerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set hotkey
    pub fn hotkey(mut self, hotkey: impl Into<String>) -> Self {
        self.hotkey = hotkey.into();
        self
    }

    /// Builder method: toggle the parent chain and set its depth
    pub fn parent_chain(mut self, include: bool, depth: u32) -> Self {
        self.include_parent_chain = include;
        self.parent_chain_depth = depth;
        self
    }

    /// Builder method: toggle the page URL
    pub fn page_url(mut self, include: bool) -> Self {
        self.include_page_url = include;
        self
    }

    /// Builder method: add an allowed hostname
    pub fn allow(mut self, hostname: impl Into<String>) -> Self {
        self.set_site_enabled(&hostname.into(), true);
        self
    }

    /// Enable or disable the picker for one hostname
    ///
    /// Local development hosts are always enabled and are never written to the allow-list.
    /// Returns whether the list changed.
    pub fn set_site_enabled(&mut self, hostname: &str, enabled: bool) -> bool {
        if hostname.is_empty() || is_local_dev_host(hostname) {
            return false;
        }

        let present = self.allowed_sites.iter().any(|h| h == hostname);
        match (enabled, present) {
            (true, false) => {
                self.allowed_sites.push(hostname.to_string());
                true
            }
            (false, true) => {
                self.allowed_sites.retain(|h| h != hostname);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PickerSettings::default();
        assert_eq!(settings.hotkey, "Alt");
        assert!(settings.include_parent_chain);
        assert_eq!(settings.parent_chain_depth, 3);
        assert!(!settings.include_page_url);
        assert!(settings.allowed_sites.is_empty());
    }

    #[test]
    fn test_partial_record_merges_over_defaults() {
        let settings: PickerSettings = serde_json::from_str(r#"{"hotkey": "Shift", "parentChainDepth": 5}"#).unwrap();
        assert_eq!(settings.hotkey, "Shift");
        assert_eq!(settings.parent_chain_depth, 5);
        assert!(settings.include_parent_chain);
        assert!(settings.allowed_sites.is_empty());
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json = serde_json::to_value(PickerSettings::default().allow("example.com")).unwrap();
        assert_eq!(json["includeParentChain"], true);
        assert_eq!(json["includePageUrl"], false);
        assert_eq!(json["parentChainDepth"], 3);
        assert_eq!(json["allowedSites"], serde_json::json!(["example.com"]));
    }

    #[test]
    fn test_set_site_enabled() {
        let mut settings = PickerSettings::default();

        assert!(settings.set_site_enabled("app.example.com", true));
        assert!(!settings.set_site_enabled("app.example.com", true));
        assert_eq!(settings.allowed_sites, vec!["app.example.com"]);

        assert!(settings.set_site_enabled("app.example.com", false));
        assert!(settings.allowed_sites.is_empty());

        assert!(!settings.set_site_enabled("localhost", true));
        assert!(settings.allowed_sites.is_empty());
    }

    #[test]
    fn test_hostnames_are_case_sensitive() {
        let mut settings = PickerSettings::default().allow("Example.com");
        assert!(settings.set_site_enabled("example.com", true));
        assert_eq!(settings.allowed_sites.len(), 2);
    }
}
