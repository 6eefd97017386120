use crate::error::Result;
use crate::settings::{PickerSettings, SettingsStore};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

/// Broadcast sent to every interested context after each save
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename = "SETTINGS_UPDATED")]
pub struct SettingsUpdated {
    pub settings: PickerSettings,
}

/// Persists settings and fans out `SETTINGS_UPDATED` notifications
pub struct SettingsRelay {
    store: Arc<dyn SettingsStore>,
    sender: broadcast::Sender<SettingsUpdated>,
    last_seen: Mutex<Option<PickerSettings>>,
}

impl SettingsRelay {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { store, sender, last_seen: Mutex::new(None) }
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Write defaults when nothing is stored yet; returns whether seeding happened
    pub fn seed_defaults(&self) -> Result<bool> {
        if self.store.get()?.is_some() {
            return Ok(false);
        }
        log::info!("No stored settings, seeding defaults");
        self.store.set(&PickerSettings::default())?;
        Ok(true)
    }

    /// Current settings, falling back to defaults
    pub fn current(&self) -> PickerSettings {
        let settings = self.store.load_or_default();
        self.remember(&settings);
        settings
    }

    /// Persist `settings` and notify every subscriber
    pub fn publish(&self, settings: PickerSettings) -> Result<()> {
        self.store.set(&settings)?;
        self.remember(&settings);
        self.broadcast(settings);
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SettingsUpdated> {
        self.sender.subscribe()
    }

    /// Re-read the store and broadcast when it changed behind our back
    ///
    /// Picks up saves made by another process, such as the `settings` subcommand.
    pub fn poll_store(&self) -> Result<bool> {
        let Some(stored) = self.store.get()? else {
            return Ok(false);
        };

        let changed = match self.last_seen.lock() {
            Ok(mut last) => {
                let changed = last.as_ref() != Some(&stored);
                *last = Some(stored.clone());
                changed
            }
            Err(_) => false,
        };

        if changed {
            log::debug!("Stored settings changed, broadcasting");
            self.broadcast(stored);
        }
        Ok(changed)
    }

    /// Poll the store until the relay is dropped by every other owner
    pub async fn watch(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if Arc::strong_count(&self) == 1 {
                break;
            }
            if let Err(e) = self.poll_store() {
                log::warn!("Settings poll failed: {}", e);
            }
        }
    }

    fn remember(&self, settings: &PickerSettings) {
        if let Ok(mut last) = self.last_seen.lock() {
            *last = Some(settings.clone());
        }
    }

    fn broadcast(&self, settings: PickerSettings) {
        // No subscribers is fine; nothing is listening yet
        let _ = self.sender.send(SettingsUpdated { settings });
    }
}
