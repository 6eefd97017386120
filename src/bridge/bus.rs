use crate::bridge::message::{BridgeMessage, Envelope};
use tokio::sync::broadcast;

const BUS_CAPACITY: usize = 64;

/// Broadcast channel shared by every endpoint, and by traffic forwarded from the page
///
/// Every subscriber sees every envelope; receivers filter for what they expect.
#[derive(Debug, Clone)]
pub struct MessageBus {
    sender: broadcast::Sender<Envelope>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    /// Deliver an envelope to every current subscriber; best effort
    pub fn post(&self, envelope: Envelope) {
        if self.sender.send(envelope).is_err() {
            log::trace!("Message posted with no subscribers");
        }
    }

    /// Post a message from this process
    pub fn post_local(&self, message: &BridgeMessage) {
        self.post(Envelope::local(message));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
