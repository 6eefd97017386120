//! Query/result protocol between the picker and the resolver
//!
//! The channel is broadcast-style and shared with whatever the inspected page posts, so both
//! sides accept only envelopes that are locally sourced, carry the local origin and match the
//! expected type tag. Requests carry no correlation id: the picker keeps at most one query in
//! flight, so a result always answers the latest query.

pub mod bus;
pub mod endpoint;
pub mod message;

pub use bus::MessageBus;
pub use endpoint::{QueryHandler, ResolverEndpoint, TabResolver};
pub use message::{BridgeMessage, Envelope, LOCAL_ORIGIN, MessageSource, QUERY_TYPE, RESULT_TYPE};

use crate::fiber::QueryResult;

/// Sends coordinate queries toward the resolver
pub trait Bridge {
    fn post_query(&mut self, x: f64, y: f64);

    /// Accept a result envelope meant for this side, dropping anything else
    fn accept(&self, envelope: &Envelope) -> Option<QueryResult> {
        accept_result(envelope)
    }
}

/// [`Bridge`] that posts onto a [`MessageBus`]
#[derive(Debug, Clone)]
pub struct BusBridge {
    bus: MessageBus,
}

impl BusBridge {
    pub fn new(bus: MessageBus) -> Self {
        Self { bus }
    }
}

impl Bridge for BusBridge {
    fn post_query(&mut self, x: f64, y: f64) {
        log::trace!("Posting query at ({}, {})", x, y);
        self.bus.post_local(&BridgeMessage::Query { x, y });
    }
}

fn is_trusted(envelope: &Envelope, expected_type: &str) -> bool {
    envelope.source == MessageSource::Local
        && envelope.origin == LOCAL_ORIGIN
        && envelope.type_tag() == Some(expected_type)
}

/// Result payload of a trusted `RCP_RESULT` envelope
pub fn accept_result(envelope: &Envelope) -> Option<QueryResult> {
    if !is_trusted(envelope, RESULT_TYPE) {
        log::trace!("Dropping {:?} message from {}", envelope.type_tag(), envelope.origin);
        return None;
    }

    match serde_json::from_value::<BridgeMessage>(envelope.data.clone()) {
        Ok(BridgeMessage::Result(result)) => Some(result),
        Ok(_) => None,
        Err(e) => {
            log::debug!("Dropping malformed result: {}", e);
            None
        }
    }
}

/// Coordinates of a trusted `RCP_QUERY` envelope
pub fn accept_query(envelope: &Envelope) -> Option<(f64, f64)> {
    if !is_trusted(envelope, QUERY_TYPE) {
        return None;
    }

    match serde_json::from_value::<BridgeMessage>(envelope.data.clone()) {
        Ok(BridgeMessage::Query { x, y }) => Some((x, y)),
        Ok(_) => None,
        Err(e) => {
            log::debug!("Dropping malformed query: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiber::ComponentInfo;

    fn result_message() -> BridgeMessage {
        BridgeMessage::Result(QueryResult { components: vec![ComponentInfo::new("Button")], ..QueryResult::empty() })
    }

    #[test]
    fn test_accepts_local_result() {
        let envelope = Envelope::local(&result_message());
        let result = accept_result(&envelope).unwrap();
        assert_eq!(result.components[0].name, "Button");
    }

    #[test]
    fn test_rejects_page_forged_result() {
        let data = serde_json::to_value(result_message()).unwrap();
        let forged = Envelope::from_page("http://localhost:3000", data.clone());
        assert!(accept_result(&forged).is_none());

        // Even when the page spoofs the local origin
        let spoofed = Envelope::from_page(LOCAL_ORIGIN, data);
        assert!(accept_result(&spoofed).is_none());
    }

    #[test]
    fn test_rejects_wrong_origin_or_tag() {
        let mut envelope = Envelope::local(&result_message());
        envelope.origin = "https://elsewhere.example".to_string();
        assert!(accept_result(&envelope).is_none());

        let query = Envelope::local(&BridgeMessage::Query { x: 1.0, y: 1.0 });
        assert!(accept_result(&query).is_none());
        assert_eq!(accept_query(&query), Some((1.0, 1.0)));
        assert!(accept_query(&Envelope::local(&result_message())).is_none());
    }

    #[test]
    fn test_rejects_malformed_payload() {
        let envelope = Envelope {
            source: MessageSource::Local,
            origin: LOCAL_ORIGIN.to_string(),
            data: serde_json::json!({"type": "RCP_RESULT", "components": "nope"}),
        };
        assert!(accept_result(&envelope).is_none());
    }

    #[test]
    fn test_bus_bridge_posts_query() {
        let bus = MessageBus::new();
        let mut receiver = bus.subscribe();
        let mut bridge = BusBridge::new(bus);

        bridge.post_query(12.0, 34.0);

        let envelope = receiver.try_recv().unwrap();
        assert_eq!(accept_query(&envelope), Some((12.0, 34.0)));
    }
}
