use crate::fiber::QueryResult;
use serde::{Deserialize, Serialize};

pub const QUERY_TYPE: &str = "RCP_QUERY";
pub const RESULT_TYPE: &str = "RCP_RESULT";

/// Origin stamped on envelopes posted by this process
pub const LOCAL_ORIGIN: &str = "component-picker://local";

/// Messages carried between the picker and the resolver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum BridgeMessage {
    /// Resolve the element at a viewport coordinate
    #[serde(rename = "RCP_QUERY")]
    Query { x: f64, y: f64 },

    /// Answer to the most recent query
    #[serde(rename = "RCP_RESULT")]
    Result(QueryResult),
}

impl BridgeMessage {
    pub fn type_tag(&self) -> &'static str {
        match self {
            BridgeMessage::Query { .. } => QUERY_TYPE,
            BridgeMessage::Result(_) => RESULT_TYPE,
        }
    }
}

/// Who put a message on the bus
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    /// Posted by an endpoint inside this process
    Local,
    /// Forwarded from the inspected page, which may post anything
    Page,
}

/// A message as observed on the bus: untyped payload plus provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub source: MessageSource,
    pub origin: String,
    pub data: serde_json::Value,
}

impl Envelope {
    /// Envelope for a message posted by this process
    pub fn local(message: &BridgeMessage) -> Self {
        let data = serde_json::to_value(message).unwrap_or_else(|e| {
            log::warn!("Failed to encode {} message: {}", message.type_tag(), e);
            serde_json::Value::Null
        });
        Self { source: MessageSource::Local, origin: LOCAL_ORIGIN.to_string(), data }
    }

    /// Envelope for traffic forwarded from the page
    pub fn from_page(origin: impl Into<String>, data: serde_json::Value) -> Self {
        Self { source: MessageSource::Page, origin: origin.into(), data }
    }

    /// The payload's `type` tag, if it has a string one
    pub fn type_tag(&self) -> Option<&str> {
        self.data.get("type").and_then(|t| t.as_str())
    }
}
