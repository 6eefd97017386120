//! Input from the inspected page
//!
//! An injected hook script reports keyboard, pointer, click, blur and `message` traffic to Rust
//! through a runtime binding. While armed it shows the crosshair cursor and swallows the page's
//! own clicks in the capture phase.

pub mod cdp;

pub use cdp::{BINDING_NAME, CdpPage, ensure_hooks, install_hooks};

use crate::bridge::{Envelope, MessageBus};
use crate::picker::PickerEvent;
use serde::{Deserialize, Serialize};

/// One signal reported by the hook script
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageSignal {
    KeyDown { key: String },
    KeyUp { key: String },
    PointerMove { x: f64, y: f64 },
    Click,
    Blur,

    /// A `message` event seen by the page; its payload is untrusted
    Message { origin: String, data: serde_json::Value },
}

impl PageSignal {
    /// Decode a binding call payload
    ///
    /// The binding may deliver the signal as a JSON string, as an object, or wrapped in the
    /// `{name, seq, args}` record the exposed-function shim produces.
    pub fn from_binding(payload: serde_json::Value) -> Option<Self> {
        let mut value = payload;
        loop {
            value = match value {
                serde_json::Value::String(text) => match serde_json::from_str(&text) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        log::debug!("Dropping undecodable page signal: {}", e);
                        return None;
                    }
                },
                serde_json::Value::Object(mut map) if map.contains_key("args") => {
                    match map.remove("args") {
                        Some(serde_json::Value::Array(args)) => args.into_iter().next()?,
                        _ => return None,
                    }
                }
                other => break serde_json::from_value(other).ok(),
            };
        }
    }

    /// Turn the signal into a picker event; page messages go onto the bus instead
    pub fn route(self, bus: &MessageBus) -> Option<PickerEvent> {
        match self {
            PageSignal::KeyDown { key } => Some(PickerEvent::KeyDown { key }),
            PageSignal::KeyUp { key } => Some(PickerEvent::KeyUp { key }),
            PageSignal::PointerMove { x, y } => Some(PickerEvent::PointerMove { x, y }),
            PageSignal::Click => Some(PickerEvent::Click),
            PageSignal::Blur => Some(PickerEvent::Blur),
            PageSignal::Message { origin, data } => {
                bus.post(Envelope::from_page(origin, data));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::MessageSource;
    use serde_json::json;

    #[test]
    fn test_signal_wire_format() {
        let signal: PageSignal = serde_json::from_value(json!({"kind": "pointermove", "x": 3, "y": 4.5})).unwrap();
        assert_eq!(signal, PageSignal::PointerMove { x: 3.0, y: 4.5 });

        let signal: PageSignal = serde_json::from_value(json!({"kind": "keydown", "key": "Alt"})).unwrap();
        assert_eq!(signal, PageSignal::KeyDown { key: "Alt".to_string() });
    }

    #[test]
    fn test_from_binding_accepts_every_shape() {
        let expected = PageSignal::Click;

        assert_eq!(PageSignal::from_binding(json!({"kind": "click"})), Some(expected.clone()));
        assert_eq!(PageSignal::from_binding(json!(r#"{"kind":"click"}"#)), Some(expected.clone()));
        assert_eq!(
            PageSignal::from_binding(json!({"name": "__rcpEmit", "seq": 1, "args": [r#"{"kind":"click"}"#]})),
            Some(expected.clone())
        );
        assert_eq!(
            PageSignal::from_binding(json!(r#"{"name":"__rcpEmit","seq":2,"args":[{"kind":"click"}]}"#)),
            Some(expected)
        );
    }

    #[test]
    fn test_from_binding_rejects_garbage() {
        assert_eq!(PageSignal::from_binding(json!("not json")), None);
        assert_eq!(PageSignal::from_binding(json!({"kind": "scroll"})), None);
        assert_eq!(PageSignal::from_binding(json!({"args": []})), None);
        assert_eq!(PageSignal::from_binding(json!(42)), None);
    }

    #[test]
    fn test_route_input_signals() {
        let bus = MessageBus::new();
        assert_eq!(PageSignal::Blur.route(&bus), Some(PickerEvent::Blur));
        assert_eq!(
            PageSignal::PointerMove { x: 1.0, y: 2.0 }.route(&bus),
            Some(PickerEvent::PointerMove { x: 1.0, y: 2.0 })
        );
    }

    #[test]
    fn test_route_messages_to_bus_as_page_traffic() {
        let bus = MessageBus::new();
        let mut receiver = bus.subscribe();

        let signal =
            PageSignal::Message { origin: "http://localhost:3000".to_string(), data: json!({"type": "RCP_RESULT"}) };
        assert_eq!(signal.route(&bus), None);

        let envelope = receiver.try_recv().unwrap();
        assert_eq!(envelope.source, MessageSource::Page);
        assert_eq!(envelope.origin, "http://localhost:3000");
    }
}
