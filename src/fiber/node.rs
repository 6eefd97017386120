use crate::fiber::props::PropValue;
use crate::fiber::source::DebugMetadata;
use serde::{Deserialize, Serialize};

/// Coarse classification of a framework tree node
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Plain markup element (`div`, `button`, ...)
    Host,
    /// User-defined function, class, memo or forward-ref component
    Component,
    /// Roots, text nodes, fragments and anything without a usable type
    #[default]
    #[serde(other)]
    Other,
}

/// Name candidates a component node may carry, in preference order
#[derive(Debug, Clone, Copy, Default)]
pub struct NameHints<'a> {
    pub display_name: Option<&'a str>,
    pub name: Option<&'a str>,
    /// Name of the inner render function for wrapped or forwarded types
    pub render_name: Option<&'a str>,
}

impl<'a> NameHints<'a> {
    /// First non-empty hint
    pub fn best(&self) -> Option<&'a str> {
        [self.display_name, self.name, self.render_name].into_iter().flatten().find(|n| !n.is_empty())
    }
}

/// Best-effort read access to an opaque, parent-linked framework node
///
/// Every accessor is optional; an adapter returns `None` for anything its framework shape does
/// not expose. The resolver only talks to nodes through this trait.
pub trait IntrospectableNode: Sized {
    fn kind(&self) -> NodeKind;

    /// Tag name for host nodes
    fn tag_name(&self) -> Option<&str>;

    fn name_hints(&self) -> NameHints<'_>;

    fn debug_metadata(&self) -> DebugMetadata<'_>;

    /// The `return` link toward the root
    fn parent(&self) -> Option<Self>;

    /// Rendered text of a host node, if captured
    fn text_content(&self) -> Option<&str> {
        None
    }

    /// Current input properties, if captured
    fn props(&self) -> Option<&PropValue> {
        None
    }

    fn is_host(&self) -> bool {
        self.kind() == NodeKind::Host
    }

    fn is_component(&self) -> bool {
        self.kind() == NodeKind::Component
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_hints_preference() {
        let hints = NameHints { display_name: Some(""), name: Some("Button"), render_name: Some("render") };
        assert_eq!(hints.best(), Some("Button"));

        let wrapped = NameHints { display_name: None, name: None, render_name: Some("FancyInput") };
        assert_eq!(wrapped.best(), Some("FancyInput"));

        assert_eq!(NameHints::default().best(), None);
    }

    #[test]
    fn test_unknown_kind_deserializes_as_other() {
        let kind: NodeKind = serde_json::from_str("\"portal\"").unwrap();
        assert_eq!(kind, NodeKind::Other);
        let kind: NodeKind = serde_json::from_str("\"host\"").unwrap();
        assert_eq!(kind, NodeKind::Host);
    }
}
