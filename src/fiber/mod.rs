//! Component resolution
//!
//! This module turns a viewport coordinate into a chain of named components:
//! - Capture: an injected script hit-tests the coordinate and reports the raw fiber chain
//! - Resolution: naming, sentinel skipping, source lookup and owner fallback over
//!   [`IntrospectableNode`]
//! - Previews: size-capped outer markup and props serialization

pub mod component;
pub mod node;
pub mod props;
pub mod resolver;
pub mod snapshot;
pub mod source;

pub use component::{ComponentInfo, QueryResult, Rect};
pub use node::{IntrospectableNode, NameHints, NodeKind};
pub use props::{PropValue, serialize_props};
pub use resolver::{MAX_CHAIN_LEN, Resolver};
pub use snapshot::{HitElement, HitSnapshot, RawFiber, SnapshotNode};
pub use source::{SourceAdapter, SourceLocation, locate_source};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_info_export() {
        let info = ComponentInfo::new("Button");
        assert_eq!(info.name, "Button");
    }

    #[test]
    fn test_resolver_export() {
        let result = Resolver::new().resolve_snapshot(&HitSnapshot::miss());
        assert!(result.components.is_empty());
    }
}
