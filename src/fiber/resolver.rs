use crate::error::{PickerError, Result};
use crate::fiber::component::{ComponentInfo, QueryResult};
use crate::fiber::node::{IntrospectableNode, NodeKind};
use crate::fiber::props::{serialize_props, truncate_chars};
use crate::fiber::snapshot::HitSnapshot;
use crate::fiber::source::{SourceLocation, locate_source};
use headless_chrome::Tab;

/// Primary component plus up to ten ancestors
pub const MAX_CHAIN_LEN: usize = 11;

/// Character budget for the captured outer markup
pub const CONTENT_BUDGET: usize = 2000;

pub const TRUNCATION_MARKER: &str = "\n<!-- truncated -->";

/// Text preview shown next to a host tag on the primary entry
pub const TEXT_PREVIEW_LEN: usize = 50;

/// Framework-internal wrappers that never occupy a chain slot
pub const INTERNAL_NAMES: &[&str] =
    &["Fragment", "Suspense", "StrictMode", "Profiler", "Provider", "Consumer", "ForwardRef", "Context"];

const CAPTURE_SCRIPT: &str = include_str!("capture_fiber.js");

/// Whether a resolved name is one of the internal sentinels
pub fn is_internal_name(name: &str) -> bool {
    INTERNAL_NAMES.contains(&name)
}

/// Display name for a node, or `None` when the node should not occupy a chain slot
///
/// Host nodes resolve to their tag; when `primary` is set the trimmed text content is quoted
/// alongside it.
pub fn resolve_name<N: IntrospectableNode>(node: &N, primary: bool) -> Option<String> {
    let name = match node.kind() {
        NodeKind::Host => {
            let tag = node.tag_name().filter(|t| !t.is_empty())?;
            if is_internal_name(tag) {
                return None;
            }
            let preview = if primary { node.text_content().map(str::trim).filter(|t| !t.is_empty()) } else { None };
            match preview {
                Some(text) => format!("{} \"{}\"", tag, truncate_chars(text, TEXT_PREVIEW_LEN)),
                None => tag.to_string(),
            }
        }
        NodeKind::Component => {
            let name = node.name_hints().best()?;
            if is_internal_name(name) {
                return None;
            }
            name.to_string()
        }
        NodeKind::Other => return None,
    };
    Some(name)
}

/// Direct source location of a node
pub fn source_of<N: IntrospectableNode>(node: &N) -> Option<SourceLocation> {
    locate_source(&node.debug_metadata())
}

/// Nearest strict non-host ancestor with a resolvable source location
pub fn owner_fallback<N: IntrospectableNode>(node: &N) -> Option<(Option<String>, SourceLocation)> {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if !ancestor.is_host() {
            if let Some(location) = source_of(&ancestor) {
                return Some((resolve_name(&ancestor, false), location));
            }
        }
        current = ancestor.parent();
    }
    None
}

/// Walk the `return` chain from `start`, collecting at most [`MAX_CHAIN_LEN`] named entries
pub fn collect_chain<N: IntrospectableNode>(start: N) -> Vec<ComponentInfo> {
    let mut components = Vec::new();
    let mut current = Some(start);

    while let Some(node) = current {
        if components.len() >= MAX_CHAIN_LEN {
            break;
        }

        if let Some(name) = resolve_name(&node, components.is_empty()) {
            let mut info = ComponentInfo::new(name);
            match source_of(&node) {
                Some(location) => info = info.with_source(location),
                None => {
                    if let Some((owner_name, location)) = owner_fallback(&node) {
                        info = info.with_owner(owner_name, location);
                    }
                }
            }
            components.push(info);
        }

        current = node.parent();
    }

    components
}

/// First genuine component in the raw upward walk, regardless of name filtering
pub fn first_component<N: IntrospectableNode>(start: N) -> Option<N> {
    let mut current = Some(start);
    while let Some(node) = current {
        if node.is_component() {
            return Some(node);
        }
        current = node.parent();
    }
    None
}

/// Cap outer markup at [`CONTENT_BUDGET`] characters
pub fn truncate_markup(markup: &str) -> String {
    if markup.chars().count() <= CONTENT_BUDGET {
        return markup.to_string();
    }
    let mut out: String = markup.chars().take(CONTENT_BUDGET).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Turns a viewport coordinate into a [`QueryResult`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver;

impl Resolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a coordinate against the page in `tab`
    ///
    /// Never fails: capture errors are logged and degrade to an empty result so the
    /// pointer-tracking loop keeps running.
    pub fn resolve(&self, tab: &Tab, x: f64, y: f64) -> QueryResult {
        match Self::capture(tab, x, y) {
            Ok(snapshot) => self.resolve_snapshot(&snapshot),
            Err(e) => {
                log::warn!("Capture at ({}, {}) failed: {}", x, y, e);
                QueryResult::empty()
            }
        }
    }

    /// Run the capture script for one coordinate
    pub fn capture(tab: &Tab, x: f64, y: f64) -> Result<HitSnapshot> {
        if !x.is_finite() || !y.is_finite() {
            return Ok(HitSnapshot::miss());
        }

        let expression = format!("{}({}, {})", CAPTURE_SCRIPT.trim_end(), x, y);
        let result = tab
            .evaluate(&expression, false)
            .map_err(|e| PickerError::EvaluationFailed(format!("Failed to execute capture script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| PickerError::SnapshotParseFailed("No value returned from capture script".to_string()))?;

        // The script returns a JSON string so key order inside props survives the round trip
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| PickerError::SnapshotParseFailed(format!("Failed to get JSON string: {}", e)))?;

        serde_json::from_str(&json_str)
            .map_err(|e| PickerError::SnapshotParseFailed(format!("Failed to parse snapshot JSON: {}", e)))
    }

    /// Resolve an already captured snapshot
    pub fn resolve_snapshot(&self, snapshot: &HitSnapshot) -> QueryResult {
        let Some(hit) = &snapshot.hit else {
            return QueryResult::empty();
        };

        let rect = Some(hit.rect).filter(|r| !r.is_empty());

        if snapshot.truncated {
            log::debug!("Tree walk stopped after {} nodes before reaching the root", snapshot.fibers.len());
        }

        let Some(start) = snapshot.root_node() else {
            log::debug!("Hit element carries no tree node");
            return QueryResult { rect, ..QueryResult::empty() };
        };

        let components = collect_chain(start);
        let content = hit.outer_html.as_deref().map(truncate_markup);
        let props = first_component(start).and_then(|node| node.props().and_then(serialize_props));

        QueryResult { components, rect, content, props }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiber::component::Rect;
    use crate::fiber::props::PropValue;
    use crate::fiber::snapshot::{HitElement, RawFiber};

    fn snapshot(fibers: Vec<RawFiber>) -> HitSnapshot {
        HitSnapshot {
            hit: Some(HitElement {
                rect: Rect::new(10.0, 20.0, 200.0, 40.0),
                outer_html: Some("<button class=\"btn\">Save</button>".to_string()),
            }),
            fibers,
            truncated: false,
        }
    }

    #[test]
    fn test_no_element_yields_empty_result() {
        let result = Resolver::new().resolve_snapshot(&HitSnapshot::miss());
        assert_eq!(result, QueryResult::empty());
        assert!(result.components.is_empty());
        assert!(result.rect.is_none() && result.content.is_none() && result.props.is_none());
    }

    #[test]
    fn test_element_without_tree_node_keeps_geometry() {
        let result = Resolver::new().resolve_snapshot(&snapshot(vec![]));
        assert!(result.components.is_empty());
        assert_eq!(result.rect, Some(Rect::new(10.0, 20.0, 200.0, 40.0)));
        assert!(result.content.is_none());
        assert!(result.props.is_none());
    }

    #[test]
    fn test_zero_area_rect_is_null() {
        let mut snap = snapshot(vec![RawFiber::host("span")]);
        snap.hit.as_mut().unwrap().rect = Rect::new(3.0, 3.0, 0.0, 0.0);

        let result = Resolver::new().resolve_snapshot(&snap);
        assert!(result.rect.is_none());
        assert_eq!(result.components.len(), 1);
    }

    #[test]
    fn test_chain_order_and_host_text_preview() {
        let snap = snapshot(vec![
            RawFiber::host("button").with_text("  Save changes  ").with_source("src/Toolbar.tsx", 12, 7),
            RawFiber::component("SaveButton").with_source("src/SaveButton.tsx", 3, 1),
            RawFiber::host("div").with_text("ignored on ancestors"),
            RawFiber::component("Toolbar").with_source("src/Toolbar.tsx", 1, 1),
            RawFiber::other(),
        ]);

        let result = Resolver::new().resolve_snapshot(&snap);
        let names: Vec<&str> = result.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["button \"Save changes\"", "SaveButton", "div", "Toolbar"]);
        assert_eq!(result.components[0].file_name.as_deref(), Some("src/Toolbar.tsx"));
        assert_eq!(result.components[0].line_number, Some(12));
    }

    #[test]
    fn test_long_text_preview_truncated() {
        let snap = snapshot(vec![RawFiber::host("p").with_text("a".repeat(80))]);
        let result = Resolver::new().resolve_snapshot(&snap);
        assert_eq!(result.components[0].name, format!("p \"{}...\"", "a".repeat(47)));
    }

    #[test]
    fn test_internal_names_are_skipped_and_do_not_count() {
        let mut fibers = vec![RawFiber::component("Leaf")];
        for sentinel in INTERNAL_NAMES {
            fibers.push(RawFiber::component(*sentinel));
        }
        fibers.push(RawFiber::component("Anon").with_display_name("Fragment"));
        fibers.push(RawFiber::component("Root"));

        let result = Resolver::new().resolve_snapshot(&snapshot(fibers));
        let names: Vec<&str> = result.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Leaf", "Root"]);
    }

    #[test]
    fn test_name_resolution_order() {
        let snap = snapshot(vec![
            RawFiber::component("inner").with_display_name("Pretty"),
            RawFiber { kind: NodeKind::Component, ..Default::default() }.with_render_name("FancyInput"),
            RawFiber { kind: NodeKind::Component, ..Default::default() },
        ]);

        let result = Resolver::new().resolve_snapshot(&snap);
        let names: Vec<&str> = result.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Pretty", "FancyInput"]);
    }

    #[test]
    fn test_chain_length_capped() {
        let fibers = (0..30).map(|i| RawFiber::component(format!("C{}", i))).collect();
        let result = Resolver::new().resolve_snapshot(&snapshot(fibers));

        assert_eq!(result.components.len(), MAX_CHAIN_LEN);
        assert_eq!(result.components[0].name, "C0");
        assert_eq!(result.components[10].name, "C10");
        assert!(result.components.iter().all(|c| !is_internal_name(&c.name)));
    }

    #[test]
    fn test_owner_fallback_points_to_nearest_non_host_ancestor() {
        let snap = snapshot(vec![
            RawFiber::host("span"),
            RawFiber::host("div").with_source("src/ignored-host.tsx", 1, 1),
            RawFiber::component("NoSource"),
            RawFiber::component("Card").with_source("src/Card.tsx", 22, 5),
            RawFiber::component("Page").with_source("src/Page.tsx", 2, 2),
        ]);

        let result = Resolver::new().resolve_snapshot(&snap);
        let span = &result.components[0];
        assert!(!span.has_source());
        assert_eq!(span.owner_name.as_deref(), Some("Card"));
        assert_eq!(span.owner_file_name.as_deref(), Some("src/Card.tsx"));
        assert_eq!(span.owner_line_number, Some(22));

        // Direct source suppresses the fallback entirely
        let div = &result.components[1];
        assert!(div.has_source());
        assert!(!div.has_owner());

        let no_source = &result.components[2];
        assert_eq!(no_source.owner_name.as_deref(), Some("Card"));

        assert_eq!(result.components.len(), 5);
    }

    #[test]
    fn test_no_owner_anywhere_leaves_both_groups_absent() {
        let snap = snapshot(vec![RawFiber::host("i"), RawFiber::component("Icon")]);
        let result = Resolver::new().resolve_snapshot(&snap);

        assert!(result.components.iter().all(|c| !c.has_source() && !c.has_owner()));
    }

    #[test]
    fn test_owner_fallback_reads_stack_metadata() {
        let snap = snapshot(vec![
            RawFiber::component("Inner"),
            RawFiber::component("Outer").with_stack("Error\n    at Outer (http://localhost:3000/src/Outer.jsx:8:12)"),
        ]);

        let result = Resolver::new().resolve_snapshot(&snap);
        assert_eq!(result.components[0].owner_file_name.as_deref(), Some("http://localhost:3000/src/Outer.jsx"));
        assert_eq!(result.components[1].file_name.as_deref(), Some("http://localhost:3000/src/Outer.jsx"));
        assert_eq!(result.components[1].column_number, Some(12));
    }

    #[test]
    fn test_owner_fallback_reaches_far_ancestor() {
        let mut fibers = vec![RawFiber::host("a").with_text("Home"), RawFiber::component("NavLink")];
        for i in 0..400 {
            fibers.push(if i % 2 == 0 { RawFiber::host("div") } else { RawFiber::other() });
        }
        fibers.push(RawFiber::component("RootLayout").with_source("app/layout.tsx", 14, 3));

        let result = Resolver::new().resolve_snapshot(&snapshot(fibers));
        let link = &result.components[0];
        assert_eq!(link.owner_name.as_deref(), Some("RootLayout"));
        assert_eq!(link.owner_file_name.as_deref(), Some("app/layout.tsx"));
        assert_eq!(result.components[1].owner_line_number, Some(14));
    }

    #[test]
    fn test_react_19_element_stack_resolves_to_user_file() {
        let snap = snapshot(vec![
            RawFiber::host("button").with_text("Go").with_stack(
                "Error: react-stack-top-frame\n    at exports.jsxDEV (http://localhost:5173/node_modules/.vite/deps/react_jsx-dev-runtime.js?v=9f1c:250:33)\n    at GoButton (http://localhost:5173/src/GoButton.tsx:4:10)",
            ),
            RawFiber::component("GoButton"),
        ]);

        let result = Resolver::new().resolve_snapshot(&snap);
        let button = &result.components[0];
        assert_eq!(button.file_name.as_deref(), Some("http://localhost:5173/src/GoButton.tsx"));
        assert_eq!(button.line_number, Some(4));
        assert!(!result.components[1].has_source());
    }

    #[test]
    fn test_truncated_walk_still_resolves() {
        let mut snap = snapshot(vec![RawFiber::host("span"), RawFiber::component("Deep")]);
        snap.truncated = true;

        let result = Resolver::new().resolve_snapshot(&snap);
        assert_eq!(result.components.len(), 2);
    }

    #[test]
    fn test_props_come_from_first_component_even_if_skipped() {
        let snap = snapshot(vec![
            RawFiber::host("li"),
            RawFiber::component("Fragment").with_props(PropValue::object([("id", PropValue::number(7.0))])),
            RawFiber::component("Item").with_props(PropValue::object([("id", PropValue::number(9.0))])),
        ]);

        let result = Resolver::new().resolve_snapshot(&snap);
        assert_eq!(result.props.as_deref(), Some("{id: 7}"));
        let names: Vec<&str> = result.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["li", "Item"]);
    }

    #[test]
    fn test_content_truncation() {
        let mut snap = snapshot(vec![RawFiber::host("div")]);
        snap.hit.as_mut().unwrap().outer_html = Some(format!("<div>{}</div>", "z".repeat(3000)));

        let result = Resolver::new().resolve_snapshot(&snap);
        let content = result.content.unwrap();
        assert!(content.ends_with(TRUNCATION_MARKER));
        assert_eq!(content.chars().count(), CONTENT_BUDGET + TRUNCATION_MARKER.chars().count());

        let short = truncate_markup("<b>ok</b>");
        assert_eq!(short, "<b>ok</b>");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let snap = snapshot(vec![
            RawFiber::host("button").with_text("Go"),
            RawFiber::component("GoButton").with_props(PropValue::object([("primary", PropValue::Bool { v: true })])),
            RawFiber::component("App").with_source("src/App.tsx", 5, 3),
        ]);

        let resolver = Resolver::new();
        assert_eq!(resolver.resolve_snapshot(&snap), resolver.resolve_snapshot(&snap));
    }
}
