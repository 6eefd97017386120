use crate::fiber::component::Rect;
use crate::fiber::node::{IntrospectableNode, NameHints, NodeKind};
use crate::fiber::props::PropValue;
use crate::fiber::source::{DebugMetadata, RawDebugSource};
use serde::{Deserialize, Serialize};

/// One framework tree node as captured by the page script
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFiber {
    pub kind: NodeKind,

    /// Element tag for host nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_source: Option<RawDebugSource>,

    /// Textual owner stack on newer framework versions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_stack: Option<String>,

    /// Text content, captured for the first host node only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Props, captured for the first component node only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<PropValue>,
}

impl RawFiber {
    /// Host node for a plain element
    pub fn host(tag: impl Into<String>) -> Self {
        Self { kind: NodeKind::Host, tag: Some(tag.into()), ..Default::default() }
    }

    /// Component node named by its function or class name
    pub fn component(name: impl Into<String>) -> Self {
        Self { kind: NodeKind::Component, name: Some(name.into()), ..Default::default() }
    }

    /// Root, text or other structural node
    pub fn other() -> Self {
        Self::default()
    }

    /// Builder method: set display name
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Builder method: set the inner render function name
    pub fn with_render_name(mut self, render_name: impl Into<String>) -> Self {
        self.render_name = Some(render_name.into());
        self
    }

    /// Builder method: set structured debug source
    pub fn with_source(mut self, file_name: impl Into<String>, line: u32, column: u32) -> Self {
        self.debug_source = Some(RawDebugSource {
            file_name: Some(file_name.into()),
            line_number: Some(line),
            column_number: Some(column),
        });
        self
    }

    /// Builder method: set owner stack text
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.debug_stack = Some(stack.into());
        self
    }

    /// Builder method: set captured text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder method: set captured props
    pub fn with_props(mut self, props: PropValue) -> Self {
        self.props = Some(props);
        self
    }
}

/// The element found under the pointer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HitElement {
    /// Bounds of the fiber-bearing element, or of the hit element when none was found
    pub rect: Rect,

    /// Outer markup of the fiber-bearing element
    #[serde(default)]
    pub outer_html: Option<String>,
}

/// Everything the page reports for one coordinate
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HitSnapshot {
    #[serde(default)]
    pub hit: Option<HitElement>,

    /// Upward `return` chain starting at the nearest tree node
    #[serde(default)]
    pub fibers: Vec<RawFiber>,

    /// The capture script stopped walking before reaching the root
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl HitSnapshot {
    /// Snapshot of a coordinate with no element under it
    pub fn miss() -> Self {
        Self::default()
    }

    /// First node of the captured chain
    pub fn root_node(&self) -> Option<SnapshotNode<'_>> {
        SnapshotNode::at(&self.fibers, 0)
    }
}

/// [`IntrospectableNode`] over a captured chain; the parent link is the next index
#[derive(Debug, Clone, Copy)]
pub struct SnapshotNode<'a> {
    chain: &'a [RawFiber],
    index: usize,
}

impl<'a> SnapshotNode<'a> {
    pub fn at(chain: &'a [RawFiber], index: usize) -> Option<Self> {
        (index < chain.len()).then_some(Self { chain, index })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    fn raw(&self) -> &'a RawFiber {
        &self.chain[self.index]
    }
}

impl<'a> IntrospectableNode for SnapshotNode<'a> {
    fn kind(&self) -> NodeKind {
        self.raw().kind
    }

    fn tag_name(&self) -> Option<&str> {
        self.raw().tag.as_deref()
    }

    fn name_hints(&self) -> NameHints<'_> {
        let raw = self.raw();
        NameHints {
            display_name: raw.display_name.as_deref(),
            name: raw.name.as_deref(),
            render_name: raw.render_name.as_deref(),
        }
    }

    fn debug_metadata(&self) -> DebugMetadata<'_> {
        let raw = self.raw();
        DebugMetadata { source: raw.debug_source.as_ref(), stack: raw.debug_stack.as_deref() }
    }

    fn parent(&self) -> Option<Self> {
        Self::at(self.chain, self.index + 1)
    }

    fn text_content(&self) -> Option<&str> {
        self.raw().text.as_deref()
    }

    fn props(&self) -> Option<&PropValue> {
        self.raw().props.as_ref()
    }
}
