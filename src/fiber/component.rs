use crate::fiber::source::SourceLocation;
use serde::{Deserialize, Serialize};

/// One resolved component in a chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    /// Display name (never an internal sentinel such as `Fragment`)
    pub name: String,

    /// Source file reported directly for this node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,

    /// Nearest non-host ancestor with a source location, only set when `file_name` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_line_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_column_number: Option<u32>,
}

impl ComponentInfo {
    /// Create a name-only entry
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            line_number: None,
            column_number: None,
            owner_name: None,
            owner_file_name: None,
            owner_line_number: None,
            owner_column_number: None,
        }
    }

    /// Builder method: set the direct source location
    pub fn with_source(mut self, location: SourceLocation) -> Self {
        self.file_name = Some(location.file_name);
        self.line_number = location.line_number;
        self.column_number = location.column_number;
        self
    }

    /// Builder method: set the owner fallback attribution
    pub fn with_owner(mut self, name: Option<String>, location: SourceLocation) -> Self {
        self.owner_name = name;
        self.owner_file_name = Some(location.file_name);
        self.owner_line_number = location.line_number;
        self.owner_column_number = location.column_number;
        self
    }

    /// Whether the framework reported a source file for this node
    pub fn has_source(&self) -> bool {
        self.file_name.is_some()
    }

    /// Whether an owner fallback was recorded
    pub fn has_owner(&self) -> bool {
        self.owner_file_name.is_some()
    }
}

/// Viewport-space bounding box of the hit element
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self { top, left, width, height }
    }

    /// No visible geometry: zero width and zero height
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Answer to a single coordinate query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    /// Index 0 is the innermost component, increasing indices walk toward the root
    pub components: Vec<ComponentInfo>,

    pub rect: Option<Rect>,

    /// Size-capped outer markup of the resolved target element
    pub content: Option<String>,

    /// Size-capped serialization of the nearest component's props
    pub props: Option<String>,
}

impl QueryResult {
    /// Result for a coordinate with nothing under it
    pub fn empty() -> Self {
        Self::default()
    }

    /// The innermost resolved component
    pub fn primary(&self) -> Option<&ComponentInfo> {
        self.components.first()
    }

    /// Ancestors of the primary component, innermost first
    pub fn ancestors(&self) -> &[ComponentInfo] {
        self.components.get(1..).unwrap_or(&[])
    }

    /// Nothing the overlay could display
    pub fn is_blank(&self) -> bool {
        self.components.is_empty() || self.rect.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_info_serialization_skips_absent_fields() {
        let info = ComponentInfo::new("Button").with_source(SourceLocation::new("src/Button.tsx", Some(12), Some(4)));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Button",
                "fileName": "src/Button.tsx",
                "lineNumber": 12,
                "columnNumber": 4
            })
        );
    }

    #[test]
    fn test_owner_fallback_fields() {
        let info =
            ComponentInfo::new("div").with_owner(Some("Card".to_string()), SourceLocation::new("src/Card.tsx", Some(3), None));

        assert!(!info.has_source());
        assert!(info.has_owner());
        assert_eq!(info.owner_name.as_deref(), Some("Card"));
        assert_eq!(info.owner_line_number, Some(3));
        assert_eq!(info.owner_column_number, None);
    }

    #[test]
    fn test_rect_geometry() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!(!rect.is_empty());
        assert_eq!(rect.bottom(), 60.0);
        assert_eq!(rect.right(), 120.0);

        assert!(Rect::new(5.0, 5.0, 0.0, 0.0).is_empty());
        assert!(!Rect::new(5.0, 5.0, 0.0, 10.0).is_empty());
    }

    #[test]
    fn test_query_result_accessors() {
        let result = QueryResult {
            components: vec![ComponentInfo::new("Button"), ComponentInfo::new("Form"), ComponentInfo::new("App")],
            rect: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            content: None,
            props: None,
        };

        assert_eq!(result.primary().map(|c| c.name.as_str()), Some("Button"));
        assert_eq!(result.ancestors().len(), 2);
        assert!(!result.is_blank());
        assert!(QueryResult::empty().is_blank());
        assert!(QueryResult::empty().ancestors().is_empty());
    }
}
