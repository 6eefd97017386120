//! Source-location adapters
//!
//! Framework versions attach debug metadata to tree nodes in different shapes. Each shape gets
//! one [`SourceAdapter`]; [`locate_source`] is the only place the walk code asks for a location.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Structured debug record (`_debugSource`) as captured from the page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDebugSource {
    pub file_name: Option<String>,
    pub line_number: Option<u32>,
    pub column_number: Option<u32>,
}

/// Borrowed view of every debug field a node exposes
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugMetadata<'a> {
    pub source: Option<&'a RawDebugSource>,
    pub stack: Option<&'a str>,
}

/// A resolved file/line/column triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file_name: String,
    pub line_number: Option<u32>,
    pub column_number: Option<u32>,
}

impl SourceLocation {
    pub fn new(file_name: impl Into<String>, line_number: Option<u32>, column_number: Option<u32>) -> Self {
        Self { file_name: file_name.into(), line_number, column_number }
    }
}

/// Reads one metadata shape
pub trait SourceAdapter: Sync {
    fn name(&self) -> &'static str;

    fn locate(&self, metadata: &DebugMetadata<'_>) -> Option<SourceLocation>;
}

/// `{fileName, lineNumber, columnNumber}` records from older framework versions
pub struct LegacyDebugSource;

impl SourceAdapter for LegacyDebugSource {
    fn name(&self) -> &'static str {
        "debug-source"
    }

    fn locate(&self, metadata: &DebugMetadata<'_>) -> Option<SourceLocation> {
        let source = metadata.source?;
        let file_name = source.file_name.as_deref().filter(|f| !f.is_empty())?;
        Some(SourceLocation::new(file_name, source.line_number, source.column_number))
    }
}

/// Call-stack strings from newer framework versions
pub struct OwnerStackTrace;

/// `(file:line:column)` on one stack line; the file may itself contain parentheses
static STACK_FRAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((.+):(\d+):(\d+)\)").expect("valid stack frame pattern"));

/// Frames that belong to the framework's element factory rather than user code
static RUNTIME_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"react[-_]stack[-_]top[-_]frame|react[-_]jsx[-_](dev[-_])?runtime|\bat (exports\.)?jsx(DEV|s)?\b|node_modules[\\/]react[\\/]")
        .expect("valid runtime frame pattern")
});

impl SourceAdapter for OwnerStackTrace {
    fn name(&self) -> &'static str {
        "owner-stack"
    }

    fn locate(&self, metadata: &DebugMetadata<'_>) -> Option<SourceLocation> {
        let stack = metadata.stack.filter(|s| !s.is_empty())?;
        // Innermost user frame comes first; element-creation stacks start inside the jsx runtime
        stack
            .lines()
            .filter(|line| !RUNTIME_FRAME.is_match(line))
            .find_map(|line| STACK_FRAME.captures(line))
            .map(|captures| {
                SourceLocation::new(&captures[1], captures[2].parse().ok(), captures[3].parse().ok())
            })
    }
}

static ADAPTERS: &[&dyn SourceAdapter] = &[&LegacyDebugSource, &OwnerStackTrace];

/// First location any registered adapter can read from the metadata
pub fn locate_source(metadata: &DebugMetadata<'_>) -> Option<SourceLocation> {
    ADAPTERS.iter().find_map(|adapter| {
        let location = adapter.locate(metadata);
        if location.is_some() {
            log::trace!("source resolved by {} adapter", adapter.name());
        }
        location
    })
}
