//! Source location tracking for error reporting.
//!
//! The engine never reads source text itself; spans are attached to tree
//! nodes by the parser collaborator and flow through diagnostics unchanged.
//! The driver that owns the source files is responsible for rendering them.

use serde::{Deserialize, Serialize};

/// Compact source location reference.
///
/// Points to a byte range in a source file with a cached line number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Identifier of the source file, assigned by the driver.
    pub file_id: u16,
    /// Byte offset of start position
    pub start: u32,
    /// Byte offset of end position (exclusive)
    pub end: u32,
    /// Cached line number (1-based) for the start position
    pub line: u16,
}

impl Span {
    /// Create a new span.
    pub fn new(file_id: u16, start: u32, end: u32, line: u16) -> Self {
        Self {
            file_id,
            start,
            end,
            line,
        }
    }

    /// Create a zero-length span at the start of a file.
    ///
    /// Used for synthesized nodes that have no source position.
    pub fn zero(file_id: u16) -> Self {
        Self::new(file_id, 0, 0, 1)
    }

    /// Check if this span is zero-length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
