//! Build-time error reporting and diagnostics.
//!
//! Errors are structured diagnostics with a source location, a message, and
//! optional secondary labels and hints.
//!
//! # Design
//!
//! - `CompileError` — single diagnostic with primary and optional secondary spans
//! - `ErrorKind` — categorizes errors by the pass that detected them
//! - `Severity` — error, warning, or note
//!
//! Every error is fatal to the whole build: the pipeline stops at the first
//! one and no partial table is returned. Warnings do not stop the build and
//! are carried alongside the successful output.

use actiondef_ast::Span;
use std::fmt;

/// Build diagnostic with source location and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Category of this error
    pub kind: ErrorKind,
    /// Severity level
    pub severity: Severity,
    /// Primary source location
    pub span: Span,
    /// Primary error message
    pub message: String,
    /// Additional labeled spans
    pub labels: Vec<Label>,
    /// Additional notes or hints
    pub notes: Vec<String>,
}

/// Category of build error.
///
/// Errors are categorized by the pass that detected them.
///
/// # Invariant
///
/// The discriminant values must match the ERROR_KIND_NAMES array indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    // Section table construction
    /// Root of the tree is not a section node.
    Structural = 0,

    // Action extraction
    /// Explicit action without help, or any action without a func binding.
    MissingAttribute = 1,

    // Uniqueness validation
    /// Duplicate action or section name, an action name colliding with a
    /// section name, or a duplicate short option.
    DuplicateName = 2,

    // Dependency linking
    /// A dependency reference matches neither a section nor an action.
    UnresolvedReference = 3,
    /// The same index appears twice in one action's resolved relation list.
    DuplicateDependency = 4,

    // Graph analysis
    /// Circular run-after or requires dependency.
    CyclicDependency = 5,
    /// A requires chain reaches an implicit action.
    InvalidDependency = 6,

    // Generic
    /// Internal engine error (bug in the generator).
    Internal = 7,
}

/// Human-readable names for error kinds.
///
/// Index matches ErrorKind discriminant.
const ERROR_KIND_NAMES: &[&str] = &[
    "structural error",      // 0: Structural
    "missing attribute",     // 1: MissingAttribute
    "duplicate name",        // 2: DuplicateName
    "unresolved reference",  // 3: UnresolvedReference
    "duplicate dependency",  // 4: DuplicateDependency
    "cyclic dependency",     // 5: CyclicDependency
    "invalid dependency",    // 6: InvalidDependency
    "internal engine error", // 7: Internal
];

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational note (not an error)
    Note,
    /// Warning (the build continues)
    Warning,
    /// Error (the build cannot proceed)
    Error,
}

/// Secondary labeled span in a diagnostic.
///
/// Used to point at related declarations (e.g. "first defined here").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Source location
    pub span: Span,
    /// Label text
    pub message: String,
}

impl CompileError {
    /// Creates a new error diagnostic.
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Error, span, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Warning, span, message)
    }

    /// Creates a new note diagnostic.
    pub fn note(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Note, span, message)
    }

    fn with_severity(kind: ErrorKind, severity: Severity, span: Span, message: String) -> Self {
        Self {
            kind,
            severity,
            span,
            message,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Adds a secondary labeled span.
    pub fn with_label(mut self, span: Span, message: String) -> Self {
        self.labels.push(Label { span, message });
        self
    }

    /// Adds a note or hint.
    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl ErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn name(self) -> &'static str {
        ERROR_KIND_NAMES[self as usize]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.severity,
            self.kind.name(),
            self.message
        )
    }
}

impl std::error::Error for CompileError {}

/// Result type for build passes.
pub type CompileResult<T> = Result<T, CompileError>;
