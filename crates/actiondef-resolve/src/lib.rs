//! # Action Definition Resolver
//!
//! Semantic analysis for declarative CLI action definitions: takes the
//! parsed definition tree from `actiondef-ast` and produces the fully
//! resolved section and action tables consumed by the code emitters.
//!
//! ## Pipeline
//!
//! ```text
//! actiondef-ast (Tree)
//!     ↓
//! sections    - section chain → SectionTable
//! actions     - attribute checks, arg-doc synthesis → ActionTable
//! uniqueness  - name and short-option collision checks
//! link        - dependency names → table indices (section expansion)
//! graph       - cycle detection, priorities, requires reach, reduction
//!     ↓
//! CompiledCli { sections, actions, warnings }
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use actiondef_resolve::compile_actions;
//!
//! let cli = compile_actions(&tree, root)?;
//! for action in cli.actions.iter() {
//!     println!("{} (priority {})", action.action_name, action.priority);
//! }
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod resolve;

pub use error::{CompileError, CompileResult, ErrorKind, Label, Severity};
pub use resolve::dot::export_dot;
pub use resolve::graph::Relation;
pub use resolve::pipeline::{compile_actions, CompiledCli};

/// Resolver version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
