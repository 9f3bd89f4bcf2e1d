//! Syntax tree and output table types.

pub mod table;
pub mod tree;

pub use table::{Action, ActionTable, ArgRange, Section, SectionTable};
pub use tree::{ActionKind, NodeData, NodeId, NodeKind, Tree};
