//! Resolution and validation passes
//!
//! This module implements the phases that turn a parsed definition tree
//! into the resolved section and action tables:
//!
//! ```text
//! Sections → Extraction → Uniqueness → Linking → Graph → DOT (optional)
//!  sections    actions    uniqueness     link     graph    dot
//! ```
//!
//! # Sections (`sections`)
//!
//! Walks the ordered section chain into a flat [`SectionTable`], rejecting
//! duplicate section names.
//!
//! # Extraction (`actions`)
//!
//! Flattens every action into an [`ActionTable`] row: attribute checks
//! (help/func requirements per action kind), argument-doc synthesis, and
//! argument-count ranges. Dependency references stay as raw names in
//! side-band [`ActionDecl`] records.
//!
//! # Uniqueness (`uniqueness`)
//!
//! Rejects duplicate action names, action names colliding with section
//! names, and duplicate short options.
//!
//! # Linking (`link`)
//!
//! Resolves raw dependency names against the section namespace first and
//! the action namespace second, expanding section references to every
//! member action, then rejects duplicate entries per relation.
//!
//! # Graph (`graph`)
//!
//! Cycle detection, run-after priority assignment, the requires-reach
//! check, and transitive reduction — generic over the [`Relation`]
//! selector.
//!
//! [`SectionTable`]: actiondef_ast::SectionTable
//! [`ActionTable`]: actiondef_ast::ActionTable
//! [`ActionDecl`]: actions::ActionDecl
//! [`Relation`]: graph::Relation

pub mod actions;
pub mod dot;
pub mod graph;
pub mod link;
pub mod pipeline;
pub mod sections;
pub mod uniqueness;
