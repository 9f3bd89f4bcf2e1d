// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Data model for the actiondef generator.
//!
//! This crate defines the syntax tree produced by the parser front end and
//! the validated section/action tables the resolution pipeline hands to the
//! code emitters. The passes themselves live in `actiondef-resolve`.

pub mod ast;
pub mod foundation;

pub use ast::*;
pub use foundation::Span;
