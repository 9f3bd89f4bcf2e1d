//! Foundation types shared across the generator.

pub mod span;

pub use span::Span;
