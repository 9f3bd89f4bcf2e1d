//! Section table construction.
//!
//! First pass of the pipeline: walks the section chain starting at the tree
//! root and builds the ordered [`SectionTable`].
//!
//! # What This Pass Does
//!
//! 1. **Root check** - The root of the build must be a section node.
//! 2. **Info extraction** - Each section's declared info text is copied into
//!    the table; sections without one get an empty string.
//! 3. **Duplicate detection** - Two sections sharing a name is a build error.
//!
//! # Pipeline Position
//!
//! ```text
//! Sections → Extraction → Uniqueness → Linking → Graph
//! ^^^^^^^^
//! ```

use crate::error::{CompileError, CompileResult, ErrorKind};
use actiondef_ast::{NodeId, NodeKind, Section, SectionTable, Tree};
use indexmap::IndexMap;

/// Builds the section table from the section chain at `root`.
///
/// # Errors
///
/// - [`ErrorKind::Structural`] if `root` (or any `next` link) is not a
///   section node.
/// - [`ErrorKind::DuplicateName`] if two sections share a name; the
///   diagnostic carries a label pointing at the first declaration.
pub fn build_section_table(tree: &Tree, root: NodeId) -> CompileResult<SectionTable> {
    if !matches!(tree.kind(root), NodeKind::Section { .. }) {
        return Err(CompileError::new(
            ErrorKind::Structural,
            tree.span(root),
            "expected a section at the root of the action table".to_string(),
        ));
    }

    let mut sections = Vec::new();
    let mut seen: IndexMap<&str, NodeId> = IndexMap::new();

    for id in tree.sections(root) {
        let NodeKind::Section { name, info, .. } = tree.kind(id) else {
            return Err(CompileError::new(
                ErrorKind::Structural,
                tree.span(id),
                "section chain links to a non-section node".to_string(),
            ));
        };

        if let Some(&first) = seen.get(name.as_str()) {
            return Err(CompileError::new(
                ErrorKind::DuplicateName,
                tree.span(id),
                format!("duplicate section '{}'", name),
            )
            .with_label(tree.span(first), "first declared here".to_string()));
        }
        seen.insert(name, id);

        sections.push(Section {
            name: name.clone(),
            info: info.clone().unwrap_or_default(),
        });
    }

    Ok(SectionTable::new(sections))
}
