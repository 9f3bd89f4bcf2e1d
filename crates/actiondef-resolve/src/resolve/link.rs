//! Dependency linking: declared names to table indices.
//!
//! Fourth pass of the pipeline. Each declared reference in a run-after,
//! requires, or meta-dependency list resolves against both namespaces:
//!
//! - a **section** name expands to every action declared in that section,
//!   in table order;
//! - an **action** name resolves to that single table index.
//!
//! Uniqueness validation has already guaranteed the namespaces are disjoint,
//! so a name can never match both. A name matching neither is a build error.
//!
//! After linking, each action's resolved list is checked for duplicate
//! indices, per relation independently — a duplicate usually means a section
//! expansion overlapped an explicit reference.
//!
//! # Pipeline Position
//!
//! ```text
//! Sections → Extraction → Uniqueness → Linking → Graph
//!                                      ^^^^^^^
//! ```

use crate::error::{CompileError, CompileResult, ErrorKind};
use crate::resolve::actions::ActionDecl;
use actiondef_ast::{ActionTable, SectionTable};
use indexmap::IndexMap;

/// Resolves all declared dependency names into table indices.
///
/// Fills the `runafter`, `requires`, and `metadeps` lists of every action in
/// `table`. `decls` is index-aligned with `table`.
///
/// # Errors
///
/// - [`ErrorKind::UnresolvedReference`] if a name matches neither a section
///   nor an action.
/// - [`ErrorKind::DuplicateDependency`] if one action's resolved list holds
///   the same index twice.
pub fn link_dependencies(
    table: &mut ActionTable,
    sections: &SectionTable,
    decls: &[ActionDecl],
) -> CompileResult<()> {
    debug_assert_eq!(table.len(), decls.len());

    // Member lists per section, in table order.
    let mut members: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for section in sections.iter() {
        members.insert(section.name.as_str(), Vec::new());
    }
    for (idx, action) in table.iter().enumerate() {
        if let Some(list) = members.get_mut(action.section_name.as_str()) {
            list.push(idx);
        }
    }

    let actions_by_name: IndexMap<String, usize> = table
        .iter()
        .enumerate()
        .map(|(idx, a)| (a.action_name.clone(), idx))
        .collect();

    for idx in 0..table.len() {
        let decl = &decls[idx];
        let runafter = resolve_refs(idx, &decl.runafter, table, &members, &actions_by_name, decl)?;
        let requires = resolve_refs(idx, &decl.requires, table, &members, &actions_by_name, decl)?;
        let metadeps = resolve_refs(idx, &decl.metadeps, table, &members, &actions_by_name, decl)?;

        let action = &mut table[idx];
        action.runafter = runafter;
        action.requires = requires;
        action.metadeps = metadeps;
    }

    for (idx, action) in table.iter().enumerate() {
        check_duplicates(idx, &action.runafter, "runafter", table, decls)?;
        check_duplicates(idx, &action.requires, "requires", table, decls)?;
        check_duplicates(idx, &action.metadeps, "metadeps", table, decls)?;
    }

    Ok(())
}

/// Resolves one declared reference list to table indices.
fn resolve_refs(
    idx: usize,
    refs: &[String],
    table: &ActionTable,
    members: &IndexMap<&str, Vec<usize>>,
    actions_by_name: &IndexMap<String, usize>,
    decl: &ActionDecl,
) -> CompileResult<Vec<usize>> {
    let mut resolved = Vec::new();
    for name in refs {
        if let Some(list) = members.get(name.as_str()) {
            resolved.extend_from_slice(list);
        } else if let Some(&target) = actions_by_name.get(name) {
            resolved.push(target);
        } else {
            return Err(CompileError::new(
                ErrorKind::UnresolvedReference,
                decl.span,
                format!(
                    "action '{}' references unknown name '{}'",
                    table[idx].action_name, name
                ),
            )
            .with_note("dependency references must name an action or a section".to_string()));
        }
    }
    Ok(resolved)
}

/// Rejects a resolved list that contains the same index twice.
fn check_duplicates(
    idx: usize,
    resolved: &[usize],
    relation: &str,
    table: &ActionTable,
    decls: &[ActionDecl],
) -> CompileResult<()> {
    for (i, &target) in resolved.iter().enumerate() {
        if resolved[..i].contains(&target) {
            return Err(CompileError::new(
                ErrorKind::DuplicateDependency,
                decls[idx].span,
                format!(
                    "action '{}' lists '{}' more than once in its {} dependencies",
                    table[idx].action_name, table[target].action_name, relation
                ),
            )
            .with_note(
                "a section reference expands to all of its actions; referencing both a \
                 section and one of its members duplicates the edge"
                    .to_string(),
            ));
        }
    }
    Ok(())
}
