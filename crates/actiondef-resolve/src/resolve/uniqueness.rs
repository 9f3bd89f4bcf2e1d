//! Name and short-option uniqueness validation.
//!
//! Third pass of the pipeline, over the fully extracted tables:
//!
//! 1. **Action names** - No two actions may share a name, regardless of
//!    section.
//! 2. **Cross-namespace collisions** - No action name may equal any section
//!    name. Dependency references resolve against both namespaces, so a
//!    collision would make references ambiguous. The check is symmetric:
//!    declaration order does not matter.
//! 3. **Short options** - No two actions may share a non-empty short option.
//!
//! The first violation found aborts the build, naming both offenders.
//!
//! # Pipeline Position
//!
//! ```text
//! Sections → Extraction → Uniqueness → Linking → Graph
//!                         ^^^^^^^^^^
//! ```

use crate::error::{CompileError, CompileResult, ErrorKind};
use crate::resolve::actions::ActionDecl;
use actiondef_ast::{ActionTable, SectionTable};
use indexmap::IndexMap;

/// Validates action/section name and short-option uniqueness.
///
/// `decls` is index-aligned with `table` and supplies declaration spans for
/// diagnostics.
///
/// # Errors
///
/// [`ErrorKind::DuplicateName`] on the first violation.
pub fn validate_unique(
    table: &ActionTable,
    sections: &SectionTable,
    decls: &[ActionDecl],
) -> CompileResult<()> {
    debug_assert_eq!(table.len(), decls.len());

    let mut seen_names: IndexMap<&str, usize> = IndexMap::new();
    for (idx, action) in table.iter().enumerate() {
        if let Some(&first) = seen_names.get(action.action_name.as_str()) {
            return Err(CompileError::new(
                ErrorKind::DuplicateName,
                decls[idx].span,
                format!(
                    "duplicate action name '{}' (in sections '{}' and '{}')",
                    action.action_name, table[first].section_name, action.section_name
                ),
            )
            .with_label(decls[first].span, "first declared here".to_string()));
        }
        seen_names.insert(&action.action_name, idx);
    }

    for (idx, action) in table.iter().enumerate() {
        if sections.name_to_index(&action.action_name).is_some() {
            return Err(CompileError::new(
                ErrorKind::DuplicateName,
                decls[idx].span,
                format!(
                    "action '{}' has the same name as a section",
                    action.action_name
                ),
            )
            .with_note(
                "dependency references resolve against both namespaces, so action and \
                 section names must not collide"
                    .to_string(),
            ));
        }
    }

    let mut seen_shorts: IndexMap<char, usize> = IndexMap::new();
    for (idx, action) in table.iter().enumerate() {
        let Some(short) = action.short_option else {
            continue;
        };
        if let Some(&first) = seen_shorts.get(&short) {
            return Err(CompileError::new(
                ErrorKind::DuplicateName,
                decls[idx].span,
                format!(
                    "actions '{}' and '{}' share the short option '{}'",
                    table[first].action_name, action.action_name, short
                ),
            )
            .with_label(decls[first].span, "first declared here".to_string()));
        }
        seen_shorts.insert(short, idx);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actiondef_ast::{Action, Section, Span};

    fn decls_for(table: &ActionTable) -> Vec<ActionDecl> {
        (0..table.len())
            .map(|i| ActionDecl {
                span: Span::new(0, i as u32, i as u32 + 1, 1),
                ..ActionDecl::default()
            })
            .collect()
    }

    fn sections(names: &[&str]) -> SectionTable {
        SectionTable::new(
            names
                .iter()
                .map(|n| Section {
                    name: n.to_string(),
                    info: String::new(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_distinct_names_pass() {
        let table = ActionTable::new(vec![
            Action::new("s1", "compile"),
            Action::new("s2", "link"),
        ]);
        let decls = decls_for(&table);
        validate_unique(&table, &sections(&["s1", "s2"]), &decls).expect("should pass");
    }

    #[test]
    fn test_duplicate_action_name_across_sections() {
        let table = ActionTable::new(vec![Action::new("s1", "foo"), Action::new("s2", "foo")]);
        let decls = decls_for(&table);

        let err = validate_unique(&table, &sections(&["s1", "s2"]), &decls).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);
        assert!(err.message.contains("foo"));
        assert!(err.message.contains("s1"));
        assert!(err.message.contains("s2"));
    }

    #[test]
    fn test_action_colliding_with_section_name() {
        let table = ActionTable::new(vec![Action::new("general", "foo")]);
        let decls = decls_for(&table);

        let err = validate_unique(&table, &sections(&["general", "foo"]), &decls).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);
        assert!(err.message.contains("same name as a section"));
    }

    #[test]
    fn test_collision_check_is_symmetric() {
        // The colliding section comes before the action's own section in
        // table order; the check must still fire.
        let table = ActionTable::new(vec![Action::new("later", "early")]);
        let decls = decls_for(&table);

        let err = validate_unique(&table, &sections(&["early", "later"]), &decls).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);
    }

    #[test]
    fn test_duplicate_short_option() {
        let mut a = Action::new("s1", "compile");
        a.short_option = Some('c');
        let mut b = Action::new("s1", "clean");
        b.short_option = Some('c');
        let table = ActionTable::new(vec![a, b]);
        let decls = decls_for(&table);

        let err = validate_unique(&table, &sections(&["s1"]), &decls).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);
        assert!(err.message.contains("compile"));
        assert!(err.message.contains("clean"));
        assert!(err.message.contains('c'));
    }

    #[test]
    fn test_absent_short_options_do_not_collide() {
        let table = ActionTable::new(vec![
            Action::new("s1", "compile"),
            Action::new("s1", "link"),
        ]);
        let decls = decls_for(&table);
        validate_unique(&table, &sections(&["s1"]), &decls).expect("should pass");
    }
}
