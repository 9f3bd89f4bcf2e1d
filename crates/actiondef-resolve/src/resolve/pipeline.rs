//! Unified resolution pipeline for action definition trees.
//!
//! This module orchestrates the resolution and validation passes that
//! transform a parsed definition tree into a fully resolved
//! [`CompiledCli`] ready for code emission.

use crate::error::CompileError;
use crate::resolve::actions::extract_actions;
use crate::resolve::graph::{
    assign_priorities, detect_cycles, reduce_transitive, validate_requires_reach, Relation,
};
use crate::resolve::link::link_dependencies;
use crate::resolve::sections::build_section_table;
use crate::resolve::uniqueness::validate_unique;
use actiondef_ast::{ActionTable, NodeId, SectionTable, Tree};
use tracing::debug;

/// Fully resolved compilation output, ready for the code emitters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCli {
    pub sections: SectionTable,
    pub actions: ActionTable,
    /// Non-fatal diagnostics collected along the way.
    pub warnings: Vec<CompileError>,
}

/// Compiles a definition tree into a resolved [`CompiledCli`].
///
/// This is the main entry point for the resolver. It runs all resolution
/// and validation passes in the correct order; the first hard error aborts
/// the pipeline.
///
/// # Pipeline Order
/// 1. **Sections** - Walk the section chain into a [`SectionTable`].
/// 2. **Extraction** - Flatten actions and attributes into an [`ActionTable`].
/// 3. **Uniqueness** - Reject name and short-option collisions.
/// 4. **Linking** - Resolve dependency names to table indices.
/// 5. **Cycles** - Reject circular run-after chains, then requires chains.
/// 6. **Priorities** - Derive run-after scheduling priorities.
/// 7. **Requires Reach** - Reject requires gates on implicit actions.
/// 8. **Reduction** - Drop transitively implied edges from both relations.
pub fn compile_actions(tree: &Tree, root: NodeId) -> Result<CompiledCli, Vec<CompileError>> {
    let mut warnings = Vec::new();

    let sections = build_section_table(tree, root).map_err(|e| vec![e])?;
    debug!(sections = sections.len(), "section table built");

    let (mut actions, decls) =
        extract_actions(tree, root, &mut warnings).map_err(|e| vec![e])?;
    debug!(actions = actions.len(), "action table extracted");

    validate_unique(&actions, &sections, &decls).map_err(|e| vec![e])?;

    link_dependencies(&mut actions, &sections, &decls).map_err(|e| vec![e])?;
    debug!("dependency references linked");

    // Run-after is checked before requires so a definition broken in both
    // graphs reports the scheduling cycle first.
    detect_cycles(&actions, Relation::RunAfter, &decls).map_err(|e| vec![e])?;
    detect_cycles(&actions, Relation::Requires, &decls).map_err(|e| vec![e])?;

    assign_priorities(&mut actions);

    validate_requires_reach(&actions, &decls).map_err(|e| vec![e])?;

    reduce_transitive(&mut actions, Relation::RunAfter);
    reduce_transitive(&mut actions, Relation::Requires);
    debug!(warnings = warnings.len(), "resolution complete");

    Ok(CompiledCli {
        sections,
        actions,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use actiondef_ast::{ActionKind, Span, Tree};

    fn sp() -> Span {
        Span::new(0, 0, 0, 1)
    }

    /// One section "general" holding fully formed explicit actions with the
    /// given run-after references.
    fn tree_with_runafter(actions: &[(&str, &[&str])]) -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let root = tree.section("general", Some("General actions"), sp());
        for (name, refs) in actions {
            let action = tree.action(name, ActionKind::Explicit, None, sp());
            let help = tree.help(&format!("Runs {name}."), sp());
            tree.push_attr(action, help);
            let func = tree.func(name, sp());
            tree.push_attr(action, func);
            if !refs.is_empty() {
                let ra = tree.runafter(refs, sp());
                tree.push_attr(action, ra);
            }
            tree.push_action(root, action);
        }
        (tree, root)
    }

    #[test]
    fn test_minimal_tree_compiles() {
        let (tree, root) = tree_with_runafter(&[("init", &[])]);
        let cli = compile_actions(&tree, root).expect("compiles");

        assert_eq!(cli.sections.len(), 1);
        assert_eq!(cli.sections[0].name, "general");
        assert_eq!(cli.actions.len(), 1);
        assert_eq!(cli.actions[0].action_name, "init");
        assert_eq!(cli.actions[0].priority, 0);
        assert!(cli.warnings.is_empty());
    }

    #[test]
    fn test_section_reference_expands_and_prioritizes() {
        // B runs after the whole section containing A: B's edge list is
        // exactly A's index and B outranks A by one.
        let mut tree = Tree::new();
        let s1 = tree.section("s1", None, sp());
        let a = tree.action("a", ActionKind::Explicit, None, sp());
        let h = tree.help("First.", sp());
        tree.push_attr(a, h);
        let f = tree.func("runA", sp());
        tree.push_attr(a, f);
        tree.push_action(s1, a);

        let s2 = tree.section("s2", None, sp());
        let b = tree.action("b", ActionKind::Explicit, None, sp());
        let h = tree.help("Second.", sp());
        tree.push_attr(b, h);
        let f = tree.func("runB", sp());
        tree.push_attr(b, f);
        let ra = tree.runafter(&["s1"], sp());
        tree.push_attr(b, ra);
        tree.push_action(s2, b);
        tree.append_section(s1, s2);

        let cli = compile_actions(&tree, s1).expect("compiles");
        let a_idx = cli.actions.name_to_index("a").unwrap();
        let b_idx = cli.actions.name_to_index("b").unwrap();
        assert_eq!(cli.actions[b_idx].runafter, vec![a_idx]);
        assert_eq!(cli.actions[b_idx].priority, cli.actions[a_idx].priority + 1);
    }

    #[test]
    fn test_cycle_aborts_pipeline() {
        let (tree, root) = tree_with_runafter(&[("a", &["b"]), ("b", &["a"])]);
        let errors = compile_actions(&tree, root).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::CyclicDependency);
    }

    #[test]
    fn test_unresolved_reference_aborts_pipeline() {
        let (tree, root) = tree_with_runafter(&[("a", &["ghost"])]);
        let errors = compile_actions(&tree, root).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::UnresolvedReference);
    }

    #[test]
    fn test_transitive_shortcut_removed() {
        let (tree, root) = tree_with_runafter(&[
            ("a", &["b", "c"]),
            ("b", &["c"]),
            ("c", &[]),
        ]);
        let cli = compile_actions(&tree, root).expect("compiles");
        let a = cli.actions.name_to_index("a").unwrap();
        let b = cli.actions.name_to_index("b").unwrap();
        assert_eq!(cli.actions[a].runafter, vec![b]);
        // Priority was computed before reduction, on the full graph.
        assert_eq!(cli.actions[a].priority, 2);
    }

    #[test]
    fn test_requires_on_implicit_rejected() {
        let mut tree = Tree::new();
        let root = tree.section("general", None, sp());

        let hidden = tree.action("hidden", ActionKind::Implicit, None, sp());
        let f = tree.func("runHidden", sp());
        tree.push_attr(hidden, f);
        tree.push_action(root, hidden);

        let open = tree.action("open", ActionKind::Explicit, None, sp());
        let h = tree.help("Opens things.", sp());
        tree.push_attr(open, h);
        let f = tree.func("runOpen", sp());
        tree.push_attr(open, f);
        let req = tree.requires(&["hidden"], sp());
        tree.push_attr(open, req);
        tree.push_action(root, open);

        let errors = compile_actions(&tree, root).unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::InvalidDependency);
    }

    #[test]
    fn test_implicit_help_warns_but_compiles() {
        let mut tree = Tree::new();
        let root = tree.section("general", None, sp());
        let hidden = tree.action("hidden", ActionKind::Implicit, None, sp());
        let h = tree.help("Never shown.", sp());
        tree.push_attr(hidden, h);
        let f = tree.func("runHidden", sp());
        tree.push_attr(hidden, f);
        tree.push_action(root, hidden);

        let cli = compile_actions(&tree, root).expect("compiles");
        assert_eq!(cli.warnings.len(), 1);
        assert!(cli.actions[0].help.is_empty());
    }

    #[test]
    fn test_synthesized_help_action_compiles() {
        let (mut tree, root) = tree_with_runafter(&[("init", &[])]);
        tree.ensure_help_action(root);

        let cli = compile_actions(&tree, root).expect("compiles");
        let help = cli.actions.name_to_index("help").expect("help action");
        assert_eq!(cli.actions[help].short_option, Some('h'));
        assert_eq!(cli.actions[help].func_name, "printHelp");
        assert_eq!(cli.actions[help].arg_range.low, 0);
        assert_eq!(cli.actions[help].arg_range.high, 1);
    }
}
