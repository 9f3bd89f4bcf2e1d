//! Action extraction and argument-doc synthesis.
//!
//! Second pass of the pipeline: walks every action node in tree order and
//! flattens it into an [`Action`] record with its documented argument
//! signature and accepted argument-count range.
//!
//! # What This Pass Does
//!
//! 1. **Attribute checks** - Explicit actions must declare help and func;
//!    implicit actions must declare func. A help attribute or argument group
//!    on an implicit action is ignored with a warning.
//! 2. **Arg-doc synthesis** - Required groups render as `<a|b>`, optional
//!    groups as `[a|b]` (with `...` when continued), joined by single spaces
//!    in declaration order.
//! 3. **Range computation** - Each required group raises both bounds; each
//!    optional group raises the upper bound; a continued group makes the
//!    upper bound unbounded (`-1`) for the rest of the scan.
//!
//! Dependency lists in the table stay empty here. The declared run-after /
//! requires / meta-dependency names are collected into per-action
//! [`ActionDecl`] side records, which the linker resolves to table indices.
//!
//! # Pipeline Position
//!
//! ```text
//! Sections → Extraction → Uniqueness → Linking → Graph
//!            ^^^^^^^^^^
//! ```

use crate::error::{CompileError, CompileResult, ErrorKind};
use actiondef_ast::{Action, ActionTable, ArgRange, NodeId, NodeKind, Span, Tree};

/// Per-action declaration data that is not part of the emitter contract.
///
/// Index-aligned with the extracted [`ActionTable`]: `decls[i]` describes
/// `table[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionDecl {
    /// Span of the action's declaration, for later diagnostics.
    pub span: Span,
    /// Declared run-after references, in declaration order.
    pub runafter: Vec<String>,
    /// Declared requires references, in declaration order.
    pub requires: Vec<String>,
    /// Declared meta-dependency references, in declaration order.
    pub metadeps: Vec<String>,
}

/// Extracts the flat action table from the section chain at `root`.
///
/// Non-fatal diagnostics (ignored attributes on implicit actions) are pushed
/// onto `warnings`; the first fatal error aborts the extraction and no
/// partial table is returned.
pub fn extract_actions(
    tree: &Tree,
    root: NodeId,
    warnings: &mut Vec<CompileError>,
) -> CompileResult<(ActionTable, Vec<ActionDecl>)> {
    let mut actions = Vec::new();
    let mut decls = Vec::new();

    for section_id in tree.sections(root) {
        let NodeKind::Section {
            name: section_name,
            actions: members,
            ..
        } = tree.kind(section_id)
        else {
            return Err(CompileError::new(
                ErrorKind::Structural,
                tree.span(section_id),
                "section chain links to a non-section node".to_string(),
            ));
        };

        for &action_id in members {
            let (action, decl) = extract_one(tree, action_id, section_name, warnings)?;
            actions.push(action);
            decls.push(decl);
        }
    }

    Ok((ActionTable::new(actions), decls))
}

fn extract_one(
    tree: &Tree,
    id: NodeId,
    section_name: &str,
    warnings: &mut Vec<CompileError>,
) -> CompileResult<(Action, ActionDecl)> {
    let NodeKind::Action {
        name,
        kind,
        short_option,
        attrs,
    } = tree.kind(id)
    else {
        return Err(CompileError::new(
            ErrorKind::Structural,
            tree.span(id),
            "section member is not an action node".to_string(),
        ));
    };

    let span = tree.span(id);
    let help = find_help(tree, attrs);
    let func = find_func(tree, attrs);

    let mut action = Action::new(section_name, name);
    action.is_meta = kind.is_meta();
    action.is_implicit = kind.is_implicit();

    let mut decl = ActionDecl {
        span,
        ..ActionDecl::default()
    };
    for &attr in attrs {
        match tree.kind(attr) {
            NodeKind::RunAfter(refs) => decl.runafter.extend(refs.iter().cloned()),
            NodeKind::Requires(refs) => decl.requires.extend(refs.iter().cloned()),
            NodeKind::MetaDeps(refs) => decl.metadeps.extend(refs.iter().cloned()),
            _ => {}
        }
    }

    let Some(func) = func else {
        return Err(CompileError::new(
            ErrorKind::MissingAttribute,
            span,
            format!(
                "action '{}' has no func attribute; every action must bind a handler function",
                name
            ),
        ));
    };
    action.func_name = func.to_string();

    if kind.is_implicit() {
        // Implicit actions have no CLI surface; their help text and argument
        // shape would never be shown or parsed.
        if help.is_some() {
            warnings.push(CompileError::warning(
                ErrorKind::MissingAttribute,
                span,
                format!(
                    "action '{}' has a help attribute, but it is ignored because the action is implicit",
                    name
                ),
            ));
        }
        if attrs.iter().any(|&a| {
            matches!(
                tree.kind(a),
                NodeKind::RequiredArg { .. } | NodeKind::OptionalArg { .. }
            )
        }) {
            warnings.push(CompileError::warning(
                ErrorKind::MissingAttribute,
                span,
                format!(
                    "action '{}' has an args attribute, but it is ignored because the action is implicit",
                    name
                ),
            ));
        }
        return Ok((action, decl));
    }

    let Some(help) = help else {
        return Err(CompileError::new(
            ErrorKind::MissingAttribute,
            span,
            format!(
                "action '{}' has no help attribute; explicit actions must declare a help string",
                name
            ),
        ));
    };
    action.help = help.to_string();
    action.long_option = name.clone();
    action.short_option = *short_option;

    let (arg_doc, arg_range) = argdoc_and_range(tree, attrs)?;
    action.arg_doc = arg_doc;
    action.arg_range = arg_range;

    Ok((action, decl))
}

/// First help attribute of an action, if any.
fn find_help<'t>(tree: &'t Tree, attrs: &[NodeId]) -> Option<&'t str> {
    attrs.iter().find_map(|&a| match tree.kind(a) {
        NodeKind::Help(text) => Some(text.as_str()),
        _ => None,
    })
}

/// First func attribute of an action, if any.
fn find_func<'t>(tree: &'t Tree, attrs: &[NodeId]) -> Option<&'t str> {
    attrs.iter().find_map(|&a| match tree.kind(a) {
        NodeKind::Func(name) => Some(name.as_str()),
        _ => None,
    })
}

/// Renders the documented argument signature and computes the accepted
/// argument-count range from the action's argument groups.
fn argdoc_and_range(tree: &Tree, attrs: &[NodeId]) -> CompileResult<(String, ArgRange)> {
    let mut doc = String::new();
    let mut range = ArgRange { low: 0, high: 0 };

    for &attr in attrs {
        match tree.kind(attr) {
            NodeKind::RequiredArg { names } => {
                if !doc.is_empty() {
                    doc.push(' ');
                }
                doc.push('<');
                push_alternatives(tree, names, &mut doc)?;
                doc.push('>');
                range.low += 1;
                if range.high != -1 {
                    range.high += 1;
                }
            }
            NodeKind::OptionalArg { names, continued } => {
                if !doc.is_empty() {
                    doc.push(' ');
                }
                doc.push('[');
                push_alternatives(tree, names, &mut doc)?;
                if *continued {
                    doc.push_str("...");
                    range.high = -1;
                } else if range.high != -1 {
                    range.high += 1;
                }
                doc.push(']');
            }
            _ => {}
        }
    }

    Ok((doc, range))
}

fn push_alternatives(tree: &Tree, names: &[NodeId], doc: &mut String) -> CompileResult<()> {
    for (i, &name) in names.iter().enumerate() {
        let NodeKind::ArgName(text) = tree.kind(name) else {
            return Err(CompileError::new(
                ErrorKind::Internal,
                tree.span(name),
                "argument group child is not an argument name".to_string(),
            ));
        };
        if i != 0 {
            doc.push('|');
        }
        doc.push_str(text);
    }
    Ok(())
}
