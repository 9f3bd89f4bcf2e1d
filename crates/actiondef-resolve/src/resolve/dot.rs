//! Graphviz export of the resolved action dependency graph.
//!
//! Diagnostic view only; nothing downstream consumes the output. Render
//! with e.g. `dot -Tpdf depgraph.dot -o depgraph.pdf` to inspect what the
//! resolver actually linked, reduced, and prioritized.

use crate::resolve::pipeline::CompiledCli;
use std::fmt::Write;

/// Renders the action dependency graph as a Graphviz digraph.
///
/// One node per action, labeled with its name and computed priority and
/// colored by kind (implicit, meta, plain). One edge per surviving
/// dependency: run-after solid black, requires solid blue, meta-dependency
/// dashed gray.
pub fn export_dot(cli: &CompiledCli) -> String {
    let mut out = String::new();
    out.push_str("digraph actions {\n");

    for (i, action) in cli.actions.iter().enumerate() {
        let fill = if action.is_implicit {
            "gray80"
        } else if action.is_meta {
            "lightskyblue"
        } else {
            "white"
        };
        let _ = writeln!(
            out,
            "    n{} [label=\"{}\\n{}\", style=filled, fillcolor=\"{}\"];",
            i,
            escape(&action.action_name),
            action.priority,
            fill
        );
    }

    for (i, action) in cli.actions.iter().enumerate() {
        for &dep in &action.runafter {
            let _ = writeln!(out, "    n{i} -> n{dep};");
        }
        for &dep in &action.requires {
            let _ = writeln!(out, "    n{i} -> n{dep} [color=blue];");
        }
        for &dep in &action.metadeps {
            let _ = writeln!(out, "    n{i} -> n{dep} [style=dashed, color=gray50];");
        }
    }

    out.push_str("}\n");
    out
}

/// Escapes a name for use inside a double-quoted DOT string.
fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}
