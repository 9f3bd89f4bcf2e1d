//! Dependency graph analysis over the linked action table.
//!
//! Final pass group of the pipeline. All routines operate generically over a
//! [`Relation`] selector so cycle detection and transitive reduction are
//! written once for both ordered relations. The meta-dependency relation is
//! informational only and is never analyzed here.
//!
//! # Graph Rules
//!
//! 1. **Roots** - An action is a root for a relation if no *other* action's
//!    list contains it; self-references do not disqualify a root.
//! 2. **Cycle Detection** - DFS carrying the current path, from every root
//!    in table order and then from every still-unvisited action in table
//!    order, so cycle components without any root are found too.
//! 3. **Priority** - After the run-after graph is confirmed acyclic, each
//!    action's priority is raised to one more than the deepest run-after
//!    chain beneath it. Generated parsers execute higher priorities first.
//! 4. **Requires Reach** - A requires chain must never reach an implicit
//!    action: implicit actions cannot be requested from the command line,
//!    so the gate could never be satisfied.
//! 5. **Transitive Reduction** - A direct edge already implied by a longer
//!    path through a sibling edge is dropped. Redundancy is judged against
//!    a frozen snapshot of the pre-reduction graph, so the outcome does not
//!    depend on edge visit order.
//!
//! # Pipeline Position
//!
//! ```text
//! Sections → Extraction → Uniqueness → Linking → Graph
//!                                                ^^^^^
//! ```

use crate::error::{CompileError, CompileResult, ErrorKind};
use crate::resolve::actions::ActionDecl;
use actiondef_ast::{Action, ActionTable};
use tracing::trace;

/// Selector for the two analyzed dependency relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    RunAfter,
    Requires,
}

impl Relation {
    /// Borrows the action's edge list for this relation.
    pub fn of(self, action: &Action) -> &[usize] {
        match self {
            Relation::RunAfter => &action.runafter,
            Relation::Requires => &action.requires,
        }
    }

    /// Mutably borrows the action's edge list for this relation.
    pub fn of_mut(self, action: &mut Action) -> &mut Vec<usize> {
        match self {
            Relation::RunAfter => &mut action.runafter,
            Relation::Requires => &mut action.requires,
        }
    }

    /// Relation name as written in definition files.
    pub fn name(self) -> &'static str {
        match self {
            Relation::RunAfter => "runafter",
            Relation::Requires => "requires",
        }
    }
}

/// Root actions of a relation, in table order.
///
/// An action is a root if no *other* action's list for the relation contains
/// it. A self-reference does not disqualify a node; the cycle check rejects
/// it from the root's own walk.
pub fn roots(table: &ActionTable, relation: Relation) -> Vec<usize> {
    (0..table.len())
        .filter(|&i| {
            !table
                .iter()
                .enumerate()
                .any(|(j, action)| j != i && relation.of(action).contains(&i))
        })
        .collect()
}

/// Rejects cycles in the given relation.
///
/// Walks depth-first from every root in table order, then from every action
/// not yet visited in table order (a cycle component has no root at all, so
/// the second sweep is what finds it).
///
/// # Errors
///
/// [`ErrorKind::CyclicDependency`] carrying the chain of action names from
/// the first repeated action back to itself.
pub fn detect_cycles(
    table: &ActionTable,
    relation: Relation,
    decls: &[ActionDecl],
) -> CompileResult<()> {
    let mut visited = vec![false; table.len()];
    let mut on_path = vec![false; table.len()];

    let start_order = roots(table, relation)
        .into_iter()
        .chain(0..table.len());

    for start in start_order {
        if visited[start] {
            continue;
        }
        let mut path = Vec::new();
        if let Some(chain) = cycle_dfs(table, relation, start, &mut visited, &mut on_path, &mut path)
        {
            let description = chain
                .iter()
                .map(|&i| table[i].action_name.as_str())
                .collect::<Vec<_>>()
                .join(" → ");
            let mut error = CompileError::new(
                ErrorKind::CyclicDependency,
                decls[chain[0]].span,
                format!("circular {} dependency: {}", relation.name(), description),
            );
            for window in chain.windows(2) {
                error = error.with_label(
                    decls[window[0]].span,
                    format!("depends on '{}'", table[window[1]].action_name),
                );
            }
            return Err(
                error.with_note("break the cycle by removing one of these dependencies".to_string())
            );
        }
    }

    Ok(())
}

/// DFS step for cycle detection.
///
/// Returns the cycle chain (first repeated action through to its repeat)
/// when a back-edge is found.
fn cycle_dfs(
    table: &ActionTable,
    relation: Relation,
    node: usize,
    visited: &mut [bool],
    on_path: &mut [bool],
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    visited[node] = true;
    on_path[node] = true;
    path.push(node);

    for &child in relation.of(&table[node]) {
        if on_path[child] {
            // Back-edge: the chain runs from the first occurrence of
            // `child` on the current path back to `child` itself.
            let start = path
                .iter()
                .position(|&n| n == child)
                .expect("on_path node must be on the path");
            let mut chain = path[start..].to_vec();
            chain.push(child);
            return Some(chain);
        }
        if visited[child] {
            continue;
        }
        if let Some(chain) = cycle_dfs(table, relation, child, visited, on_path, path) {
            return Some(chain);
        }
    }

    on_path[node] = false;
    path.pop();
    None
}

/// Assigns run-after scheduling priorities.
///
/// Must only run on a table whose run-after graph passed [`detect_cycles`].
/// Every action's priority ends up exactly one more than the deepest
/// run-after chain beneath it; actions with no run-after edges stay at 0.
pub fn assign_priorities(table: &mut ActionTable) {
    for root in roots(table, Relation::RunAfter) {
        raise_priority(table, root);
    }
}

/// Recomputes `priority` for `node` and everything below it.
///
/// Priorities are only ever raised; revisits from a later root cannot lower
/// a value established by an earlier, deeper chain.
fn raise_priority(table: &mut ActionTable, node: usize) -> i32 {
    let children = table[node].runafter.clone();
    for child in children {
        let child_priority = raise_priority(table, child);
        if table[node].priority <= child_priority {
            table[node].priority = child_priority + 1;
        }
    }
    table[node].priority
}

/// Rejects requires chains that reach an implicit action.
///
/// Implicit actions have no CLI surface, so a gate on one could never be
/// satisfied by the user. Walks from every requires root; the table is
/// already known acyclic.
///
/// # Errors
///
/// [`ErrorKind::InvalidDependency`] naming the direct requirer and the
/// implicit target.
pub fn validate_requires_reach(table: &ActionTable, decls: &[ActionDecl]) -> CompileResult<()> {
    for root in roots(table, Relation::Requires) {
        requires_walk(table, root, decls)?;
    }
    Ok(())
}

fn requires_walk(table: &ActionTable, node: usize, decls: &[ActionDecl]) -> CompileResult<()> {
    for &child in &table[node].requires {
        if table[child].is_implicit {
            return Err(CompileError::new(
                ErrorKind::InvalidDependency,
                decls[node].span,
                format!(
                    "action '{}' requires implicit action '{}'",
                    table[node].action_name, table[child].action_name
                ),
            )
            .with_note(
                "implicit actions cannot be requested from the command line, so a \
                 requires gate on one can never be satisfied"
                    .to_string(),
            ));
        }
        requires_walk(table, child, decls)?;
    }
    Ok(())
}

/// Removes transitively implied edges from a relation.
///
/// A direct edge `a -> c` is dropped when `c` is also reachable through some
/// *other* direct child of `a`. Redundancy is judged against a frozen
/// snapshot of the pre-reduction graph, so results do not depend on the
/// order edges are visited in. Surviving edges keep their order.
pub fn reduce_transitive(table: &mut ActionTable, relation: Relation) {
    let snapshot: Vec<Vec<usize>> = table.iter().map(|a| relation.of(a).to_vec()).collect();

    for a in 0..table.len() {
        let direct = &snapshot[a];
        let kept: Vec<usize> = direct
            .iter()
            .copied()
            .filter(|&c| {
                let implied = direct
                    .iter()
                    .any(|&d| d != c && reachable(&snapshot, d, c));
                if implied {
                    trace!(
                        action = %table[a].action_name,
                        target = %table[c].action_name,
                        relation = relation.name(),
                        "dropping transitively implied edge"
                    );
                }
                !implied
            })
            .collect();
        *relation.of_mut(&mut table[a]) = kept;
    }
}

/// True if `to` is reachable from `from` over zero or more snapshot edges.
fn reachable(adj: &[Vec<usize>], from: usize, to: usize) -> bool {
    if from == to {
        return true;
    }
    let mut visited = vec![false; adj.len()];
    let mut stack = vec![from];
    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if visited[node] {
            continue;
        }
        visited[node] = true;
        stack.extend_from_slice(&adj[node]);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use actiondef_ast::{Action, Span};

    /// Builds a table where action `i` is named `names[i]` and has the given
    /// run-after edges, plus aligned declaration records.
    fn runafter_table(names: &[&str], edges: &[&[usize]]) -> (ActionTable, Vec<ActionDecl>) {
        let actions = names
            .iter()
            .zip(edges)
            .map(|(name, deps)| {
                let mut a = Action::new("s", name);
                a.runafter = deps.to_vec();
                a
            })
            .collect();
        let decls = (0..names.len())
            .map(|i| ActionDecl {
                span: Span::new(0, i as u32, i as u32 + 1, 1),
                ..ActionDecl::default()
            })
            .collect();
        (ActionTable::new(actions), decls)
    }

    #[test]
    fn test_roots_ignore_self_references() {
        let (mut table, _) = runafter_table(&["a", "b"], &[&[0], &[]]);
        // a references itself; nothing else references a or b.
        assert_eq!(roots(&table, Relation::RunAfter), vec![0, 1]);

        // b referencing a disqualifies a.
        table.get_mut(1).unwrap().runafter = vec![0];
        assert_eq!(roots(&table, Relation::RunAfter), vec![1]);
    }

    #[test]
    fn test_acyclic_chain_passes() {
        let (table, decls) = runafter_table(&["a", "b", "c"], &[&[], &[0], &[1]]);
        detect_cycles(&table, Relation::RunAfter, &decls).expect("acyclic");
    }

    #[test]
    fn test_two_cycle_detected_with_chain() {
        // a ↔ b is a rootless component; the table-order sweep finds it.
        let (table, decls) = runafter_table(&["a", "b"], &[&[1], &[0]]);
        let err = detect_cycles(&table, Relation::RunAfter, &decls).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CyclicDependency);
        assert!(err.message.contains("a → b → a"), "got: {}", err.message);
    }

    #[test]
    fn test_self_cycle_detected() {
        let (table, decls) = runafter_table(&["a"], &[&[0]]);
        let err = detect_cycles(&table, Relation::RunAfter, &decls).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CyclicDependency);
        assert!(err.message.contains("a → a"));
    }

    #[test]
    fn test_cycle_behind_root_detected() {
        // root → b → c → b
        let (table, decls) = runafter_table(&["root", "b", "c"], &[&[1], &[2], &[1]]);
        let err = detect_cycles(&table, Relation::RunAfter, &decls).unwrap_err();
        assert!(err.message.contains("b → c → b"), "got: {}", err.message);
    }

    #[test]
    fn test_requires_cycles_checked_separately() {
        let (mut table, decls) = runafter_table(&["a", "b"], &[&[], &[]]);
        table.get_mut(0).unwrap().requires = vec![1];
        table.get_mut(1).unwrap().requires = vec![0];

        detect_cycles(&table, Relation::RunAfter, &decls).expect("runafter is acyclic");
        let err = detect_cycles(&table, Relation::Requires, &decls).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CyclicDependency);
        assert!(err.message.contains("requires"));
    }

    #[test]
    fn test_priority_chain() {
        // c ← b ← a (a runs after b, b runs after c)
        let (mut table, _) = runafter_table(&["a", "b", "c"], &[&[1], &[2], &[]]);
        assign_priorities(&mut table);
        assert_eq!(table[2].priority, 0);
        assert_eq!(table[1].priority, 1);
        assert_eq!(table[0].priority, 2);
    }

    #[test]
    fn test_priority_takes_deepest_chain() {
        // a → b → c and a → c: the two-step chain wins.
        let (mut table, _) = runafter_table(&["a", "b", "c"], &[&[1, 2], &[2], &[]]);
        assign_priorities(&mut table);
        assert_eq!(table[0].priority, 2);
        assert_eq!(table[1].priority, 1);
        assert_eq!(table[2].priority, 0);
    }

    #[test]
    fn test_priority_never_lowered_across_roots() {
        // Two roots share a child; the deeper root raises the shared
        // child's parent first, and the second walk must not lower it.
        //   r1 → mid → leaf,  r2 → mid
        let (mut table, _) = runafter_table(&["r1", "mid", "leaf", "r2"], &[&[1], &[2], &[], &[1]]);
        assign_priorities(&mut table);
        assert_eq!(table[2].priority, 0);
        assert_eq!(table[1].priority, 1);
        assert_eq!(table[0].priority, 2);
        assert_eq!(table[3].priority, 2);
    }

    #[test]
    fn test_priority_monotonic_along_edges() {
        let (mut table, decls) =
            runafter_table(&["a", "b", "c", "d"], &[&[1, 2], &[3], &[3], &[]]);
        detect_cycles(&table, Relation::RunAfter, &decls).expect("acyclic");
        assign_priorities(&mut table);
        for (i, action) in table.iter().enumerate() {
            for &child in &action.runafter {
                assert!(
                    table[i].priority > table[child].priority,
                    "priority[{}] must exceed priority[{}]",
                    i,
                    child
                );
            }
        }
    }

    #[test]
    fn test_requires_direct_implicit_rejected() {
        let (mut table, decls) = runafter_table(&["c", "d"], &[&[], &[]]);
        table.get_mut(0).unwrap().requires = vec![1];
        table.get_mut(1).unwrap().is_implicit = true;

        let err = validate_requires_reach(&table, &decls).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidDependency);
        assert!(err.message.contains("'c'"));
        assert!(err.message.contains("'d'"));
    }

    #[test]
    fn test_requires_transitive_implicit_rejected() {
        // a requires b, b requires hidden (implicit): the direct requirer
        // named in the error is b.
        let (mut table, decls) = runafter_table(&["a", "b", "hidden"], &[&[], &[], &[]]);
        table.get_mut(0).unwrap().requires = vec![1];
        table.get_mut(1).unwrap().requires = vec![2];
        table.get_mut(2).unwrap().is_implicit = true;

        let err = validate_requires_reach(&table, &decls).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidDependency);
        assert!(err.message.contains("'b'"));
        assert!(err.message.contains("'hidden'"));
    }

    #[test]
    fn test_runafter_may_reach_implicit() {
        let (mut table, decls) = runafter_table(&["a", "hidden"], &[&[1], &[]]);
        table.get_mut(1).unwrap().is_implicit = true;

        detect_cycles(&table, Relation::RunAfter, &decls).expect("acyclic");
        validate_requires_reach(&table, &decls).expect("runafter edges are not gates");
    }

    #[test]
    fn test_reduction_drops_implied_edge() {
        // a → b → c plus the shortcut a → c.
        let (mut table, _) = runafter_table(&["a", "b", "c"], &[&[1, 2], &[2], &[]]);
        reduce_transitive(&mut table, Relation::RunAfter);
        assert_eq!(table[0].runafter, vec![1]);
        assert_eq!(table[1].runafter, vec![2]);
    }

    #[test]
    fn test_reduction_keeps_independent_edges() {
        let (mut table, _) = runafter_table(&["a", "b", "c"], &[&[1, 2], &[], &[]]);
        reduce_transitive(&mut table, Relation::RunAfter);
        assert_eq!(table[0].runafter, vec![1, 2]);
    }

    #[test]
    fn test_reduction_uses_frozen_snapshot() {
        // Two parallel one-step paths to the same target:
        //   a → b → d, a → c → d, and shortcut a → d.
        // Only the shortcut is implied; b and c both survive because
        // redundancy is judged against the pre-reduction graph, not the
        // partially reduced one.
        let (mut table, _) =
            runafter_table(&["a", "b", "c", "d"], &[&[1, 2, 3], &[3], &[3], &[]]);
        reduce_transitive(&mut table, Relation::RunAfter);
        assert_eq!(table[0].runafter, vec![1, 2]);
        assert_eq!(table[1].runafter, vec![3]);
        assert_eq!(table[2].runafter, vec![3]);
    }

    #[test]
    fn test_reduction_longer_implied_path() {
        // a → d implied by a → b → c → d.
        let (mut table, _) =
            runafter_table(&["a", "b", "c", "d"], &[&[1, 3], &[2], &[3], &[]]);
        reduce_transitive(&mut table, Relation::RunAfter);
        assert_eq!(table[0].runafter, vec![1]);
    }

    #[test]
    fn test_reduction_applies_per_relation() {
        let (mut table, _) = runafter_table(&["a", "b", "c"], &[&[1, 2], &[2], &[]]);
        table.get_mut(0).unwrap().requires = vec![1, 2];
        table.get_mut(1).unwrap().requires = vec![2];

        reduce_transitive(&mut table, Relation::RunAfter);
        // requires untouched until its own reduction runs
        assert_eq!(table[0].requires, vec![1, 2]);
        reduce_transitive(&mut table, Relation::Requires);
        assert_eq!(table[0].requires, vec![1]);
    }

    #[test]
    fn test_metadeps_never_reduced() {
        let (mut table, _) = runafter_table(&["a", "b", "c"], &[&[1, 2], &[2], &[]]);
        table.get_mut(0).unwrap().metadeps = vec![1, 2];
        table.get_mut(1).unwrap().metadeps = vec![2];

        reduce_transitive(&mut table, Relation::RunAfter);
        reduce_transitive(&mut table, Relation::Requires);
        assert_eq!(table[0].metadeps, vec![1, 2]);
    }
}
