//! Validated output tables consumed by the code emitters.
//!
//! [`SectionTable`] and [`ActionTable`] are the primary deliverable of the
//! resolution pipeline. After a successful build every dependency entry is a
//! valid index into the same action table, the run-after and requires
//! sub-graphs are acyclic and transitively reduced, and every action carries
//! a scheduling priority derived from its run-after chain depth.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Named grouping of actions, with its descriptive info text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    /// Descriptive text shown in generated help output; empty if the
    /// section declared none.
    pub info: String,
}

/// Ordered, name-addressable list of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTable {
    sections: Vec<Section>,
}

impl SectionTable {
    /// Builds a table from an already-validated list.
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Index of the section with the given name, if any.
    pub fn name_to_index(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }
}

impl Index<usize> for SectionTable {
    type Output = Section;

    fn index(&self, index: usize) -> &Section {
        &self.sections[index]
    }
}

/// Accepted argument count range for an action.
///
/// `high == -1` means the action accepts unboundedly many trailing
/// arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgRange {
    pub low: u32,
    pub high: i32,
}

/// One fully resolved CLI behavior unit.
///
/// Dependency lists hold indices into the owning [`ActionTable`]. They are
/// filled in by the dependency linker and rewritten by the graph engine;
/// `priority` is assigned by the graph engine after cycle checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Name of the section this action was declared in.
    pub section_name: String,
    /// Identity of the action. Equal to the long option text for explicit
    /// actions; implicit actions keep their declared name here.
    pub action_name: String,
    /// CLI flag text; empty for implicit actions.
    pub long_option: String,
    pub short_option: Option<char>,
    /// Documented argument signature, e.g. `<input> [flags...]`.
    pub arg_doc: String,
    pub help: String,
    /// Handler function the generated parser dispatches to.
    pub func_name: String,
    pub arg_range: ArgRange,
    pub is_implicit: bool,
    pub is_meta: bool,
    /// Scheduling rank: one more than the deepest run-after chain below.
    pub priority: i32,
    /// Ordering-only dependencies.
    pub runafter: Vec<usize>,
    /// Gating dependencies; never resolve to implicit actions.
    pub requires: Vec<usize>,
    /// Informational dependencies; not validated for cycles or priority.
    pub metadeps: Vec<usize>,
}

impl Action {
    /// Creates an action with empty dependency lists and zero priority.
    pub fn new(section_name: &str, action_name: &str) -> Self {
        Self {
            section_name: section_name.to_string(),
            action_name: action_name.to_string(),
            long_option: String::new(),
            short_option: None,
            arg_doc: String::new(),
            help: String::new(),
            func_name: String::new(),
            arg_range: ArgRange::default(),
            is_implicit: false,
            is_meta: false,
            priority: 0,
            runafter: Vec::new(),
            requires: Vec::new(),
            metadeps: Vec::new(),
        }
    }
}

/// Ordered, index-addressable list of resolved actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTable {
    actions: Vec<Action>,
}

impl ActionTable {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Index of the action with the given name, if any.
    pub fn name_to_index(&self, name: &str) -> Option<usize> {
        self.actions.iter().position(|a| a.action_name == name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Action> {
        self.actions.iter_mut()
    }

    /// Borrows an action by index.
    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    /// Mutably borrows an action by index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Action> {
        self.actions.get_mut(index)
    }

    /// Borrows the underlying slice.
    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }
}

impl Index<usize> for ActionTable {
    type Output = Action;

    fn index(&self, index: usize) -> &Action {
        &self.actions[index]
    }
}

impl IndexMut<usize> for ActionTable {
    fn index_mut(&mut self, index: usize) -> &mut Action {
        &mut self.actions[index]
    }
}
