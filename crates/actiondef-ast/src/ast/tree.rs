//! Arena-backed syntax tree for action definition files.
//!
//! The parser collaborator produces this tree; the resolution passes consume
//! it read-only. Nodes live in a flat arena and reference each other through
//! [`NodeId`] indices, so the tree is trivially cloneable and free of
//! lifetime plumbing.
//!
//! # Tree shape
//!
//! - The root of a build is a [`NodeKind::Section`]; sections form an ordered
//!   chain through their `next` link.
//! - Each section owns an ordered list of action nodes.
//! - Each action owns an ordered list of attribute nodes, each of which is
//!   exactly one of: help text, function name, run-after / requires /
//!   meta-dependency name list, or a required/optional argument group.
//! - Argument groups own ordered [`NodeKind::ArgName`] alternatives.

use crate::foundation::Span;
use serde::{Deserialize, Serialize};

/// Index of a node in a [`Tree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Arena slot this id refers to.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Flavor of an action declaration.
///
/// Explicit actions are bound to a CLI flag; implicit actions are triggered
/// by other means and have no flag. Meta actions have handlers that return a
/// further handler/argument pair instead of a boolean result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Explicit,
    Implicit,
    ExplicitMeta,
    ImplicitMeta,
}

impl ActionKind {
    /// True for the two implicit flavors.
    pub fn is_implicit(self) -> bool {
        matches!(self, ActionKind::Implicit | ActionKind::ImplicitMeta)
    }

    /// True for the two meta flavors.
    pub fn is_meta(self) -> bool {
        matches!(self, ActionKind::ExplicitMeta | ActionKind::ImplicitMeta)
    }
}

/// Tagged node payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Named grouping of actions. Sections chain through `next` in
    /// declaration order.
    Section {
        name: String,
        /// Optional descriptive text shown in generated help output.
        info: Option<String>,
        /// Actions declared in this section, in declaration order.
        actions: Vec<NodeId>,
        /// Next section in the chain.
        next: Option<NodeId>,
    },
    /// One CLI behavior unit.
    Action {
        /// Declared name; doubles as the long option for explicit kinds.
        name: String,
        kind: ActionKind,
        /// Only meaningful for explicit kinds.
        short_option: Option<char>,
        /// Attribute nodes in declaration order.
        attrs: Vec<NodeId>,
    },
    /// Help text attribute.
    Help(String),
    /// Handler function binding attribute.
    Func(String),
    /// Ordering-only dependency references.
    RunAfter(Vec<String>),
    /// Gating dependency references.
    Requires(Vec<String>),
    /// Informational dependency references.
    MetaDeps(Vec<String>),
    /// Required argument group; alternatives are `ArgName` children.
    RequiredArg { names: Vec<NodeId> },
    /// Optional argument group; `continued` marks unbounded trailing args.
    OptionalArg { names: Vec<NodeId>, continued: bool },
    /// One alternative name inside an argument group.
    ArgName(String),
}

/// A node with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    pub kind: NodeKind,
    pub span: Span,
}

/// Arena of syntax tree nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocates a node and returns its id.
    pub fn add(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData { kind, span });
        id
    }

    /// Borrows a node.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this arena.
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    /// Borrows a node's kind.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Source position of a node.
    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    /// True if the node is one of the four action flavors.
    pub fn is_action(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Action { .. })
    }

    /// Iterates the section chain starting at `root`.
    ///
    /// Yields `root` itself first. Stops silently if a `next` link points at
    /// a non-section node; the section table builder reports that case.
    pub fn sections(&self, root: NodeId) -> SectionIter<'_> {
        SectionIter {
            tree: self,
            cursor: Some(root),
        }
    }

    // ---- typed constructors, used by the parser and by tests ------------

    /// Allocates a section node.
    pub fn section(&mut self, name: &str, info: Option<&str>, span: Span) -> NodeId {
        self.add(
            NodeKind::Section {
                name: name.to_string(),
                info: info.map(str::to_string),
                actions: Vec::new(),
                next: None,
            },
            span,
        )
    }

    /// Allocates an action node.
    pub fn action(
        &mut self,
        name: &str,
        kind: ActionKind,
        short_option: Option<char>,
        span: Span,
    ) -> NodeId {
        self.add(
            NodeKind::Action {
                name: name.to_string(),
                kind,
                short_option,
                attrs: Vec::new(),
            },
            span,
        )
    }

    /// Allocates a help attribute.
    pub fn help(&mut self, text: &str, span: Span) -> NodeId {
        self.add(NodeKind::Help(text.to_string()), span)
    }

    /// Allocates a func attribute.
    pub fn func(&mut self, name: &str, span: Span) -> NodeId {
        self.add(NodeKind::Func(name.to_string()), span)
    }

    /// Allocates a run-after attribute.
    pub fn runafter(&mut self, refs: &[&str], span: Span) -> NodeId {
        self.add(
            NodeKind::RunAfter(refs.iter().map(|s| s.to_string()).collect()),
            span,
        )
    }

    /// Allocates a requires attribute.
    pub fn requires(&mut self, refs: &[&str], span: Span) -> NodeId {
        self.add(
            NodeKind::Requires(refs.iter().map(|s| s.to_string()).collect()),
            span,
        )
    }

    /// Allocates a meta-dependency attribute.
    pub fn metadeps(&mut self, refs: &[&str], span: Span) -> NodeId {
        self.add(
            NodeKind::MetaDeps(refs.iter().map(|s| s.to_string()).collect()),
            span,
        )
    }

    /// Allocates a required argument group with the given alternatives.
    pub fn required_arg(&mut self, names: &[&str], span: Span) -> NodeId {
        let names = names
            .iter()
            .map(|n| self.add(NodeKind::ArgName(n.to_string()), span))
            .collect();
        self.add(NodeKind::RequiredArg { names }, span)
    }

    /// Allocates an optional argument group with the given alternatives.
    pub fn optional_arg(&mut self, names: &[&str], continued: bool, span: Span) -> NodeId {
        let names = names
            .iter()
            .map(|n| self.add(NodeKind::ArgName(n.to_string()), span))
            .collect();
        self.add(NodeKind::OptionalArg { names, continued }, span)
    }

    /// Appends an action to a section.
    ///
    /// # Panics
    /// Panics if `section` is not a section node.
    pub fn push_action(&mut self, section: NodeId, action: NodeId) {
        match &mut self.nodes[section.index()].kind {
            NodeKind::Section { actions, .. } => actions.push(action),
            other => panic!("push_action on non-section node: {:?}", other),
        }
    }

    /// Appends an attribute to an action.
    ///
    /// # Panics
    /// Panics if `action` is not an action node.
    pub fn push_attr(&mut self, action: NodeId, attr: NodeId) {
        match &mut self.nodes[action.index()].kind {
            NodeKind::Action { attrs, .. } => attrs.push(attr),
            other => panic!("push_attr on non-action node: {:?}", other),
        }
    }

    /// Links `next` to the end of the section chain starting at `section`.
    ///
    /// # Panics
    /// Panics if any node along the chain is not a section node.
    pub fn append_section(&mut self, section: NodeId, next: NodeId) {
        let mut cursor = section;
        loop {
            match &mut self.nodes[cursor.index()].kind {
                NodeKind::Section { next: link, .. } => match link {
                    Some(id) => cursor = *id,
                    None => {
                        *link = Some(next);
                        return;
                    }
                },
                other => panic!("append_section on non-section node: {:?}", other),
            }
        }
    }

    /// Finds an action by name anywhere in the section chain at `root`.
    pub fn find_action(&self, root: NodeId, name: &str) -> Option<NodeId> {
        for section in self.sections(root) {
            let NodeKind::Section { actions, .. } = self.kind(section) else {
                continue;
            };
            for &action in actions {
                if let NodeKind::Action { name: n, .. } = self.kind(action) {
                    if n == name {
                        return Some(action);
                    }
                }
            }
        }
        None
    }

    /// Synthesizes a default `help` action if none is declared.
    ///
    /// Mirrors the generated argument parsers' expectation that a `help`
    /// action always exists: when no action named `help` is found in the
    /// chain at `root`, a `help-action` section containing an explicit
    /// `help` action (bound to `printHelp`, with an optional
    /// `[section|all]` argument) is appended to the chain.
    pub fn ensure_help_action(&mut self, root: NodeId) {
        if self.find_action(root, "help").is_some() {
            return;
        }

        let span = Span::zero(self.span(root).file_id);
        let action = self.action("help", ActionKind::Explicit, Some('h'), span);
        let help = self.help("Prints this help text.", span);
        let args = self.optional_arg(&["section", "all"], false, span);
        let func = self.func("printHelp", span);
        self.push_attr(action, help);
        self.push_attr(action, args);
        self.push_attr(action, func);

        let section = self.section("help-action", None, span);
        self.push_action(section, action);
        self.append_section(root, section);
    }
}

/// Iterator over a section chain. See [`Tree::sections`].
pub struct SectionIter<'a> {
    tree: &'a Tree,
    cursor: Option<NodeId>,
}

impl Iterator for SectionIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cursor?;
        self.cursor = match self.tree.kind(id) {
            NodeKind::Section { next, .. } => *next,
            _ => None,
        };
        Some(id)
    }
}
