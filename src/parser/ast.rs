/*!
# MCS syntax tree

Nodes live in a flat [`Arena`] and refer to each other by [`NodeId`]. Parents
own their children through the `children` list; the `parent` field is a plain
index used for upward lookups.

A [`Document`] is rebuilt from scratch for every text change and never
mutated afterwards.
*/

use crate::core::{Point, Position};
use crate::schema::{OperandDefinition, StatementClass, StatementDefinition, SubOperandDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// Stable node identifier inside one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Raw value between parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    Text(String),
    /// The closing parenthesis was never found.
    Unterminated,
}

impl ParameterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(text) => Some(text),
            ParameterValue::Unterminated => None,
        }
    }

    pub fn is_unterminated(&self) -> bool {
        matches!(self, ParameterValue::Unterminated)
    }

    /// True for `()` and for values holding only blanks.
    pub fn is_blank(&self) -> bool {
        self.as_text().map_or(false, |text| text.trim().is_empty())
    }
}

/// Schema entry bound to an operand node.
///
/// Top-level operands bind to an operand definition, operands nested inside
/// another operand bind to one of its value definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandSchema {
    Operand(Arc<OperandDefinition>),
    Value(Arc<SubOperandDefinition>),
}

impl OperandSchema {
    pub fn as_operand(&self) -> Option<&Arc<OperandDefinition>> {
        match self {
            OperandSchema::Operand(definition) => Some(definition),
            OperandSchema::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Arc<SubOperandDefinition>> {
        match self {
            OperandSchema::Value(definition) => Some(definition),
            OperandSchema::Operand(_) => None,
        }
    }

    pub fn max_length(&self) -> usize {
        match self {
            OperandSchema::Operand(definition) => definition.max_length,
            OperandSchema::Value(definition) => definition.max_length,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            OperandSchema::Operand(definition) => definition.description.as_deref(),
            OperandSchema::Value(definition) => definition.description.as_deref(),
        }
    }
}

/// Inclusive range of physical lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub first: usize,
    pub last: usize,
}

impl LineSpan {
    pub fn contains(&self, line: usize) -> bool {
        (self.first..=self.last).contains(&line)
    }
}

/// Payload of a statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Name as written, including the `++` marker and any language suffix.
    pub name: String,
    /// Three-letter language suffix, empty when there is none.
    pub language_id: String,
    pub class: StatementClass,
    /// Definition from the schema; for language variants, the base statement.
    pub definition: Option<Arc<StatementDefinition>>,
    pub has_terminator: bool,
    pub terminator: Option<Position>,
    /// Positive: missing `)`. Negative: missing `(` or extra `)`.
    pub unbalanced_parens: i32,
    pub has_inline_data: bool,
    /// Lines consumed as inline data after the terminator.
    pub inline_data: Option<LineSpan>,
    /// Last line of the statement text (the terminator line when present).
    pub end_line: usize,
    /// Location just past the last non-blank character before the terminator.
    pub text_end: Point,
    /// First occurrence of each top-level operand, keyed by canonical name.
    pub operand_map: HashMap<String, NodeId>,
}

impl Statement {
    /// Name used for policy lookups: the base name for language variants.
    pub fn base_name(&self) -> &str {
        match &self.class {
            StatementClass::LanguageVariant { base, .. }
            | StatementClass::InvalidLanguage { base, .. } => base,
            StatementClass::Known | StatementClass::Unknown => &self.name,
        }
    }

    pub fn is_known(&self) -> bool {
        self.definition.is_some()
    }

    pub fn has_operand(&self, name: &str) -> bool {
        self.operand_map.contains_key(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Statement(Statement),
    Operand {
        name: String,
        definition: Option<OperandSchema>,
    },
    Parameter {
        value: ParameterValue,
    },
    Comment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub position: Position,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Storage for all nodes of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Adds a node and links it to its parent.
    pub fn alloc(&mut self, kind: NodeKind, position: Position, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            position,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0 as usize].children.push(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }
}

/// Parsed MCS source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub(crate) arena: Arena,
    pub(crate) statements: Vec<NodeId>,
    pub(crate) comments: Vec<NodeId>,
    pub(crate) standalone_comments: Vec<NodeId>,
    pub(crate) inline_data_statements: Vec<NodeId>,
    /// Width of each physical line without trailing blanks.
    pub(crate) line_widths: Vec<usize>,
}

impl Document {
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.arena.node(id)
    }

    /// Statement nodes in source order.
    pub fn statement_ids(&self) -> &[NodeId] {
        &self.statements
    }

    pub fn statements(&self) -> impl Iterator<Item = (NodeId, &Statement)> {
        self.statements
            .iter()
            .filter_map(|&id| self.statement(id).map(|statement| (id, statement)))
    }

    pub fn statement(&self, id: NodeId) -> Option<&Statement> {
        match &self.arena.node(id).kind {
            NodeKind::Statement(statement) => Some(statement),
            _ => None,
        }
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    /// All comment nodes, in source order.
    pub fn comments(&self) -> &[NodeId] {
        &self.comments
    }

    /// Comments that begin outside any statement.
    pub fn standalone_comments(&self) -> &[NodeId] {
        &self.standalone_comments
    }

    /// Statements expected to be followed by inline data.
    pub fn inline_data_statements(&self) -> &[NodeId] {
        &self.inline_data_statements
    }

    pub fn line_count(&self) -> usize {
        self.line_widths.len()
    }

    pub fn line_width(&self, line: usize) -> usize {
        self.line_widths.get(line).copied().unwrap_or(0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.arena.node(id).children
    }

    /// Parent chain from the direct parent up to the statement.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Statement that owns `id` (itself for statement nodes).
    pub fn owning_statement(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&candidate| self.statement(candidate).is_some())
    }

    /// Operand children of a statement or operand, duplicates included.
    pub fn operands(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &str, Option<&OperandSchema>)> {
        self.children(id).iter().filter_map(move |&child| match &self.node(child).kind {
            NodeKind::Operand { name, definition } => Some((child, name.as_str(), definition.as_ref())),
            _ => None,
        })
    }

    /// Direct parameter child of a statement or operand.
    pub fn parameter(&self, id: NodeId) -> Option<(NodeId, &ParameterValue)> {
        self.children(id).iter().find_map(|&child| match &self.node(child).kind {
            NodeKind::Parameter { value } => Some((child, value)),
            _ => None,
        })
    }

    /// First occurrence of an operand, accepting any of its aliases.
    pub fn operand(&self, statement: NodeId, name: &str) -> Option<NodeId> {
        let stmt = self.statement(statement)?;
        let canonical = stmt
            .definition
            .as_ref()
            .and_then(|definition| definition.find_operand(name))
            .map(|operand| operand.name())
            .unwrap_or(name);
        stmt.operand_map.get(canonical).copied()
    }

    /// Statement whose text or inline data covers `line`.
    pub fn statement_at_line(&self, line: usize) -> Option<NodeId> {
        self.statements().find_map(|(id, statement)| {
            let start = self.node(id).position.line;
            let covered = (start..=statement.end_line).contains(&line)
                || statement.inline_data.map_or(false, |span| span.contains(line));
            covered.then_some(id)
        })
    }

    /// Innermost node covering the location.
    pub fn node_at(&self, line: usize, character: usize) -> Option<NodeId> {
        if let Some(statement) = self.statement_at_line(line) {
            let mut current = statement;
            'descend: loop {
                for &child in self.children(current) {
                    if self.node(child).position.contains(line, character) {
                        current = child;
                        continue 'descend;
                    }
                    // nested operands may sit on a later line than their parent token
                    if self.subtree_contains(child, line, character) {
                        current = child;
                        continue 'descend;
                    }
                }
                return Some(current);
            }
        }

        self.comments
            .iter()
            .copied()
            .find(|&id| self.node(id).position.contains(line, character))
    }

    fn subtree_contains(&self, id: NodeId, line: usize, character: usize) -> bool {
        self.children(id).iter().any(|&child| {
            self.node(child).position.contains(line, character)
                || self.subtree_contains(child, line, character)
        })
    }
}
