/*!
# Tree Builder

Turns statement spans into statement nodes with operand, sub-operand and
parameter children. The schema drives interpretation: an operand is only
scanned for nested values when its definition declares them.

The builder never fails. Unknown names and broken parentheses are kept in
the tree as marked nodes and reported by the diagnostics engine.
*/

use super::ast::{Arena, Document, LineSpan, NodeId, NodeKind, OperandSchema, ParameterValue, Statement};
use super::segmenter::{CommentSpan, InlineData, SourceChar, StatementSpan, STATEMENT_MARKER};
use super::suppresses_inline_data;
use crate::core::{Point, Position};
use crate::schema::{OperandDefinition, SchemaStore, StatementDefinition};
use std::collections::HashMap;

/// Characters allowed in statement and operand names.
pub fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '@' | '#' | '$')
}

/// Whether an identifier in an unknown statement should be taken as an operand.
pub fn looks_like_operand(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().map_or(false, |first| first.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '@' | '#' | '$'))
}

/// What the identifiers of a scan are resolved against.
#[derive(Clone, Copy)]
enum Scope<'d> {
    Statement(Option<&'d StatementDefinition>),
    Values(&'d OperandDefinition),
}

/// Index of the `)` matching the `(` at `open`, searching before `end`.
fn matching_close(chars: &[SourceChar], open: usize, end: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, c) in chars.iter().enumerate().take(end).skip(open) {
        match c.ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn text_of(chars: &[SourceChar], start: usize, end: usize) -> String {
    chars[start..end].iter().map(|c| c.ch).collect()
}

/// Position of `chars[start..end]`, clipped to its first line.
fn position_of(chars: &[SourceChar], start: usize, end: usize) -> Position {
    if start < end {
        let first = chars[start];
        let last = chars[start..end]
            .iter()
            .rev()
            .find(|c| c.line == first.line)
            .copied()
            .unwrap_or(first);
        return Position::new(first.line, first.column, last.column + 1 - first.column);
    }
    match chars.get(start).or_else(|| chars.last()) {
        Some(anchor) if start < chars.len() => Position::new(anchor.line, anchor.column, 0),
        Some(anchor) => Position::new(anchor.line, anchor.column + 1, 0),
        None => Position::zero(),
    }
}

fn skip_blanks(chars: &[SourceChar], mut index: usize) -> usize {
    while index < chars.len() && chars[index].ch.is_whitespace() {
        index += 1;
    }
    index
}

/// Accumulates statement nodes for one document.
pub struct TreeBuilder<'s> {
    schema: &'s SchemaStore,
    arena: Arena,
    statements: Vec<NodeId>,
    inline_data_statements: Vec<NodeId>,
}

impl<'s> TreeBuilder<'s> {
    pub fn new(schema: &'s SchemaStore) -> Self {
        Self {
            schema,
            arena: Arena::new(),
            statements: Vec::new(),
            inline_data_statements: Vec::new(),
        }
    }

    /// Builds the statement node for one span.
    pub fn build(&mut self, span: &StatementSpan) -> NodeId {
        let chars = span.chars.as_slice();

        let mut name_end = STATEMENT_MARKER.len().min(chars.len());
        while name_end < chars.len() && is_name_char(chars[name_end].ch) {
            name_end += 1;
        }
        let name = text_of(chars, 0, name_end);
        let resolution = self.schema.classify(&name);
        let definition = resolution.definition.clone();

        let statement = Statement {
            language_id: resolution.language_id().to_string(),
            name,
            class: resolution.class,
            definition: definition.clone(),
            has_terminator: span.terminator.is_some(),
            terminator: span.terminator.map(|(line, column)| Position::new(line, column, 1)),
            unbalanced_parens: span.unbalanced_parens,
            has_inline_data: false,
            inline_data: None,
            end_line: span.end_line,
            text_end: chars
                .iter()
                .rev()
                .find(|c| !c.ch.is_whitespace())
                .map_or(Point::new(span.start_line, span.start_column), |c| {
                    Point::new(c.line, c.column + 1)
                }),
            operand_map: HashMap::new(),
        };
        let id = self.arena.alloc(
            NodeKind::Statement(statement),
            Position::new(span.start_line, span.start_column, name_end),
            None,
        );
        self.statements.push(id);

        // Statement parameter; unknown statements get one whenever `(` follows
        let mut cursor = name_end;
        let wants_parameter = definition.as_ref().map_or(true, |d| d.expects_parameter());
        let open = skip_blanks(chars, name_end);
        if wants_parameter && chars.get(open).map_or(false, |c| c.ch == '(') {
            match matching_close(chars, open, chars.len()) {
                Some(close) => {
                    self.add_parameter(id, chars, open + 1, close);
                    cursor = close + 1;
                }
                None => {
                    self.add_unterminated(id, chars, open + 1, chars.len());
                    cursor = chars.len();
                }
            }
        }

        let mut operand_map = HashMap::new();
        self.scan_operands(
            chars,
            cursor,
            chars.len(),
            Scope::Statement(definition.as_deref()),
            id,
            Some(&mut operand_map),
        );

        let expects_inline_data = definition.as_ref().map_or(false, |d| d.expects_inline_data)
            && !operand_map.keys().any(|name| suppresses_inline_data(name));
        if expects_inline_data {
            self.inline_data_statements.push(id);
        }
        if let NodeKind::Statement(statement) = &mut self.arena.node_mut(id).kind {
            statement.operand_map = operand_map;
        }
        id
    }

    fn add_parameter(&mut self, parent: NodeId, chars: &[SourceChar], start: usize, end: usize) {
        self.arena.alloc(
            NodeKind::Parameter {
                value: ParameterValue::Text(text_of(chars, start, end)),
            },
            position_of(chars, start, end),
            Some(parent),
        );
    }

    fn add_unterminated(&mut self, parent: NodeId, chars: &[SourceChar], start: usize, end: usize) {
        self.arena.alloc(
            NodeKind::Parameter {
                value: ParameterValue::Unterminated,
            },
            position_of(chars, start, end),
            Some(parent),
        );
    }

    /// Reads identifiers in `chars[start..end]` and attaches operand nodes to `parent`.
    fn scan_operands(
        &mut self,
        chars: &[SourceChar],
        start: usize,
        end: usize,
        scope: Scope<'_>,
        parent: NodeId,
        mut operand_map: Option<&mut HashMap<String, NodeId>>,
    ) {
        let mut index = start;
        while index < end {
            let ch = chars[index].ch;
            if ch == '(' {
                // group without a preceding operand name
                index = matching_close(chars, index, end).map_or(end, |close| close + 1);
                continue;
            }
            if !is_name_char(ch) {
                index += 1;
                continue;
            }

            let token_start = index;
            while index < end && is_name_char(chars[index].ch) {
                index += 1;
            }
            let token = text_of(chars, token_start, index);

            let binding = match scope {
                Scope::Statement(Some(definition)) => Some(
                    definition
                        .find_operand(&token)
                        .cloned()
                        .map(OperandSchema::Operand),
                ),
                Scope::Statement(None) => looks_like_operand(&token).then_some(None),
                Scope::Values(definition) => Some(
                    definition
                        .find_sub_operand(&token)
                        .cloned()
                        .map(OperandSchema::Value),
                ),
            };
            let Some(binding) = binding else {
                continue;
            };

            let key = binding
                .as_ref()
                .and_then(OperandSchema::as_operand)
                .map_or_else(|| token.clone(), |d| d.name().to_string());
            let nested = binding
                .as_ref()
                .and_then(OperandSchema::as_operand)
                .filter(|d| d.has_sub_operands())
                .cloned();
            let node = self.arena.alloc(
                NodeKind::Operand {
                    name: token,
                    definition: binding,
                },
                position_of(chars, token_start, index),
                Some(parent),
            );
            if let Some(map) = operand_map.as_mut() {
                map.entry(key).or_insert(node);
            }

            if index < end && chars[index].ch == '(' {
                let open = index;
                match (matching_close(chars, open, end), nested) {
                    (Some(close), Some(definition)) => {
                        self.scan_operands(chars, open + 1, close, Scope::Values(&definition), node, None);
                        index = close + 1;
                    }
                    (Some(close), None) => {
                        self.add_parameter(node, chars, open + 1, close);
                        index = close + 1;
                    }
                    (None, _) => {
                        self.add_unterminated(node, chars, open + 1, end);
                        index = end;
                    }
                }
            }
        }
    }

    /// Whether the statement must be followed by inline data.
    pub fn expects_inline_data(&self, id: NodeId) -> bool {
        self.inline_data_statements.contains(&id)
    }

    pub fn attach_inline_data(&mut self, id: NodeId, data: InlineData) {
        if let NodeKind::Statement(statement) = &mut self.arena.node_mut(id).kind {
            statement.has_inline_data = data.has_content;
            statement.inline_data = Some(LineSpan {
                first: data.first_line,
                last: data.last_line,
            });
        }
    }

    /// Adds comment nodes and returns the finished document.
    pub fn finish(mut self, comments: Vec<CommentSpan>, line_widths: Vec<usize>) -> Document {
        let mut comment_ids = Vec::with_capacity(comments.len());
        let mut standalone = Vec::new();
        for comment in comments {
            let parent = comment
                .owner
                .and_then(|owner| self.statements.get(owner).copied());
            let id = self.arena.alloc(NodeKind::Comment, comment.position, parent);
            if comment.standalone {
                standalone.push(id);
            }
            comment_ids.push(id);
        }

        Document {
            arena: self.arena,
            statements: self.statements,
            comments: comment_ids,
            standalone_comments: standalone,
            inline_data_statements: self.inline_data_statements,
            line_widths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::segmenter::Segmenter;
    use crate::schema::StatementClass;
    use pretty_assertions::assert_eq;

    const SCHEMA: &str = r#"{ "statements": [
        { "name": "++VER", "parameter": "srel", "parameterLength": 4,
          "operands": [ { "name": "FMID", "parameter": "sysmod", "length": 7 },
                        { "name": "PRE", "parameter": "sysmods", "length": 7 } ] },
        { "name": "++MAC", "parameter": "name", "parameterLength": 8, "inlineData": true,
          "operands": [ { "name": "DISTLIB", "parameter": "ddname", "length": 8 },
                        { "name": "DESC|DESCRIPTION", "parameter": "text", "length": 64 },
                        { "name": "FROMDS", "parameter": "dataset", "values": [
                            { "name": "DSN", "length": 44 }, { "name": "VOL", "length": 6 } ] } ] },
        { "name": "++MSG", "parameter": "name", "languageVariants": true }
    ] }"#;

    fn build_one(source: &str) -> Document {
        let schema = SchemaStore::from_json(SCHEMA).unwrap();
        let mut segmenter = Segmenter::new(source);
        let mut builder = TreeBuilder::new(&schema);
        while let Some(span) = segmenter.next_statement() {
            builder.build(&span);
        }
        builder.finish(segmenter.finish(), Vec::new())
    }

    fn operand_names(document: &Document, id: NodeId) -> Vec<String> {
        document
            .operands(id)
            .map(|(_, name, _)| name.to_string())
            .collect()
    }

    #[test]
    fn test_statement_with_parameter_and_operands() {
        let document = build_one("++VER(Z038) FMID(HBB7790) PRE(UA00001) .");
        let id = document.statement_ids()[0];
        let statement = document.statement(id).unwrap();
        assert_eq!(statement.name, "++VER");
        assert!(statement.has_terminator);
        assert_eq!(document.node(id).position, Position::new(0, 0, 5));

        let (param_id, value) = document.parameter(id).unwrap();
        assert_eq!(value, &ParameterValue::Text("Z038".to_string()));
        assert_eq!(document.node(param_id).position, Position::new(0, 6, 4));

        assert_eq!(operand_names(&document, id), vec!["FMID", "PRE"]);
        let fmid = document.operand(id, "FMID").unwrap();
        assert_eq!(document.node(fmid).position, Position::new(0, 12, 4));
        let (_, fmid_value) = document.parameter(fmid).unwrap();
        assert_eq!(fmid_value.as_text(), Some("HBB7790"));
    }

    #[test]
    fn test_sub_operands_are_scanned_only_with_values() {
        let document = build_one("++MAC(TEST) FROMDS(DSN(MY.TEST) VOL()) DISTLIB(A(B)) .");
        let id = document.statement_ids()[0];
        let fromds = document.operand(id, "FROMDS").unwrap();
        assert_eq!(operand_names(&document, fromds), vec!["DSN", "VOL"]);
        assert!(document.parameter(fromds).is_none());

        let vol = document.operands(fromds).nth(1).unwrap().0;
        let (vol_param, value) = document.parameter(vol).unwrap();
        assert!(value.is_blank());
        assert_eq!(document.node(vol_param).position.length, 0);

        let distlib = document.operand(id, "DISTLIB").unwrap();
        assert!(document.operands(distlib).next().is_none());
        assert_eq!(document.parameter(distlib).unwrap().1.as_text(), Some("A(B)"));
    }

    #[test]
    fn test_aliases_share_one_map_entry() {
        let document = build_one("++MAC(X) DESCRIPTION(A) DESC(B) .");
        let id = document.statement_ids()[0];
        let statement = document.statement(id).unwrap();
        assert_eq!(statement.operand_map.len(), 1);
        let first = document.operand(id, "DESC").unwrap();
        assert_eq!(document.operand(id, "DESCRIPTION"), Some(first));
        assert_eq!(operand_names(&document, id), vec!["DESCRIPTION", "DESC"]);
    }

    #[test]
    fn test_unterminated_statement_parameter() {
        let document = build_one("++MAC(LJS2012 .");
        let id = document.statement_ids()[0];
        let statement = document.statement(id).unwrap();
        assert_eq!(statement.unbalanced_parens, 1);
        assert!(!statement.has_terminator);
        assert!(document.parameter(id).unwrap().1.is_unterminated());
        assert!(document.operands(id).next().is_none());
    }

    #[test]
    fn test_unknown_statement_takes_uppercase_tokens() {
        let document = build_one("++BOGUS(X) ALPHA(1) beta GAMMA .");
        let id = document.statement_ids()[0];
        let statement = document.statement(id).unwrap();
        assert_eq!(statement.class, StatementClass::Unknown);
        assert!(statement.definition.is_none());
        assert!(document.parameter(id).is_some());
        assert_eq!(operand_names(&document, id), vec!["ALPHA", "GAMMA"]);
    }

    #[test]
    fn test_unknown_operand_kept_without_definition() {
        let document = build_one("++VER(Z038) FOO(1) .");
        let id = document.statement_ids()[0];
        let (_, name, definition) = document.operands(id).next().unwrap();
        assert_eq!(name, "FOO");
        assert!(definition.is_none());
    }

    #[test]
    fn test_language_variant_binds_base_definition() {
        let document = build_one("++MSGENU(ABC) .");
        let statement = document.statement(document.statement_ids()[0]).unwrap();
        assert_eq!(statement.language_id, "ENU");
        assert_eq!(statement.base_name(), "++MSG");
        assert_eq!(statement.definition.as_ref().unwrap().name, "++MSG");
    }

    #[test]
    fn test_inline_data_expectation() {
        let document = build_one("++MAC(A) .\n++MAC(B) FROMDS(DSN(X)) .\n++MAC(C) DELETE .");
        assert_eq!(document.inline_data_statements(), &document.statement_ids()[..1]);
    }

    #[test]
    fn test_multiline_parameter_position() {
        let document = build_one("++MAC(A) DESC(FIRST\n  SECOND) .");
        let id = document.statement_ids()[0];
        let desc = document.operand(id, "DESC").unwrap();
        let (param, value) = document.parameter(desc).unwrap();
        assert_eq!(value.as_text(), Some("FIRST   SECOND"));
        assert_eq!(document.node(param).position, Position::new(0, 14, 6));
    }

    #[test]
    fn test_is_name_char_and_operand_shape() {
        assert!(is_name_char('A'));
        assert!(is_name_char('#'));
        assert!(!is_name_char('('));
        assert!(looks_like_operand("FMID"));
        assert!(looks_like_operand("A1$"));
        assert!(!looks_like_operand("fmid"));
        assert!(!looks_like_operand("1ABC"));
    }
}
