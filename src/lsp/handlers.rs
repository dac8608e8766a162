//! Request handlers that only need a parsed document: outline symbols and
//! hover text. Kept free of the client so they can be tested directly.

use super::diagnostics::{to_lsp_position, to_lsp_range};
use crate::core::Point;
use crate::parser::{Document, NodeId, NodeKind, OperandSchema, Statement};
use tower_lsp::lsp_types::{
    DocumentSymbol, Hover, HoverContents, MarkupContent, MarkupKind, Position, Range, SymbolKind,
};

/// One symbol per statement, with its operands (and their values) as children.
pub fn document_symbols(document: &Document) -> Vec<DocumentSymbol> {
    document
        .statements()
        .map(|(id, statement)| statement_symbol(document, id, statement))
        .collect()
}

#[allow(deprecated)]
fn statement_symbol(document: &Document, id: NodeId, statement: &Statement) -> DocumentSymbol {
    let position = document.node(id).position;
    let end = statement
        .terminator
        .map(|terminator| Point::new(terminator.line, terminator.end_character()))
        .unwrap_or(statement.text_end);

    DocumentSymbol {
        name: statement.name.clone(),
        detail: parameter_text(document, id),
        kind: SymbolKind::OBJECT,
        tags: None,
        deprecated: None,
        range: Range {
            start: to_lsp_position(Point::new(position.line, position.character)),
            end: to_lsp_position(end),
        },
        selection_range: to_lsp_range(position.range()),
        children: Some(operand_symbols(document, id)),
    }
}

#[allow(deprecated)]
fn operand_symbols(document: &Document, parent: NodeId) -> Vec<DocumentSymbol> {
    document
        .operands(parent)
        .map(|(id, name, definition)| {
            let position = document.node(id).position;
            let children = operand_symbols(document, id);
            let kind = match definition {
                Some(OperandSchema::Value(_)) => SymbolKind::FIELD,
                _ => SymbolKind::PROPERTY,
            };
            DocumentSymbol {
                name: name.to_string(),
                detail: parameter_text(document, id),
                kind,
                tags: None,
                deprecated: None,
                range: Range {
                    start: to_lsp_position(Point::new(position.line, position.character)),
                    end: to_lsp_position(subtree_end(document, id)),
                },
                selection_range: to_lsp_range(position.range()),
                children: (!children.is_empty()).then_some(children),
            }
        })
        .collect()
}

fn parameter_text(document: &Document, id: NodeId) -> Option<String> {
    document
        .parameter(id)
        .and_then(|(_, value)| value.as_text())
        .map(|text| text.trim().to_string())
}

/// Furthest point covered by a node or any of its descendants.
fn subtree_end(document: &Document, id: NodeId) -> Point {
    let position = document.node(id).position;
    document
        .children(id)
        .iter()
        .map(|&child| subtree_end(document, child))
        .fold(
            Point::new(position.line, position.end_character()),
            |furthest, point| {
                if (point.line, point.character) > (furthest.line, furthest.character) {
                    point
                } else {
                    furthest
                }
            },
        )
}

/// Markdown description of the statement or operand under the cursor.
pub fn hover_at(document: &Document, position: Position) -> Option<Hover> {
    let id = document.node_at(position.line as usize, position.character as usize)?;
    let node = document.node(id);

    // a parameter describes whatever it belongs to
    let target = match node.kind {
        NodeKind::Parameter { .. } => node.parent?,
        _ => id,
    };
    let contents = describe(document, target)?;

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: contents,
        }),
        range: Some(to_lsp_range(node.position.range())),
    })
}

fn describe(document: &Document, id: NodeId) -> Option<String> {
    match &document.node(id).kind {
        NodeKind::Statement(statement) => {
            let definition = statement.definition.as_ref()?;
            let mut text = format!("**{}**", statement.name);
            if statement.name != definition.name {
                text.push_str(&format!(" (language variant of `{}`)", definition.name));
            }
            if let Some(description) = &definition.description {
                text.push_str(&format!("\n\n{}", description));
            }
            if let Some(parameter) = &definition.parameter {
                text.push_str(&format!("\n\nParameter: `{}`", parameter));
            }
            Some(text)
        }
        NodeKind::Operand {
            definition: Some(schema),
            ..
        } => {
            let (title, hint) = match schema {
                OperandSchema::Operand(definition) => {
                    (definition.display_name(), definition.parameter_hint.clone())
                }
                OperandSchema::Value(definition) => {
                    (definition.name.clone(), Some(definition.value_type.clone()))
                }
            };
            let mut text = format!("**{}**", title);
            if let Some(description) = schema.description() {
                text.push_str(&format!("\n\n{}", description));
            }
            if let Some(hint) = hint.filter(|hint| !hint.is_empty()) {
                text.push_str(&format!("\n\nValue: `{}`", hint));
            }
            if schema.max_length() > 0 {
                text.push_str(&format!(" (max {} characters)", schema.max_length()));
            }
            Some(text)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::schema::SchemaStore;
    use pretty_assertions::assert_eq;

    fn hover_text(hover: Hover) -> String {
        match hover.contents {
            HoverContents::Markup(markup) => markup.value,
            other => panic!("unexpected hover contents: {:?}", other),
        }
    }

    #[test]
    fn test_document_symbols() {
        let schema = SchemaStore::builtin().unwrap();
        let document = parse(
            "++PTF(UA00001) /* fix */\n  FILES(2) .\n++MAC(IEFBR14) DISTLIB(AMACLIB) FROMDS(DSN(A.B) NUMBER(1)) .",
            &schema,
        );
        let symbols = document_symbols(&document);

        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].name, "++PTF");
        assert_eq!(symbols[0].detail.as_deref(), Some("UA00001"));
        let ptf_children = symbols[0].children.as_ref().unwrap();
        assert_eq!(ptf_children.len(), 1);
        assert_eq!(ptf_children[0].name, "FILES");
        assert_eq!(ptf_children[0].detail.as_deref(), Some("2"));
        assert_eq!(symbols[0].range.end.line, 1);

        let mac_children = symbols[1].children.as_ref().unwrap();
        let names: Vec<&str> = mac_children.iter().map(|symbol| symbol.name.as_str()).collect();
        assert_eq!(names, vec!["DISTLIB", "FROMDS"]);
        let values = mac_children[1].children.as_ref().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].kind, SymbolKind::FIELD);
        assert_eq!(values[0].detail.as_deref(), Some("A.B"));
    }

    #[test]
    fn test_hover_statement_and_operand() {
        let schema = SchemaStore::builtin().unwrap();
        let document = parse("++PTF(UA00001)\n  FILES(2) .", &schema);

        let statement = hover_text(hover_at(&document, Position::new(0, 1)).unwrap());
        assert!(statement.starts_with("**++PTF**"));

        let operand = hover_text(hover_at(&document, Position::new(1, 3)).unwrap());
        assert!(operand.contains("**FILES**"));
        assert!(operand.contains("relative files"));

        // the parameter of FILES describes FILES
        let parameter = hover_text(hover_at(&document, Position::new(1, 8)).unwrap());
        assert_eq!(parameter, operand);
    }

    #[test]
    fn test_hover_unknown_statement() {
        let schema = SchemaStore::builtin().unwrap();
        let document = parse("++BOGUS(X) .", &schema);
        assert!(hover_at(&document, Position::new(0, 2)).is_none());
        assert!(hover_at(&document, Position::new(5, 0)).is_none());
    }
}
