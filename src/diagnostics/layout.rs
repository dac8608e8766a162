//! Document-level passes: inline data presence, column width and comment
//! placement.

use super::{Category, FindingSink};
use crate::core::Range;
use crate::parser::{Document, EXTERNAL_DATA_OPERANDS};

/// Last column MCS text may occupy.
pub const COLUMN_LIMIT: usize = 72;

pub(super) fn check_inline_data(document: &Document, sink: &mut FindingSink) {
    if !sink.enabled(Category::MissingInlineData) {
        return;
    }
    for &id in document.inline_data_statements() {
        let Some(statement) = document.statement(id) else {
            continue;
        };
        if statement.has_inline_data {
            continue;
        }

        let alternatives: Vec<&str> = statement
            .definition
            .as_ref()
            .map(|definition| {
                EXTERNAL_DATA_OPERANDS
                    .iter()
                    .copied()
                    .filter(|name| definition.find_operand(name).is_some())
                    .collect()
            })
            .unwrap_or_default();

        let mut message = format!("'{}' expects inline data but none found", statement.name);
        if let Some((last, rest)) = alternatives.split_last() {
            let choices = if rest.is_empty() {
                last.to_string()
            } else {
                format!("{} or {}", rest.join(", "), last)
            };
            message.push_str(&format!(" (use {} to point at external data)", choices));
        }
        sink.report(
            Category::MissingInlineData,
            document.node(id).position.range(),
            message,
        );
    }
}

pub(super) fn check_columns(document: &Document, sink: &mut FindingSink) {
    if !sink.enabled(Category::ColumnOverflow) {
        return;
    }
    for line in 0..document.line_count() {
        let width = document.line_width(line);
        if width <= COLUMN_LIMIT {
            continue;
        }
        sink.report(
            Category::ColumnOverflow,
            Range::on_line(line, COLUMN_LIMIT, width),
            format!("text extends beyond column {} ({} columns)", COLUMN_LIMIT, width),
        );
    }
}

pub(super) fn check_comments(document: &Document, sink: &mut FindingSink) {
    if !sink.enabled(Category::StandaloneComment) {
        return;
    }
    let first_line = document
        .statement_ids()
        .first()
        .map(|&id| document.node(id).position.line);
    let last_line = document
        .statements()
        .last()
        .map(|(_, statement)| statement.end_line);

    for &id in document.standalone_comments() {
        let position = document.node(id).position;
        let place = match (first_line, last_line) {
            (Some(first), _) if position.line < first => "before the first",
            (_, Some(last)) if position.line > last => "after the last",
            (Some(_), Some(_)) => "between",
            _ => "before the first",
        };
        let message = if place == "between" {
            "comment not allowed between MCS statements".to_string()
        } else {
            format!("comment not allowed {} MCS statement", place)
        };
        sink.report(Category::StandaloneComment, position.range(), message);
    }
}
