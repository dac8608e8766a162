//! Statement-level rules: classification, parentheses, terminator and the
//! statement's own parameter.

use super::{Category, FindingSink};
use crate::core::Range;
use crate::parser::{Document, NodeId, ParameterValue, Statement};
use crate::schema::{SchemaStore, StatementClass, StatementDefinition};
use std::sync::Arc;

/// Length of a parameter value as the length rules count it: the trimmed
/// text, without surrounding quotes when the value is quoted.
pub(crate) fn value_length(text: &str) -> usize {
    let trimmed = text.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        return trimmed[1..trimmed.len() - 1].chars().count();
    }
    trimmed.chars().count()
}

/// Reports unknown names and bad language suffixes; returns the definition
/// the remaining rules should use.
pub(super) fn check_classification(
    schema: &SchemaStore,
    document: &Document,
    id: NodeId,
    statement: &Statement,
    sink: &mut FindingSink,
) -> Option<Arc<StatementDefinition>> {
    let range = document.node(id).position.range();
    let resolution = schema.classify(&statement.name);

    match (&resolution.class, resolution.definition) {
        (StatementClass::InvalidLanguage { base, suffix }, _) => {
            sink.report(
                Category::InvalidLanguageId,
                range,
                format!(
                    "invalid language identifier '{}' in '{}' (base statement '{}')",
                    suffix, statement.name, base
                ),
            );
            None
        }
        (StatementClass::LanguageVariant { base, .. }, None) => {
            sink.report(
                Category::UnknownStatement,
                range,
                format!("unknown statement '{}' (base '{}' is not defined)", statement.name, base),
            );
            None
        }
        (_, Some(definition)) => Some(definition),
        (_, None) => {
            sink.report(
                Category::UnknownStatement,
                range,
                format!("unknown statement '{}'", statement.name),
            );
            None
        }
    }
}

/// Returns whether an imbalance finding was reported.
pub(super) fn check_parentheses(
    document: &Document,
    id: NodeId,
    statement: &Statement,
    sink: &mut FindingSink,
) -> bool {
    let range = document.node(id).position.range();
    let count = statement.unbalanced_parens;
    let message = match count {
        0 => return false,
        1 => format!("unbalanced parentheses in '{}': missing closing parenthesis", statement.name),
        n if n > 1 => format!(
            "unbalanced parentheses in '{}': {} missing closing parentheses",
            statement.name, n
        ),
        _ => format!(
            "unbalanced parentheses in '{}': missing opening or extra closing parenthesis",
            statement.name
        ),
    };
    sink.report(Category::UnbalancedParentheses, range, message)
}

pub(super) fn check_terminator(statement: &Statement, sink: &mut FindingSink) {
    if statement.has_terminator {
        return;
    }
    let end = statement.text_end;
    sink.report(
        Category::MissingTerminator,
        Range::on_line(end.line, end.character, end.character),
        format!("statement '{}' is not terminated with '.'", statement.name),
    );
}

pub(super) fn check_parameter(
    document: &Document,
    id: NodeId,
    statement: &Statement,
    definition: &StatementDefinition,
    unbalanced_reported: bool,
    sink: &mut FindingSink,
) {
    if !definition.expects_parameter() {
        return;
    }
    let name_range = document.node(id).position.range();
    let hint = definition.parameter.as_deref().unwrap_or_default();

    match document.parameter(id) {
        None => {
            sink.report(
                Category::MissingParameter,
                name_range,
                format!("missing parameter for '{}' (expected {})", statement.name, hint),
            );
        }
        Some((_, value)) if value.is_blank() => {
            sink.report(
                Category::MissingParameter,
                name_range,
                format!("missing parameter for '{}' (expected {})", statement.name, hint),
            );
        }
        Some((param, ParameterValue::Unterminated)) => {
            // the imbalance finding already explains an unclosed parameter
            if !unbalanced_reported {
                sink.report(
                    Category::MalformedParameter,
                    document.node(param).position.range(),
                    format!("malformed parameter for '{}': missing ')'", statement.name),
                );
            }
        }
        Some((param, ParameterValue::Text(text))) => {
            let max = definition.max_parameter_length;
            let length = value_length(text);
            if max > 0 && length > max {
                sink.report(
                    Category::ParameterTooLong,
                    document.node(param).position.range(),
                    format!(
                        "parameter of '{}' is {} characters long, maximum is {}",
                        statement.name, length, max
                    ),
                );
            }
        }
    }
}
