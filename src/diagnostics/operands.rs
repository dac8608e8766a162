//! Operand set validation for one statement.

use super::policy::required_operands;
use super::statement::value_length;
use super::{Category, FindingSink};
use crate::parser::{Document, NodeId, ParameterValue, Statement};
use crate::schema::{OperandDefinition, StatementDefinition};
use std::collections::{HashMap, HashSet};

/// Canonical name of an operand spelled as `alias`.
fn canonical<'a>(definition: &'a StatementDefinition, alias: &'a str) -> &'a str {
    definition
        .find_operand(alias)
        .map_or(alias, |operand| operand.name())
}

pub(super) fn check_operands(
    document: &Document,
    id: NodeId,
    statement: &Statement,
    definition: &StatementDefinition,
    sink: &mut FindingSink,
) {
    check_occurrences(document, id, statement, sink);
    check_required(document, id, statement, definition, sink);
    check_dependencies(document, statement, definition, sink);
    check_mutually_exclusive(document, statement, definition, sink);
    check_required_groups(document, id, statement, definition, sink);
}

/// Per-occurrence checks: unknown, duplicate, parameter presence and length.
fn check_occurrences(document: &Document, id: NodeId, statement: &Statement, sink: &mut FindingSink) {
    let mut first_seen: HashMap<&str, NodeId> = HashMap::new();

    for (operand_id, name, binding) in document.operands(id) {
        let range = document.node(operand_id).position.range();
        let Some(operand) = binding.and_then(|b| b.as_operand()) else {
            sink.report(
                Category::UnknownOperand,
                range,
                format!("unknown operand '{}' for '{}'", name, statement.name),
            );
            continue;
        };

        match first_seen.get(operand.name()) {
            Some(&first) => {
                let first_line = document.node(first).position.line;
                let message = if first_line != range.start.line {
                    format!(
                        "duplicate operand '{}', first occurrence on line {}",
                        name,
                        first_line + 1
                    )
                } else {
                    format!("duplicate operand '{}'", name)
                };
                sink.report(Category::DuplicateOperand, range, message);
            }
            None => {
                first_seen.insert(operand.name(), operand_id);
            }
        }

        if operand.has_sub_operands() {
            check_sub_operands(document, operand_id, name, operand, sink);
            continue;
        }

        match document.parameter(operand_id) {
            None => {
                if operand.expects_parameter() {
                    sink.report(
                        Category::EmptyOperandParameter,
                        range,
                        format!("operand '{}' has an empty parameter", name),
                    );
                }
            }
            Some((_, ParameterValue::Unterminated)) => {}
            Some((_, value)) if value.is_blank() => {
                if operand.expects_parameter() {
                    sink.report(
                        Category::EmptyOperandParameter,
                        range,
                        format!("operand '{}' has an empty parameter", name),
                    );
                }
            }
            Some((param, ParameterValue::Text(text))) => {
                let length = value_length(text);
                if operand.max_length > 0 && length > operand.max_length {
                    sink.report(
                        Category::OperandParameterTooLong,
                        document.node(param).position.range(),
                        format!(
                            "parameter of operand '{}' is {} characters long, maximum is {}",
                            name, length, operand.max_length
                        ),
                    );
                }
            }
        }
    }
}

fn check_sub_operands(
    document: &Document,
    operand_id: NodeId,
    operand_name: &str,
    operand: &OperandDefinition,
    sink: &mut FindingSink,
) {
    let range = document.node(operand_id).position.range();
    let has_children = !document.children(operand_id).is_empty();
    if !has_children && operand.expects_parameter() {
        sink.report(
            Category::EmptyOperandParameter,
            range,
            format!("operand '{}' has an empty parameter", operand_name),
        );
        return;
    }

    for (value_id, name, binding) in document.operands(operand_id) {
        let value_range = document.node(value_id).position.range();
        let Some(value) = binding.and_then(|b| b.as_value()) else {
            sink.report(
                Category::UnknownSubOperand,
                value_range,
                format!("unknown sub-operand '{}'", name),
            );
            continue;
        };
        if value.max_length == 0 {
            continue;
        }

        match document.parameter(value_id) {
            Some((_, ParameterValue::Unterminated)) => {}
            Some((param, ParameterValue::Text(text))) if !text.trim().is_empty() => {
                let length = value_length(text);
                if length > value.max_length {
                    sink.report(
                        Category::SubOperandTooLong,
                        document.node(param).position.range(),
                        format!(
                            "value of sub-operand '{}' is {} characters long, maximum is {}",
                            name, length, value.max_length
                        ),
                    );
                }
            }
            _ => {
                sink.report(
                    Category::EmptySubOperand,
                    value_range,
                    format!("sub-operand '{}' has an empty parameter", name),
                );
            }
        }
    }
}

/// Required operands from the policy table and the schema, each reported once.
fn check_required(
    document: &Document,
    id: NodeId,
    statement: &Statement,
    definition: &StatementDefinition,
    sink: &mut FindingSink,
) {
    let mut required: Vec<&str> = Vec::new();
    let table = required_operands(statement.base_name());
    let from_table = table.iter().map(|alias| canonical(definition, alias));
    let from_schema = definition
        .operands
        .iter()
        .filter(|operand| operand.required)
        .map(|operand| operand.name());

    for name in from_table.chain(from_schema) {
        let in_group = definition
            .find_operand(name)
            .map_or(false, |operand| operand.required_group.is_some());
        if !in_group && !required.contains(&name) {
            required.push(name);
        }
    }

    let range = document.node(id).position.range();
    for name in required {
        if !statement.has_operand(name) {
            sink.report(
                Category::MissingRequiredOperand,
                range,
                format!("missing required operand '{}' for '{}'", name, statement.name),
            );
        }
    }
}

fn check_dependencies(
    document: &Document,
    statement: &Statement,
    definition: &StatementDefinition,
    sink: &mut FindingSink,
) {
    for operand in &definition.operands {
        let (Some(target), Some(&node)) = (
            operand.allowed_if.as_deref(),
            statement.operand_map.get(operand.name()),
        ) else {
            continue;
        };
        if !statement.has_operand(canonical(definition, target)) {
            sink.report(
                Category::DependencyViolation,
                document.node(node).position.range(),
                format!(
                    "operand '{}' is only allowed together with '{}'",
                    operand.name(),
                    target
                ),
            );
        }
    }
}

fn check_mutually_exclusive(
    document: &Document,
    statement: &Statement,
    definition: &StatementDefinition,
    sink: &mut FindingSink,
) {
    let mut reported: HashSet<(&str, &str)> = HashSet::new();

    for operand in &definition.operands {
        let Some(&node) = statement.operand_map.get(operand.name()) else {
            continue;
        };
        for peer in &operand.mutually_exclusive_with {
            let peer_name = canonical(definition, peer);
            let Some(&peer_node) = statement.operand_map.get(peer_name) else {
                continue;
            };
            let pair = if operand.name() <= peer_name {
                (operand.name(), peer_name)
            } else {
                (peer_name, operand.name())
            };
            if !reported.insert(pair) {
                continue;
            }
            // point at whichever of the two comes later
            let at = node.max(peer_node);
            sink.report(
                Category::MutuallyExclusive,
                document.node(at).position.range(),
                format!(
                    "operands '{}' and '{}' are mutually exclusive",
                    operand.name(),
                    peer_name
                ),
            );
        }
    }
}

fn check_required_groups(
    document: &Document,
    id: NodeId,
    statement: &Statement,
    definition: &StatementDefinition,
    sink: &mut FindingSink,
) {
    let range = document.node(id).position.range();
    for (group, members) in definition.required_groups() {
        if members.iter().any(|member| statement.has_operand(member.name())) {
            continue;
        }
        let names: Vec<String> = members
            .iter()
            .map(|member| format!("'{}'", member.name()))
            .collect();
        sink.report(
            Category::RequiredGroup,
            range,
            format!(
                "'{}' requires one of {} ({})",
                statement.name,
                names.join(", "),
                group
            ),
        );
    }
}
