/*!
# Statement policies

Rules from the SMP/E syntax that the schema format cannot express. They are
kept as explicit tables and match arms, separate from the schema-driven rules.
*/

use super::{Category, FindingSink};
use crate::parser::{Document, NodeId, Statement};

/// Operands that must be present, by statement name.
///
/// Members of a schema required group are skipped when this table is
/// applied, so a group member listed here is reported by the group rule only.
pub const REQUIRED_OPERANDS: &[(&str, &[&str])] = &[
    ("++ASSIGN", &["SOURCEID", "TO"]),
    ("++DELETE", &["SYSLIB"]),
    ("++IF", &["FMID", "REQ"]),
    ("++RENAME", &["TONAME"]),
];

pub fn required_operands(statement: &str) -> &'static [&'static str] {
    REQUIRED_OPERANDS
        .iter()
        .find(|(name, _)| *name == statement)
        .map(|(_, operands)| *operands)
        .unwrap_or(&[])
}

const MOVE_DISTLIB_ELEMENTS: [&str; 3] = ["MAC", "MOD", "SRC"];
const MOVE_SYSLIB_ELEMENTS: [&str; 4] = ["MAC", "SRC", "LMOD", "FMID"];

pub(super) fn check_statement_policy(
    document: &Document,
    id: NodeId,
    statement: &Statement,
    sink: &mut FindingSink,
) {
    if statement.base_name() == "++MOVE" {
        check_move(document, id, statement, sink);
    }
}

/// `++MOVE` works on either distribution or target libraries, never both.
fn check_move(document: &Document, id: NodeId, statement: &Statement, sink: &mut FindingSink) {
    let range = document.node(id).position.range();
    let has = |name: &str| statement.has_operand(name);

    let (companion, elements, mode) = match (has("DISTLIB"), has("SYSLIB")) {
        (true, true) => {
            sink.report(
                Category::MoveStatement,
                range,
                "'++MOVE' cannot specify both DISTLIB and SYSLIB",
            );
            return;
        }
        (false, false) => {
            sink.report(
                Category::MoveStatement,
                range,
                "'++MOVE' requires either DISTLIB or SYSLIB",
            );
            return;
        }
        (true, false) => ("TODISTLIB", &MOVE_DISTLIB_ELEMENTS[..], "DISTLIB"),
        (false, true) => ("TOSYSLIB", &MOVE_SYSLIB_ELEMENTS[..], "SYSLIB"),
    };

    if !has(companion) {
        sink.report(
            Category::MoveStatement,
            range,
            format!("'++MOVE' with {} requires {}", mode, companion),
        );
    }
    if !elements.iter().any(|&element| has(element)) {
        sink.report(
            Category::MoveStatement,
            range,
            format!("'++MOVE' with {} requires one of {}", mode, elements.join(", ")),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_operands_table() {
        assert_eq!(required_operands("++ASSIGN"), &["SOURCEID", "TO"]);
        assert_eq!(required_operands("++RENAME"), &["TONAME"]);
        assert!(required_operands("++PTF").is_empty());
    }
}
