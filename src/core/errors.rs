/*!
# Error types

Typed errors raised while loading external inputs. Parsing and diagnostics
never fail; only schema documents can be rejected.
*/

use thiserror::Error;

/// Problems found while building a [`SchemaStore`](crate::schema::SchemaStore)
/// from its JSON form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("statement '{0}' is defined more than once")]
    DuplicateStatement(String),

    #[error("statement name '{0}' must start with '++'")]
    InvalidStatementName(String),

    #[error("operand without a name in statement '{0}'")]
    EmptyOperandName(String),

    #[error("statement '{statement}' includes unknown operand set '{set}'")]
    UnknownOperandSet { statement: String, set: String },

    #[error("operand '{operand}' of '{statement}' is allowed only with undefined operand '{target}'")]
    UnknownAllowedIf {
        statement: String,
        operand: String,
        target: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SchemaError::DuplicateStatement("++MAC".to_string());
        assert_eq!(err.to_string(), "statement '++MAC' is defined more than once");

        let err = SchemaError::UnknownAllowedIf {
            statement: "++HOLD".to_string(),
            operand: "CATEGORY".to_string(),
            target: "FIXCATX".to_string(),
        };
        assert!(err.to_string().contains("FIXCATX"));
    }
}
