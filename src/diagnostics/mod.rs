/*!
# Diagnostics Engine

Walks a parsed [`Document`] against the schema store and produces a flat
list of [`Finding`]s. Every rule belongs to a [`Category`]; categories
switched off in [`DiagnosticsConfig`] are skipped entirely.

Per statement the rules run in a fixed order (classification, parenthesis
balance, terminator, statement parameter, operands, statement policies),
followed by three document passes: missing inline data, column overflow and
comment placement.

```rust
use mcs_analyzer::diagnostics::{DiagnosticsConfig, DiagnosticsEngine};
use mcs_analyzer::parser::McsParser;
use mcs_analyzer::schema::SchemaStore;

let schema = SchemaStore::builtin()?;
let config = DiagnosticsConfig::default();
let document = McsParser::new(&schema).parse("++USERMOD(LJS2012 .");
let findings = DiagnosticsEngine::new(&schema, &config).run(&document);
assert_eq!(findings.len(), 1);
# Ok::<(), anyhow::Error>(())
```
*/

pub mod config;
mod layout;
mod operands;
pub mod policy;
mod statement;

pub use config::DiagnosticsConfig;

use crate::core::Range;
use crate::parser::{Document, NodeId, Statement};
use crate::schema::SchemaStore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Finding severity. Ordered so that `Error` is the greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Information,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// Rule classes; each one can be switched off on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    UnknownStatement,
    InvalidLanguageId,
    UnbalancedParentheses,
    MissingTerminator,
    MissingParameter,
    MalformedParameter,
    ParameterTooLong,
    UnknownOperand,
    DuplicateOperand,
    EmptyOperandParameter,
    OperandParameterTooLong,
    UnknownSubOperand,
    EmptySubOperand,
    SubOperandTooLong,
    MissingRequiredOperand,
    DependencyViolation,
    MutuallyExclusive,
    RequiredGroup,
    MoveStatement,
    MissingInlineData,
    ColumnOverflow,
    StandaloneComment,
}

impl Category {
    pub const ALL: [Category; 22] = [
        Category::UnknownStatement,
        Category::InvalidLanguageId,
        Category::UnbalancedParentheses,
        Category::MissingTerminator,
        Category::MissingParameter,
        Category::MalformedParameter,
        Category::ParameterTooLong,
        Category::UnknownOperand,
        Category::DuplicateOperand,
        Category::EmptyOperandParameter,
        Category::OperandParameterTooLong,
        Category::UnknownSubOperand,
        Category::EmptySubOperand,
        Category::SubOperandTooLong,
        Category::MissingRequiredOperand,
        Category::DependencyViolation,
        Category::MutuallyExclusive,
        Category::RequiredGroup,
        Category::MoveStatement,
        Category::MissingInlineData,
        Category::ColumnOverflow,
        Category::StandaloneComment,
    ];

    /// Stable rule code, `MCS001` to `MCS022`.
    pub fn code(&self) -> &'static str {
        match self {
            Category::UnknownStatement => "MCS001",
            Category::InvalidLanguageId => "MCS002",
            Category::UnbalancedParentheses => "MCS003",
            Category::MissingTerminator => "MCS004",
            Category::MissingParameter => "MCS005",
            Category::MalformedParameter => "MCS006",
            Category::ParameterTooLong => "MCS007",
            Category::UnknownOperand => "MCS008",
            Category::DuplicateOperand => "MCS009",
            Category::EmptyOperandParameter => "MCS010",
            Category::OperandParameterTooLong => "MCS011",
            Category::UnknownSubOperand => "MCS012",
            Category::EmptySubOperand => "MCS013",
            Category::SubOperandTooLong => "MCS014",
            Category::MissingRequiredOperand => "MCS015",
            Category::DependencyViolation => "MCS016",
            Category::MutuallyExclusive => "MCS017",
            Category::RequiredGroup => "MCS018",
            Category::MoveStatement => "MCS019",
            Category::MissingInlineData => "MCS020",
            Category::ColumnOverflow => "MCS021",
            Category::StandaloneComment => "MCS022",
        }
    }

    /// Name used in configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            Category::UnknownStatement => "unknown_statement",
            Category::InvalidLanguageId => "invalid_language_id",
            Category::UnbalancedParentheses => "unbalanced_parentheses",
            Category::MissingTerminator => "missing_terminator",
            Category::MissingParameter => "missing_parameter",
            Category::MalformedParameter => "malformed_parameter",
            Category::ParameterTooLong => "parameter_too_long",
            Category::UnknownOperand => "unknown_operand",
            Category::DuplicateOperand => "duplicate_operand",
            Category::EmptyOperandParameter => "empty_operand_parameter",
            Category::OperandParameterTooLong => "operand_parameter_too_long",
            Category::UnknownSubOperand => "unknown_sub_operand",
            Category::EmptySubOperand => "empty_sub_operand",
            Category::SubOperandTooLong => "sub_operand_too_long",
            Category::MissingRequiredOperand => "missing_required_operand",
            Category::DependencyViolation => "dependency_violation",
            Category::MutuallyExclusive => "mutually_exclusive",
            Category::RequiredGroup => "required_group",
            Category::MoveStatement => "move_statement",
            Category::MissingInlineData => "missing_inline_data",
            Category::ColumnOverflow => "column_overflow",
            Category::StandaloneComment => "standalone_comment",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Category::UnknownOperand
            | Category::OperandParameterTooLong
            | Category::UnknownSubOperand
            | Category::EmptySubOperand
            | Category::SubOperandTooLong
            | Category::MissingInlineData => Severity::Warning,
            Category::DependencyViolation => Severity::Information,
            Category::DuplicateOperand => Severity::Hint,
            _ => Severity::Error,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::UnknownStatement => "Statement name is not defined in the schema",
            Category::InvalidLanguageId => "Language suffix is not a national language identifier",
            Category::UnbalancedParentheses => "Opening and closing parentheses do not match",
            Category::MissingTerminator => "Statement does not end with '.'",
            Category::MissingParameter => "Statement parameter is required but absent",
            Category::MalformedParameter => "Statement parameter is not closed",
            Category::ParameterTooLong => "Statement parameter exceeds its maximum length",
            Category::UnknownOperand => "Operand is not defined for the statement",
            Category::DuplicateOperand => "Operand is specified more than once",
            Category::EmptyOperandParameter => "Operand requires a parameter but has none",
            Category::OperandParameterTooLong => "Operand parameter exceeds its maximum length",
            Category::UnknownSubOperand => "Sub-operand is not defined for the operand",
            Category::EmptySubOperand => "Sub-operand requires a value but has none",
            Category::SubOperandTooLong => "Sub-operand value exceeds its maximum length",
            Category::MissingRequiredOperand => "A required operand is absent",
            Category::DependencyViolation => "Operand is only allowed together with another operand",
            Category::MutuallyExclusive => "Operands cannot be specified together",
            Category::RequiredGroup => "At least one operand of a group must be specified",
            Category::MoveStatement => "++MOVE operand combination is invalid",
            Category::MissingInlineData => "Statement expects inline data but none follows",
            Category::ColumnOverflow => "Text extends beyond column 72",
            Category::StandaloneComment => "Comment outside of an MCS statement",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::UnknownStatement => "unknown statement",
            Category::InvalidLanguageId => "invalid language identifier",
            Category::UnbalancedParentheses => "unbalanced parentheses",
            Category::MissingTerminator => "missing terminator",
            Category::MissingParameter => "missing parameter",
            Category::MalformedParameter => "malformed parameter",
            Category::ParameterTooLong => "parameter too long",
            Category::UnknownOperand => "unknown operand",
            Category::DuplicateOperand => "duplicate operand",
            Category::EmptyOperandParameter => "empty operand parameter",
            Category::OperandParameterTooLong => "operand parameter too long",
            Category::UnknownSubOperand => "unknown sub-operand",
            Category::EmptySubOperand => "empty sub-operand",
            Category::SubOperandTooLong => "sub-operand too long",
            Category::MissingRequiredOperand => "missing required operand",
            Category::DependencyViolation => "dependency violation",
            Category::MutuallyExclusive => "mutually exclusive operands",
            Category::RequiredGroup => "required group",
            Category::MoveStatement => "move statement",
            Category::MissingInlineData => "missing inline data",
            Category::ColumnOverflow => "column overflow",
            Category::StandaloneComment => "standalone comment",
        };
        f.write_str(label)
    }
}

/// One validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub range: Range,
    pub severity: Severity,
    pub category: Category,
    pub code: &'static str,
    pub message: String,
}

impl Finding {
    /// Creates a finding with the category's default severity.
    pub fn new(category: Category, range: Range, message: impl Into<String>) -> Self {
        Self {
            range,
            severity: category.severity(),
            category,
            code: category.code(),
            message: message.into(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.range, self.severity, self.code, self.message
        )
    }
}

/// Collects findings, dropping those of disabled categories.
pub(crate) struct FindingSink<'c> {
    config: &'c DiagnosticsConfig,
    findings: Vec<Finding>,
}

impl<'c> FindingSink<'c> {
    fn new(config: &'c DiagnosticsConfig) -> Self {
        Self {
            config,
            findings: Vec::new(),
        }
    }

    pub(crate) fn enabled(&self, category: Category) -> bool {
        self.config.is_enabled(category)
    }

    /// Records a finding; returns whether it was kept.
    pub(crate) fn report(&mut self, category: Category, range: Range, message: impl Into<String>) -> bool {
        if !self.enabled(category) {
            return false;
        }
        self.findings.push(Finding::new(category, range, message));
        true
    }

    fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

/// Stateless rule runner over parsed documents.
pub struct DiagnosticsEngine<'a> {
    schema: &'a SchemaStore,
    config: &'a DiagnosticsConfig,
}

impl<'a> DiagnosticsEngine<'a> {
    pub fn new(schema: &'a SchemaStore, config: &'a DiagnosticsConfig) -> Self {
        Self { schema, config }
    }

    /// Runs every enabled rule. Findings come out in a stable order.
    pub fn run(&self, document: &Document) -> Vec<Finding> {
        let mut sink = FindingSink::new(self.config);

        for (id, statement) in document.statements() {
            self.check_statement(document, id, statement, &mut sink);
        }
        layout::check_inline_data(document, &mut sink);
        layout::check_columns(document, &mut sink);
        layout::check_comments(document, &mut sink);

        let findings = sink.into_findings();
        tracing::debug!(
            "Diagnostics produced {} findings for {} statements",
            findings.len(),
            document.statement_count()
        );
        findings
    }

    fn check_statement(&self, document: &Document, id: NodeId, statement: &Statement, sink: &mut FindingSink) {
        let definition = statement::check_classification(self.schema, document, id, statement, sink);

        let unbalanced_reported = statement::check_parentheses(document, id, statement, sink);
        if statement.unbalanced_parens == 0 {
            statement::check_terminator(statement, sink);
        }

        // Without a definition there is nothing to validate operands against
        let Some(definition) = definition else {
            return;
        };
        statement::check_parameter(document, id, statement, &definition, unbalanced_reported, sink);
        operands::check_operands(document, id, statement, &definition, sink);
        policy::check_statement_policy(document, id, statement, sink);
    }
}
