/*!
Operand rules, statement policies, language variants and configuration
switches, run through the public analysis API with the built-in schema.
*/

use mcs_analyzer::{analyze, Category, DiagnosticsConfig, Finding, SchemaStore, Severity};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn findings_with(text: &str, config: &DiagnosticsConfig) -> Vec<Finding> {
    let schema = SchemaStore::builtin().unwrap();
    analyze(text, &schema, config).diagnostics
}

fn findings(text: &str) -> Vec<Finding> {
    findings_with(text, &DiagnosticsConfig::default())
}

fn categories(findings: &[Finding]) -> Vec<Category> {
    findings.iter().map(|finding| finding.category).collect()
}

#[test]
fn test_required_table_reports_each_operand_once() {
    let result = findings("++ASSIGN SOURCEID(SPRING) .");
    assert_eq!(categories(&result), vec![Category::MissingRequiredOperand]);
    assert_eq!(result[0].message, "missing required operand 'TO' for '++ASSIGN'");

    let result = findings("++RENAME(OLDMOD) .");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].message, "missing required operand 'TONAME' for '++RENAME'");
}

#[test]
fn test_schema_required_and_group_do_not_overlap() {
    let result = findings("++HOLD(UA00001) FMID(HBB7790) REASON(AA00001) .");
    assert_eq!(categories(&result), vec![Category::RequiredGroup]);
    assert!(result[0].message.contains("'ERROR'"));
    assert!(result[0].message.contains("'USER'"));
    assert!(result[0].message.contains("hold type"));

    let result = findings("++HOLD(UA00001) ERROR .");
    assert_eq!(
        categories(&result),
        vec![
            Category::MissingRequiredOperand,
            Category::MissingRequiredOperand
        ]
    );
}

#[test]
fn test_mutually_exclusive_pair_reported_once() {
    let result = findings("++HOLD(UA00001) FMID(HBB7790) REASON(AA00001) ERROR SYSTEM .");
    assert_eq!(categories(&result), vec![Category::MutuallyExclusive]);
    assert_eq!(result[0].severity, Severity::Error);
    assert!(result[0].message.contains("'ERROR'"));
    assert!(result[0].message.contains("'SYSTEM'"));
}

#[test]
fn test_dependency_violation_is_information() {
    let result =
        findings("++HOLD(UA00001) FMID(HBB7790) REASON(AA00001) ERROR CATEGORY(IBM.PRD) .");
    assert_eq!(categories(&result), vec![Category::DependencyViolation]);
    assert_eq!(result[0].severity, Severity::Information);
    assert_eq!(
        result[0].message,
        "operand 'CATEGORY' is only allowed together with 'FIXCAT'"
    );
}

#[test]
fn test_duplicate_operand_mentions_first_line() {
    let result = findings("++VER(Z038) FMID(HBB7790)\n  FMID(HBB7790) .");
    assert_eq!(categories(&result), vec![Category::DuplicateOperand]);
    assert_eq!(result[0].severity, Severity::Hint);
    assert_eq!(
        result[0].message,
        "duplicate operand 'FMID', first occurrence on line 1"
    );
    assert_eq!(result[0].range.start.line, 1);
}

#[test]
fn test_unknown_operand_and_statement() {
    let result = findings("++PTF(UA00001) BOGUS(1) .\n++NOSUCH(X) .");
    assert_eq!(
        categories(&result),
        vec![Category::UnknownOperand, Category::UnknownStatement]
    );
    assert_eq!(result[0].severity, Severity::Warning);
    assert_eq!(result[1].message, "unknown statement '++NOSUCH'");
}

#[test]
fn test_language_variants() {
    assert_eq!(
        findings("++MSGENU(IEAMSG) FROMDS(DSN(SYS1.MSGS) NUMBER(1)) ."),
        vec![]
    );

    let result = findings("++MSGXYZ(IEAMSG) FROMDS(DSN(SYS1.MSGS) NUMBER(1)) .");
    assert_eq!(categories(&result), vec![Category::InvalidLanguageId]);
    assert!(result[0].message.contains("'XYZ'"));

    // statements without language variants never take a suffix
    let result = findings("++PTFENU(UA00001) .");
    assert_eq!(categories(&result), vec![Category::UnknownStatement]);
}

#[test]
fn test_move_modes() {
    assert_eq!(findings("++MOVE DISTLIB(ADIST) TODISTLIB(BDIST) MAC(M1) ."), vec![]);
    assert_eq!(findings("++MOVE SYSLIB(ATGT) TOSYSLIB(BTGT) LMOD(L1) ."), vec![]);

    let result = findings("++MOVE DISTLIB(ADIST) SYSLIB(ATGT) MAC(M1) .");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].message, "'++MOVE' cannot specify both DISTLIB and SYSLIB");

    let result = findings("++MOVE MAC(M1) .");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].message, "'++MOVE' requires either DISTLIB or SYSLIB");

    let result = findings("++MOVE SYSLIB(ATGT) MOD(M1) .");
    let messages: Vec<&str> = result.iter().map(|finding| finding.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "'++MOVE' with SYSLIB requires TOSYSLIB",
            "'++MOVE' with SYSLIB requires one of MAC, SRC, LMOD, FMID",
        ]
    );
}

#[test]
fn test_column_overflow() {
    let text = format!("++PTF(UA00001)\n  DESC({}) .", "D".repeat(64));
    let result = findings(&text);
    assert_eq!(categories(&result), vec![Category::ColumnOverflow]);
    assert_eq!(result[0].range.start.character, 72);
    assert_eq!(result[0].range.start.line, 1);
}

#[test]
fn test_disabled_category_is_silent() {
    let text = "++USERMOD(LJS2012 .";
    let config = DiagnosticsConfig::default().with_disabled(Category::UnbalancedParentheses);
    let result = findings_with(text, &config);

    // with the imbalance silenced the unclosed parameter is reported on its own
    assert_eq!(categories(&result), vec![Category::MalformedParameter]);

    let config = DiagnosticsConfig::all(false);
    assert_eq!(findings_with(text, &config), vec![]);
}

#[test]
fn test_config_file_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("mcs-rules.toml");
    DiagnosticsConfig::default()
        .with_disabled(Category::ColumnOverflow)
        .save_to_file(&path)
        .unwrap();

    let loaded = DiagnosticsConfig::from_file(&path).unwrap();
    assert!(!loaded.is_enabled(Category::ColumnOverflow));
    assert!(loaded.is_enabled(Category::UnknownOperand));

    let yaml = temp.path().join("mcs-rules.yaml");
    fs::write(&yaml, "standalone_comment: false\n").unwrap();
    let loaded = DiagnosticsConfig::from_file(&yaml).unwrap();
    assert_eq!(loaded.disabled_categories(), vec![Category::StandaloneComment]);
}

#[test]
fn test_balanced_statement_without_period() {
    let result = findings("++PTF(UA00001)\n++APAR(AA00001) .");
    assert_eq!(categories(&result), vec![Category::MissingTerminator]);
    assert_eq!(result[0].severity, Severity::Error);
    assert_eq!(result[0].range.start.line, 0);
    assert_eq!(result[0].message, "statement '++PTF' is not terminated with '.'");
}

#[test]
fn test_statement_parameter_findings_are_distinct() {
    let missing = findings("++PTF .");
    assert_eq!(categories(&missing), vec![Category::MissingParameter]);
    assert!(missing[0].message.starts_with("missing parameter for '++PTF'"));

    let blank = findings("++PTF( ) .");
    assert_eq!(categories(&blank), vec![Category::MissingParameter]);

    let too_long = findings("++PTF(UA0000001) .");
    assert_eq!(categories(&too_long), vec![Category::ParameterTooLong]);
    assert_eq!(too_long[0].severity, Severity::Error);
    assert_eq!(
        too_long[0].message,
        "parameter of '++PTF' is 9 characters long, maximum is 7"
    );

    let config = DiagnosticsConfig::default().with_disabled(Category::UnbalancedParentheses);
    let malformed = findings_with("++PTF(UA00001 .", &config);
    assert_eq!(categories(&malformed), vec![Category::MalformedParameter]);
    assert_ne!(malformed[0].message, missing[0].message);
}

#[test]
fn test_empty_operand_parameter() {
    let result = findings("++VER(Z038) FMID() .");
    assert_eq!(categories(&result), vec![Category::EmptyOperandParameter]);
    assert_eq!(result[0].severity, Severity::Warning);
    assert_eq!(result[0].message, "operand 'FMID' has an empty parameter");
}

#[test]
fn test_operand_parameter_too_long() {
    let result = findings("++VER(Z038) FMID(HBB77901) .");
    assert_eq!(categories(&result), vec![Category::OperandParameterTooLong]);
    assert_eq!(result[0].severity, Severity::Warning);
    assert_eq!(
        result[0].message,
        "parameter of operand 'FMID' is 8 characters long, maximum is 7"
    );
}

#[test]
fn test_operand_length_counts_whole_value() {
    let schema = SchemaStore::from_json(
        r#"{ "statements": [ { "name": "++PTF", "parameter": "sysmod_id", "parameterLength": 7,
             "operands": [ { "name": "X", "parameter": "text", "length": 44 } ] } ] }"#,
    )
    .unwrap();
    let config = DiagnosticsConfig::default();

    let words = analyze(
        "++PTF(UA00001) X(AAAAAAAAA BBBBBBBBB CCCCCCCCC DDDDDDDDD EEEEEEEEE) .",
        &schema,
        &config,
    );
    assert_eq!(
        categories(&words.diagnostics),
        vec![Category::OperandParameterTooLong]
    );
    assert!(words.diagnostics[0].message.contains("is 49 characters long"));

    let quoted = analyze(&format!("++PTF(UA00001) X('{}') .", "Q".repeat(44)), &schema, &config);
    assert_eq!(quoted.diagnostics, vec![]);
}

#[test]
fn test_sysmod_lists_are_not_length_checked() {
    assert_eq!(
        findings("++VER(Z038) FMID(HBB7790) PRE(UA00001 UA00002,UA00003) SUP(UA00004) ."),
        vec![]
    );
}

#[test]
fn test_extra_closing_parenthesis() {
    let result = findings("++PTF(UA00001)) .");
    let unbalanced: Vec<_> = result
        .iter()
        .filter(|finding| finding.category == Category::UnbalancedParentheses)
        .collect();
    assert_eq!(unbalanced.len(), 1);
    assert_eq!(unbalanced[0].severity, Severity::Error);
    assert_eq!(
        unbalanced[0].message,
        "unbalanced parentheses in '++PTF': missing opening or extra closing parenthesis"
    );
}

#[test]
fn test_comments_before_first_and_after_last_statement() {
    let result = findings("/* header */\n++PTF(UA00001) .\n/* trailer */");
    assert_eq!(
        categories(&result),
        vec![Category::StandaloneComment, Category::StandaloneComment]
    );
    assert_eq!(result[0].range.start.line, 0);
    assert_eq!(result[0].message, "comment not allowed before the first MCS statement");
    assert_eq!(result[1].range.start.line, 2);
    assert_eq!(result[1].message, "comment not allowed after the last MCS statement");
}

#[test]
fn test_column_limit_boundary() {
    let exact = format!("++PTF(UA00001)\n  DESC({}) .", "D".repeat(62));
    assert_eq!(exact.lines().nth(1).unwrap().len(), 72);
    assert_eq!(findings(&exact), vec![]);

    let over = format!("++PTF(UA00001)\n  DESC({}) .", "D".repeat(63));
    let result = findings(&over);
    assert_eq!(categories(&result), vec![Category::ColumnOverflow]);
    assert_eq!(result[0].range.end.character, 73);
}

#[test]
fn test_column_overflow_inside_inline_data() {
    let text = format!("++MAC(M1) DISTLIB(AMACLIB) .\n{}\n", "X".repeat(80));
    let result = findings(&text);
    assert_eq!(categories(&result), vec![Category::ColumnOverflow]);
    assert_eq!(result[0].severity, Severity::Error);
    assert_eq!(result[0].range.start.line, 1);
}
