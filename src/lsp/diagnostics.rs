//! Conversion of analysis findings into LSP diagnostics.

use crate::diagnostics::{Finding, Severity};
use crate::reports::json::DIAGNOSTIC_SOURCE;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};

/// Converts a finding into an LSP diagnostic.
pub fn convert_to_lsp_diagnostic(finding: &Finding) -> Diagnostic {
    Diagnostic {
        range: to_lsp_range(finding.range),
        severity: Some(convert_severity(finding.severity)),
        code: Some(NumberOrString::String(finding.code.to_string())),
        code_description: None,
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: finding.message.clone(),
        related_information: None,
        tags: None,
        data: None,
    }
}

pub fn convert_findings(findings: &[Finding]) -> Vec<Diagnostic> {
    findings.iter().map(convert_to_lsp_diagnostic).collect()
}

fn convert_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}

pub(crate) fn to_lsp_position(point: crate::core::Point) -> Position {
    Position {
        line: point.line as u32,
        character: point.character as u32,
    }
}

pub(crate) fn to_lsp_range(range: crate::core::Range) -> Range {
    Range {
        start: to_lsp_position(range.start),
        end: to_lsp_position(range.end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Category;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_convert_finding() {
        let finding = Finding::new(
            Category::DuplicateOperand,
            crate::core::Range::on_line(3, 10, 14),
            "duplicate operand 'FMID'",
        );
        let diagnostic = convert_to_lsp_diagnostic(&finding);

        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::HINT));
        assert_eq!(
            diagnostic.code,
            Some(NumberOrString::String("MCS009".to_string()))
        );
        assert_eq!(diagnostic.range.start, Position { line: 3, character: 10 });
        assert_eq!(diagnostic.range.end, Position { line: 3, character: 14 });
        assert_eq!(diagnostic.message, "duplicate operand 'FMID'");
    }

    #[test]
    fn test_severity_override_is_kept() {
        let finding = Finding::new(
            Category::UnknownOperand,
            crate::core::Range::on_line(0, 0, 1),
            "unknown operand 'X' for '++PTF'",
        )
        .with_severity(Severity::Error);
        assert_eq!(
            convert_findings(&[finding])[0].severity,
            Some(DiagnosticSeverity::ERROR)
        );
    }
}
