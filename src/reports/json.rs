/*!
# JSON Reporter

Machine readable output. `render` produces one pretty-printed document for
the whole run; `render_lsp` produces one compact line per file whose
diagnostics follow the LSP `Diagnostic` shape (zero-based positions,
numeric severity).
*/

use super::FileReport;
use crate::analyzer::AnalysisSummary;
use crate::diagnostics::{Finding, Severity};
use anyhow::Result;
use serde_json::{json, Value};
use std::path::Path;

/// Source tag placed on every LSP-shaped diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "mcs-analyzer";

pub struct JsonReporter;

impl JsonReporter {
    pub fn render(reports: &[FileReport]) -> Result<String> {
        let mut total = AnalysisSummary::default();
        for report in reports {
            total.merge(&report.summary);
        }
        let value = json!({
            "files": reports,
            "summary": total,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    pub fn render_lsp(report: &FileReport) -> Result<String> {
        let diagnostics: Vec<Value> = report.diagnostics.iter().map(lsp_diagnostic).collect();
        let value = json!({
            "uri": file_uri(&report.file),
            "diagnostics": diagnostics,
        });
        Ok(serde_json::to_string(&value)?)
    }
}

/// LSP numbering: 1 error, 2 warning, 3 information, 4 hint.
pub fn lsp_severity(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 1,
        Severity::Warning => 2,
        Severity::Information => 3,
        Severity::Hint => 4,
    }
}

fn lsp_diagnostic(finding: &Finding) -> Value {
    json!({
        "range": finding.range,
        "severity": lsp_severity(finding.severity),
        "code": finding.code,
        "source": DIAGNOSTIC_SOURCE,
        "message": finding.message,
    })
}

fn file_uri(path: &Path) -> String {
    let absolute = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Range;
    use crate::diagnostics::Category;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn sample_report() -> FileReport {
        FileReport {
            file: PathBuf::from("/tmp/does-not-exist/ptf.mcs"),
            diagnostics: vec![Finding::new(
                Category::UnknownOperand,
                Range::on_line(2, 3, 8),
                "unknown operand 'BOGUS' for '++PTF'",
            )],
            summary: AnalysisSummary {
                statements: 1,
                warnings: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_render_json() {
        let text = JsonReporter::render(&[sample_report(), sample_report()]).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["summary"]["warnings"], 2);
        assert_eq!(value["summary"]["statements"], 2);
        let finding = &value["files"][0]["diagnostics"][0];
        assert_eq!(finding["code"], "MCS008");
        assert_eq!(finding["severity"], "warning");
        assert_eq!(finding["category"], "unknown_operand");
    }

    #[test]
    fn test_render_lsp() {
        let text = JsonReporter::render_lsp(&sample_report()).unwrap();
        assert!(!text.contains('\n'));
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["uri"], "file:///tmp/does-not-exist/ptf.mcs");
        let diagnostic = &value["diagnostics"][0];
        assert_eq!(diagnostic["severity"], 2);
        assert_eq!(diagnostic["range"]["start"]["line"], 2);
        assert_eq!(diagnostic["range"]["end"]["character"], 8);
        assert_eq!(diagnostic["source"], DIAGNOSTIC_SOURCE);
    }
}
