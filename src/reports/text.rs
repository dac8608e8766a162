/*!
# Text Reporter

Console output in the style of compiler diagnostics:

```text
error[MCS003]: unbalanced parentheses in '++USERMOD': missing closing parenthesis
  --> sysmods/ptf.mcs:1:1
```
*/

use super::FileReport;
use crate::analyzer::AnalysisSummary;
use crate::diagnostics::Severity;
use console::{style, StyledObject};
use std::fmt::Write;

/// Human readable reporter.
pub struct TextReporter {
    use_colors: bool,
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextReporter {
    /// Colours follow the terminal.
    pub fn new() -> Self {
        Self {
            use_colors: console::colors_enabled(),
        }
    }

    /// Plain output for CI logs and tests.
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    fn paint<D>(&self, styled: StyledObject<D>) -> StyledObject<D> {
        styled.force_styling(self.use_colors)
    }

    fn severity_label(&self, severity: Severity) -> StyledObject<String> {
        let label = severity.to_string();
        self.paint(match severity {
            Severity::Error => style(label).red().bold(),
            Severity::Warning => style(label).yellow().bold(),
            Severity::Information => style(label).blue(),
            Severity::Hint => style(label).cyan(),
        })
    }

    pub fn render(&self, report: &FileReport) -> String {
        let mut out = String::new();
        for finding in &report.diagnostics {
            let _ = writeln!(
                out,
                "{}[{}]: {}",
                self.severity_label(finding.severity),
                finding.code,
                self.paint(style(&finding.message).bold())
            );
            let _ = writeln!(
                out,
                "  {} {}:{}",
                self.paint(style("-->").blue()),
                report.file.display(),
                finding.range
            );
        }
        out
    }

    pub fn render_summary(&self, files: usize, summary: &AnalysisSummary) -> String {
        let count = |value: usize, severity: Severity| {
            let styled = style(value);
            self.paint(match (value, severity) {
                (0, _) => styled.green(),
                (_, Severity::Error) => styled.red(),
                (_, Severity::Warning) => styled.yellow(),
                _ => styled.cyan(),
            })
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.paint(style("=== MCS check summary ===").bold()));
        let _ = writeln!(out, "Files checked: {}", files);
        let _ = writeln!(out, "Statements: {}", summary.statements);
        let _ = writeln!(out, "Errors: {}", count(summary.errors, Severity::Error));
        let _ = writeln!(out, "Warnings: {}", count(summary.warnings, Severity::Warning));
        let _ = writeln!(
            out,
            "Info/hints: {}",
            count(summary.information + summary.hints, Severity::Hint)
        );
        out
    }
}
