/*!
# Reports Module

Renders analysis results for the command line.

## Supported formats:
- **Human** - coloured, rustc-style text for the console
- **Json** - structured report with per-file findings and totals
- **Lsp** - one JSON line per file in the shape of `publishDiagnostics`
*/

pub mod json;
pub mod text;

pub use json::JsonReporter;
pub use text::TextReporter;

use crate::analyzer::{Analysis, AnalysisSummary};
use crate::diagnostics::Finding;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Findings of one analysed file, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub diagnostics: Vec<Finding>,
    pub summary: AnalysisSummary,
}

impl FileReport {
    /// Builds a report, optionally keeping only error findings.
    pub fn from_analysis(path: &Path, analysis: &Analysis, errors_only: bool) -> Self {
        let diagnostics = analysis
            .diagnostics
            .iter()
            .filter(|finding| !errors_only || finding.is_error())
            .cloned()
            .collect();
        Self {
            file: path.to_path_buf(),
            diagnostics,
            summary: analysis.summary(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::diagnostics::DiagnosticsConfig;
    use crate::schema::SchemaStore;

    #[test]
    fn test_errors_only_filter() {
        let schema = SchemaStore::builtin().unwrap();
        let analysis = analyze(
            "++VER(Z038) FMID(HBB7790) FMID(HBB7790) .\n++BOGUS .",
            &schema,
            &DiagnosticsConfig::default(),
        );
        let all = FileReport::from_analysis(Path::new("a.mcs"), &analysis, false);
        let errors = FileReport::from_analysis(Path::new("a.mcs"), &analysis, true);

        assert_eq!(all.diagnostics.len(), 2);
        assert_eq!(errors.diagnostics.len(), 1);
        assert!(errors.has_errors());
        assert_eq!(errors.summary, all.summary);
    }
}
