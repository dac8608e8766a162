/*!
# MCS Analyzer Module

Glue between the parser and the diagnostics engine. Analysis is a pure
function of (text, schema, configuration); the schema store is shared
read-only, so files can be analysed on several threads at once.
*/

use crate::core::read_mcs_file;
use crate::diagnostics::{DiagnosticsConfig, DiagnosticsEngine, Finding, Severity};
use crate::parser::{Document, McsParser};
use crate::schema::SchemaStore;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Parsed document together with its findings.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub document: Document,
    pub diagnostics: Vec<Finding>,
}

impl Analysis {
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|finding| finding.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Finding::is_error)
    }

    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            statements: self.document.statement_count(),
            errors: self.count(Severity::Error),
            warnings: self.count(Severity::Warning),
            information: self.count(Severity::Information),
            hints: self.count(Severity::Hint),
        }
    }
}

/// Finding counts for one or more analysed documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub statements: usize,
    pub errors: usize,
    pub warnings: usize,
    pub information: usize,
    pub hints: usize,
}

impl AnalysisSummary {
    pub fn merge(&mut self, other: &AnalysisSummary) {
        self.statements += other.statements;
        self.errors += other.errors;
        self.warnings += other.warnings;
        self.information += other.information;
        self.hints += other.hints;
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.information + self.hints
    }
}

/// Parses `text` and runs every enabled rule on it.
pub fn analyze(text: &str, schema: &SchemaStore, config: &DiagnosticsConfig) -> Analysis {
    let document = McsParser::new(schema).parse(text);
    let diagnostics = DiagnosticsEngine::new(schema, config).run(&document);
    Analysis {
        document,
        diagnostics,
    }
}

/// Reusable analyzer bound to one schema and configuration.
#[derive(Debug, Clone)]
pub struct McsAnalyzer {
    schema: Arc<SchemaStore>,
    config: DiagnosticsConfig,
}

impl McsAnalyzer {
    pub fn new(schema: Arc<SchemaStore>, config: DiagnosticsConfig) -> Self {
        Self { schema, config }
    }

    /// Analyzer over the built-in SMP/E schema with every rule enabled.
    pub fn with_builtin_schema() -> Result<Self> {
        Ok(Self::new(SchemaStore::builtin()?, DiagnosticsConfig::default()))
    }

    pub fn schema(&self) -> &Arc<SchemaStore> {
        &self.schema
    }

    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    pub fn analyze_text(&self, text: &str) -> Analysis {
        analyze(text, &self.schema, &self.config)
    }

    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<Analysis> {
        let content = read_mcs_file(path.as_ref())?;
        let analysis = self.analyze_text(&content);
        tracing::debug!(
            "Analyzed {}: {} findings",
            path.as_ref().display(),
            analysis.diagnostics.len()
        );
        Ok(analysis)
    }
}
