/*!
# MCS Analyzer v1.0

Structural parser and semantic validator for SMP/E Modification Control
Statements (MCS), the `++`-prefixed control language used to package
z/OS software maintenance.

## Core Features

- **Statement parsing** into an arena tree of statements, operands,
  sub-operands, parameters and comments
- **Schema-driven validation** from a JSON statement schema (built-in
  SMP/E definitions or a custom file)
- **Inline data** recognition after element statements
- **Configurable diagnostics** with TOML/YAML category switches
- **CLI interface** for batch linting in CI, with text, JSON and LSP-shaped output
- **LSP server** (stdio) with diagnostics, outline and hover

## Architecture

```text
MCS Analyzer
├── Core         - Positions, schema errors, source decoding
├── Schema       - Statement/operand definitions, language variants
├── Parser       - Segmenter + tree builder, Document queries
├── Diagnostics  - Rule engine, policy tables, configuration
├── Analyzer     - Parse + validate facade
├── Reports      - Text and JSON renderers
└── LSP          - tower-lsp language server
```

## Usage

```bash
mcs-analyzer lint ./sysmods --format json
mcs-analyzer rules generate-config --output mcs-rules.toml
mcs-analyzer lsp
```

```rust
use mcs_analyzer::{analyze, DiagnosticsConfig, SchemaStore};

let schema = SchemaStore::builtin()?;
let analysis = analyze("++PTF(UA00001) .", &schema, &DiagnosticsConfig::default());
assert!(analysis.diagnostics.is_empty());
# Ok::<(), anyhow::Error>(())
```
*/

pub mod analyzer;
pub mod cli_common;
pub mod core;
pub mod diagnostics;
pub mod lsp;
pub mod parser;
pub mod reports;
pub mod schema;

// Re-export main types for convenience
pub use analyzer::{analyze, Analysis, AnalysisSummary, McsAnalyzer};
pub use crate::core::{read_mcs_file, Point, Position, Range, SchemaError};
pub use diagnostics::{Category, DiagnosticsConfig, DiagnosticsEngine, Finding, Severity};
pub use parser::{parse, Document, McsParser, NodeId, NodeKind};
pub use reports::{FileReport, JsonReporter, TextReporter};
pub use schema::SchemaStore;
