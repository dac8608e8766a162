/*!
# MCS Analyzer CLI

Command-line interface for the SMP/E MCS analyzer.

```bash
mcs-analyzer lint ./sysmods --format json
mcs-analyzer rules list
mcs-analyzer rules generate-config --output mcs-rules.toml
mcs-analyzer schema list
mcs-analyzer lsp
```
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use mcs_analyzer::analyzer::{AnalysisSummary, McsAnalyzer};
use mcs_analyzer::cli_common::{self, collect_mcs_files, print_error, print_success, print_warning};
use mcs_analyzer::diagnostics::{Category, DiagnosticsConfig};
use mcs_analyzer::reports::{FileReport, JsonReporter, TextReporter};
use mcs_analyzer::schema::SchemaStore;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "mcs-analyzer",
    version = env!("CARGO_PKG_VERSION"),
    author = "MCS Analyzer Team",
    about = "Structural parser and validator for SMP/E MCS sources"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check MCS files or directories
    Lint {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Report errors only
        #[arg(long)]
        errors_only: bool,

        /// Diagnostics configuration (TOML or YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Statement schema (JSON) replacing the built-in one
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Print a summary after the findings
        #[arg(long)]
        stats: bool,

        /// Print nothing but the findings
        #[arg(short, long)]
        quiet: bool,
    },

    /// Rules management commands
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },

    /// Schema inspection commands
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },

    /// Start the Language Server Protocol (LSP) server on stdio
    Lsp {
        /// Diagnostics configuration (TOML or YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Statement schema (JSON) replacing the built-in one
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum RulesCommands {
    /// List all diagnostic categories
    List {
        /// Configuration to show enabled state from
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a configuration file with every category enabled
    GenerateConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "mcs-rules.toml")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// List the statements known to the schema
    List {
        /// Statement schema (JSON) replacing the built-in one
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
    /// LSP-compatible JSON lines
    Lsp,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli_common::init_logging(cli.verbose)?;

    match cli.command {
        Commands::Lint {
            paths,
            format,
            errors_only,
            config,
            schema,
            stats,
            quiet,
        } => {
            let analyzer = build_analyzer(config.as_deref(), schema.as_deref())?;
            let options = LintOptions {
                format,
                errors_only,
                stats,
                quiet,
            };
            if !lint_command(&analyzer, &paths, &options)? {
                std::process::exit(1);
            }
        }

        Commands::Rules { command } => rules_command(command)?,

        Commands::Schema { command } => schema_command(command)?,

        Commands::Lsp { config, schema } => {
            let analyzer = build_analyzer(config.as_deref(), schema.as_deref())?;
            mcs_analyzer::lsp::start_stdio_server(analyzer).await?;
        }
    }

    Ok(())
}

fn load_schema(schema: Option<&Path>) -> Result<Arc<SchemaStore>> {
    match schema {
        Some(path) => Ok(Arc::new(SchemaStore::from_file(path)?)),
        None => SchemaStore::builtin(),
    }
}

fn load_config(config: Option<&Path>) -> Result<DiagnosticsConfig> {
    let Some(path) = config else {
        return Ok(DiagnosticsConfig::default());
    };
    let config = DiagnosticsConfig::from_file(path)?;
    for warning in config.validate() {
        print_warning(&warning);
    }
    Ok(config)
}

fn build_analyzer(config: Option<&Path>, schema: Option<&Path>) -> Result<McsAnalyzer> {
    Ok(McsAnalyzer::new(load_schema(schema)?, load_config(config)?))
}

struct LintOptions {
    format: OutputFormat,
    errors_only: bool,
    stats: bool,
    quiet: bool,
}

/// Lints every file and prints the results. Returns `false` when any file
/// has an error finding or could not be read.
fn lint_command(analyzer: &McsAnalyzer, paths: &[PathBuf], options: &LintOptions) -> Result<bool> {
    let files = collect_mcs_files(paths)?;
    tracing::info!("Checking {} MCS files", files.len());

    let results: Vec<(PathBuf, Result<FileReport>)> = files
        .par_iter()
        .map(|path| {
            let report = analyzer
                .analyze_file(path)
                .map(|analysis| FileReport::from_analysis(path, &analysis, options.errors_only));
            (path.clone(), report)
        })
        .collect();

    let mut reports = Vec::with_capacity(results.len());
    let mut failed_files = 0;
    for (path, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                failed_files += 1;
                print_error(&format!("{}: {:#}", path.display(), e));
            }
        }
    }

    let mut total = AnalysisSummary::default();
    for report in &reports {
        total.merge(&report.summary);
    }

    match options.format {
        OutputFormat::Human => {
            let reporter = TextReporter::new();
            for report in &reports {
                print!("{}", reporter.render(report));
            }
            if options.stats {
                println!();
                print!("{}", reporter.render_summary(reports.len(), &total));
            }
            if !options.quiet && total.errors == 0 && failed_files == 0 {
                print_success(&format!("No errors in {} files", reports.len()));
            }
        }
        OutputFormat::Json => {
            println!("{}", JsonReporter::render(&reports)?);
        }
        OutputFormat::Lsp => {
            for report in &reports {
                println!("{}", JsonReporter::render_lsp(report)?);
            }
        }
    }

    Ok(total.errors == 0 && failed_files == 0)
}

fn rules_command(command: RulesCommands) -> Result<()> {
    let term = Term::stdout();

    match command {
        RulesCommands::List { config } => {
            let config = load_config(config.as_deref())?;
            term.write_line(&format!("{}", style("Diagnostic categories").bold().cyan()))?;

            for category in Category::ALL {
                let status = if config.is_enabled(category) {
                    style("enabled ").green()
                } else {
                    style("disabled").red()
                };
                term.write_line(&format!(
                    "  {} {} {:<11} {:<26} {}",
                    style(category.code()).bold(),
                    status,
                    category.severity().to_string(),
                    category.key(),
                    style(category.description()).dim()
                ))?;
            }
        }

        RulesCommands::GenerateConfig { output } => {
            DiagnosticsConfig::default()
                .save_to_file(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            print_success(&format!("Configuration written to {}", output.display()));
        }
    }

    Ok(())
}

fn schema_command(command: SchemaCommands) -> Result<()> {
    let term = Term::stdout();

    match command {
        SchemaCommands::List { schema } => {
            let schema = load_schema(schema.as_deref())?;
            term.write_line(&format!(
                "{} ({} statements)",
                style("MCS statements").bold().cyan(),
                schema.len()
            ))?;

            let mut statements: Vec<_> = schema.statements().collect();
            statements.sort_by(|a, b| a.name.cmp(&b.name));
            for statement in statements {
                let mut traits = Vec::new();
                if statement.expects_inline_data {
                    traits.push("inline data");
                }
                if statement.accepts_language_variant {
                    traits.push("language variants");
                }
                let traits = if traits.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", traits.join(", "))
                };
                term.write_line(&format!(
                    "  {:<12} {}{}",
                    style(&statement.name).bold(),
                    statement.description.as_deref().unwrap_or_default(),
                    style(traits).dim()
                ))?;
            }
        }
    }

    Ok(())
}
