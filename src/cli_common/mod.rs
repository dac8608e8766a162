//! Shared pieces of the command line binaries: logging setup, coloured
//! status lines and discovery of MCS source files.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// File extensions picked up when a directory is linted.
pub const MCS_EXTENSIONS: &[&str] = &["mcs", "smpe", "txt"];

/// Initializes logging to stderr; `RUST_LOG` still takes precedence per target.
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message.green());
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Checks that a file or directory exists.
pub fn validate_path(path: &Path, description: &str) -> Result<()> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "{} does not exist: {}",
            description,
            path.display()
        ));
    }
    Ok(())
}

fn has_mcs_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map_or(false, |extension| {
            MCS_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}

/// Expands the given paths into a sorted list of MCS files.
///
/// Files named explicitly are kept whatever their extension; directories are
/// walked recursively and filtered by [`MCS_EXTENSIONS`].
pub fn collect_mcs_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        validate_path(path, "Input path")?;
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).follow_links(true) {
            let entry =
                entry.with_context(|| format!("Failed to walk directory: {}", path.display()))?;
            if entry.file_type().is_file() && has_mcs_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}
