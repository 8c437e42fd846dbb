//! tbind CLI tool.
//!
//! Usage:
//! ```bash
//! tbind --ast ast.json [DIR]
//! ```
//!
//! `DIR` is the bindings root: `rules.json`, template paths, and output
//! paths all resolve against it. The AST dump is produced by a parser
//! frontend (e.g. a libclang dump tool) and handed to the engine as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rule-driven binding generator: extracts classes from a parsed AST and
/// renders them through user-supplied templates.
#[derive(Parser)]
#[command(name = "tbind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bindings root directory (templates and outputs resolve against it)
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Path to the parsed AST dump (JSON)
    #[arg(long)]
    ast: PathBuf,

    /// Path to the rules file (default: <DIR>/rules.json)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let root = if cli.dir.is_absolute() {
        cli.dir.clone()
    } else {
        std::env::current_dir()
            .context("Failed to determine current directory")?
            .join(&cli.dir)
    };

    let rules_path = cli.rules.unwrap_or_else(|| root.join("rules.json"));
    let rules = tbind_core::load_rules(&rules_path)
        .with_context(|| format!("Failed to load rules: {}", rules_path.display()))?;

    let ast_text = std::fs::read_to_string(&cli.ast)
        .with_context(|| format!("Failed to read AST dump: {}", cli.ast.display()))?;
    let unit = tbind_core::ast::Node::from_json(&ast_text)
        .with_context(|| format!("Failed to parse AST dump: {}", cli.ast.display()))?;

    let generator = tbind_core::Generator::builder()
        .root(&root)
        .rules(rules)
        .build()
        .context("Failed to build generator")?;

    tracing::info!(
        "Generating bindings into {:?} with {} rule(s)",
        generator.root(),
        generator.rule_count()
    );

    let report = generator.generate(&unit).context("Generation failed")?;

    tracing::info!(
        "Done: {} file(s) from {} class(es)",
        report.files_written,
        report.classes_extracted
    );
    Ok(())
}
