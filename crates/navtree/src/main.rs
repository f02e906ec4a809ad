//! navtree CLI - Documentation navigation index builder.
//!
//! Provides commands for:
//! - `build`: Generate navigation scripts from a symbol table
//! - `check`: Verify a directory of generated scripts
//! - `search`: Prefix lookup over the paginated index
//! - `diff`: Compare the indexes of two releases
//! - `import`: Recover a symbol table from existing fragment scripts

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CheckArgs, DiffArgs, ImportArgs, SearchArgs};
use output::Output;

/// navtree - Documentation navigation index builder.
#[derive(Parser)]
#[command(name = "navtree", version, about)]
struct Cli {
    /// Enable verbose output (build summaries and per-file decisions).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate navigation scripts from a symbol table.
    Build(BuildArgs),
    /// Verify a directory of generated navigation scripts.
    Check(CheckArgs),
    /// Look up index entries by key prefix.
    Search(SearchArgs),
    /// Compare the indexes of two generated directories.
    Diff(DiffArgs),
    /// Derive a symbol table from member-index fragment scripts.
    Import(ImportArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Check(args) => args.execute(),
        Commands::Search(args) => args.execute(),
        Commands::Diff(args) => args.execute(),
        Commands::Import(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
