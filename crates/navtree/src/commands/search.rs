//! `navtree search` command implementation.

use std::path::PathBuf;

use clap::Args;
use navtree_core::{IndexEntry, NavBundle};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the search command.
#[derive(Args)]
pub(crate) struct SearchArgs {
    /// Directory holding navtreedata.js.
    dir: PathBuf,

    /// Key prefix, e.g. `armnn::IBackend`.
    prefix: String,

    /// Maximum number of results.
    #[arg(short, long, default_value_t = 20)]
    limit: usize,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,
}

impl SearchArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let bundle = NavBundle::read(&self.dir)?;
        let matches = bundle.index.search_prefix(&self.prefix);
        let shown = &matches[..matches.len().min(self.limit)];

        if self.json {
            output.result(&serde_json::to_string_pretty(shown)?);
            return Ok(());
        }

        if matches.is_empty() {
            output.warning(&format!("No entries start with {:?}", self.prefix));
            return Ok(());
        }

        for line in format_entries(shown) {
            output.result(&line);
        }
        if shown.len() < matches.len() {
            output.info(&format!(
                "{} of {} matches shown (page {})",
                shown.len(),
                matches.len(),
                bundle.index.page_of(&self.prefix).unwrap_or_default()
            ));
        }
        Ok(())
    }
}

/// One `key<TAB>target` line per entry.
fn format_entries(entries: &[IndexEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| format!("{}\t{}", entry.key, entry.target))
        .collect()
}
