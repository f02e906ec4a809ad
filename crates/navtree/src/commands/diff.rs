//! `navtree diff` command implementation.

use std::path::PathBuf;

use clap::Args;
use navtree_core::{IndexDiff, NavBundle, diff_indexes};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the diff command.
#[derive(Args)]
pub(crate) struct DiffArgs {
    /// Directory generated for the old release.
    old_dir: PathBuf,

    /// Directory generated for the new release.
    new_dir: PathBuf,

    /// Print the difference as JSON.
    #[arg(long)]
    json: bool,
}

impl DiffArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let old = NavBundle::read(&self.old_dir)?;
        let new = NavBundle::read(&self.new_dir)?;
        let diff = diff_indexes(&old.index, &new.index);

        if self.json {
            output.result(&serde_json::to_string_pretty(&diff)?);
            return Ok(());
        }

        if diff.is_empty() {
            output.success("Indexes are identical");
            return Ok(());
        }

        for (heading, lines) in report_sections(&diff) {
            if lines.is_empty() {
                continue;
            }
            output.highlight(&format!("{heading} ({})", lines.len()));
            for line in lines {
                output.result(&line);
            }
        }
        Ok(())
    }
}

/// Headed groups of report lines, in display order.
fn report_sections(diff: &IndexDiff) -> Vec<(&'static str, Vec<String>)> {
    vec![
        (
            "Added",
            diff.added
                .iter()
                .map(|e| format!("+ {}\t{}", e.key, e.target))
                .collect(),
        ),
        (
            "Removed",
            diff.removed
                .iter()
                .map(|e| format!("- {}\t{}", e.key, e.target))
                .collect(),
        ),
        (
            "Retargeted",
            diff.retargeted
                .iter()
                .map(|r| format!("~ {}\t{} -> {}", r.key, r.old, r.new))
                .collect(),
        ),
        (
            "Changed pages",
            diff.changed_pages
                .iter()
                .map(|n| format!("navtreeindex{n}.js"))
                .collect(),
        ),
    ]
}
