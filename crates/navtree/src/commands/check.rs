//! `navtree check` command implementation.

use std::path::PathBuf;

use clap::Args;
use navtree_core::NavBundle;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Directory holding navtreedata.js.
    dir: PathBuf,
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let bundle = NavBundle::read(&self.dir)?;
        let violations = bundle.check();

        if violations.is_empty() {
            output.success(&format!(
                "{}: {} entries in {} pages, {} fragments, all consistent",
                self.dir.display(),
                bundle.index.len(),
                bundle.index.page_count(),
                bundle.fragments.len()
            ));
            return Ok(());
        }

        for violation in &violations {
            output.warning(&violation.to_string());
        }
        Err(CliError::Validation(format!(
            "{}: {} problems found",
            self.dir.display(),
            violations.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use navtree_core::{BundleOptions, Symbol, SymbolKind, Target};
    use tempfile::TempDir;

    #[test]
    fn test_check_accepts_built_bundle() {
        let tmp = TempDir::new().unwrap();
        let symbols = vec![Symbol::new(
            &["armnn"],
            "Layer",
            SymbolKind::Class,
            Target::page("classarmnn_1_1_layer.xhtml"),
        )];
        NavBundle::build(&symbols, &BundleOptions::default())
            .unwrap()
            .write(tmp.path())
            .unwrap();

        let args = CheckArgs {
            dir: tmp.path().to_path_buf(),
        };
        assert!(args.execute().is_ok());
    }

    #[test]
    fn test_check_fails_on_missing_fragment() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("navtreedata.js"),
            r#"var NAVTREE = [ [ "Root", null, "hierarchy" ] ];
var NAVTREEINDEX = [ ];"#,
        )
        .unwrap();

        let args = CheckArgs {
            dir: tmp.path().to_path_buf(),
        };

        let err = args.execute().unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        assert!(err.to_string().contains("1 problems"));
    }
}
