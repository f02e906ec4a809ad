//! `navtree build` command implementation.

use std::path::PathBuf;

use clap::Args;
use navtree_config::{CliSettings, Config};
use navtree_core::{BundleOptions, NavBundle, SymbolTable, Target, TreeOptions};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Symbol table JSON file (overrides config).
    #[arg(short, long)]
    symbols: Option<PathBuf>,

    /// Output directory for the generated scripts (overrides config).
    #[arg(short, long, env = "NAVTREE_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Entries per index page (overrides config).
    #[arg(long)]
    page_size: Option<usize>,

    /// Depth from which children move into fragment scripts, 0 to keep the
    /// tree inline (overrides config).
    #[arg(long)]
    inline_depth: Option<usize>,

    /// Project name shown at the root of the tree (overrides config).
    #[arg(long)]
    project_name: Option<String>,

    /// Path to configuration file (default: auto-discover navtree.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            symbols: self.symbols,
            output_dir: self.output_dir,
            page_size: self.page_size,
            inline_depth: self.inline_depth,
            project_name: self.project_name,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!("Symbols: {}", config.paths.symbols.display()));
        output.info(&format!("Output: {}", config.paths.output_dir.display()));

        let table = SymbolTable::load(&config.paths.symbols)?;
        if table.is_empty() {
            output.warning("Symbol table is empty, writing an index without entries");
        }

        let bundle = NavBundle::build(table.symbols(), &bundle_options(&config))?;
        let report = bundle.write(&config.paths.output_dir)?;

        output.success(&format!(
            "Navigation built: {} entries in {} pages, {} fragments",
            bundle.index.len(),
            bundle.index.page_count(),
            bundle.fragments.len()
        ));
        output.info(&format!(
            "{} written, {} unchanged, {} removed",
            report.written.len(),
            report.unchanged.len(),
            report.removed.len()
        ));
        Ok(())
    }
}

/// Translate configuration into build options.
fn bundle_options(config: &Config) -> BundleOptions {
    BundleOptions {
        tree: TreeOptions {
            root_label: config.project.name.clone(),
            root_target: Some(Target::parse(&config.project.main_page)),
            sort_children: config.tree.sort_children,
        },
        page_size: config.index.page_size,
        inline_depth: config.tree.inline_depth,
        sync_on_msg: config.paths.sync_on_msg.clone(),
        sync_off_msg: config.paths.sync_off_msg.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_bundle_options_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("navtree.toml");
        fs::write(
            &path,
            r#"
[project]
name = "ArmNN"
main_page = "index.xhtml#S1"

[index]
page_size = 100

[tree]
sort_children = false
inline_depth = 2

[output]
sync_on_msg = "sync on"
"#,
        )
        .unwrap();
        let config = Config::load(Some(&path), None).unwrap();

        let options = bundle_options(&config);

        assert_eq!(options.tree.root_label, "ArmNN");
        assert_eq!(
            options.tree.root_target,
            Some(Target::anchored("index.xhtml", "S1"))
        );
        assert!(!options.tree.sort_children);
        assert_eq!(options.page_size, 100);
        assert_eq!(options.inline_depth, 2);
        assert_eq!(options.sync_on_msg, "sync on");
        assert_eq!(options.sync_off_msg, "click to enable panel synchronisation");
    }

    #[test]
    fn test_build_writes_scripts() {
        let tmp = TempDir::new().unwrap();
        let symbols = tmp.path().join("symbols.json");
        fs::write(
            &symbols,
            r#"[{"name": "Layer", "scope": ["armnn"], "kind": "class",
                "target": "classarmnn_1_1_layer.xhtml"}]"#,
        )
        .unwrap();
        let config_path = tmp.path().join("navtree.toml");
        fs::write(&config_path, "[project]\nname = \"ArmNN\"\n").unwrap();

        let args = BuildArgs {
            symbols: Some(symbols),
            output_dir: Some(tmp.path().join("html")),
            page_size: Some(10),
            inline_depth: None,
            project_name: None,
            config: Some(config_path),
        };
        args.execute().unwrap();

        let bundle = NavBundle::read(&tmp.path().join("html")).unwrap();
        assert_eq!(bundle.tree.root().label, "ArmNN");
        assert_eq!(bundle.index.len(), 1);
        assert!(bundle.check().is_empty());
    }

    #[test]
    fn test_build_rejects_zero_page_size() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("navtree.toml");
        fs::write(&config_path, "").unwrap();

        let args = BuildArgs {
            symbols: None,
            output_dir: None,
            page_size: Some(0),
            inline_depth: None,
            project_name: None,
            config: Some(config_path),
        };

        let err = args.execute().unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
