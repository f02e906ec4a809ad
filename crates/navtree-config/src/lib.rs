//! Configuration management for navtree.
//!
//! Parses `navtree.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `project.name`
//! - `project.main_page`
//! - `input.symbols`
//! - `output.dir`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override symbol table path.
    pub symbols: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override index page size.
    pub page_size: Option<usize>,
    /// Override fragment split depth.
    pub inline_depth: Option<usize>,
    /// Override project name.
    pub project_name: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "navtree.toml";

/// Largest accepted index page size.
const MAX_PAGE_SIZE: usize = 100_000;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project configuration.
    pub project: ProjectConfig,
    /// Flat index configuration.
    pub index: IndexConfig,
    /// Navigation tree configuration.
    pub tree: TreeConfig,
    /// Input paths (relative strings from TOML).
    input: InputConfigRaw,
    /// Output configuration (relative strings from TOML).
    output: OutputConfigRaw,

    /// Resolved input/output paths (set after loading).
    #[serde(skip)]
    pub paths: PathsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Project configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Label of the navigation root.
    pub name: String,
    /// Target of the navigation root.
    pub main_page: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Documentation".to_owned(),
            main_page: "index.xhtml".to_owned(),
        }
    }
}

/// Flat index configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Number of entries per index page.
    pub page_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { page_size: 250 }
    }
}

/// Navigation tree configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Sort siblings by label instead of keeping input order.
    pub sort_children: bool,
    /// Depth below which subtrees move into fragment scripts (0 disables).
    pub inline_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            sort_children: true,
            inline_depth: 0,
        }
    }
}

/// Raw input configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct InputConfigRaw {
    symbols: Option<String>,
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    sync_on_msg: Option<String>,
    sync_off_msg: Option<String>,
}

/// Resolved input and output locations.
#[derive(Debug)]
pub struct PathsConfig {
    /// Symbol table JSON file.
    pub symbols: PathBuf,
    /// Directory receiving the generated scripts.
    pub output_dir: PathBuf,
    /// Tooltip shown while panel synchronisation is enabled.
    pub sync_on_msg: String,
    /// Tooltip shown while panel synchronisation is disabled.
    pub sync_off_msg: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            symbols: PathBuf::from("symbols.json"),
            output_dir: PathBuf::from("html"),
            sync_on_msg: "click to disable panel synchronisation".to_owned(),
            sync_off_msg: "click to enable panel synchronisation".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`output.dir`").
        field: String,
        /// Error message (e.g., "${`DOCS_OUT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `navtree.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, and the
    /// result is validated again so overrides cannot bypass the checks.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(symbols) = &settings.symbols {
            self.paths.symbols.clone_from(symbols);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.paths.output_dir.clone_from(output_dir);
        }
        if let Some(page_size) = settings.page_size {
            self.index.page_size = page_size;
        }
        if let Some(inline_depth) = settings.inline_depth {
            self.tree.inline_depth = inline_depth;
        }
        if let Some(name) = &settings.project_name {
            self.project.name.clone_from(name);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let defaults = PathsConfig::default();
        Self {
            project: ProjectConfig::default(),
            index: IndexConfig::default(),
            tree: TreeConfig::default(),
            input: InputConfigRaw::default(),
            output: OutputConfigRaw::default(),
            paths: PathsConfig {
                symbols: base.join(&defaults.symbols),
                output_dir: base.join(&defaults.output_dir),
                ..defaults
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.project.name, "project.name")?;
        require_non_empty(&self.project.main_page, "project.main_page")?;

        let page_size = self.index.page_size;
        if page_size == 0 {
            return Err(ConfigError::Validation(
                "index.page_size must be greater than 0".to_owned(),
            ));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Validation(format!(
                "index.page_size cannot exceed {MAX_PAGE_SIZE}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.project.name = expand::expand_env(&self.project.name, "project.name")?;
        self.project.main_page =
            expand::expand_env(&self.project.main_page, "project.main_page")?;

        if let Some(ref symbols) = self.input.symbols {
            self.input.symbols = Some(expand::expand_env(symbols, "input.symbols")?);
        }
        if let Some(ref dir) = self.output.dir {
            self.output.dir = Some(expand::expand_env(dir, "output.dir")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = PathsConfig::default();

        self.paths = PathsConfig {
            symbols: self
                .input
                .symbols
                .as_deref()
                .map_or_else(|| config_dir.join(&defaults.symbols), |p| config_dir.join(p)),
            output_dir: self
                .output
                .dir
                .as_deref()
                .map_or_else(|| config_dir.join(&defaults.output_dir), |p| config_dir.join(p)),
            sync_on_msg: self
                .output
                .sync_on_msg
                .clone()
                .unwrap_or(defaults.sync_on_msg),
            sync_off_msg: self
                .output
                .sync_off_msg
                .clone()
                .unwrap_or(defaults.sync_off_msg),
        };
    }
}
