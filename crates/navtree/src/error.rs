//! CLI error types.

use navtree_config::ConfigError;
use navtree_core::{BundleError, ResolveError, SymbolError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Symbol(#[from] SymbolError),

    #[error("{0}")]
    Bundle(#[from] BundleError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Script(String),

    #[error("{0}")]
    Validation(String),
}
