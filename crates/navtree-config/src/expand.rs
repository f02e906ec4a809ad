//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// Strings without a `${` are returned as is, so file names containing a
/// bare dollar sign pass through unchanged.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, MissingVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| MissingVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.0),
    })
}

/// Name of an environment variable that was referenced but not set.
struct MissingVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("NAVTREE_EXPAND_SIMPLE", "ArmNN");
        }
        let result = expand_env("${NAVTREE_EXPAND_SIMPLE}", "project.name").unwrap();
        assert_eq!(result, "ArmNN");
        unsafe {
            std::env::remove_var("NAVTREE_EXPAND_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("NAVTREE_EXPAND_UNSET");
        }
        let result = expand_env("${NAVTREE_EXPAND_UNSET:-html}", "output.dir").unwrap();
        assert_eq!(result, "html");
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("NAVTREE_EXPAND_RELEASE", "24.08");
        }
        let result = expand_env("docs/${NAVTREE_EXPAND_RELEASE}/html", "output.dir").unwrap();
        assert_eq!(result, "docs/24.08/html");
        unsafe {
            std::env::remove_var("NAVTREE_EXPAND_RELEASE");
        }
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("NAVTREE_EXPAND_MISSING");
        }
        let err = expand_env("${NAVTREE_EXPAND_MISSING}", "output.dir").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("NAVTREE_EXPAND_MISSING"));
        assert!(err.to_string().contains("output.dir"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("dir_$hash", "output.dir").unwrap();
        assert_eq!(result, "dir_$hash");
    }
}
