//! Link targets of navigation entries.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Page path plus optional in-page anchor, e.g. `index.xhtml#S0_1_armnn`.
///
/// Parsing splits on the first `#`. A trailing `#` with nothing after it is
/// kept as an empty anchor so that [`Display`](fmt::Display) reproduces the
/// parsed text exactly.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target {
    /// Page path relative to the documentation root.
    pub path: String,
    /// In-page anchor without the leading `#`.
    pub anchor: Option<String>,
}

impl Target {
    /// Create a target pointing at a whole page.
    #[must_use]
    pub fn page(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            anchor: None,
        }
    }

    /// Create a target pointing at an anchor inside a page.
    #[must_use]
    pub fn anchored(path: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            anchor: Some(anchor.into()),
        }
    }

    /// Parse `path[#anchor]`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.split_once('#') {
            Some((path, anchor)) => Self::anchored(path, anchor),
            None => Self::page(text),
        }
    }

    /// File name of the page without its extension.
    ///
    /// `classarmnn_1_1_i_backend.xhtml` becomes `classarmnn_1_1_i_backend`.
    #[must_use]
    pub fn stem(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        name.rsplit_once('.').map_or(name, |(stem, _)| stem)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if let Some(anchor) = &self.anchor {
            write!(f, "#{anchor}")?;
        }
        Ok(())
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::parse(&text))
    }
}
