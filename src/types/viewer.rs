//! Viewer phase of the companion document viewer.

use serde::{Deserialize, Serialize};

/// Whether the companion document viewer is actively showing a part.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ViewerPhase {
    #[default]
    Closed,
    Viewer,
}

impl ViewerPhase {
    /// Wire name used by hosts (`"closed"` / `"viewer"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for ViewerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ViewerPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "closed" => Ok(Self::Closed),
            "viewer" => Ok(Self::Viewer),
            other => Err(format!("unknown viewer state '{other}'")),
        }
    }
}
