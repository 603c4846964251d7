use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Light/dark display preference taken from settings.
///
/// The cursor never looks at it; views use it to pick a palette and the
/// name of the code highlighting theme handed to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Light,
    #[default]
    Dark,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Highlighting theme for fenced code blocks, as named in syntect's
    /// bundled theme set.
    pub fn code_theme(&self) -> &'static str {
        match self {
            Self::Light => "InspiredGitHub",
            Self::Dark => "base16-ocean.dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown display mode '{}' (expected light or dark)", other)),
        }
    }
}
