use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating system family a package can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Macos,
    Windows,
}

impl Platform {
    /// Every known platform.
    pub const ALL: [Self; 3] = [Self::Linux, Self::Macos, Self::Windows];

    /// Platform of the running machine, if it is a known one.
    #[must_use]
    pub fn current() -> Option<Self> {
        std::env::consts::OS.parse().ok()
    }

    /// Lowercase label used in package definitions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s))
            .or_else(|| s.eq_ignore_ascii_case("darwin").then_some(Self::Macos))
            .ok_or_else(|| anyhow::anyhow!("Unknown platform: {s}"))
    }
}
