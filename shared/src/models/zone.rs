//! Zone Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Floor zone (区域：大厅、露台、吧台)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Indoor dining room
    Interior,
    /// Terrace facing Campanar
    Campanar,
    /// Terrace facing Justicia
    Justicia,
    /// Bar counter
    Barra,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::Interior, Zone::Campanar, Zone::Justicia, Zone::Barra];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Interior => "interior",
            Zone::Campanar => "campanar",
            Zone::Justicia => "justicia",
            Zone::Barra => "barra",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown zone name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown zone: {0}")]
pub struct InvalidZone(pub String);

impl FromStr for Zone {
    type Err = InvalidZone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interior" => Ok(Zone::Interior),
            "campanar" => Ok(Zone::Campanar),
            "justicia" => Ok(Zone::Justicia),
            "barra" => Ok(Zone::Barra),
            other => Err(InvalidZone(other.to_string())),
        }
    }
}
