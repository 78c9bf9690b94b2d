use serde::{Deserialize, Serialize};
use std::fmt;

/// Gig platform an earnings export originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Platform {
    Swiggy,
    Zomato,
    Uber,
    Rapido,
    UrbanClap,
    #[default]
    #[serde(rename = "Unknown Platform")]
    Unknown,
}

impl Platform {
    /// Every platform, in detection priority order.
    pub const ALL: [Platform; 6] = [
        Platform::Swiggy,
        Platform::Zomato,
        Platform::Uber,
        Platform::Rapido,
        Platform::UrbanClap,
        Platform::Unknown,
    ];

    /// Human readable name, as stored and displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Swiggy => "Swiggy",
            Platform::Zomato => "Zomato",
            Platform::Uber => "Uber",
            Platform::Rapido => "Rapido",
            Platform::UrbanClap => "UrbanClap",
            Platform::Unknown => "Unknown Platform",
        }
    }

    /// Parses a stored platform name. Unrecognized names map to `Unknown`.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(Platform::Unknown)
    }

    /// Lowercase keywords that identify the platform in CSV headers.
    pub(crate) fn keywords(&self) -> &'static [&'static str] {
        match self {
            Platform::Swiggy => &["swiggy"],
            Platform::Zomato => &["zomato"],
            Platform::Uber => &["uber"],
            Platform::Rapido => &["rapido"],
            Platform::UrbanClap => &["urbanclap", "urban"],
            Platform::Unknown => &[],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
