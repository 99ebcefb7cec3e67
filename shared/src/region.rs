use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Game server cluster selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Region {
    #[default]
    #[serde(rename = "EU", alias = "eu")]
    Eu,
    #[serde(rename = "NA", alias = "na")]
    Na,
    #[serde(rename = "Asia", alias = "asia", alias = "ASIA")]
    Asia,
}

pub const HOST_VARIANT_EU: &str = "-am";
pub const HOST_VARIANT_ASIA: &str = "-sgp";
pub const HOST_VARIANT_DEFAULT: &str = "";

impl Region {
    pub const ALL: [Region; 3] = [Region::Eu, Region::Na, Region::Asia];

    /// Subdomain suffix of the gameinfo host serving this region.
    pub fn host_variant(self) -> &'static str {
        match self {
            Region::Eu => HOST_VARIANT_EU,
            Region::Asia => HOST_VARIANT_ASIA,
            Region::Na => HOST_VARIANT_DEFAULT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Eu => "EU",
            Region::Na => "NA",
            Region::Asia => "Asia",
        }
    }

    /// Case-insensitive selector lookup. Returns `None` for anything outside the three clusters.
    pub fn from_selector(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|region| region.as_str().eq_ignore_ascii_case(raw))
    }

    /// Selector lookup that never fails: unrecognized values land on the default host (NA).
    pub fn from_selector_or_default_host(raw: &str) -> Self {
        Self::from_selector(raw).unwrap_or(Region::Na)
    }
}

/// Host variant for a raw selector string; unrecognized selectors use the default host.
pub fn host_variant_for(raw: &str) -> &'static str {
    Region::from_selector_or_default_host(raw).host_variant()
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRegion(pub String);

impl fmt::Display for UnknownRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown region {:?}", self.0)
    }
}

impl std::error::Error for UnknownRegion {}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_selector(s).ok_or_else(|| UnknownRegion(s.to_string()))
    }
}
