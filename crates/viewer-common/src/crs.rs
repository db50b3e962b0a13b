//! Coordinate Reference System codes understood by the viewer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Well-known CRS codes the reference layers and grids may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// NAD83 Geographic, used by Census TIGER files
    Epsg4269,
    /// Web Mercator (meters)
    Epsg3857,
}

impl CrsCode {
    /// Check if this is a geographic (lon/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4269)
    }

    /// EPSG numeric code.
    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg4269 => 4269,
            CrsCode::Epsg3857 => 3857,
        }
    }
}

impl FromStr for CrsCode {
    type Err = CrsParseError;

    /// Accepts "EPSG:4326", "epsg:3857", "CRS:84" and the legacy "EPSG:900913".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EPSG:4326" | "CRS:84" => Ok(CrsCode::Epsg4326),
            "EPSG:4269" => Ok(CrsCode::Epsg4269),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }
}

impl TryFrom<String> for CrsCode {
    type Error = CrsParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CrsCode> for String {
    fn from(code: CrsCode) -> Self {
        code.to_string()
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}
