//! Tile identifiers for the partitioned climate grid.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifier of one spatial tile of the climate grid.
///
/// Daymet tiles are numeric (e.g. `11371`) but the lookup table may carry
/// arbitrary strings, so the raw text is kept. Numeric ids sort numerically
/// and before any non-numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(String);

impl TileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the id, when it is an integer.
    pub fn as_number(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl Ord for TileId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for TileId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TileId {
    fn from(s: &str) -> Self {
        TileId::new(s)
    }
}

impl From<String> for TileId {
    fn from(s: String) -> Self {
        TileId::new(s)
    }
}

impl From<i64> for TileId {
    fn from(n: i64) -> Self {
        TileId(n.to_string())
    }
}
