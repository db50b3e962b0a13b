//! Tile/year → file identifier lookup table.
//!
//! Loaded once at startup from a CSV with the columns `tile`, `year` and
//! `file_id`. The schema is checked up front so a malformed table fails
//! startup instead of the first render.

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};
use viewer_common::{TileId, ViewerError, ViewerResult};

/// Columns every lookup table must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["tile", "year", "file_id"];

/// One row of the lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TileYearRecord {
    pub tile: TileId,
    pub year: i32,
    pub file_id: String,
}

/// Immutable (tile, year) → file id index.
///
/// When a (tile, year) pair appears more than once the first row wins.
#[derive(Debug, Clone)]
pub struct TileYearIndex {
    records: Vec<TileYearRecord>,
    by_key: HashMap<(TileId, i32), usize>,
}

impl TileYearIndex {
    /// Load the table from a CSV file.
    pub fn load(path: &Path) -> ViewerResult<Self> {
        let source_name = format!("lookup table {}", path.display());
        let file = std::fs::File::open(path).map_err(|e| ViewerError::data_load(&source_name, e))?;
        let index = Self::from_reader(file, &source_name)?;

        info!(
            path = %path.display(),
            records = index.len(),
            years = index.years().len(),
            tiles = index.tiles().len(),
            "Loaded tile/year lookup table"
        );
        Ok(index)
    }

    /// Parse the table from any CSV reader.
    pub fn from_reader<R: Read>(reader: R, source_name: &str) -> ViewerResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| ViewerError::data_load(source_name, e))?
            .clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ViewerError::data_load(
                    source_name,
                    format!("missing required column '{}'", column),
                ));
            }
        }

        let mut records = Vec::new();
        for (i, row) in rdr.deserialize::<TileYearRecord>().enumerate() {
            // Row 1 is the header.
            let line = i + 2;
            let record = row.map_err(|e| {
                ViewerError::data_load(source_name, format!("line {}: {}", line, e))
            })?;
            if record.file_id.is_empty() || record.tile.as_str().is_empty() {
                return Err(ViewerError::data_load(
                    source_name,
                    format!("line {}: empty tile or file_id", line),
                ));
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(ViewerError::data_load(source_name, "table has no rows"));
        }

        Ok(Self::from_records(records))
    }

    /// Build an index from already-parsed records.
    pub fn from_records(records: Vec<TileYearRecord>) -> Self {
        let mut by_key = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let key = (record.tile.clone(), record.year);
            if by_key.contains_key(&key) {
                warn!(
                    tile = %record.tile,
                    year = record.year,
                    file_id = %record.file_id,
                    "Duplicate lookup row ignored; first match wins"
                );
                continue;
            }
            by_key.insert(key, i);
        }

        debug!(records = records.len(), unique = by_key.len(), "Indexed lookup table");
        Self { records, by_key }
    }

    /// File id recorded for `(tile, year)`.
    pub fn resolve(&self, tile: &TileId, year: i32) -> ViewerResult<&str> {
        self.by_key
            .get(&(tile.clone(), year))
            .map(|&i| self.records[i].file_id.as_str())
            .ok_or_else(|| ViewerError::NotFound {
                tile: tile.to_string(),
                year,
            })
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> BTreeSet<i32> {
        self.records.iter().map(|r| r.year).collect()
    }

    /// Distinct tiles, numeric ids first in numeric order.
    pub fn tiles(&self) -> BTreeSet<TileId> {
        self.records.iter().map(|r| r.tile.clone()).collect()
    }

    pub fn records(&self) -> &[TileYearRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
