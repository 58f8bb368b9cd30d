//! Map-level configuration.

use std::path::Path;

use boardgen_logic::{ConfigError, KindTable, SegmentLayout, VariantCounts};
use serde::{Deserialize, Serialize};

/// Configuration for map generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub name: String,
    /// Segments per map column
    pub map_rows: i32,
    /// Segments per map row
    pub map_columns: i32,
    pub seed: u64,
    pub layout: SegmentLayout,
    pub kinds: KindTable,
    pub variants: VariantCounts,
    /// Explicit kind per segment, `kind_grid[row][col]`. When absent each
    /// segment draws a kind uniformly from the table.
    pub kind_grid: Option<Vec<Vec<String>>>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            name: "Overworld".to_string(),
            map_rows: 10,
            map_columns: 10,
            seed: 0,
            layout: SegmentLayout::default(),
            kinds: KindTable::standard(),
            variants: VariantCounts::default(),
            kind_grid: None,
        }
    }
}

impl MapConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_size(mut self, map_rows: i32, map_columns: i32) -> Self {
        self.map_rows = map_rows;
        self.map_columns = map_columns;
        self
    }

    pub fn with_kinds(mut self, kinds: KindTable) -> Self {
        self.kinds = kinds;
        self
    }
}
