//! Errors raised while configuring or populating a board segment.

use thiserror::Error;

use crate::collaborators::AssetCategory;
use crate::grid::Footprint;

/// Placement and configuration failures. None of these are fatal: a
/// segment that runs into `NoValidPlacement` is still usable with fewer
/// objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("invalid footprint {width}×{height}{}", bounds_suffix(.columns, .rows))]
    InvalidFootprint {
        width: i32,
        height: i32,
        columns: Option<i32>,
        rows: Option<i32>,
    },

    #[error("no valid anchor for {}×{} footprint after {attempts} attempts", .footprint.width, .footprint.height)]
    NoValidPlacement { footprint: Footprint, attempts: u32 },

    #[error("free cell pool is empty")]
    EmptyPool,

    #[error("unknown tile kind '{0}'")]
    UnknownKind(String),

    #[error("no {0:?} variants available")]
    MissingVariants(AssetCategory),
}

fn bounds_suffix(columns: &Option<i32>, rows: &Option<i32>) -> String {
    match (columns, rows) {
        (Some(c), Some(r)) => format!(" for {}×{} segment", c, r),
        _ => String::new(),
    }
}

/// Failures loading a kind table or other JSON configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tile kind '{kind}': {source}")]
    Kind {
        kind: String,
        #[source]
        source: PlacementError,
    },

    #[error("count range for '{kind}' {field} has min {min} > max {max}")]
    InvertedRange {
        kind: String,
        field: &'static str,
        min: u32,
        max: u32,
    },

    #[error("kind table is empty")]
    NoKinds,
}
