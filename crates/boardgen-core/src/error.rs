//! Engine errors.

use boardgen_logic::{ConfigError, PlacementError, SegmentId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("segment ({}, {}): {source}", .segment.row, .segment.col)]
    Placement {
        segment: SegmentId,
        #[source]
        source: PlacementError,
    },

    #[error("no segment at ({}, {})", .0.row, .0.col)]
    UnknownSegment(SegmentId),

    #[error("kind grid is {rows}×{columns}, map is {map_rows}×{map_columns}")]
    KindGridShape {
        rows: usize,
        columns: usize,
        map_rows: i32,
        map_columns: i32,
    },

    #[error("map must have at least one segment, got {map_rows}×{map_columns}")]
    EmptyMap { map_rows: i32, map_columns: i32 },
}
