//! ECS components for placed objects.

use boardgen_logic::{AssetCategory, PlacementRecord, SegmentId};
use serde::{Deserialize, Serialize};

/// Which segment an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentMember(pub SegmentId);

/// Asset family and variant index; the renderer resolves the actual asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    pub category: AssetCategory,
    pub variant: usize,
}

/// Cell position within the segment. `depth` orders sprites back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
    pub depth: i32,
}

impl GridCell {
    /// Floor sits at depth 0; everything standing on it is layered by row.
    pub fn for_record(record: &PlacementRecord, rows: i32) -> Self {
        let depth = match record.category {
            AssetCategory::Floor | AssetCategory::OuterWall | AssetCategory::Road => 0,
            _ => rows - record.at.y,
        };
        Self {
            x: record.at.x,
            y: record.at.y,
            depth,
        }
    }
}

/// Whether the renderer should show the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Visible(pub bool);

/// Marks actor entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActorTag;
