//! Boundaries between placement and the rest of the game.
//!
//! The populator never sees sprites, prefabs or NPC logic. It asks a
//! `VariantSource` how many variants a category has and picks an index,
//! drives each spawned actor through `Actor`, and hands placement records
//! to a `VisibilityToggle` when a segment is drawn or hidden.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grid::SegmentId;
use crate::populator::PlacementRecord;

/// Asset family a placement draws its variant from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Floor,
    OuterWall,
    Road,
    Building,
    Obstacle,
    Actor,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 6] = [
        AssetCategory::Floor,
        AssetCategory::OuterWall,
        AssetCategory::Road,
        AssetCategory::Building,
        AssetCategory::Obstacle,
        AssetCategory::Actor,
    ];
}

/// How many interchangeable assets exist per category.
pub trait VariantSource {
    fn variant_count(&self, category: AssetCategory) -> usize;
}

/// Variant counts as plain data. Missing categories count as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantCounts {
    counts: BTreeMap<AssetCategory, usize>,
}

impl VariantCounts {
    /// `n` variants for every category.
    pub fn uniform(n: usize) -> Self {
        Self {
            counts: AssetCategory::ALL.iter().map(|&c| (c, n)).collect(),
        }
    }

    pub fn with(mut self, category: AssetCategory, count: usize) -> Self {
        self.counts.insert(category, count);
        self
    }
}

impl Default for VariantCounts {
    fn default() -> Self {
        Self::uniform(1)
            .with(AssetCategory::Floor, 4)
            .with(AssetCategory::OuterWall, 3)
            .with(AssetCategory::Building, 3)
            .with(AssetCategory::Obstacle, 4)
    }
}

impl VariantSource for VariantCounts {
    fn variant_count(&self, category: AssetCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }
}

/// A mobile actor living on a segment.
pub trait Actor {
    fn init(&mut self);
    fn place_at(&mut self, segment_col: i32, segment_row: i32, x: i32, y: i32, depth: i32);
    fn draw(&mut self);
    fn undraw(&mut self);
}

/// Receives visibility changes for static placements.
pub trait VisibilityToggle {
    fn set_visible(
        &mut self,
        segment: SegmentId,
        category: AssetCategory,
        record: &PlacementRecord,
        visible: bool,
    );
}

/// Toggle that discards every change, for headless generation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRender;

impl VisibilityToggle for NoRender {
    fn set_visible(&mut self, _: SegmentId, _: AssetCategory, _: &PlacementRecord, _: bool) {}
}
