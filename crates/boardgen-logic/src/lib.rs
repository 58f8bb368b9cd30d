//! Pure board segment placement logic for boardgen.
//!
//! This crate contains the spatial allocation engine and the per-segment
//! setup sequence, independent of any ECS, renderer or asset pipeline.
//! Functions take plain data plus an injected `rand::Rng`, so a fixed seed
//! reproduces a layout exactly.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`collaborators`] | Traits for asset variants, actors and visibility |
//! | [`error`] | Placement and configuration errors |
//! | [`grid`] | Coordinates, footprints, segment layout and map position |
//! | [`kinds`] | Data-driven tile kind parameter tables |
//! | [`pool`] | Free cell pool and rejection-sampled anchor selection |
//! | [`populator`] | Border/road carve-out and building, obstacle, actor passes |
//! | [`validation`] | Overlap, bounds and exclusion-zone checks |

pub mod collaborators;
pub mod error;
pub mod grid;
pub mod kinds;
pub mod pool;
pub mod populator;
pub mod validation;

pub use collaborators::{Actor, AssetCategory, VariantCounts, VariantSource, VisibilityToggle};
pub use error::{ConfigError, PlacementError};
pub use grid::{Coord, Footprint, SegmentId, SegmentLayout, SegmentPosition};
pub use kinds::{CountRange, KindParams, KindTable};
pub use pool::FreeCellPool;
pub use populator::{BoardSegment, PassReport, PlacementRecord, TilePopulator};
