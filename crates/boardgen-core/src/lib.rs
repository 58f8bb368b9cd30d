//! Boardgen Core - Board Map Engine
//!
//! Generates a grid of board segments and keeps every placed object in an
//! ECS world so a renderer can show one segment at a time.
//!
//! # Architecture
//!
//! Placement itself lives in `boardgen-logic`. This crate wires it up:
//! - **Engine**: derives a seeded stream per segment, runs the populator,
//!   spawns one `hecs` entity per placement
//! - **Components**: `Sprite`, `GridCell`, `Visible`, `SegmentMember`
//! - **Npc**: the default actor handed to each segment
//!
//! # Example
//!
//! ```rust,no_run
//! use boardgen_core::prelude::*;
//!
//! let mut engine = MapEngine::new(MapConfig::default().with_seed(42));
//! engine.generate().unwrap();
//!
//! let spawn = SegmentId { row: 0, col: 0 };
//! engine.draw_segment(spawn).unwrap();
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod npc;
pub mod rng;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::MapConfig;
    pub use crate::engine::{MapEngine, MapSummary};
    pub use crate::error::EngineError;
    pub use crate::npc::Npc;
    pub use boardgen_logic::{Coord, SegmentId};
}
