//! Seed derivation so every segment gets its own reproducible stream.

use rand::rngs::StdRng;
use rand::SeedableRng;

use boardgen_logic::SegmentId;

const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;

/// One map seed, split into independent per-phase generators.
#[derive(Debug, Clone, Copy)]
pub struct SeedSequence {
    base: u64,
}

impl SeedSequence {
    pub fn new(seed: u64) -> Self {
        Self { base: seed }
    }

    pub fn seed(&self) -> u64 {
        self.base
    }

    pub fn for_phase(&self, phase: u64) -> StdRng {
        StdRng::seed_from_u64(self.base ^ phase.wrapping_mul(GOLDEN))
    }

    /// Segment streams start at phase 16 so they never collide with the
    /// fixed phases below.
    pub fn for_segment(&self, id: SegmentId) -> StdRng {
        let packed = ((id.row as u32 as u64) << 32) | id.col as u32 as u64;
        self.for_phase(16 + packed)
    }

    /// Kind assignment across the map.
    pub fn for_kinds(&self) -> StdRng {
        self.for_phase(1)
    }

    /// Runtime queries such as `empty_location`.
    pub fn for_queries(&self) -> StdRng {
        self.for_phase(2)
    }
}
