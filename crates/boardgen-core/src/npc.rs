//! Default actor: a villager that remembers where it was put.

use boardgen_logic::{Actor, SegmentId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub initialized: bool,
    pub segment: Option<SegmentId>,
    pub x: i32,
    pub y: i32,
    pub depth: i32,
    pub drawn: bool,
}

impl Actor for Npc {
    fn init(&mut self) {
        *self = Self {
            initialized: true,
            ..Self::default()
        };
    }

    fn place_at(&mut self, segment_col: i32, segment_row: i32, x: i32, y: i32, depth: i32) {
        self.segment = Some(SegmentId {
            row: segment_row,
            col: segment_col,
        });
        self.x = x;
        self.y = y;
        self.depth = depth;
    }

    fn draw(&mut self) {
        self.drawn = true;
    }

    fn undraw(&mut self) {
        self.drawn = false;
    }
}
