//! Board segment population.
//!
//! `TilePopulator` turns a tile kind into a populated `BoardSegment`:
//! floor and outer walls first, the road band carved out, then buildings,
//! obstacles and actors placed one pass at a time through the segment's
//! `FreeCellPool`.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::collaborators::{Actor, AssetCategory, VariantSource, VisibilityToggle};
use crate::error::{ConfigError, PlacementError};
use crate::grid::{Coord, Footprint, SegmentLayout, SegmentPosition};
use crate::kinds::{CountRange, KindParams, KindTable};
use crate::pool::FreeCellPool;

/// One placed object: which asset family, which variant, where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub category: AssetCategory,
    pub variant: usize,
    pub at: Coord,
}

/// What a placement pass asked for and what it got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub category: AssetCategory,
    pub requested: u32,
    pub placed: u32,
    /// The pool was already empty when the pass started.
    pub skipped: bool,
}

impl PassReport {
    pub fn is_short(&self) -> bool {
        self.placed < self.requested
    }
}

/// A populated segment. Placement lists are fixed once setup returns; only
/// the pool (through `empty_location`/`release_location`) and visibility
/// change afterwards.
#[derive(Debug)]
pub struct BoardSegment<A> {
    position: SegmentPosition,
    kind: String,
    pool: FreeCellPool,
    floors: Vec<PlacementRecord>,
    buildings: Vec<PlacementRecord>,
    obstacles: Vec<PlacementRecord>,
    actors: Vec<PlacementRecord>,
    agents: Vec<A>,
    reports: Vec<PassReport>,
    visible: bool,
}

impl<A> BoardSegment<A> {
    pub fn position(&self) -> SegmentPosition {
        self.position
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn pool(&self) -> &FreeCellPool {
        &self.pool
    }

    pub fn floors(&self) -> &[PlacementRecord] {
        &self.floors
    }

    pub fn buildings(&self) -> &[PlacementRecord] {
        &self.buildings
    }

    pub fn obstacles(&self) -> &[PlacementRecord] {
        &self.obstacles
    }

    pub fn actors(&self) -> &[PlacementRecord] {
        &self.actors
    }

    pub fn agents(&self) -> &[A] {
        &self.agents
    }

    /// Building, obstacle and actor passes, in run order.
    pub fn reports(&self) -> &[PassReport] {
        &self.reports
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether a building or obstacle is anchored at `(x, y)`.
    pub fn object_at(&self, x: i32, y: i32) -> bool {
        let c = Coord::new(x, y);
        self.buildings.iter().any(|r| r.at == c) || self.obstacles.iter().any(|r| r.at == c)
    }

    /// Hand out a random free cell and take it out of the pool.
    /// `None` once the pool is exhausted.
    pub fn empty_location(&mut self, rng: &mut impl Rng) -> Option<Coord> {
        let index = self.pool.sample_index(rng)?;
        self.pool.remove_at(index)
    }

    /// Return a cell previously handed out by `empty_location`.
    pub fn release_location(&mut self, x: i32, y: i32) -> bool {
        self.pool.restore(x, y)
    }

    /// Every static placement in draw order: floor, obstacles, buildings.
    pub fn static_placements(&self) -> impl Iterator<Item = &PlacementRecord> {
        self.floors
            .iter()
            .chain(self.obstacles.iter())
            .chain(self.buildings.iter())
    }
}

impl<A: Actor> BoardSegment<A> {
    pub fn draw(&mut self, toggle: &mut impl VisibilityToggle) {
        self.set_visible(toggle, true);
    }

    pub fn undraw(&mut self, toggle: &mut impl VisibilityToggle) {
        self.set_visible(toggle, false);
    }

    fn set_visible(&mut self, toggle: &mut impl VisibilityToggle, visible: bool) {
        let id = self.position.id();
        for record in self.static_placements() {
            toggle.set_visible(id, record.category, record, visible);
        }
        for agent in &mut self.agents {
            if visible {
                agent.draw();
            } else {
                agent.undraw();
            }
        }
        self.visible = visible;
    }
}

/// Runs the setup sequence for segments of one layout against one kind
/// table.
pub struct TilePopulator<'a, V> {
    kinds: &'a KindTable,
    layout: &'a SegmentLayout,
    variants: &'a V,
}

impl<'a, V: VariantSource> TilePopulator<'a, V> {
    /// Validates the kind table against the layout up front.
    pub fn new(
        kinds: &'a KindTable,
        layout: &'a SegmentLayout,
        variants: &'a V,
    ) -> Result<Self, ConfigError> {
        kinds.validate(layout)?;
        Ok(Self {
            kinds,
            layout,
            variants,
        })
    }

    pub fn layout(&self) -> &SegmentLayout {
        self.layout
    }

    pub fn kinds(&self) -> &KindTable {
        self.kinds
    }

    /// Populate one segment of `kind` at `position`.
    ///
    /// `spawn_actor` is called once per accepted actor placement. Fails only
    /// on configuration problems; running out of room just places fewer
    /// objects.
    pub fn populate<A, F, R>(
        &self,
        position: SegmentPosition,
        kind: &str,
        mut spawn_actor: F,
        rng: &mut R,
    ) -> Result<BoardSegment<A>, PlacementError>
    where
        A: Actor,
        F: FnMut() -> A,
        R: Rng,
    {
        let params = self.kinds.get(kind)?;
        self.require_variants(position, params)?;

        let mut segment = BoardSegment {
            position,
            kind: kind.to_string(),
            pool: FreeCellPool::new(self.layout.columns, self.layout.rows),
            floors: Vec::with_capacity(self.layout.cell_count()),
            buildings: Vec::new(),
            obstacles: Vec::new(),
            actors: Vec::new(),
            agents: Vec::new(),
            reports: Vec::with_capacity(3),
            visible: false,
        };

        self.lay_floor(&mut segment, rng);

        let report = self.run_pass(
            &mut segment.pool,
            AssetCategory::Building,
            params.building_count,
            params.building_footprint,
            &mut segment.buildings,
            rng,
        );
        segment.reports.push(report);

        let report = self.run_pass(
            &mut segment.pool,
            AssetCategory::Obstacle,
            params.obstacle_count,
            Footprint::UNIT,
            &mut segment.obstacles,
            rng,
        );
        segment.reports.push(report);

        let report = self.run_pass(
            &mut segment.pool,
            AssetCategory::Actor,
            params.actor_count,
            Footprint::UNIT,
            &mut segment.actors,
            rng,
        );
        segment.reports.push(report);

        for record in &segment.actors {
            let mut agent = spawn_actor();
            agent.init();
            agent.place_at(
                position.col,
                position.row,
                record.at.x,
                record.at.y,
                self.layout.rows - record.at.y,
            );
            segment.agents.push(agent);
        }

        debug!(
            "segment ({}, {}) '{}': {} buildings, {} obstacles, {} actors, {} cells free",
            position.row,
            position.col,
            kind,
            segment.buildings.len(),
            segment.obstacles.len(),
            segment.actors.len(),
            segment.pool.len()
        );

        Ok(segment)
    }

    /// Every category this segment will draw from must have a variant.
    fn require_variants(
        &self,
        position: SegmentPosition,
        params: &KindParams,
    ) -> Result<(), PlacementError> {
        let touches_world_edge = position.row == 0
            || position.col == 0
            || position.row == position.map_rows - 1
            || position.col == position.map_columns - 1;
        let has_road = !self.layout.road_columns.is_empty() || !self.layout.road_rows.is_empty();

        let needed = [
            (AssetCategory::Floor, true),
            (AssetCategory::OuterWall, touches_world_edge),
            (AssetCategory::Road, has_road),
            (AssetCategory::Building, params.building_count.max > 0),
            (AssetCategory::Obstacle, params.obstacle_count.max > 0),
            (AssetCategory::Actor, params.actor_count.max > 0),
        ];
        for (category, required) in needed {
            if required && self.variants.variant_count(category) == 0 {
                return Err(PlacementError::MissingVariants(category));
            }
        }
        Ok(())
    }

    /// One floor record per cell; world-edge and road cells leave the pool.
    fn lay_floor<A>(&self, segment: &mut BoardSegment<A>, rng: &mut impl Rng) {
        for x in 0..self.layout.columns {
            for y in 0..self.layout.rows {
                let at = Coord::new(x, y);
                let on_edge = segment.position.is_world_edge(at, self.layout);
                let on_road = self.layout.is_road(at);
                if on_edge || on_road {
                    segment.pool.remove(x, y);
                }

                let category = if on_edge {
                    AssetCategory::OuterWall
                } else if on_road {
                    AssetCategory::Road
                } else {
                    AssetCategory::Floor
                };
                let variant = self.pick_variant(category, rng);
                segment.floors.push(PlacementRecord {
                    category,
                    variant,
                    at,
                });
            }
        }
    }

    fn run_pass(
        &self,
        pool: &mut FreeCellPool,
        category: AssetCategory,
        range: CountRange,
        footprint: Footprint,
        out: &mut Vec<PlacementRecord>,
        rng: &mut impl Rng,
    ) -> PassReport {
        let requested = range.sample(rng);
        let mut report = PassReport {
            category,
            requested,
            placed: 0,
            skipped: false,
        };

        if pool.is_empty() {
            debug!("{:?} pass skipped: no free cells", category);
            report.skipped = true;
            return report;
        }

        for _ in 0..requested {
            match pool.sample_valid_anchor(footprint, self.layout.max_attempts, rng) {
                Ok(at) => {
                    let variant = self.pick_variant(category, rng);
                    out.push(PlacementRecord {
                        category,
                        variant,
                        at,
                    });
                    report.placed += 1;
                }
                Err(e) => {
                    warn!(
                        "{:?} pass placed {}/{}: {}",
                        category, report.placed, requested, e
                    );
                    break;
                }
            }
        }
        report
    }

    fn pick_variant(&self, category: AssetCategory, rng: &mut impl Rng) -> usize {
        match self.variants.variant_count(category) {
            0 => 0,
            n => rng.gen_range(0..n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{NoRender, VariantCounts};
    use crate::grid::SegmentId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Debug, Default)]
    struct TestActor {
        initialized: bool,
        placed: Option<(i32, i32, i32, i32, i32)>,
        drawn: bool,
    }

    impl Actor for TestActor {
        fn init(&mut self) {
            self.initialized = true;
        }
        fn place_at(&mut self, segment_col: i32, segment_row: i32, x: i32, y: i32, depth: i32) {
            self.placed = Some((segment_col, segment_row, x, y, depth));
        }
        fn draw(&mut self) {
            self.drawn = true;
        }
        fn undraw(&mut self) {
            self.drawn = false;
        }
    }

    #[derive(Default)]
    struct CountingToggle {
        shown: usize,
        hidden: usize,
    }

    impl VisibilityToggle for CountingToggle {
        fn set_visible(
            &mut self,
            _segment: SegmentId,
            _category: AssetCategory,
            _record: &PlacementRecord,
            visible: bool,
        ) {
            if visible {
                self.shown += 1;
            } else {
                self.hidden += 1;
            }
        }
    }

    fn single_building_table() -> KindTable {
        KindTable::new().with_kind(
            "plaza",
            KindParams {
                building_count: CountRange::exactly(1),
                obstacle_count: CountRange::NONE,
                actor_count: CountRange::NONE,
                building_footprint: Footprint {
                    width: 2,
                    height: 2,
                },
            },
        )
    }

    #[test]
    fn test_single_building_on_standalone_segment() {
        let kinds = single_building_table();
        let layout = SegmentLayout::default();
        let variants = VariantCounts::default();
        let populator = TilePopulator::new(&kinds, &layout, &variants).unwrap();

        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let segment: BoardSegment<TestActor> = populator
                .populate(SegmentPosition::standalone(), "plaza", TestActor::default, &mut rng)
                .unwrap();
            assert_eq!(segment.buildings().len(), 1);
            let at = segment.buildings()[0].at;
            assert!((1..=8).contains(&at.x) && (1..=8).contains(&at.y), "{:?}", at);
            assert!(!layout.is_road(at));
            assert!(segment.obstacles().is_empty());
            assert!(segment.actors().is_empty());
        }
    }

    #[test]
    fn test_floor_covers_every_cell_once() {
        let kinds = KindTable::standard();
        let layout = SegmentLayout::default();
        let variants = VariantCounts::default();
        let populator = TilePopulator::new(&kinds, &layout, &variants).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let segment: BoardSegment<TestActor> = populator
            .populate(SegmentPosition::new(0, 0, 3, 3), "town", TestActor::default, &mut rng)
            .unwrap();

        assert_eq!(segment.floors().len(), 100);
        let walls = segment
            .floors()
            .iter()
            .filter(|r| r.category == AssetCategory::OuterWall)
            .count();
        // Top-left corner segment: column 0 and row 0, sharing one cell.
        assert_eq!(walls, 19);
        for r in segment.floors() {
            if r.category != AssetCategory::Floor {
                assert!(!segment.pool().contains(r.at.x, r.at.y));
            }
        }
    }

    #[test]
    fn test_interior_segment_has_no_outer_walls() {
        let kinds = KindTable::standard();
        let layout = SegmentLayout::default();
        let variants = VariantCounts::default();
        let populator = TilePopulator::new(&kinds, &layout, &variants).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let segment: BoardSegment<TestActor> = populator
            .populate(SegmentPosition::new(1, 1, 3, 3), "forest", TestActor::default, &mut rng)
            .unwrap();
        assert!(segment
            .floors()
            .iter()
            .all(|r| r.category != AssetCategory::OuterWall));
        assert_eq!(segment.floors()[0].category, AssetCategory::Floor);
    }

    #[test]
    fn test_actors_are_initialized_and_placed() {
        let kinds = KindTable::new().with_kind(
            "square",
            KindParams {
                building_count: CountRange::NONE,
                obstacle_count: CountRange::NONE,
                actor_count: CountRange::exactly(3),
                building_footprint: Footprint::UNIT,
            },
        );
        let layout = SegmentLayout::default();
        let variants = VariantCounts::default();
        let populator = TilePopulator::new(&kinds, &layout, &variants).unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let position = SegmentPosition::new(2, 1, 4, 4);
        let segment: BoardSegment<TestActor> = populator
            .populate(position, "square", TestActor::default, &mut rng)
            .unwrap();

        assert_eq!(segment.agents().len(), 3);
        for (agent, record) in segment.agents().iter().zip(segment.actors()) {
            assert!(agent.initialized);
            assert_eq!(
                agent.placed,
                Some((1, 2, record.at.x, record.at.y, 10 - record.at.y))
            );
        }
    }

    #[test]
    fn test_draw_and_undraw() {
        let kinds = KindTable::standard();
        let layout = SegmentLayout::default();
        let variants = VariantCounts::default();
        let populator = TilePopulator::new(&kinds, &layout, &variants).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let mut segment: BoardSegment<TestActor> = populator
            .populate(SegmentPosition::standalone(), "market", TestActor::default, &mut rng)
            .unwrap();
        let statics = segment.static_placements().count();

        let mut toggle = CountingToggle::default();
        segment.draw(&mut toggle);
        assert!(segment.is_visible());
        assert_eq!(toggle.shown, statics);
        assert!(segment.agents().iter().all(|a| a.drawn));

        segment.undraw(&mut toggle);
        assert!(!segment.is_visible());
        assert_eq!(toggle.hidden, statics);
        assert!(segment.agents().iter().all(|a| !a.drawn));
    }

    #[test]
    fn test_empty_location_until_exhausted() {
        let kinds = KindTable::standard();
        let layout = SegmentLayout::default();
        let variants = VariantCounts::default();
        let populator = TilePopulator::new(&kinds, &layout, &variants).unwrap();
        let mut rng = StdRng::seed_from_u64(13);
        let mut segment: BoardSegment<TestActor> = populator
            .populate(SegmentPosition::standalone(), "farm", TestActor::default, &mut rng)
            .unwrap();

        let free = segment.pool().len();
        let mut handed_out = Vec::new();
        while let Some(c) = segment.empty_location(&mut rng) {
            assert!(!segment.object_at(c.x, c.y));
            handed_out.push(c);
        }
        assert_eq!(handed_out.len(), free);
        assert_eq!(segment.empty_location(&mut rng), None);

        let back = handed_out[0];
        assert!(segment.release_location(back.x, back.y));
        assert_eq!(segment.empty_location(&mut rng), Some(back));
    }

    #[test]
    fn test_object_at_matches_buildings_and_obstacles() {
        let kinds = KindTable::standard();
        let layout = SegmentLayout::default();
        let variants = VariantCounts::default();
        let populator = TilePopulator::new(&kinds, &layout, &variants).unwrap();
        let mut rng = StdRng::seed_from_u64(77);
        let segment: BoardSegment<TestActor> = populator
            .populate(SegmentPosition::standalone(), "cave", TestActor::default, &mut rng)
            .unwrap();

        for r in segment.buildings().iter().chain(segment.obstacles()) {
            assert!(segment.object_at(r.at.x, r.at.y));
        }
        // Roads never host objects.
        assert!(!segment.object_at(4, 4));
    }

    #[test]
    fn test_unknown_kind_and_missing_variants() {
        let kinds = KindTable::standard();
        let layout = SegmentLayout::default();
        let variants = VariantCounts::default().with(AssetCategory::Obstacle, 0);
        let populator = TilePopulator::new(&kinds, &layout, &variants).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let err = populator
            .populate::<TestActor, _, _>(
                SegmentPosition::standalone(),
                "moon",
                TestActor::default,
                &mut rng,
            )
            .unwrap_err();
        assert_eq!(err, PlacementError::UnknownKind("moon".into()));

        let err = populator
            .populate::<TestActor, _, _>(
                SegmentPosition::standalone(),
                "forest",
                TestActor::default,
                &mut rng,
            )
            .unwrap_err();
        assert_eq!(err, PlacementError::MissingVariants(AssetCategory::Obstacle));

        // Market has no obstacles, so it still works.
        assert!(populator
            .populate::<TestActor, _, _>(
                SegmentPosition::standalone(),
                "market",
                TestActor::default,
                &mut rng,
            )
            .is_ok());
    }

    #[test]
    fn test_overpacked_kind_places_fewer() {
        let kinds = KindTable::new().with_kind(
            "crowded",
            KindParams {
                building_count: CountRange::exactly(50),
                obstacle_count: CountRange::NONE,
                actor_count: CountRange::NONE,
                building_footprint: Footprint {
                    width: 2,
                    height: 2,
                },
            },
        );
        let layout = SegmentLayout::default().with_max_attempts(256);
        let variants = VariantCounts::default();
        let populator = TilePopulator::new(&kinds, &layout, &variants).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let segment: BoardSegment<TestActor> = populator
            .populate(SegmentPosition::standalone(), "crowded", TestActor::default, &mut rng)
            .unwrap();

        let report = segment.reports()[0];
        assert_eq!(report.requested, 50);
        assert!(report.is_short());
        assert_eq!(report.placed as usize, segment.buildings().len());
        assert!(!segment.buildings().is_empty());
    }

    #[test]
    fn test_pass_skipped_on_empty_pool() {
        // A 2×2 standalone segment is all outer wall.
        let kinds = KindTable::new().with_kind(
            "rock",
            KindParams {
                building_count: CountRange::NONE,
                obstacle_count: CountRange::exactly(2),
                actor_count: CountRange::NONE,
                building_footprint: Footprint::UNIT,
            },
        );
        let layout = SegmentLayout::new(2, 2).without_roads();
        let variants = VariantCounts::default();
        let populator = TilePopulator::new(&kinds, &layout, &variants).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let mut segment: BoardSegment<TestActor> = populator
            .populate(SegmentPosition::standalone(), "rock", TestActor::default, &mut rng)
            .unwrap();

        assert!(segment.pool().is_empty());
        assert!(segment.reports()[1].skipped);
        assert!(segment.obstacles().is_empty());
        assert_eq!(segment.empty_location(&mut rng), None);
        segment.draw(&mut NoRender);
    }
}
