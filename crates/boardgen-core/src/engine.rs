//! Map engine - main entry point for generating and showing a map

use std::collections::{BTreeMap, HashMap};

use boardgen_logic::validation::{validate_segment, ValidationError};
use boardgen_logic::{
    AssetCategory, BoardSegment, Coord, PlacementRecord, SegmentId, SegmentPosition,
    TilePopulator, VisibilityToggle,
};
use hecs::{Entity, World};
use log::info;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{ActorTag, GridCell, SegmentMember, Sprite, Visible};
use crate::config::MapConfig;
use crate::error::EngineError;
use crate::npc::Npc;
use crate::rng::SeedSequence;

type PlacementKey = (SegmentId, AssetCategory, Coord);

/// Totals for a generated map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSummary {
    pub segments: usize,
    pub floors: usize,
    pub buildings: usize,
    pub obstacles: usize,
    pub actors: usize,
    /// Passes that placed fewer objects than requested
    pub short_passes: usize,
    pub kinds: BTreeMap<String, usize>,
}

/// Main map engine
pub struct MapEngine {
    /// ECS world with one entity per placement
    pub world: World,
    config: MapConfig,
    seeds: SeedSequence,
    segments: BTreeMap<SegmentId, BoardSegment<Npc>>,
    entities: HashMap<PlacementKey, Entity>,
    query_rng: StdRng,
}

impl MapEngine {
    /// Create an empty engine; call `generate` to populate it.
    pub fn new(config: MapConfig) -> Self {
        let seeds = SeedSequence::new(config.seed);
        Self {
            world: World::new(),
            query_rng: seeds.for_queries(),
            seeds,
            config,
            segments: BTreeMap::new(),
            entities: HashMap::new(),
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Generate every segment of the map, replacing anything generated
    /// before.
    pub fn generate(&mut self) -> Result<MapSummary, EngineError> {
        let MapConfig {
            map_rows,
            map_columns,
            ..
        } = self.config;
        if map_rows <= 0 || map_columns <= 0 {
            return Err(EngineError::EmptyMap {
                map_rows,
                map_columns,
            });
        }

        let kind_grid = self.assign_kinds()?;
        let populator =
            TilePopulator::new(&self.config.kinds, &self.config.layout, &self.config.variants)?;

        // Populate everything before touching the current map so a failed
        // regenerate leaves it intact.
        let mut segments = BTreeMap::new();
        for row in 0..map_rows {
            for col in 0..map_columns {
                let position = SegmentPosition::new(row, col, map_rows, map_columns);
                let id = position.id();
                let kind = &kind_grid[row as usize][col as usize];
                let mut rng = self.seeds.for_segment(id);
                let segment = populator
                    .populate(position, kind, Npc::default, &mut rng)
                    .map_err(|source| EngineError::Placement {
                        segment: id,
                        source,
                    })?;
                segments.insert(id, segment);
            }
        }

        self.world.clear();
        self.entities.clear();
        self.query_rng = self.seeds.for_queries();

        let rows = self.config.layout.rows;
        for (&id, segment) in &segments {
            for record in segment.static_placements() {
                let e = self.world.spawn((
                    SegmentMember(id),
                    Sprite {
                        category: record.category,
                        variant: record.variant,
                    },
                    GridCell::for_record(record, rows),
                    Visible(false),
                ));
                self.entities.insert((id, record.category, record.at), e);
            }
            for (record, npc) in segment.actors().iter().zip(segment.agents()) {
                let e = self.world.spawn((
                    SegmentMember(id),
                    Sprite {
                        category: record.category,
                        variant: record.variant,
                    },
                    GridCell {
                        x: npc.x,
                        y: npc.y,
                        depth: npc.depth,
                    },
                    Visible(false),
                    ActorTag,
                ));
                self.entities.insert((id, record.category, record.at), e);
            }
        }
        self.segments = segments;

        let summary = self.summary();
        info!(
            "Generated map '{}' ({}×{} segments, seed {}): {} buildings, {} obstacles, {} actors",
            self.config.name,
            map_rows,
            map_columns,
            self.config.seed,
            summary.buildings,
            summary.obstacles,
            summary.actors
        );
        Ok(summary)
    }

    /// Kind for every segment: the explicit grid if configured, otherwise a
    /// uniform draw from the table.
    fn assign_kinds(&self) -> Result<Vec<Vec<String>>, EngineError> {
        let (map_rows, map_columns) = (self.config.map_rows, self.config.map_columns);
        if let Some(grid) = &self.config.kind_grid {
            let shape_ok = grid.len() == map_rows as usize
                && grid.iter().all(|r| r.len() == map_columns as usize);
            if !shape_ok {
                return Err(EngineError::KindGridShape {
                    rows: grid.len(),
                    columns: grid.first().map_or(0, Vec::len),
                    map_rows,
                    map_columns,
                });
            }
            return Ok(grid.clone());
        }

        let names: Vec<&str> = self.config.kinds.names().collect();
        if names.is_empty() {
            return Err(boardgen_logic::ConfigError::NoKinds.into());
        }
        let mut rng = self.seeds.for_kinds();
        Ok((0..map_rows)
            .map(|_| {
                (0..map_columns)
                    .map(|_| names[rng.gen_range(0..names.len())].to_string())
                    .collect()
            })
            .collect())
    }

    pub fn summary(&self) -> MapSummary {
        let mut summary = MapSummary {
            segments: self.segments.len(),
            ..MapSummary::default()
        };
        for segment in self.segments.values() {
            summary.floors += segment.floors().len();
            summary.buildings += segment.buildings().len();
            summary.obstacles += segment.obstacles().len();
            summary.actors += segment.actors().len();
            summary.short_passes += segment.reports().iter().filter(|r| r.is_short()).count();
            *summary.kinds.entry(segment.kind().to_string()).or_default() += 1;
        }
        summary
    }

    pub fn segment(&self, id: SegmentId) -> Option<&BoardSegment<Npc>> {
        self.segments.get(&id)
    }

    pub fn segments(&self) -> impl Iterator<Item = &BoardSegment<Npc>> {
        self.segments.values()
    }

    fn segment_mut(&mut self, id: SegmentId) -> Result<&mut BoardSegment<Npc>, EngineError> {
        self.segments
            .get_mut(&id)
            .ok_or(EngineError::UnknownSegment(id))
    }

    /// Show a segment: floor, obstacles, buildings and its actors.
    pub fn draw_segment(&mut self, id: SegmentId) -> Result<(), EngineError> {
        self.toggle_segment(id, true)
    }

    /// Hide a segment.
    pub fn undraw_segment(&mut self, id: SegmentId) -> Result<(), EngineError> {
        self.toggle_segment(id, false)
    }

    fn toggle_segment(&mut self, id: SegmentId, visible: bool) -> Result<(), EngineError> {
        let segment = self
            .segments
            .get_mut(&id)
            .ok_or(EngineError::UnknownSegment(id))?;
        let mut toggle = WorldToggle {
            world: &mut self.world,
            entities: &self.entities,
        };
        if visible {
            segment.draw(&mut toggle);
        } else {
            segment.undraw(&mut toggle);
        }

        // Actor entities follow their agent's drawn state.
        for (record, npc) in segment.actors().iter().zip(segment.agents()) {
            if let Some(&e) = self.entities.get(&(id, record.category, record.at)) {
                if let Ok(mut v) = self.world.get::<&mut Visible>(e) {
                    v.0 = npc.drawn;
                }
            }
        }
        Ok(())
    }

    /// Take a random free cell of a segment, or `None` if it is full.
    pub fn empty_location(&mut self, id: SegmentId) -> Result<Option<Coord>, EngineError> {
        let segment = self
            .segments
            .get_mut(&id)
            .ok_or(EngineError::UnknownSegment(id))?;
        Ok(segment.empty_location(&mut self.query_rng))
    }

    /// Give back a cell taken with `empty_location`.
    pub fn release_location(&mut self, id: SegmentId, x: i32, y: i32) -> Result<bool, EngineError> {
        Ok(self.segment_mut(id)?.release_location(x, y))
    }

    /// Whether a building or obstacle stands at `(x, y)` of a segment.
    pub fn object_at(&self, id: SegmentId, x: i32, y: i32) -> Result<bool, EngineError> {
        self.segments
            .get(&id)
            .map(|s| s.object_at(x, y))
            .ok_or(EngineError::UnknownSegment(id))
    }

    /// Number of entities currently flagged visible.
    pub fn visible_count(&self) -> usize {
        self.world
            .query::<&Visible>()
            .iter()
            .filter(|(_, v)| v.0)
            .count()
    }

    /// Entities belonging to one segment.
    pub fn segment_entities(&self, id: SegmentId) -> Vec<Entity> {
        self.world
            .query::<&SegmentMember>()
            .iter()
            .filter(|(_, m)| m.0 == id)
            .map(|(e, _)| e)
            .collect()
    }

    /// Invariant violations across every segment, tagged with the segment.
    pub fn validate(&self) -> Vec<(SegmentId, ValidationError)> {
        let mut out = Vec::new();
        for (id, segment) in &self.segments {
            for e in validate_segment(segment, &self.config.kinds, &self.config.layout) {
                out.push((*id, e));
            }
        }
        out
    }
}

/// Writes visibility into `Visible` components.
struct WorldToggle<'w> {
    world: &'w mut World,
    entities: &'w HashMap<PlacementKey, Entity>,
}

impl VisibilityToggle for WorldToggle<'_> {
    fn set_visible(
        &mut self,
        segment: SegmentId,
        category: AssetCategory,
        record: &PlacementRecord,
        visible: bool,
    ) {
        if let Some(&e) = self.entities.get(&(segment, category, record.at)) {
            if let Ok(mut v) = self.world.get::<&mut Visible>(e) {
                v.0 = visible;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardgen_logic::validation::Severity;
    use boardgen_logic::{CountRange, Footprint, KindParams, KindTable, PlacementError};

    fn small_config(seed: u64) -> MapConfig {
        MapConfig::default().with_size(3, 3).with_seed(seed)
    }

    #[test]
    fn test_generate_small_map() {
        let mut engine = MapEngine::new(small_config(1));
        let summary = engine.generate().unwrap();
        assert_eq!(summary.segments, 9);
        assert_eq!(summary.floors, 900);
        assert_eq!(summary.kinds.values().sum::<usize>(), 9);
        let entities = engine.world.len() as usize;
        assert_eq!(
            entities,
            summary.floors + summary.buildings + summary.obstacles + summary.actors
        );
        assert_eq!(engine.visible_count(), 0);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut a = MapEngine::new(small_config(77));
        let mut b = MapEngine::new(small_config(77));
        assert_eq!(a.generate().unwrap(), b.generate().unwrap());
        for (sa, sb) in a.segments().zip(b.segments()) {
            assert_eq!(sa.kind(), sb.kind());
            assert_eq!(sa.buildings(), sb.buildings());
            assert_eq!(sa.obstacles(), sb.obstacles());
            assert_eq!(sa.actors(), sb.actors());
        }
    }

    #[test]
    fn test_regenerate_replaces_world() {
        let mut engine = MapEngine::new(small_config(3));
        let first = engine.generate().unwrap();
        let second = engine.generate().unwrap();
        assert_eq!(first, second);
        assert_eq!(
            engine.world.len() as usize,
            second.floors + second.buildings + second.obstacles + second.actors
        );
    }

    #[test]
    fn test_draw_and_undraw_segment() {
        let mut engine = MapEngine::new(small_config(5));
        engine.generate().unwrap();
        let id = SegmentId { row: 1, col: 1 };
        let expected = engine.segment_entities(id).len();

        engine.draw_segment(id).unwrap();
        assert_eq!(engine.visible_count(), expected);
        assert!(engine.segment(id).unwrap().is_visible());
        assert!(engine.segment(id).unwrap().agents().iter().all(|n| n.drawn));

        engine.undraw_segment(id).unwrap();
        assert_eq!(engine.visible_count(), 0);
    }

    #[test]
    fn test_unknown_segment() {
        let mut engine = MapEngine::new(small_config(5));
        engine.generate().unwrap();
        let id = SegmentId { row: 9, col: 9 };
        assert!(matches!(
            engine.draw_segment(id),
            Err(EngineError::UnknownSegment(_))
        ));
        assert!(engine.object_at(id, 1, 1).is_err());
    }

    #[test]
    fn test_explicit_kind_grid() {
        let mut config = MapConfig::default().with_size(1, 2);
        config.kind_grid = Some(vec![vec!["forest".into(), "market".into()]]);
        let mut engine = MapEngine::new(config);
        engine.generate().unwrap();
        assert_eq!(engine.segment(SegmentId { row: 0, col: 0 }).unwrap().kind(), "forest");
        assert_eq!(engine.segment(SegmentId { row: 0, col: 1 }).unwrap().kind(), "market");
    }

    #[test]
    fn test_bad_kind_grid_shape() {
        let mut config = MapConfig::default().with_size(2, 2);
        config.kind_grid = Some(vec![vec!["forest".into()]]);
        let mut engine = MapEngine::new(config);
        assert!(matches!(
            engine.generate(),
            Err(EngineError::KindGridShape { .. })
        ));
    }

    #[test]
    fn test_unknown_kind_in_grid() {
        let mut config = MapConfig::default().with_size(1, 1);
        config.kind_grid = Some(vec![vec!["lagoon".into()]]);
        let mut engine = MapEngine::new(config);
        assert!(matches!(
            engine.generate(),
            Err(EngineError::Placement { .. })
        ));
    }

    #[test]
    fn test_failed_regenerate_keeps_previous_map() {
        let mut engine = MapEngine::new(MapConfig::default().with_size(1, 2).with_seed(11));
        let before = engine.generate().unwrap();
        let entities = engine.world.len();
        assert_eq!(before.segments, 2);

        engine.config.kind_grid = Some(vec![vec!["forest".into(), "lagoon".into()]]);
        assert!(matches!(
            engine.generate(),
            Err(EngineError::Placement { source: PlacementError::UnknownKind(ref k), .. }) if k == "lagoon"
        ));
        assert_eq!(engine.summary(), before);
        assert_eq!(engine.world.len(), entities);
        assert!(engine.segment(SegmentId { row: 0, col: 1 }).is_some());
    }

    #[test]
    fn test_missing_variants_keeps_previous_map() {
        let mut engine = MapEngine::new(small_config(4));
        let before = engine.generate().unwrap();
        engine.config.variants = engine.config.variants.clone().with(AssetCategory::Floor, 0);
        assert!(engine.generate().is_err());
        assert_eq!(engine.summary(), before);
        engine.draw_segment(SegmentId { row: 0, col: 0 }).unwrap();
        assert!(engine.visible_count() > 0);
    }

    #[test]
    fn test_empty_location_and_object_at() {
        let kinds = KindTable::new().with_kind(
            "yard",
            KindParams {
                building_count: CountRange::exactly(1),
                obstacle_count: CountRange::exactly(3),
                actor_count: CountRange::NONE,
                building_footprint: Footprint {
                    width: 2,
                    height: 2,
                },
            },
        );
        let mut engine = MapEngine::new(MapConfig::default().with_size(1, 1).with_kinds(kinds));
        engine.generate().unwrap();
        let id = SegmentId { row: 0, col: 0 };

        let segment = engine.segment(id).unwrap();
        let objects: Vec<Coord> = segment
            .buildings()
            .iter()
            .chain(segment.obstacles())
            .map(|r| r.at)
            .collect();
        for c in &objects {
            assert!(engine.object_at(id, c.x, c.y).unwrap());
        }

        let mut taken = 0;
        while let Some(c) = engine.empty_location(id).unwrap() {
            assert!(!objects.contains(&c));
            taken += 1;
        }
        assert!(taken > 0);
        assert_eq!(engine.empty_location(id).unwrap(), None);
    }

    #[test]
    fn test_whole_map_validates() {
        let mut engine = MapEngine::new(MapConfig::default().with_seed(2024));
        engine.generate().unwrap();
        let errors: Vec<_> = engine
            .validate()
            .into_iter()
            .filter(|(_, e)| e.severity == Severity::Error)
            .collect();
        assert!(errors.is_empty(), "{:?}", errors);
    }
}
