//! Tile kind parameter tables.
//!
//! Each tile kind (market, town, forest, ...) maps to object count ranges
//! and a building footprint. Tables are plain data: load one from JSON at
//! startup and add kinds without touching code.

use std::collections::BTreeMap;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PlacementError};
use crate::grid::{Footprint, SegmentLayout};

/// Inclusive `[min, max]` object count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const NONE: Self = Self { min: 0, max: 0 };

    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn exactly(n: u32) -> Self {
        Self { min: n, max: n }
    }

    /// Uniform draw from the range. An inverted range yields `min`.
    pub fn sample(&self, rng: &mut impl Rng) -> u32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Placement parameters for one tile kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindParams {
    pub building_count: CountRange,
    #[serde(default)]
    pub obstacle_count: CountRange,
    #[serde(default)]
    pub actor_count: CountRange,
    #[serde(default)]
    pub building_footprint: Footprint,
}

impl KindParams {
    fn validate(&self, kind: &str, layout: &SegmentLayout) -> Result<(), ConfigError> {
        self.building_footprint
            .check_against(layout.columns, layout.rows)
            .map_err(|source| ConfigError::Kind {
                kind: kind.to_string(),
                source,
            })?;
        for (field, range) in [
            ("building_count", self.building_count),
            ("obstacle_count", self.obstacle_count),
            ("actor_count", self.actor_count),
        ] {
            if range.min > range.max {
                return Err(ConfigError::InvertedRange {
                    kind: kind.to_string(),
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }
}

/// Kind identifier → parameters. Ordered so iteration is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindTable {
    kinds: BTreeMap<String, KindParams>,
}

impl KindTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five reference kinds.
    pub fn standard() -> Self {
        let two_by_two = Footprint {
            width: 2,
            height: 2,
        };
        Self::new()
            // Stalls and shoppers
            .with_kind(
                "market",
                KindParams {
                    building_count: CountRange::new(1, 2),
                    obstacle_count: CountRange::NONE,
                    actor_count: CountRange::new(1, 2),
                    building_footprint: two_by_two,
                },
            )
            // Houses, fences, residents
            .with_kind(
                "town",
                KindParams {
                    building_count: CountRange::new(1, 2),
                    obstacle_count: CountRange::new(0, 5),
                    actor_count: CountRange::new(1, 2),
                    building_footprint: two_by_two,
                },
            )
            // Trees and bushes only
            .with_kind(
                "forest",
                KindParams {
                    building_count: CountRange::NONE,
                    obstacle_count: CountRange::new(10, 30),
                    actor_count: CountRange::NONE,
                    building_footprint: Footprint::UNIT,
                },
            )
            // One cave mouth among rocks
            .with_kind(
                "cave",
                KindParams {
                    building_count: CountRange::exactly(1),
                    obstacle_count: CountRange::new(5, 10),
                    actor_count: CountRange::NONE,
                    building_footprint: two_by_two,
                },
            )
            // Crops and animals
            .with_kind(
                "farm",
                KindParams {
                    building_count: CountRange::NONE,
                    obstacle_count: CountRange::new(5, 20),
                    actor_count: CountRange::new(0, 1),
                    building_footprint: two_by_two,
                },
            )
    }

    pub fn with_kind(mut self, name: impl Into<String>, params: KindParams) -> Self {
        self.insert(name, params);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, params: KindParams) {
        self.kinds.insert(name.into(), params);
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject tables that could never be placed on `layout`.
    pub fn validate(&self, layout: &SegmentLayout) -> Result<(), ConfigError> {
        if self.kinds.is_empty() {
            return Err(ConfigError::NoKinds);
        }
        for (name, params) in &self.kinds {
            params.validate(name, layout)?;
        }
        Ok(())
    }

    pub fn get(&self, kind: &str) -> Result<&KindParams, PlacementError> {
        self.kinds
            .get(kind)
            .ok_or_else(|| PlacementError::UnknownKind(kind.to_string()))
    }

    /// Kind names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_standard_has_five_kinds() {
        let table = KindTable::standard();
        let names: Vec<_> = table.names().collect();
        assert_eq!(names, vec!["cave", "farm", "forest", "market", "town"]);
        assert!(table.validate(&SegmentLayout::default()).is_ok());
    }

    #[test]
    fn test_count_range_sample_inclusive() {
        let mut rng = StdRng::seed_from_u64(42);
        let range = CountRange::new(2, 4);
        let mut seen = [false; 5];
        for _ in 0..200 {
            let n = range.sample(&mut rng);
            assert!((2..=4).contains(&n));
            seen[n as usize] = true;
        }
        assert!(seen[2] && seen[3] && seen[4]);
        assert_eq!(CountRange::exactly(3).sample(&mut rng), 3);
    }

    #[test]
    fn test_from_json_with_defaults() {
        let json = r#"{
            "ruins": {
                "building_count": { "min": 0, "max": 3 },
                "building_footprint": { "width": 3, "height": 2 }
            }
        }"#;
        let table = KindTable::from_json(json).unwrap();
        let ruins = table.get("ruins").unwrap();
        assert_eq!(ruins.building_count, CountRange::new(0, 3));
        assert_eq!(ruins.obstacle_count, CountRange::NONE);
        assert_eq!(ruins.building_footprint, Footprint { width: 3, height: 2 });
    }

    #[test]
    fn test_validate_rejects_bad_footprint() {
        let table = KindTable::new().with_kind(
            "tower",
            KindParams {
                building_count: CountRange::exactly(1),
                obstacle_count: CountRange::NONE,
                actor_count: CountRange::NONE,
                building_footprint: Footprint { width: 0, height: 2 },
            },
        );
        let err = table.validate(&SegmentLayout::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Kind { ref kind, .. } if kind == "tower"));
    }

    #[test]
    fn test_validate_rejects_footprint_wider_than_segment_allows() {
        let table = KindTable::new().with_kind(
            "hall",
            KindParams {
                building_count: CountRange::exactly(1),
                obstacle_count: CountRange::NONE,
                actor_count: CountRange::NONE,
                building_footprint: Footprint { width: 6, height: 2 },
            },
        );
        match table.validate(&SegmentLayout::default()) {
            Err(ConfigError::Kind { kind, source }) => {
                assert_eq!(kind, "hall");
                assert!(matches!(
                    source,
                    PlacementError::InvalidFootprint { width: 6, height: 2, .. }
                ));
            }
            other => panic!("expected footprint rejection, got {:?}", other),
        }
        assert!(table.validate(&SegmentLayout::new(11, 10)).is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let table = KindTable::new().with_kind(
            "swamp",
            KindParams {
                building_count: CountRange::NONE,
                obstacle_count: CountRange::new(5, 1),
                actor_count: CountRange::NONE,
                building_footprint: Footprint::UNIT,
            },
        );
        assert!(matches!(
            table.validate(&SegmentLayout::default()),
            Err(ConfigError::InvertedRange { field: "obstacle_count", .. })
        ));
    }

    #[test]
    fn test_unknown_kind() {
        let table = KindTable::standard();
        assert_eq!(
            table.get("volcano"),
            Err(PlacementError::UnknownKind("volcano".into()))
        );
    }

    #[test]
    fn test_empty_table_invalid() {
        assert!(matches!(
            KindTable::new().validate(&SegmentLayout::default()),
            Err(ConfigError::NoKinds)
        ));
    }
}
