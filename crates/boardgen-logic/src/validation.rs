//! Invariant checks for populated segments.
//!
//! Pure functions that take a segment and return validation errors, the
//! same shape the generation harness and the integration tests consume.

use std::collections::{HashMap, HashSet};

use crate::grid::{Coord, Footprint, SegmentLayout};
use crate::kinds::KindTable;
use crate::populator::{BoardSegment, PlacementRecord};

/// A segment validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

/// Buildings with their footprint, obstacles and actors as single cells.
fn placed_objects<'s, A>(
    segment: &'s BoardSegment<A>,
    building_footprint: Footprint,
) -> impl Iterator<Item = (&'s PlacementRecord, Footprint)> {
    segment
        .buildings()
        .iter()
        .map(move |r| (r, building_footprint))
        .chain(segment.obstacles().iter().map(|r| (r, Footprint::UNIT)))
        .chain(segment.actors().iter().map(|r| (r, Footprint::UNIT)))
}

/// Every anchor grown by its footprint must stay on the segment.
pub fn check_in_bounds<A>(
    segment: &BoardSegment<A>,
    building_footprint: Footprint,
    layout: &SegmentLayout,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (r, fp) in placed_objects(segment, building_footprint) {
        if !fp.grows_in_bounds(r.at, layout.columns, layout.rows) {
            errors.push(ValidationError {
                category: "bounds",
                severity: Severity::Error,
                message: format!(
                    "{:?} at ({}, {}) with {}×{} footprint leaves the {}×{} segment",
                    r.category, r.at.x, r.at.y, fp.width, fp.height, layout.columns, layout.rows
                ),
            });
        }
    }
    errors
}

/// No two placements may share an extremal cell.
pub fn check_no_overlap<A>(
    segment: &BoardSegment<A>,
    building_footprint: Footprint,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut owner: HashMap<Coord, usize> = HashMap::new();
    for (i, (r, fp)) in placed_objects(segment, building_footprint).enumerate() {
        // A 1×1 footprint repeats the anchor four times.
        let cells: HashSet<Coord> = fp.extremal_cells(r.at).into_iter().collect();
        for c in cells {
            if let Some(&other) = owner.get(&c) {
                if other != i {
                    errors.push(ValidationError {
                        category: "overlap",
                        severity: Severity::Error,
                        message: format!(
                            "{:?} at ({}, {}) overlaps placement #{} at cell ({}, {})",
                            r.category, r.at.x, r.at.y, other, c.x, c.y
                        ),
                    });
                }
            } else {
                owner.insert(c, i);
            }
        }
    }
    errors
}

/// Anchors must never sit on an outer wall or the road band.
pub fn check_exclusion_zones<A>(
    segment: &BoardSegment<A>,
    layout: &SegmentLayout,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let position = segment.position();
    for (r, _) in placed_objects(segment, Footprint::UNIT) {
        let zone = if position.is_world_edge(r.at, layout) {
            Some("outer wall")
        } else if layout.is_road(r.at) {
            Some("road")
        } else {
            None
        };
        if let Some(zone) = zone {
            errors.push(ValidationError {
                category: "exclusion",
                severity: Severity::Error,
                message: format!(
                    "{:?} anchored on {} at ({}, {})",
                    r.category, zone, r.at.x, r.at.y
                ),
            });
        }
    }
    errors
}

/// Exactly one floor record per cell.
pub fn check_floor_coverage<A>(
    segment: &BoardSegment<A>,
    layout: &SegmentLayout,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for r in segment.floors() {
        if !layout.in_bounds(r.at) || !seen.insert(r.at) {
            errors.push(ValidationError {
                category: "floor",
                severity: Severity::Error,
                message: format!("stray or duplicate floor at ({}, {})", r.at.x, r.at.y),
            });
        }
    }
    if seen.len() != layout.cell_count() {
        errors.push(ValidationError {
            category: "floor",
            severity: Severity::Error,
            message: format!(
                "floor covers {} of {} cells",
                seen.len(),
                layout.cell_count()
            ),
        });
    }
    errors
}

/// Passes that came up short. Expected on crowded kinds, so only a warning.
pub fn check_shortfalls<A>(segment: &BoardSegment<A>) -> Vec<ValidationError> {
    segment
        .reports()
        .iter()
        .filter(|r| r.is_short())
        .map(|r| ValidationError {
            category: "shortfall",
            severity: Severity::Warning,
            message: format!(
                "{:?} pass placed {} of {} requested",
                r.category, r.placed, r.requested
            ),
        })
        .collect()
}

/// Run every check for a segment generated from `kinds`.
pub fn validate_segment<A>(
    segment: &BoardSegment<A>,
    kinds: &KindTable,
    layout: &SegmentLayout,
) -> Vec<ValidationError> {
    let footprint = match kinds.get(segment.kind()) {
        Ok(params) => params.building_footprint,
        Err(e) => {
            return vec![ValidationError {
                category: "config",
                severity: Severity::Error,
                message: e.to_string(),
            }]
        }
    };

    let mut errors = Vec::new();
    errors.extend(check_in_bounds(segment, footprint, layout));
    errors.extend(check_no_overlap(segment, footprint));
    errors.extend(check_exclusion_zones(segment, layout));
    errors.extend(check_floor_coverage(segment, layout));
    errors.extend(check_shortfalls(segment));
    errors
}
