//! Boardgen Headless Generation Harness
//!
//! Validates kind tables and placement invariants without any renderer.
//! Runs entirely in-process across a sweep of seeds.
//!
//! Usage:
//!   cargo run -p boardgen-simtest
//!   cargo run -p boardgen-simtest -- --seeds 100 --verbose
//!   cargo run -p boardgen-simtest -- --kinds my_kinds.json --json

use std::ops::Range;
use std::path::PathBuf;
use std::process::ExitCode;

use boardgen_core::config::MapConfig;
use boardgen_core::engine::{MapEngine, MapSummary};
use boardgen_logic::validation::Severity;
use boardgen_logic::{Footprint, FreeCellPool, KindTable, PlacementError, SegmentId};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

// ── Kind table (same JSON the library tests use) ────────────────────────
const KINDS_JSON: &str = include_str!("../../../data/tile_kinds.json");

#[derive(Debug, Parser)]
#[command(name = "boardgen-simtest", about = "Sweep seeds and check board placement invariants")]
struct Args {
    /// Number of seeds to sweep
    #[arg(long, default_value_t = 20)]
    seeds: u64,

    /// First seed of the sweep
    #[arg(long, default_value_t = 0)]
    start_seed: u64,

    /// Map configuration JSON; defaults to a 10×10 map of standard kinds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Kind table JSON, overriding the one in the map configuration
    #[arg(long)]
    kinds: Option<PathBuf>,

    /// Print every check, not only failures
    #[arg(long)]
    verbose: bool,

    /// Print the per-seed summaries as JSON
    #[arg(long)]
    json: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Serialize)]
struct SeedReport {
    seed: u64,
    summary: MapSummary,
    errors: usize,
    warnings: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();
    println!("=== Boardgen Generation Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration
    let config = match load_config(&args) {
        Ok(c) => c,
        Err(detail) => {
            println!("  ✗ config_load: {}", detail);
            return ExitCode::FAILURE;
        }
    };
    results.extend(validate_kind_table(&config, args.verbose));

    // 2. Free cell pool edge cases
    results.extend(validate_pool_behaviour(args.verbose));

    // 3. Seed sweep
    let (sweep, reports) = validate_seed_sweep(&config, &args);
    results.extend(sweep);

    // 4. Visibility toggling
    results.extend(validate_visibility(&config, args.verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(s) => println!("{}", s),
            Err(e) => println!("  ✗ json_output: {}", e),
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn load_config(args: &Args) -> Result<MapConfig, String> {
    let mut config = match &args.config {
        Some(path) => MapConfig::load(path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => MapConfig::default(),
    };
    if let Some(path) = &args.kinds {
        config.kinds = KindTable::load(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    } else if args.config.is_none() {
        config.kinds =
            KindTable::from_json(KINDS_JSON).map_err(|e| format!("built-in kinds: {}", e))?;
    }
    Ok(config)
}

// ── 1. Kind table ───────────────────────────────────────────────────────

fn validate_kind_table(config: &MapConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Kind Table ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "kinds_not_empty".into(),
        passed: !config.kinds.is_empty(),
        detail: format!("{} kinds loaded", config.kinds.len()),
    });

    let valid = config.kinds.validate(&config.layout);
    results.push(TestResult {
        name: "kinds_fit_layout".into(),
        passed: valid.is_ok(),
        detail: match valid {
            Ok(()) => format!(
                "all footprints fit {}×{}",
                config.layout.columns, config.layout.rows
            ),
            Err(e) => e.to_string(),
        },
    });

    if verbose {
        for name in config.kinds.names() {
            if let Ok(p) = config.kinds.get(name) {
                println!(
                    "  {:<10} buildings {}-{} ({}×{})  obstacles {}-{}  actors {}-{}",
                    name,
                    p.building_count.min,
                    p.building_count.max,
                    p.building_footprint.width,
                    p.building_footprint.height,
                    p.obstacle_count.min,
                    p.obstacle_count.max,
                    p.actor_count.min,
                    p.actor_count.max
                );
            }
        }
    }

    results
}

// ── 2. Pool behaviour ───────────────────────────────────────────────────

fn validate_pool_behaviour(_verbose: bool) -> Vec<TestResult> {
    println!("--- Free Cell Pool ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(0);

    // Overpacked: only a 2×2 island left, ask for 3×3.
    let mut pool = FreeCellPool::new(10, 10);
    for x in 0..10 {
        for y in 0..10 {
            if !(4..=5).contains(&x) || !(4..=5).contains(&y) {
                pool.remove(x, y);
            }
        }
    }
    let outcome = pool.sample_valid_anchor(Footprint { width: 3, height: 3 }, 500, &mut rng);
    results.push(TestResult {
        name: "pool_bounded_rejection".into(),
        passed: matches!(outcome, Err(PlacementError::NoValidPlacement { .. })),
        detail: format!("{:?}", outcome),
    });

    // Exhaust a pool, then one more draw.
    let mut pool = FreeCellPool::new(3, 3);
    let mut drawn = 0;
    while let Some(i) = pool.sample_index(&mut rng) {
        pool.remove_at(i);
        drawn += 1;
    }
    results.push(TestResult {
        name: "pool_exhaustion".into(),
        passed: drawn == 9 && pool.sample_index(&mut rng).is_none(),
        detail: format!("{} cells drawn before exhaustion", drawn),
    });

    results
}

// ── 3. Seed sweep ───────────────────────────────────────────────────────

/// `count` seeds from `start`, stopping at `u64::MAX`.
fn seed_range(start: u64, count: u64) -> Range<u64> {
    start..start.saturating_add(count)
}

fn validate_seed_sweep(config: &MapConfig, args: &Args) -> (Vec<TestResult>, Vec<SeedReport>) {
    println!("--- Seed Sweep ---");
    let mut results = Vec::new();
    let mut reports = Vec::new();
    let mut generation_failures = Vec::new();
    let mut invariant_failures = Vec::new();
    let mut nondeterministic = Vec::new();
    let mut short_passes = 0;

    let seeds = seed_range(args.start_seed, args.seeds);
    for seed in seeds.clone() {
        let mut engine = MapEngine::new(config.clone().with_seed(seed));
        let summary = match engine.generate() {
            Ok(s) => s,
            Err(e) => {
                generation_failures.push(format!("seed {}: {}", seed, e));
                continue;
            }
        };

        let findings = engine.validate();
        let errors = findings
            .iter()
            .filter(|(_, e)| e.severity == Severity::Error)
            .count();
        let warnings = findings.len() - errors;
        for (id, e) in findings.iter().filter(|(_, e)| e.severity == Severity::Error) {
            invariant_failures.push(format!(
                "seed {} segment ({}, {}) [{}]: {}",
                seed, id.row, id.col, e.category, e.message
            ));
        }
        short_passes += summary.short_passes;

        let mut again = MapEngine::new(config.clone().with_seed(seed));
        if again.generate().ok().as_ref() != Some(&summary) {
            nondeterministic.push(seed);
        }

        if args.verbose {
            println!(
                "  seed {:>4}: {} buildings, {} obstacles, {} actors, {} short passes",
                seed, summary.buildings, summary.obstacles, summary.actors, summary.short_passes
            );
        }
        reports.push(SeedReport {
            seed,
            summary,
            errors,
            warnings,
        });
    }

    results.push(TestResult {
        name: "sweep_generates".into(),
        passed: generation_failures.is_empty(),
        detail: if generation_failures.is_empty() {
            format!("{} maps generated", reports.len())
        } else {
            generation_failures.join("; ")
        },
    });
    results.push(TestResult {
        name: "sweep_invariants".into(),
        passed: invariant_failures.is_empty(),
        detail: if invariant_failures.is_empty() {
            "no overlaps, bounds or exclusion-zone violations".into()
        } else {
            format!(
                "{} violations, first: {}",
                invariant_failures.len(),
                invariant_failures[0]
            )
        },
    });
    results.push(TestResult {
        name: "sweep_deterministic".into(),
        passed: nondeterministic.is_empty(),
        detail: if nondeterministic.is_empty() {
            format!("seeds {:?} reproduce exactly", seeds)
        } else {
            format!("seeds differ on rerun: {:?}", nondeterministic)
        },
    });
    results.push(TestResult {
        name: "sweep_shortfalls".into(),
        passed: true,
        detail: format!("{} passes placed fewer objects than requested", short_passes),
    });

    (results, reports)
}

// ── 4. Visibility ───────────────────────────────────────────────────────

fn validate_visibility(config: &MapConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Visibility ---");
    let mut results = Vec::new();

    let mut engine = MapEngine::new(config.clone());
    if let Err(e) = engine.generate() {
        results.push(TestResult {
            name: "visibility_generate".into(),
            passed: false,
            detail: e.to_string(),
        });
        return results;
    }

    let id = SegmentId { row: 0, col: 0 };
    let expected = engine.segment_entities(id).len();
    let drawn = engine.draw_segment(id).map(|_| engine.visible_count());
    results.push(TestResult {
        name: "visibility_draw".into(),
        passed: matches!(drawn, Ok(n) if n == expected),
        detail: format!("{:?} of {} entities visible", drawn, expected),
    });

    let hidden = engine.undraw_segment(id).map(|_| engine.visible_count());
    results.push(TestResult {
        name: "visibility_undraw".into(),
        passed: matches!(hidden, Ok(0)),
        detail: format!("{:?} entities visible after undraw", hidden),
    });

    results
}
