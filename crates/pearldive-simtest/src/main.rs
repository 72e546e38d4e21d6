//! PearlDive Headless Validation Harness
//!
//! Exercises the cavern generation and pathfinding core end-to-end the
//! way the game's level assembly does, without the engine: generate a
//! cavern, turn its wall cells into world rectangles, rasterize them
//! into a nav grid, and run pursuit-style path queries.
//!
//! Usage:
//!   cargo run -p pearldive-simtest
//!   cargo run -p pearldive-simtest -- --verbose

use pearldive_logic::cavern::{CavernGenerator, Cell};
use pearldive_logic::constants::{cavern as cavern_config, nav, world};
use pearldive_logic::navgrid::{NavGrid, WallRect};
use serde::Deserialize;

// ── Level manifest (same JSON the game client uses) ─────────────────────
const MANIFEST_JSON: &str = include_str!("../../../data/level_manifest.json");

#[derive(Debug, Deserialize)]
struct LevelSpec {
    level: u64,
    world_width: f32,
    world_height: f32,
    enemies: u32,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== PearlDive Core Harness ===\n");

    let mut results = Vec::new();

    // 1. Level manifest validation
    let manifest = load_manifest(&mut results);

    // 2. Cavern generation sweep
    results.extend(validate_generation_sweep(verbose));

    // 3. Determinism
    results.extend(validate_determinism(verbose));

    // 4. Pathfinding on synthetic layouts
    results.extend(validate_pathfinding(verbose));

    // 5. End-to-end level assembly
    results.extend(validate_level_assembly(&manifest, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Level Manifest ───────────────────────────────────────────────────

fn load_manifest(results: &mut Vec<TestResult>) -> Vec<LevelSpec> {
    println!("--- Level Manifest ---");

    let manifest: Vec<LevelSpec> = match serde_json::from_str(MANIFEST_JSON) {
        Ok(m) => m,
        Err(e) => {
            results.push(TestResult {
                name: "manifest_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return Vec::new();
        }
    };

    results.push(TestResult {
        name: "manifest_not_empty".into(),
        passed: !manifest.is_empty(),
        detail: format!("{} levels loaded", manifest.len()),
    });

    // World sizes must be positive and align with the cavern tile size,
    // so grid dimensions come out whole.
    let misaligned: Vec<_> = manifest
        .iter()
        .filter(|l| {
            l.world_width <= 0.0
                || l.world_height <= 0.0
                || l.world_width % world::TILE_SIZE != 0.0
                || l.world_height % world::TILE_SIZE != 0.0
        })
        .collect();
    results.push(TestResult {
        name: "manifest_tile_aligned_worlds".into(),
        passed: misaligned.is_empty(),
        detail: if misaligned.is_empty() {
            format!("all worlds align to {}-unit tiles", world::TILE_SIZE)
        } else {
            format!("{} levels with misaligned world size", misaligned.len())
        },
    });

    manifest
}

// ── 2. Cavern Generation Sweep ──────────────────────────────────────────

fn validate_generation_sweep(verbose: bool) -> Vec<TestResult> {
    println!("--- Cavern Generation ---");
    let mut results = Vec::new();

    // Default parameters land caverns close to the 0.50 open-space
    // bar, so a fair share of seeds exhaust the attempt budget and
    // keep their last grid. That is the documented contract: callers
    // re-check and handle the degraded grid. The sweep asserts a
    // healthy acceptance rate and that fallback grids stay well-formed.
    let mut accepted = 0;
    let mut malformed = 0;
    let mut min_open_ratio = f32::MAX;
    let mut max_open_ratio = 0.0f32;

    for seed in 1..=20u64 {
        let mut gen = CavernGenerator::new(
            world::GRID_WIDTH,
            world::GRID_HEIGHT,
            cavern_config::INITIAL_DENSITY,
        );
        let grid = gen.generate(cavern_config::MAX_ATTEMPTS, seed);
        if grid.width() != world::GRID_WIDTH || grid.height() != world::GRID_HEIGHT {
            malformed += 1;
        }
        let ratio = grid.open_count() as f32 / (world::GRID_WIDTH * world::GRID_HEIGHT) as f32;
        min_open_ratio = min_open_ratio.min(ratio);
        max_open_ratio = max_open_ratio.max(ratio);
        let ok = gen.is_connected() && gen.validate_open_space(cavern_config::MIN_OPEN_SPACE);
        if ok {
            accepted += 1;
        }
        if verbose {
            println!("  seed {:2}: open {:.1}% accepted={}", seed, ratio * 100.0, ok);
        }
    }

    results.push(TestResult {
        name: "generation_20_seed_sweep".into(),
        passed: accepted >= 10 && malformed == 0,
        detail: format!(
            "{}/20 seeds accepted, {} best-effort fallbacks, open ratio {:.2}–{:.2}",
            accepted,
            20 - accepted,
            min_open_ratio,
            max_open_ratio
        ),
    });

    // Every accepted cavern must leave room to place clams and enemies.
    let mut gen = CavernGenerator::new(
        world::GRID_WIDTH,
        world::GRID_HEIGHT,
        cavern_config::INITIAL_DENSITY,
    );
    gen.generate(cavern_config::MAX_ATTEMPTS, 1);
    let open = gen.open_positions();
    results.push(TestResult {
        name: "generation_placement_capacity".into(),
        passed: open.len() > 20,
        detail: format!("{} open positions for entity placement", open.len()),
    });

    results
}

// ── 3. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(_verbose: bool) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();

    let mut a = CavernGenerator::new(50, 50, cavern_config::INITIAL_DENSITY);
    let mut b = CavernGenerator::new(50, 50, cavern_config::INITIAL_DENSITY);
    let same = a.generate(10, 42) == b.generate(10, 42);
    results.push(TestResult {
        name: "determinism_same_seed".into(),
        passed: same,
        detail: "seed 42 reproduces bit-identical grid".into(),
    });

    let mut c = CavernGenerator::new(50, 50, cavern_config::INITIAL_DENSITY);
    let differs = a.generate(10, 111) != c.generate(10, 222);
    results.push(TestResult {
        name: "determinism_seed_variation".into(),
        passed: differs,
        detail: "seeds 111 and 222 produce different grids".into(),
    });

    results
}

// ── 4. Pathfinding Scenarios ────────────────────────────────────────────

fn validate_pathfinding(_verbose: bool) -> Vec<TestResult> {
    println!("--- Pathfinding ---");
    let mut results = Vec::new();

    // Open 20×20 grid: path length equals Manhattan distance + 1.
    let mut open_grid = NavGrid::new(10.0);
    open_grid.build_grid(&[], 200.0, 200.0);
    let path = open_grid.find_path(15.0, 15.0, 185.0, 185.0);
    results.push(TestResult {
        name: "pathfind_open_grid_optimal".into(),
        passed: path.as_ref().map(|p| p.len()) == Some(35),
        detail: format!(
            "(1,1)→(18,18) = {:?} waypoints (expect 35)",
            path.map(|p| p.len())
        ),
    });

    // Full divider: no path across.
    let mut divided = NavGrid::new(10.0);
    divided.build_grid(
        &[WallRect {
            x: 100.0,
            y: 0.0,
            width: 10.0,
            height: 200.0,
        }],
        200.0,
        200.0,
    );
    let blocked = divided.find_path(15.0, 100.0, 185.0, 100.0);
    results.push(TestResult {
        name: "pathfind_divider_no_path".into(),
        passed: blocked.is_none(),
        detail: "full-height wall → None".into(),
    });

    // Blocked endpoint: None regardless of the rest of the grid.
    let mut spot = NavGrid::new(10.0);
    spot.build_grid(
        &[WallRect {
            x: 10.0,
            y: 10.0,
            width: 10.0,
            height: 10.0,
        }],
        200.0,
        200.0,
    );
    let from_wall = spot.find_path(15.0, 15.0, 105.0, 105.0);
    results.push(TestResult {
        name: "pathfind_blocked_start".into(),
        passed: from_wall.is_none(),
        detail: "start inside wall → None".into(),
    });

    results
}

// ── 5. End-to-End Level Assembly ────────────────────────────────────────

fn validate_level_assembly(manifest: &[LevelSpec], verbose: bool) -> Vec<TestResult> {
    println!("--- Level Assembly ---");
    let mut results = Vec::new();

    for spec in manifest {
        let tile = world::TILE_SIZE;
        let grid_w = (spec.world_width / tile) as usize;
        let grid_h = (spec.world_height / tile) as usize;

        // Level number seeds generation, as the game does. Acceptance
        // is best-effort: a level that exhausts its attempt budget
        // still ships its last grid, and pursuit falls back more often.
        let mut gen = CavernGenerator::new(grid_w, grid_h, cavern_config::INITIAL_DENSITY);
        gen.generate(cavern_config::MAX_ATTEMPTS, spec.level);
        let accepted =
            gen.is_connected() && gen.validate_open_space(cavern_config::MIN_OPEN_SPACE);

        // One wall rect per wall tile, as level assembly does.
        let mut walls = Vec::new();
        for y in 0..grid_h {
            for x in 0..grid_w {
                if gen.grid().get(x, y) == Cell::Wall {
                    walls.push(WallRect {
                        x: x as f32 * tile,
                        y: y as f32 * tile,
                        width: tile,
                        height: tile,
                    });
                }
            }
        }

        // Tile-aligned nav grid: on an accepted cavern its connectivity
        // carries over exactly, so every open-to-open query must route.
        // A best-effort grid may be disconnected; there `None` is the
        // documented fallback, not a failure.
        let mut nav = NavGrid::new(tile);
        nav.build_grid(&walls, spec.world_width, spec.world_height);

        let open = gen.open_positions();
        let mut waypoints_ok = true;
        let mut all_found = true;
        let mut queries = 0;
        if let Some(last) = open.last().copied() {
            // Spread query starts across the open list, one per enemy.
            let step = (open.len() / (spec.enemies as usize + 1)).max(1);
            for start in open.iter().step_by(step) {
                queries += 1;
                let (sx, sy) = (
                    start.x as f32 * tile + tile / 2.0,
                    start.y as f32 * tile + tile / 2.0,
                );
                let (tx, ty) = (
                    last.x as f32 * tile + tile / 2.0,
                    last.y as f32 * tile + tile / 2.0,
                );
                match nav.find_path(sx, sy, tx, ty) {
                    Some(path) => {
                        for w in &path {
                            let cx = (w.x / tile).floor() as usize;
                            let cy = (w.y / tile).floor() as usize;
                            if !nav.is_walkable(cx, cy) {
                                waypoints_ok = false;
                            }
                        }
                    }
                    None => all_found = false,
                }
            }
        }

        results.push(TestResult {
            name: format!("assembly_level_{}", spec.level),
            passed: waypoints_ok && (!accepted || all_found),
            detail: format!(
                "{}×{} cavern, accepted={}, {} walls, {} open cells, {} path queries",
                grid_w,
                grid_h,
                accepted,
                walls.len(),
                open.len(),
                queries
            ),
        });

        // Coarse pursuit grid at the game's nav resolution (two tiles
        // per cell). Even so, an open tile next to a wall tile can
        // share a blocked coarse cell, so unroutable queries fall back
        // to direct pursuit; any path that is returned must stay on
        // walkable cells.
        let mut coarse = NavGrid::new(nav::CELL_SIZE);
        coarse.build_grid(&walls, spec.world_width, spec.world_height);
        let mut found = 0;
        let mut attempted = 0u32;
        let mut coarse_ok = true;
        let step = (open.len() / 12).max(1);
        for pair in open.iter().step_by(step).collect::<Vec<_>>().windows(2) {
            attempted += 1;
            let (a, b) = (pair[0], pair[1]);
            if let Some(path) = coarse.find_path(
                a.x as f32 * tile + tile / 2.0,
                a.y as f32 * tile + tile / 2.0,
                b.x as f32 * tile + tile / 2.0,
                b.y as f32 * tile + tile / 2.0,
            ) {
                found += 1;
                for w in &path {
                    let cx = (w.x / nav::CELL_SIZE).floor() as usize;
                    let cy = (w.y / nav::CELL_SIZE).floor() as usize;
                    if !coarse.is_walkable(cx, cy) {
                        coarse_ok = false;
                    }
                }
            }
        }
        // One query per re-query interval approximates a stretch of
        // real pursuit.
        let pursuit_ms = attempted * nav::PATHFINDING_UPDATE_MS;
        results.push(TestResult {
            name: format!("coarse_pursuit_level_{}", spec.level),
            passed: coarse_ok,
            detail: format!(
                "{}/{} queries routable over {:.1}s of pursuit, rest fall back to direct",
                found,
                attempted,
                pursuit_ms as f32 / 1000.0
            ),
        });

        if verbose {
            println!(
                "  level {}: accepted={} open={:.1}%",
                spec.level,
                accepted,
                open.len() as f32 / (grid_w * grid_h) as f32 * 100.0
            );
        }
    }

    results
}
