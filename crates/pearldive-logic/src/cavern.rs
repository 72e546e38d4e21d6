//! Procedural cavern generation using cellular automata.
//!
//! A [`CavernGenerator`] fills a grid with random wall noise, runs a
//! few birth/death smoothing passes to cluster the noise into organic
//! cave shapes, then checks the result with a flood fill (all open
//! cells reachable) and an open-space ratio. Grids that fail either
//! check are regenerated from fresh noise — regeneration is cheaper
//! and simpler than repairing a bad grid.
//!
//! Each generator owns its own seeded RNG, so two generators built
//! with the same parameters and run with the same seed produce
//! bit-identical grids. There is no global random state.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::constants::cavern as config;

/// State of one cavern cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Open,
    Wall,
}

/// A cell position in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

/// Rectangular wall/open grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CavernGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl CavernGrid {
    fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![cell; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[y * self.width + x] = cell;
    }

    /// Whether (x, y) lies on the outer border.
    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || x == self.width - 1 || y == 0 || y == self.height - 1
    }

    /// Total number of open cells.
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Open).count()
    }
}

/// Procedural cavern generator with an instance-owned seeded RNG.
pub struct CavernGenerator {
    width: usize,
    height: usize,
    density: f32,
    grid: CavernGrid,
    rng: ChaCha8Rng,
}

impl CavernGenerator {
    /// Create a generator for a `width` × `height` grid.
    ///
    /// `density` is the probability an interior cell starts as a wall.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is below 3 (no interior to carve)
    /// or `density` is outside [0, 1]. These are programming errors,
    /// not recoverable generation failures.
    pub fn new(width: usize, height: usize, density: f32) -> Self {
        assert!(
            width >= 3 && height >= 3,
            "cavern grid must be at least 3×3, got {}×{}",
            width,
            height
        );
        assert!(
            (0.0..=1.0).contains(&density),
            "density must be in [0, 1], got {}",
            density
        );
        Self {
            width,
            height,
            density,
            grid: CavernGrid::filled(width, height, Cell::Wall),
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The current grid — the output of the last generation step.
    pub fn grid(&self) -> &CavernGrid {
        &self.grid
    }

    /// Fill the grid with fresh noise: borders are forced walls, every
    /// interior cell becomes a wall with probability `density`.
    pub fn initialize_grid(&mut self, density: f32) {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = if self.grid.is_border(x, y) || self.rng.gen::<f32>() < density {
                    Cell::Wall
                } else {
                    Cell::Open
                };
                self.grid.set(x, y, cell);
            }
        }
    }

    /// Count wall cells in the 8-cell Moore neighborhood of (x, y).
    /// Off-grid neighbors count as walls. Result is in 0..=8.
    pub fn count_wall_neighbors(&self, x: usize, y: usize) -> u32 {
        let mut count = 0;
        for ny in y as isize - 1..=y as isize + 1 {
            for nx in x as isize - 1..=x as isize + 1 {
                if nx == x as isize && ny == y as isize {
                    continue;
                }
                if nx < 0 || nx >= self.width as isize || ny < 0 || ny >= self.height as isize {
                    count += 1;
                } else if self.grid.get(nx as usize, ny as usize) == Cell::Wall {
                    count += 1;
                }
            }
        }
        count
    }

    /// Apply `iterations` cellular-automaton passes.
    ///
    /// Each pass reads neighbor counts from a snapshot of the previous
    /// pass, never from partially updated cells — in-place updates
    /// would make the result depend on scan order. Rules per cell:
    /// at least `birth_threshold` wall neighbors → wall, fewer than
    /// `death_threshold` → open, otherwise unchanged. Borders stay
    /// walls every pass.
    pub fn smooth(&mut self, iterations: u32, birth_threshold: u32, death_threshold: u32) {
        for _ in 0..iterations {
            let mut next = self.grid.clone();
            for y in 0..self.height {
                for x in 0..self.width {
                    if self.grid.is_border(x, y) {
                        next.set(x, y, Cell::Wall);
                        continue;
                    }
                    let neighbors = self.count_wall_neighbors(x, y);
                    let cell = if neighbors >= birth_threshold {
                        Cell::Wall
                    } else if neighbors < death_threshold {
                        Cell::Open
                    } else {
                        self.grid.get(x, y)
                    };
                    next.set(x, y, cell);
                }
            }
            self.grid = next;
        }
    }

    /// Check that every open cell is reachable from every other via a
    /// 4-connected flood fill. A grid with no open cells is reported
    /// not connected — there is nowhere to start from.
    pub fn is_connected(&self) -> bool {
        // First open cell in row-major order seeds the fill.
        let start = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .find(|&(x, y)| self.grid.get(x, y) == Cell::Open);
        let Some((start_x, start_y)) = start else {
            return false;
        };

        let mut visited = vec![false; self.width * self.height];
        let mut queue = VecDeque::new();
        visited[start_y * self.width + start_x] = true;
        queue.push_back((start_x, start_y));
        let mut reachable = 0usize;

        while let Some((x, y)) = queue.pop_front() {
            reachable += 1;
            let neighbors = [
                (x as isize + 1, y as isize),
                (x as isize - 1, y as isize),
                (x as isize, y as isize + 1),
                (x as isize, y as isize - 1),
            ];
            for (nx, ny) in neighbors {
                if nx < 0 || nx >= self.width as isize || ny < 0 || ny >= self.height as isize {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if !visited[ny * self.width + nx] && self.grid.get(nx, ny) == Cell::Open {
                    visited[ny * self.width + nx] = true;
                    queue.push_back((nx, ny));
                }
            }
        }

        reachable == self.grid.open_count()
    }

    /// Check that the grid has enough open space for gameplay:
    /// open cells / total cells ≥ `min_open_ratio`.
    pub fn validate_open_space(&self, min_open_ratio: f32) -> bool {
        let total = (self.width * self.height) as f32;
        self.grid.open_count() as f32 / total >= min_open_ratio
    }

    /// All interior open cells, for entity placement by level assembly.
    /// Recomputed from the current grid on every call.
    pub fn open_positions(&self) -> Vec<GridPos> {
        let mut positions = Vec::new();
        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                if self.grid.get(x, y) == Cell::Open {
                    positions.push(GridPos { x, y });
                }
            }
        }
        positions
    }

    /// Generate a validated cavern, retrying with fresh noise up to
    /// `max_attempts` times. The RNG is re-seeded from `seed`, so the
    /// same seed and parameters always reproduce the same grid.
    ///
    /// If no attempt passes both the connectivity and open-space
    /// checks, the grid from the final attempt is returned anyway —
    /// a bounded-probability degradation, not an error. Callers that
    /// need the guarantee can re-check [`is_connected`] and
    /// [`validate_open_space`] on the result.
    ///
    /// [`is_connected`]: CavernGenerator::is_connected
    /// [`validate_open_space`]: CavernGenerator::validate_open_space
    pub fn generate(&mut self, max_attempts: u32, seed: u64) -> &CavernGrid {
        self.rng = ChaCha8Rng::seed_from_u64(seed);

        for _ in 0..max_attempts {
            self.initialize_grid(self.density);
            self.smooth(
                config::ITERATIONS,
                config::BIRTH_THRESHOLD,
                config::DEATH_THRESHOLD,
            );
            if self.is_connected() && self.validate_open_space(config::MIN_OPEN_SPACE) {
                return &self.grid;
            }
        }

        log::warn!(
            "failed to generate valid cavern after {} attempts, keeping last grid",
            max_attempts
        );
        &self.grid
    }
}
