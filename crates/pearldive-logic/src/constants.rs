//! Game constants — cavern tuning, world layout, pathfinding grid.
//!
//! Simple consts with no engine dependency. Both the game client and
//! the native simtest use these.

pub mod cavern {
    /// Probability an interior cell starts as a wall.
    pub const INITIAL_DENSITY: f32 = 0.40;
    /// Cellular-automaton smoothing passes.
    pub const ITERATIONS: u32 = 5;
    /// A cell with at least this many wall neighbors becomes a wall.
    pub const BIRTH_THRESHOLD: u32 = 5;
    /// A cell with fewer wall neighbors than this becomes open.
    pub const DEATH_THRESHOLD: u32 = 3;
    /// Minimum fraction of open cells for an accepted cavern.
    pub const MIN_OPEN_SPACE: f32 = 0.50;
    /// Generation retries before settling for the last attempt.
    pub const MAX_ATTEMPTS: u32 = 10;
}

pub mod world {
    /// Edge length of one cavern tile in world units.
    pub const TILE_SIZE: f32 = 32.0;
    pub const GRID_WIDTH: usize = 50;
    pub const GRID_HEIGHT: usize = 50;
}

pub mod nav {
    /// Edge length of one pathfinding cell in world units. Two cavern
    /// tiles per cell: coarser means faster search, and the alignment
    /// keeps cells from straddling wall tiles and over-blocking.
    pub const CELL_SIZE: f32 = 64.0;
    /// Recommended interval between path re-queries, in milliseconds.
    /// Throttling is caller policy; the grid itself never rate-limits.
    pub const PATHFINDING_UPDATE_MS: u32 = 500;
}
