//! A* pathfinding over an occupancy grid rasterized from wall geometry.
//!
//! A [`NavGrid`] is built once per level from world-space wall
//! rectangles and answers point-to-point shortest-path queries for
//! pursuit AI. It is independent of the cavern grid and uses its own
//! (usually coarser) resolution; the only thing the two share is the
//! wall geometry that level assembly feeds in.
//!
//! "No path" is a normal result (`None`), not an error — callers are
//! expected to fall back to direct pursuit.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Axis-aligned wall rectangle in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One step of a path: the world-space center of a walkable cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f32,
    pub y: f32,
}

/// State of one pathfinding cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavCell {
    Walkable,
    Blocked,
}

/// Coarse walkable/blocked grid with A* path queries.
pub struct NavGrid {
    cell_size: f32,
    width: usize,
    height: usize,
    cells: Vec<NavCell>,
}

impl NavGrid {
    /// Create an empty grid. `cell_size` is the edge length of one
    /// pathfinding cell in world units.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not positive.
    pub fn new(cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "cell size must be positive, got {}", cell_size);
        Self {
            cell_size,
            width: 0,
            height: 0,
            cells: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether (x, y) is inside the grid and not blocked.
    pub fn is_walkable(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x] == NavCell::Walkable
    }

    /// Rasterize wall rectangles into a fresh grid covering
    /// `world_width` × `world_height`. Every cell a rectangle overlaps
    /// is marked blocked; rectangles may span several cells. The
    /// rectangles are not retained. Expected to be called once per
    /// level, before any path query.
    pub fn build_grid(&mut self, walls: &[WallRect], world_width: f32, world_height: f32) {
        self.width = (world_width / self.cell_size).ceil() as usize;
        self.height = (world_height / self.cell_size).ceil() as usize;
        self.cells = vec![NavCell::Walkable; self.width * self.height];

        for wall in walls {
            let start_x = (wall.x / self.cell_size).floor().max(0.0) as usize;
            let start_y = (wall.y / self.cell_size).floor().max(0.0) as usize;
            let end_x = ((wall.x + wall.width) / self.cell_size).ceil().max(0.0) as usize;
            let end_y = ((wall.y + wall.height) / self.cell_size).ceil().max(0.0) as usize;

            for y in start_y..end_y.min(self.height) {
                for x in start_x..end_x.min(self.width) {
                    self.cells[y * self.width + x] = NavCell::Blocked;
                }
            }
        }

        log::info!(
            "built {}×{} nav grid ({} world units per cell, {} walls)",
            self.width,
            self.height,
            self.cell_size,
            walls.len()
        );
    }

    /// Find the shortest 4-connected path between two world-space
    /// points. Returns the waypoints (cell centers) from the start
    /// cell to the goal cell inclusive, or `None` when either endpoint
    /// falls outside the grid, either endpoint's cell is blocked, or
    /// no walkable route exists.
    ///
    /// A* with unit edge cost and the Manhattan heuristic, which is
    /// admissible on a 4-connected grid, so returned paths have
    /// minimal step count. Equal f-scores break toward the lower
    /// heuristic, then earlier insertion, keeping path choice
    /// deterministic among equal-cost alternatives.
    pub fn find_path(
        &self,
        start_x: f32,
        start_y: f32,
        target_x: f32,
        target_y: f32,
    ) -> Option<Vec<Waypoint>> {
        let start = self.to_cell(start_x, start_y)?;
        let goal = self.to_cell(target_x, target_y)?;
        if !self.is_walkable(start.0, start.1) || !self.is_walkable(goal.0, goal.1) {
            return None;
        }

        let start_idx = start.1 * self.width + start.0;
        let goal_idx = goal.1 * self.width + goal.0;

        let mut g_score = vec![u32::MAX; self.cells.len()];
        let mut came_from = vec![usize::MAX; self.cells.len()];
        let mut closed = vec![false; self.cells.len()];
        // Min-heap entries: (f, h, insertion order, cell index).
        let mut open: BinaryHeap<Reverse<(u32, u32, u32, usize)>> = BinaryHeap::new();
        let mut insertions: u32 = 0;

        let h0 = manhattan(start, goal);
        g_score[start_idx] = 0;
        open.push(Reverse((h0, h0, insertions, start_idx)));

        while let Some(Reverse((_, _, _, idx))) = open.pop() {
            if closed[idx] {
                continue; // stale entry superseded by a shorter path
            }
            if idx == goal_idx {
                return Some(self.reconstruct(&came_from, idx));
            }
            closed[idx] = true;

            let (x, y) = (idx % self.width, idx / self.width);
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
                let nidx = ny * self.width + nx;
                if self.cells[nidx] == NavCell::Blocked || closed[nidx] {
                    continue;
                }

                let tentative = g_score[idx] + 1;
                if tentative < g_score[nidx] {
                    came_from[nidx] = idx;
                    g_score[nidx] = tentative;
                    let h = manhattan((nx, ny), goal);
                    insertions += 1;
                    open.push(Reverse((tentative + h, h, insertions, nidx)));
                }
            }
        }

        None
    }

    /// Convert a world coordinate to a grid cell, `None` if outside.
    fn to_cell(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let cx = (x / self.cell_size).floor() as usize;
        let cy = (y / self.cell_size).floor() as usize;
        if cx >= self.width || cy >= self.height {
            return None;
        }
        Some((cx, cy))
    }

    /// World-space center of a grid cell.
    fn cell_center(&self, x: usize, y: usize) -> Waypoint {
        Waypoint {
            x: x as f32 * self.cell_size + self.cell_size / 2.0,
            y: y as f32 * self.cell_size + self.cell_size / 2.0,
        }
    }

    /// Walk the predecessor chain back from the goal and reverse it.
    fn reconstruct(&self, came_from: &[usize], goal_idx: usize) -> Vec<Waypoint> {
        let mut path = Vec::new();
        let mut idx = goal_idx;
        loop {
            path.push(self.cell_center(idx % self.width, idx / self.width));
            if came_from[idx] == usize::MAX {
                break;
            }
            idx = came_from[idx];
        }
        path.reverse();
        path
    }
}

fn manhattan(a: (usize, usize), b: (usize, usize)) -> u32 {
    (a.0.abs_diff(b.0) + a.1.abs_diff(b.1)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 20×20 grid of 10-unit cells over a 200×200 world.
    fn open_grid() -> NavGrid {
        let mut grid = NavGrid::new(10.0);
        grid.build_grid(&[], 200.0, 200.0);
        grid
    }

    fn rect(x: f32, y: f32, w: f32, h: f32) -> WallRect {
        WallRect {
            x,
            y,
            width: w,
            height: h,
        }
    }

    #[test]
    #[should_panic]
    fn test_rejects_non_positive_cell_size() {
        NavGrid::new(0.0);
    }

    #[test]
    fn test_grid_dimensions_round_up() {
        let mut grid = NavGrid::new(50.0);
        grid.build_grid(&[], 1601.0, 1550.0);
        assert_eq!(grid.width(), 33);
        assert_eq!(grid.height(), 31);
    }

    #[test]
    fn test_rect_blocks_every_overlapped_cell() {
        let mut grid = NavGrid::new(10.0);
        // Spans cells (0..3, 0..3)
        grid.build_grid(&[rect(5.0, 5.0, 20.0, 20.0)], 100.0, 100.0);
        for y in 0..3 {
            for x in 0..3 {
                assert!(!grid.is_walkable(x, y), "({}, {}) should be blocked", x, y);
            }
        }
        assert!(grid.is_walkable(3, 0));
        assert!(grid.is_walkable(0, 3));
    }

    #[test]
    fn test_rect_clipped_to_bounds() {
        let mut grid = NavGrid::new(10.0);
        grid.build_grid(&[rect(-20.0, -20.0, 500.0, 45.0)], 100.0, 100.0);
        for x in 0..10 {
            assert!(!grid.is_walkable(x, 0));
            assert!(!grid.is_walkable(x, 2));
            assert!(grid.is_walkable(x, 3));
        }
    }

    #[test]
    fn test_open_grid_path_is_optimal() {
        let grid = open_grid();
        // Cell (1,1) → cell (18,18): Manhattan distance 34, 35 waypoints.
        let path = grid.find_path(15.0, 15.0, 185.0, 185.0).unwrap();
        assert_eq!(path.len(), 35);
        assert_eq!(path[0], Waypoint { x: 15.0, y: 15.0 });
        assert_eq!(path[34], Waypoint { x: 185.0, y: 185.0 });
    }

    #[test]
    fn test_consecutive_waypoints_adjacent() {
        let grid = open_grid();
        let path = grid.find_path(15.0, 15.0, 185.0, 105.0).unwrap();
        for pair in path.windows(2) {
            let dx = (pair[1].x - pair[0].x).abs();
            let dy = (pair[1].y - pair[0].y).abs();
            // Exactly one axis moves, by exactly one cell.
            assert_eq!(dx + dy, 10.0);
        }
    }

    #[test]
    fn test_same_cell_path() {
        let grid = open_grid();
        let path = grid.find_path(15.0, 15.0, 17.0, 12.0).unwrap();
        assert_eq!(path, vec![Waypoint { x: 15.0, y: 15.0 }]);
    }

    #[test]
    fn test_out_of_bounds_endpoints() {
        let grid = open_grid();
        assert_eq!(grid.find_path(-5.0, 15.0, 185.0, 185.0), None);
        assert_eq!(grid.find_path(15.0, 15.0, 185.0, 500.0), None);
    }

    #[test]
    fn test_blocked_endpoints() {
        let mut grid = NavGrid::new(10.0);
        grid.build_grid(
            &[rect(10.0, 10.0, 10.0, 10.0), rect(180.0, 180.0, 10.0, 10.0)],
            200.0,
            200.0,
        );
        // Start in blocked cell (1,1)
        assert_eq!(grid.find_path(15.0, 15.0, 105.0, 105.0), None);
        // Goal in blocked cell (18,18)
        assert_eq!(grid.find_path(105.0, 105.0, 185.0, 185.0), None);
    }

    #[test]
    fn test_full_divider_splits_grid() {
        let mut grid = NavGrid::new(10.0);
        // Wall spanning the full height at x = 100..110
        grid.build_grid(&[rect(100.0, 0.0, 10.0, 200.0)], 200.0, 200.0);
        assert_eq!(grid.find_path(15.0, 100.0, 185.0, 100.0), None);
    }

    #[test]
    fn test_divider_with_gap_routes_around() {
        let mut grid = NavGrid::new(10.0);
        // Same divider but the bottom row stays open.
        grid.build_grid(&[rect(100.0, 0.0, 10.0, 190.0)], 200.0, 200.0);
        let path = grid.find_path(15.0, 100.0, 185.0, 100.0).unwrap();
        // Must detour through the gap at y = 19, so it is longer than
        // the 18-step Manhattan distance.
        assert!(path.len() > 19);
        // The detour passes through the open bottom row.
        assert!(path.iter().any(|w| w.y == 195.0));
    }

    #[test]
    fn test_waypoints_are_walkable_cells() {
        let mut grid = NavGrid::new(10.0);
        grid.build_grid(
            &[
                rect(40.0, 0.0, 10.0, 150.0),
                rect(100.0, 50.0, 10.0, 150.0),
                rect(150.0, 0.0, 10.0, 100.0),
            ],
            200.0,
            200.0,
        );
        let path = grid.find_path(15.0, 15.0, 185.0, 185.0).unwrap();
        for w in &path {
            let cx = (w.x / 10.0).floor() as usize;
            let cy = (w.y / 10.0).floor() as usize;
            assert!(grid.is_walkable(cx, cy), "waypoint off walkable grid: {:?}", w);
        }
    }

    #[test]
    fn test_query_before_build_finds_nothing() {
        let grid = NavGrid::new(10.0);
        assert_eq!(grid.find_path(5.0, 5.0, 50.0, 50.0), None);
    }

    #[test]
    fn test_deterministic_among_equal_cost_paths() {
        // Many shortest paths exist on an open grid; the tie-break
        // must pick the same one every time.
        let grid = open_grid();
        let a = grid.find_path(15.0, 15.0, 185.0, 185.0).unwrap();
        let b = grid.find_path(15.0, 15.0, 185.0, 185.0).unwrap();
        assert_eq!(a, b);
    }
}
