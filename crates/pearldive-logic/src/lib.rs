//! Pure core logic for PearlDive.
//!
//! This crate contains the level-generation and pathfinding core of the
//! game, independent of any engine or renderer. Functions take plain
//! data and return results, making them unit-testable and portable
//! between the game client and the native simtest harness.
//!
//! The two components are deliberately independent: level assembly asks
//! [`cavern`] for a validated wall/open grid, turns the wall cells into
//! world-space rectangles, and feeds those into [`navgrid`]. The two
//! grids use separate coordinate systems and resolutions and never read
//! each other's state.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`cavern`] | Cellular-automaton cavern generation with a seeded per-generator RNG |
//! | [`constants`] | Tuning constants for generation, world layout, and the nav grid |
//! | [`navgrid`] | A* pathfinding over an occupancy grid rasterized from wall rectangles |

pub mod cavern;
pub mod constants;
pub mod navgrid;
