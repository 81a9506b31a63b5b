//! # Pathfinding Algorithms
//!
//! Breadth-first search over a tile grid, 4-directional.

use crate::game::{Position, TileGrid};
use ::pathfinding::prelude::bfs;

/// Shortest 4-directional path from `start` to `goal` over non-blocked tiles.
///
/// The start is excluded and the goal included. Returns an empty path when
/// the goal is unreachable, blocked, or equal to the start.
///
/// # Examples
///
/// ```
/// use delve::{grid_path, Position, TileGrid, TileType};
///
/// let grid = TileGrid::filled(5, 1, TileType::Floor);
/// let path = grid_path(&grid, Position::new(0, 0), Position::new(3, 0));
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.last(), Some(&Position::new(3, 0)));
/// ```
pub fn grid_path(grid: &TileGrid, start: Position, goal: Position) -> Vec<Position> {
    if start == goal || !grid.in_bounds(start) || grid.is_blocked(goal) {
        return Vec::new();
    }

    let found = bfs(
        &start,
        |pos: &Position| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|next| !grid.is_blocked(*next))
                .collect::<Vec<_>>()
        },
        |pos: &Position| *pos == goal,
    );

    match found {
        Some(mut path) => {
            path.remove(0);
            path
        }
        None => Vec::new(),
    }
}

/// Whether a non-empty path exists between two positions.
pub fn grid_path_exists(grid: &TileGrid, start: Position, goal: Position) -> bool {
    !grid_path(grid, start, goal).is_empty()
}
