//! # Grid Mathematics
//!
//! Line rasterization used by line-of-sight queries.

use crate::game::Position;

/// Cells on the Bresenham line from `from` to `to`, both ends included.
///
/// # Examples
///
/// ```
/// use delve::{bresenham_line, Position};
///
/// let line = bresenham_line(Position::new(0, 0), Position::new(4, 2));
/// assert_eq!(line.first(), Some(&Position::new(0, 0)));
/// assert_eq!(line.last(), Some(&Position::new(4, 2)));
/// assert_eq!(line.len(), 5);
/// ```
pub fn bresenham_line(from: Position, to: Position) -> Vec<Position> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };

    let mut line = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);

    loop {
        line.push(Position::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    line
}
