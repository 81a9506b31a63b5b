//! # Room Layout
//!
//! Positions room rectangles in map space. Layouts only place rooms: they do
//! not prevent overlap and may put bounds at negative coordinates.
//! [`fit_layout`] then shifts the result onto the grid and grows the map
//! where a layout overflows it.

use crate::config::{BRANCH_GAP, LINEAR_GAP, ORGANIC_JITTER};
use crate::game::{Bounds, Direction};
use crate::generation::LayoutStrategy;
use rand::rngs::StdRng;
use rand::Rng;

/// Outer room dimensions, walls included.
pub type RoomSize = (i32, i32);

/// Lays out rooms of the given sizes with `strategy`, in room order.
///
/// # Examples
///
/// ```
/// use delve::{layout_rooms, LayoutStrategy};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(3);
/// let bounds = layout_rooms(LayoutStrategy::Linear, &[(5, 5), (7, 5)], 40, 20, &mut rng);
/// assert_eq!(bounds[1].x1 - bounds[0].x2 - 1, 3);
/// ```
pub fn layout_rooms(
    strategy: LayoutStrategy,
    sizes: &[RoomSize],
    map_width: u32,
    map_height: u32,
    rng: &mut StdRng,
) -> Vec<Bounds> {
    let (map_width, map_height) = (map_width as i32, map_height as i32);
    match strategy {
        LayoutStrategy::Linear => linear_layout(sizes, map_height),
        LayoutStrategy::Vertical => vertical_layout(sizes, map_width),
        LayoutStrategy::Branching => branching_layout(sizes, map_height, rng),
        LayoutStrategy::Organic => organic_layout(sizes, map_height, rng),
        LayoutStrategy::Symmetrical => symmetrical_layout(sizes, map_width),
    }
}

/// Rooms left to right, `LINEAR_GAP` cells apart, centered vertically.
pub fn linear_layout(sizes: &[RoomSize], map_height: i32) -> Vec<Bounds> {
    let mut placed = Vec::with_capacity(sizes.len());
    let mut x = 1;
    for &(width, height) in sizes {
        let y = map_height / 2 - height / 2;
        placed.push(Bounds::from_origin(x, y, width, height));
        x += width + LINEAR_GAP;
    }
    placed
}

/// Rooms top to bottom, `LINEAR_GAP` cells apart, centered horizontally.
pub fn vertical_layout(sizes: &[RoomSize], map_width: i32) -> Vec<Bounds> {
    let mut placed = Vec::with_capacity(sizes.len());
    let mut y = 1;
    for &(width, height) in sizes {
        let x = map_width / 2 - width / 2;
        placed.push(Bounds::from_origin(x, y, width, height));
        y += height + LINEAR_GAP;
    }
    placed
}

/// Shifts a layout so every room starts at column and row 1 or later, and
/// returns map dimensions that hold every room with a one-cell margin.
///
/// The map only ever grows; it is never shrunk to fit.
pub fn fit_layout(bounds: &mut [Bounds], map_width: u32, map_height: u32) -> (u32, u32) {
    let min_x = bounds.iter().map(|b| b.x1).min().unwrap_or(1);
    let min_y = bounds.iter().map(|b| b.y1).min().unwrap_or(1);
    let (dx, dy) = ((1 - min_x).max(0), (1 - min_y).max(0));
    if dx != 0 || dy != 0 {
        for b in bounds.iter_mut() {
            *b = b.translated(dx, dy);
        }
    }

    let max_x = bounds.iter().map(|b| b.x2).max().unwrap_or(0);
    let max_y = bounds.iter().map(|b| b.y2).max().unwrap_or(0);
    (
        map_width.max((max_x + 2) as u32),
        map_height.max((max_y + 2) as u32),
    )
}

/// Directions branch rooms attach in, repeating.
const BRANCH_DIRECTIONS: [Direction; 3] = [Direction::East, Direction::North, Direction::South];

/// First room at the west edge; every later room hangs off a random earlier one.
pub fn branching_layout(sizes: &[RoomSize], map_height: i32, rng: &mut StdRng) -> Vec<Bounds> {
    let mut placed: Vec<Bounds> = Vec::with_capacity(sizes.len());
    for (index, &(width, height)) in sizes.iter().enumerate() {
        if index == 0 {
            placed.push(Bounds::from_origin(1, map_height / 2 - height / 2, width, height));
            continue;
        }

        let parent = placed[rng.gen_range(0..placed.len())];
        let center = parent.center();
        let direction = BRANCH_DIRECTIONS[(index - 1) % BRANCH_DIRECTIONS.len()];
        let (x, y) = match direction {
            Direction::East => (parent.x2 + 1 + BRANCH_GAP, center.y - height / 2),
            Direction::North => (center.x - width / 2, parent.y1 - BRANCH_GAP - height),
            Direction::South => (center.x - width / 2, parent.y2 + 1 + BRANCH_GAP),
            Direction::West => (parent.x1 - BRANCH_GAP - width, center.y - height / 2),
        };
        placed.push(Bounds::from_origin(x, y, width, height));
    }
    placed
}

/// Branching, then every room nudged by up to `ORGANIC_JITTER` on each axis.
pub fn organic_layout(sizes: &[RoomSize], map_height: i32, rng: &mut StdRng) -> Vec<Bounds> {
    branching_layout(sizes, map_height, rng)
        .into_iter()
        .map(|bounds| {
            let dx = rng.gen_range(-ORGANIC_JITTER..=ORGANIC_JITTER);
            let dy = rng.gen_range(-ORGANIC_JITTER..=ORGANIC_JITTER);
            bounds.translated(dx, dy)
        })
        .collect()
}

/// Rooms on a grid of `ceil(sqrt(n))` columns with uniform cells, centered
/// horizontally on the map when it fits.
pub fn symmetrical_layout(sizes: &[RoomSize], map_width: i32) -> Vec<Bounds> {
    if sizes.is_empty() {
        return Vec::new();
    }

    let columns = (sizes.len() as f64).sqrt().ceil() as i32;
    let max_width = sizes.iter().map(|size| size.0).max().unwrap_or(0);
    let max_height = sizes.iter().map(|size| size.1).max().unwrap_or(0);
    let cell_width = max_width + LINEAR_GAP;
    let cell_height = max_height + LINEAR_GAP;

    let grid_width = columns * cell_width - LINEAR_GAP;
    let offset_x = ((map_width - grid_width) / 2).max(1);

    sizes
        .iter()
        .enumerate()
        .map(|(index, &(width, height))| {
            let column = index as i32 % columns;
            let row = index as i32 / columns;
            let x = offset_x + column * cell_width + (max_width - width) / 2;
            let y = 1 + row * cell_height + (max_height - height) / 2;
            Bounds::from_origin(x, y, width, height)
        })
        .collect()
}
