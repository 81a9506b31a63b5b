//! # Tile Grid
//!
//! The addressable 2D array of tiles with bounds-checked accessors.

use crate::game::{MapRoom, Position, Tile, TileType};
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};

/// Row-major grid of tiles covering `width × height` cells.
///
/// Every in-bounds cell has exactly one tile whose `x, y` match its slot.
/// Cells outside the grid do not exist and are reported as blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TileGridRecord", into = "TileGridRecord")]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

#[derive(Serialize, Deserialize)]
struct TileGridRecord {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TryFrom<TileGridRecord> for TileGrid {
    type Error = DelveError;

    fn try_from(record: TileGridRecord) -> Result<Self, Self::Error> {
        TileGrid::from_tiles(record.width, record.height, record.tiles)
    }
}

impl From<TileGrid> for TileGridRecord {
    fn from(grid: TileGrid) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            tiles: grid.tiles,
        }
    }
}

impl TileGrid {
    /// Creates a grid where every cell is `empty`.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{TileGrid, Position, TileType};
    ///
    /// let grid = TileGrid::new(4, 3);
    /// assert_eq!(grid.len(), 12);
    /// assert_eq!(grid.get(Position::new(3, 2)).unwrap().tile_type, TileType::Empty);
    /// assert!(grid.get(Position::new(4, 0)).is_none());
    /// ```
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TileType::Empty)
    }

    /// Creates a grid with every cell set to `tile_type`.
    pub fn filled(width: u32, height: u32, tile_type: TileType) -> Self {
        let mut tiles = Vec::with_capacity(cell_count(width, height));
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                tiles.push(Tile::new(x, y, tile_type));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Rebuilds a grid from row-major tile records, validating their coordinates.
    pub fn from_tiles(width: u32, height: u32, tiles: Vec<Tile>) -> DelveResult<Self> {
        let expected = cell_count(width, height);
        if tiles.len() != expected {
            return Err(DelveError::InvalidState(format!(
                "grid {width}x{height} needs {expected} tiles, got {}",
                tiles.len()
            )));
        }

        for (index, tile) in tiles.iter().enumerate() {
            let x = (index % width as usize) as i32;
            let y = (index / width as usize) as i32;
            if tile.x != x || tile.y != y {
                return Err(DelveError::InvalidState(format!(
                    "tile at slot ({x}, {y}) claims position ({}, {})",
                    tile.x, tile.y
                )));
            }
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of tiles in the grid.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Checks whether a position lies inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Gets the tile at a position, if it exists.
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        self.index(pos).map(|index| &self.tiles[index])
    }

    /// Gets a mutable tile at a position, if it exists.
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        self.index(pos).map(move |index| &mut self.tiles[index])
    }

    /// Gets the tile at a position or reports `TileNotFound`.
    pub fn tile(&self, pos: Position) -> DelveResult<&Tile> {
        self.get(pos).ok_or(DelveError::TileNotFound { x: pos.x, y: pos.y })
    }

    /// Gets a mutable tile at a position or reports `TileNotFound`.
    pub fn tile_mut(&mut self, pos: Position) -> DelveResult<&mut Tile> {
        self.get_mut(pos)
            .ok_or(DelveError::TileNotFound { x: pos.x, y: pos.y })
    }

    /// Type of the tile at a position, if it exists.
    pub fn tile_type(&self, pos: Position) -> Option<TileType> {
        self.get(pos).map(|tile| tile.tile_type)
    }

    /// Sets the type of an existing tile. Flags and room back-reference are kept.
    pub fn set_type(&mut self, pos: Position, tile_type: TileType) -> DelveResult<()> {
        self.tile_mut(pos)?.tile_type = tile_type;
        Ok(())
    }

    /// Paints a room's rectangle: border cells become walls, interior cells floor.
    ///
    /// Cells outside the grid are skipped. Every painted tile takes the
    /// room's id as its back-reference.
    pub fn paint_room(&mut self, room: &MapRoom) {
        for pos in room.bounds.positions() {
            let tile_type = if room.bounds.is_border(pos) {
                TileType::Wall
            } else {
                TileType::Floor
            };
            if let Some(tile) = self.get_mut(pos) {
                tile.tile_type = tile_type;
                tile.room_id = Some(room.room_id);
            }
        }
    }

    /// Whether movement into `pos` is forbidden.
    ///
    /// Missing tiles count as blocked, as do walls, pits and empty cells.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.get(pos).map(Tile::is_blocking).unwrap_or(true)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// Tiles of one row, left to right.
    pub fn row(&self, y: i32) -> &[Tile] {
        if y < 0 || y >= self.height as i32 {
            return &[];
        }
        let start = y as usize * self.width as usize;
        &self.tiles[start..start + self.width as usize]
    }
}

/// Number of cells in a `width` x `height` grid, widened before multiplying.
fn cell_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}
