//! # Sprite-Data Renderer
//!
//! Emits `{x, y, sprite_row, sprite_col, visibility_state}` records for
//! clients that draw from a tile sheet.
//!
//! ## Sheet layout
//!
//! | Row | Contents |
//! |-----|----------|
//! | 0 | floor variants |
//! | 1 | auto-tiled walls |
//! | 2 | doors: closed, open, locked, secret |
//! | 3 | features: stairs up/down, trap, disarmed trap, chest, open chest, altar, statue, pillar |
//! | 4 | terrain: water, pit |
//! | 5 | entities: party facing N/E/S/W, enemy, NPC |

use crate::game::{Direction, DungeonMap, Position, TileGrid, TileType, Visibility};
use crate::rendering::{apparent_type, content_markers, tile_visibility, MarkerKind, RenderOptions};
use serde::{Deserialize, Serialize};

pub const FLOOR_ROW: u32 = 0;
pub const WALL_ROW: u32 = 1;
pub const DOOR_ROW: u32 = 2;
pub const FEATURE_ROW: u32 = 3;
pub const TERRAIN_ROW: u32 = 4;
pub const ENTITY_ROW: u32 = 5;

/// Number of floor variants on the sheet.
pub const FLOOR_VARIANTS: u32 = 4;

/// One sprite to draw at a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRecord {
    pub x: i32,
    pub y: i32,
    pub sprite_row: u32,
    pub sprite_col: u32,
    pub visibility_state: Visibility,
}

/// Wall sprite variants, selected from which cardinal neighbours are walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallSprite {
    Isolated,
    Vertical,
    Horizontal,
    CornerTopLeft,
    CornerTopRight,
    CornerBottomLeft,
    CornerBottomRight,
    TeeEast,
    TeeWest,
    TeeSouth,
    TeeNorth,
    Cross,
}

const NORTH: u8 = 1;
const EAST: u8 = 2;
const SOUTH: u8 = 4;
const WEST: u8 = 8;

impl WallSprite {
    /// Picks the variant for a 4-bit neighbour mask (N=1, E=2, S=4, W=8).
    pub fn from_mask(mask: u8) -> Self {
        match mask & 0b1111 {
            0 => WallSprite::Isolated,
            m if m & (EAST | WEST) == 0 => WallSprite::Vertical,
            m if m & (NORTH | SOUTH) == 0 => WallSprite::Horizontal,
            m if m == SOUTH | EAST => WallSprite::CornerTopLeft,
            m if m == SOUTH | WEST => WallSprite::CornerTopRight,
            m if m == NORTH | EAST => WallSprite::CornerBottomLeft,
            m if m == NORTH | WEST => WallSprite::CornerBottomRight,
            m if m == NORTH | EAST | SOUTH => WallSprite::TeeEast,
            m if m == NORTH | WEST | SOUTH => WallSprite::TeeWest,
            m if m == EAST | SOUTH | WEST => WallSprite::TeeSouth,
            m if m == EAST | NORTH | WEST => WallSprite::TeeNorth,
            _ => WallSprite::Cross,
        }
    }

    pub fn sprite_col(self) -> u32 {
        self as u32
    }
}

fn looks_like_wall(grid: &TileGrid, pos: Position) -> bool {
    grid.get(pos)
        .is_some_and(|tile| apparent_type(tile) == TileType::Wall)
}

/// Neighbour mask for the wall at `pos`.
pub fn wall_mask(grid: &TileGrid, pos: Position) -> u8 {
    [
        (Direction::North, NORTH),
        (Direction::East, EAST),
        (Direction::South, SOUTH),
        (Direction::West, WEST),
    ]
    .into_iter()
    .filter(|(direction, _)| looks_like_wall(grid, pos.step(*direction)))
    .fold(0, |mask, (_, bit)| mask | bit)
}

/// Floor variant from a coordinate hash, stable across renders.
pub fn floor_variant(pos: Position) -> u32 {
    let hash = (pos.x as u32).wrapping_mul(73_856_093) ^ (pos.y as u32).wrapping_mul(19_349_663);
    // Mix high bits down so neighbouring cells differ
    (hash ^ (hash >> 13)) % FLOOR_VARIANTS
}

/// Sheet cell for a non-wall tile type. `None` for nothing to draw.
pub fn sheet_cell(tile_type: TileType, pos: Position) -> Option<(u32, u32)> {
    let cell = match tile_type {
        TileType::Floor => (FLOOR_ROW, floor_variant(pos)),
        TileType::DoorClosed => (DOOR_ROW, 0),
        TileType::DoorOpen => (DOOR_ROW, 1),
        TileType::DoorLocked => (DOOR_ROW, 2),
        TileType::DoorSecret => (DOOR_ROW, 3),
        TileType::StairsUp => (FEATURE_ROW, 0),
        TileType::StairsDown => (FEATURE_ROW, 1),
        TileType::Trap => (FEATURE_ROW, 2),
        TileType::TrapDisabled => (FEATURE_ROW, 3),
        TileType::Chest => (FEATURE_ROW, 4),
        TileType::ChestOpen => (FEATURE_ROW, 5),
        TileType::Altar => (FEATURE_ROW, 6),
        TileType::Statue => (FEATURE_ROW, 7),
        TileType::Pillar => (FEATURE_ROW, 8),
        TileType::Water => (TERRAIN_ROW, 0),
        TileType::Pit => (TERRAIN_ROW, 1),
        TileType::Wall | TileType::Empty => return None,
    };
    Some(cell)
}

fn party_col(facing: Direction) -> u32 {
    match facing {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}

/// Renders sprite records: shown tiles in row-major order, then content
/// markers, then the party.
pub fn render_sprites(map: &DungeonMap, options: &RenderOptions) -> Vec<SpriteRecord> {
    let mode = options.effective_fog_mode(map);
    let mut records = Vec::new();

    for tile in map.tiles.iter() {
        let visibility = tile_visibility(tile, mode);
        if visibility == Visibility::Hidden {
            continue;
        }
        let pos = tile.position();
        let cell = match apparent_type(tile) {
            TileType::Wall => Some((
                WALL_ROW,
                WallSprite::from_mask(wall_mask(&map.tiles, pos)).sprite_col(),
            )),
            other => sheet_cell(other, pos),
        };
        if let Some((sprite_row, sprite_col)) = cell {
            records.push(SpriteRecord {
                x: pos.x,
                y: pos.y,
                sprite_row,
                sprite_col,
                visibility_state: visibility,
            });
        }
    }

    if options.show_contents {
        for marker in content_markers(map, mode) {
            records.push(SpriteRecord {
                x: marker.position.x,
                y: marker.position.y,
                sprite_row: ENTITY_ROW,
                sprite_col: match marker.kind {
                    MarkerKind::Enemy => 4,
                    MarkerKind::Npc => 5,
                },
                visibility_state: Visibility::Visible,
            });
        }
    }

    if options.show_party {
        if let Some(party) = map.party {
            records.push(SpriteRecord {
                x: party.x,
                y: party.y,
                sprite_row: ENTITY_ROW,
                sprite_col: party_col(party.facing),
                visibility_state: Visibility::Visible,
            });
        }
    }

    records
}
