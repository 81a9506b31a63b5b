//! # Tiles
//!
//! A single grid cell, its closed set of types and the door flavours that
//! generation stamps onto room boundaries.

use crate::game::Position;
use crate::DelveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every kind of terrain a grid cell can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    Floor,
    Wall,
    DoorClosed,
    DoorOpen,
    DoorLocked,
    DoorSecret,
    StairsUp,
    StairsDown,
    Trap,
    TrapDisabled,
    Chest,
    ChestOpen,
    Water,
    Pit,
    Pillar,
    Altar,
    Statue,
    Empty,
}

impl TileType {
    /// All tile types, in declaration order.
    pub const ALL: [TileType; 18] = [
        TileType::Floor,
        TileType::Wall,
        TileType::DoorClosed,
        TileType::DoorOpen,
        TileType::DoorLocked,
        TileType::DoorSecret,
        TileType::StairsUp,
        TileType::StairsDown,
        TileType::Trap,
        TileType::TrapDisabled,
        TileType::Chest,
        TileType::ChestOpen,
        TileType::Water,
        TileType::Pit,
        TileType::Pillar,
        TileType::Altar,
        TileType::Statue,
        TileType::Empty,
    ];

    /// Whether the party may never stand on this tile.
    pub fn is_blocking(self) -> bool {
        matches!(self, TileType::Wall | TileType::Pit | TileType::Empty)
    }

    /// Whether this tile is any kind of door.
    pub fn is_door(self) -> bool {
        self.door_type().is_some()
    }

    /// The door flavour of a door tile.
    pub fn door_type(self) -> Option<DoorType> {
        match self {
            TileType::DoorClosed => Some(DoorType::Closed),
            TileType::DoorOpen => Some(DoorType::Open),
            TileType::DoorLocked => Some(DoorType::Locked),
            TileType::DoorSecret => Some(DoorType::Secret),
            _ => None,
        }
    }

    /// Wire name of the tile type.
    pub fn as_str(self) -> &'static str {
        match self {
            TileType::Floor => "floor",
            TileType::Wall => "wall",
            TileType::DoorClosed => "door_closed",
            TileType::DoorOpen => "door_open",
            TileType::DoorLocked => "door_locked",
            TileType::DoorSecret => "door_secret",
            TileType::StairsUp => "stairs_up",
            TileType::StairsDown => "stairs_down",
            TileType::Trap => "trap",
            TileType::TrapDisabled => "trap_disabled",
            TileType::Chest => "chest",
            TileType::ChestOpen => "chest_open",
            TileType::Water => "water",
            TileType::Pit => "pit",
            TileType::Pillar => "pillar",
            TileType::Altar => "altar",
            TileType::Statue => "statue",
            TileType::Empty => "empty",
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TileType {
    type Err = DelveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileType::ALL
            .into_iter()
            .find(|tile_type| tile_type.as_str() == s)
            .ok_or_else(|| DelveError::InvalidState(format!("unknown tile type '{s}'")))
    }
}

/// Door flavours assigned to room connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorType {
    #[default]
    Closed,
    Open,
    Locked,
    Secret,
}

impl DoorType {
    /// The tile stamped on the grid for this door.
    pub fn tile_type(self) -> TileType {
        match self {
            DoorType::Closed => TileType::DoorClosed,
            DoorType::Open => TileType::DoorOpen,
            DoorType::Locked => TileType::DoorLocked,
            DoorType::Secret => TileType::DoorSecret,
        }
    }
}

/// One grid cell.
///
/// `visited` always implies `revealed`; the flag setters maintain this and
/// deserialization normalizes records that violate it.
///
/// Serializes to the wire record
/// `{x, y, type, room_id, visited, revealed, discovered}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TileRecord")]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub tile_type: TileType,
    /// Back-reference to the room this tile was painted for
    pub room_id: Option<u32>,
    visited: bool,
    revealed: bool,
    /// Set once a secret door has been found
    discovered: bool,
}

#[derive(Deserialize)]
struct TileRecord {
    x: i32,
    y: i32,
    #[serde(rename = "type")]
    tile_type: TileType,
    room_id: Option<u32>,
    visited: bool,
    revealed: bool,
    discovered: bool,
}

impl From<TileRecord> for Tile {
    fn from(record: TileRecord) -> Self {
        Self {
            x: record.x,
            y: record.y,
            tile_type: record.tile_type,
            room_id: record.room_id,
            visited: record.visited,
            revealed: record.revealed || record.visited,
            discovered: record.discovered,
        }
    }
}

impl Tile {
    /// Creates an unseen tile of the given type.
    pub fn new(x: i32, y: i32, tile_type: TileType) -> Self {
        Self {
            x,
            y,
            tile_type,
            room_id: None,
            visited: false,
            revealed: false,
            discovered: false,
        }
    }

    /// Creates an empty (non-existent terrain) tile.
    pub fn empty(x: i32, y: i32) -> Self {
        Self::new(x, y, TileType::Empty)
    }

    /// Position of this tile.
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_discovered(&self) -> bool {
        self.discovered
    }

    /// Whether the party cannot stand here.
    pub fn is_blocking(&self) -> bool {
        self.tile_type.is_blocking()
    }

    /// Marks the tile as seen first hand. Also reveals it.
    pub fn mark_visited(&mut self) {
        self.visited = true;
        self.revealed = true;
    }

    /// Marks the tile as known about without having been seen first hand.
    pub fn mark_revealed(&mut self) {
        self.revealed = true;
    }

    /// Forgets the tile entirely.
    pub fn hide(&mut self) {
        self.visited = false;
        self.revealed = false;
    }

    /// Records that a secret door here has been found.
    pub fn mark_discovered(&mut self) {
        self.discovered = true;
    }
}
