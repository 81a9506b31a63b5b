//! # Dungeon Map
//!
//! The aggregate root: grid, rooms, fog-of-war mode and the single party
//! position. Engines borrow it explicitly; it holds no engine state itself.

use crate::game::{
    Direction, MapRoom, Position, RoomContents, RoomGraph, RoomSummary, Tile, TileGrid, TileType,
};
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

/// How much of the map the party gets to see.
///
/// Ordered from most to least permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FogMode {
    /// Everything is visible
    None,
    /// The current room is seen; connected corridors and rooms are revealed
    #[default]
    Partial,
    /// Only rooms the party has stood in are visible
    Full,
}

impl FogMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FogMode::None => "none",
            FogMode::Partial => "partial",
            FogMode::Full => "full",
        }
    }
}

impl fmt::Display for FogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FogMode {
    type Err = DelveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(FogMode::None),
            "partial" => Ok(FogMode::Partial),
            "full" => Ok(FogMode::Full),
            _ => Err(DelveError::InvalidFogMode(s.to_string())),
        }
    }
}

/// Where the party stands, which way it faces and which room it is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyPosition {
    pub x: i32,
    pub y: i32,
    pub facing: Direction,
    pub room_id: Option<u32>,
}

impl PartyPosition {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// A generated dungeon level and everything this core tracks about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonMap {
    pub width: u32,
    pub height: u32,
    pub tiles: TileGrid,
    pub rooms: RoomGraph,
    pub fog_of_war_mode: FogMode,
    pub party: Option<PartyPosition>,
}

impl DungeonMap {
    /// Creates a map of `empty` tiles with no rooms.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{DungeonMap, FogMode};
    ///
    /// let map = DungeonMap::new(20, 10);
    /// assert_eq!(map.tiles.len(), 200);
    /// assert_eq!(map.fog_of_war_mode, FogMode::Partial);
    /// assert!(map.party.is_none());
    /// ```
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: TileGrid::new(width, height),
            rooms: RoomGraph::new(),
            fog_of_war_mode: FogMode::default(),
            party: None,
        }
    }

    /// Assembles a map from already built parts.
    pub fn from_parts(tiles: TileGrid, rooms: RoomGraph, fog_of_war_mode: FogMode) -> Self {
        Self {
            width: tiles.width(),
            height: tiles.height(),
            tiles,
            rooms,
            fog_of_war_mode,
            party: None,
        }
    }

    /// Adds a room and paints it onto the grid.
    pub fn add_room(&mut self, room: MapRoom) {
        self.tiles.paint_room(&room);
        self.rooms.push(room);
    }

    /// The room whose tiles include `pos`, resolved through the tile's back-reference.
    pub fn room_at(&self, pos: Position) -> Option<&MapRoom> {
        self.room_id_at(pos).and_then(|room_id| self.rooms.get(room_id))
    }

    pub fn room_id_at(&self, pos: Position) -> Option<u32> {
        self.tiles.get(pos).and_then(|tile| tile.room_id)
    }

    /// The current party position or `NoPartyPosition`.
    pub fn party_position(&self) -> DelveResult<Position> {
        self.party
            .map(|party| party.position())
            .ok_or(DelveError::NoPartyPosition)
    }

    /// Puts the party on the map without running any engine logic.
    pub fn set_party(&mut self, position: Position, facing: Direction) {
        let room_id = self.room_id_at(position);
        self.party = Some(PartyPosition {
            x: position.x,
            y: position.y,
            facing,
            room_id,
        });
    }

    pub fn tile(&self, pos: Position) -> DelveResult<&Tile> {
        self.tiles.tile(pos)
    }

    /// Applies a tile change coming from gameplay. Idempotent.
    pub fn set_tile_type(&mut self, pos: Position, tile_type: TileType) -> DelveResult<()> {
        self.tiles.set_type(pos, tile_type)
    }

    /// Records that a secret door has been found. Idempotent.
    pub fn discover_secret_door(&mut self, pos: Position) -> DelveResult<()> {
        let tile = self.tiles.tile_mut(pos)?;
        if tile.tile_type != TileType::DoorSecret {
            return Err(DelveError::InvalidState(format!(
                "no secret door at {pos}, found {}",
                tile.tile_type
            )));
        }
        tile.mark_discovered();
        Ok(())
    }

    /// Turns a locked door into a closed one. Already unlocked doors are left alone.
    pub fn unlock_door(&mut self, pos: Position) -> DelveResult<()> {
        self.replace_tile(pos, TileType::DoorLocked, TileType::DoorClosed)
    }

    /// Disables an armed trap. Already disabled traps are left alone.
    pub fn disarm_trap(&mut self, pos: Position) -> DelveResult<()> {
        self.replace_tile(pos, TileType::Trap, TileType::TrapDisabled)
    }

    /// Opens a closed chest. Already open chests are left alone.
    pub fn open_chest(&mut self, pos: Position) -> DelveResult<()> {
        self.replace_tile(pos, TileType::Chest, TileType::ChestOpen)
    }

    fn replace_tile(&mut self, pos: Position, from: TileType, to: TileType) -> DelveResult<()> {
        let tile = self.tiles.tile_mut(pos)?;
        if tile.tile_type == from {
            tile.tile_type = to;
            Ok(())
        } else if tile.tile_type == to {
            Ok(())
        } else {
            Err(DelveError::InvalidState(format!(
                "expected {from} at {pos}, found {}",
                tile.tile_type
            )))
        }
    }

    /// Mutable access to the externally owned contents of a room.
    pub fn room_contents_mut(&mut self, room_id: u32) -> DelveResult<&mut RoomContents> {
        Ok(&mut self.rooms.room_mut(room_id)?.contents)
    }

    /// Marks a room's enemies as dealt with.
    pub fn mark_room_cleared(&mut self, room_id: u32) -> DelveResult<()> {
        self.room_contents_mut(room_id)?.cleared = true;
        Ok(())
    }

    /// Per-room summaries for UI state sync.
    pub fn room_summaries(&self) -> Vec<RoomSummary> {
        self.rooms.summaries()
    }

    /// Writes the map as JSON.
    pub fn write_json<W: Write>(&self, writer: W) -> DelveResult<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Reads a map previously written with [`DungeonMap::write_json`].
    pub fn read_json<R: Read>(reader: R) -> DelveResult<Self> {
        let map: DungeonMap = serde_json::from_reader(reader)?;
        map.validate()?;
        Ok(map)
    }

    /// Checks cross-structure consistency after deserialization.
    pub fn validate(&self) -> DelveResult<()> {
        if self.width != self.tiles.width() || self.height != self.tiles.height() {
            return Err(DelveError::InvalidState(format!(
                "map is {}x{} but grid is {}x{}",
                self.width,
                self.height,
                self.tiles.width(),
                self.tiles.height()
            )));
        }
        if let Some((room_id, target)) = self.rooms.first_unreciprocated() {
            return Err(DelveError::InvalidState(format!(
                "connection {room_id} -> {target} has no reciprocal"
            )));
        }
        if let Some(tile) = self
            .tiles
            .iter()
            .find(|tile| tile.room_id.is_some_and(|id| self.rooms.get(id).is_none()))
        {
            return Err(DelveError::InvalidState(format!(
                "tile {} references a missing room",
                tile.position()
            )));
        }
        Ok(())
    }
}
