//! # Fog of War
//!
//! Owns the three visibility modes and the per-tile `visited`/`revealed`
//! flags, and answers line-of-sight queries.
//!
//! Flags only ever grow as the party explores. Switching to a stricter mode
//! changes what counts as visible, never what the party has already seen.
//! The only way to forget tiles is an explicit [`FogOfWarEngine::hide_room`].

use crate::game::{Bounds, DungeonMap, FogMode, Position, Tile, TileGrid, TileType};
use crate::utils::bresenham_line;
use crate::{DelveError, DelveResult};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// How a single tile should be presented to the party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Nothing is known about the tile
    Hidden,
    /// Known about (e.g. a neighbouring room) but not seen first hand
    Revealed,
    /// Seen first hand, or fog is off
    Visible,
}

impl Visibility {
    /// Whether the tile counts as visible to the client at all.
    pub fn is_shown(self) -> bool {
        self != Visibility::Hidden
    }
}

/// Stateless fog-of-war engine operating on a borrowed [`DungeonMap`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FogOfWarEngine;

impl FogOfWarEngine {
    pub fn new() -> Self {
        Self
    }

    /// Presentation state of a tile under `mode`.
    ///
    /// This is the single source of truth for visibility; renderers call it
    /// rather than inspecting flags themselves.
    pub fn visibility(tile: &Tile, mode: FogMode) -> Visibility {
        match mode {
            FogMode::None => Visibility::Visible,
            FogMode::Partial => {
                if tile.is_visited() {
                    Visibility::Visible
                } else if tile.is_revealed() {
                    Visibility::Revealed
                } else {
                    Visibility::Hidden
                }
            }
            FogMode::Full => {
                if tile.is_visited() {
                    Visibility::Visible
                } else {
                    Visibility::Hidden
                }
            }
        }
    }

    /// Refreshes tile flags for the party standing at `party` under `mode`.
    pub fn update_visibility(&self, map: &mut DungeonMap, party: Position, mode: FogMode) {
        match mode {
            FogMode::None => {
                for tile in map.tiles.iter_mut() {
                    tile.mark_revealed();
                }
            }
            FogMode::Partial => {
                self.mark_current_room_visited(map, party);
                self.reveal_neighbours(map, party);
            }
            FogMode::Full => {
                self.mark_current_room_visited(map, party);
            }
        }
    }

    /// Refreshes tile flags using the map's own party position and mode.
    ///
    /// Without a party only the `none` mode has anything to do.
    pub fn refresh(&self, map: &mut DungeonMap) {
        let mode = map.fog_of_war_mode;
        match map.party {
            Some(party) => self.update_visibility(map, party.position(), mode),
            None if mode == FogMode::None => {
                for tile in map.tiles.iter_mut() {
                    tile.mark_revealed();
                }
            }
            None => {}
        }
    }

    fn mark_current_room_visited(&self, map: &mut DungeonMap, party: Position) {
        if let Some(tile) = map.tiles.get_mut(party) {
            tile.mark_visited();
        }
        let Some(bounds) = map.room_at(party).map(|room| room.bounds) else {
            return;
        };
        for pos in bounds.positions() {
            if let Some(tile) = map.tiles.get_mut(pos) {
                tile.mark_visited();
            }
        }
    }

    fn reveal_neighbours(&self, map: &mut DungeonMap, party: Position) {
        let Some(current) = map.room_at(party) else {
            return;
        };

        let mut corridors = Vec::new();
        let mut neighbour_bounds: Vec<Bounds> = Vec::new();
        for connection in &current.connections {
            let Some(target) = map.rooms.get(connection.target_room_id) else {
                continue;
            };
            // Corridors are drawn from the lower room id towards the higher one
            let corridor = if current.room_id < target.room_id {
                current.corridor_to(target)
            } else {
                target.corridor_to(current)
            };
            corridors.push(corridor);
            neighbour_bounds.push(target.bounds);
        }

        for pos in corridors.into_iter().flatten() {
            if let Some(tile) = map.tiles.get_mut(pos) {
                tile.mark_revealed();
            }
        }
        for bounds in neighbour_bounds {
            for pos in bounds.positions() {
                if let Some(tile) = map.tiles.get_mut(pos) {
                    if !tile.is_visited() {
                        tile.mark_revealed();
                    }
                }
            }
        }
    }

    /// Every tile visible under `mode`.
    pub fn visible_tiles<'a>(&self, map: &'a DungeonMap, mode: FogMode) -> Vec<&'a Tile> {
        map.tiles
            .iter()
            .filter(|tile| Self::visibility(tile, mode).is_shown())
            .collect()
    }

    /// Whether the tile at `pos` is visible under `mode`.
    pub fn is_visible(&self, map: &DungeonMap, pos: Position, mode: FogMode) -> DelveResult<bool> {
        let tile = map.tiles.tile(pos)?;
        Ok(Self::visibility(tile, mode).is_shown())
    }

    /// Cells within a `radius` square of `origin` with an unobstructed line to it.
    ///
    /// A cell is rejected when any wall lies strictly between the origin and
    /// the cell; the cell itself may be a wall. Cells outside the grid are
    /// never returned. Pure: no flags are touched.
    pub fn line_of_sight(&self, grid: &TileGrid, origin: Position, radius: i32) -> Vec<Position> {
        let radius = radius.max(0);
        let mut seen = Vec::new();
        if grid.is_empty() {
            return seen;
        }

        // Scan box clipped to the grid
        let x_lo = origin.x.saturating_sub(radius).max(0);
        let x_hi = origin.x.saturating_add(radius).min(grid.width() as i32 - 1);
        let y_lo = origin.y.saturating_sub(radius).max(0);
        let y_hi = origin.y.saturating_add(radius).min(grid.height() as i32 - 1);

        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                let target = Position::new(x, y);

                let line = bresenham_line(origin, target);
                let obstructed = line
                    .iter()
                    .skip(1)
                    .take(line.len().saturating_sub(2))
                    .any(|pos| grid.tile_type(*pos) == Some(TileType::Wall));
                if !obstructed {
                    seen.push(target);
                }
            }
        }

        seen
    }

    /// Switches fog mode and immediately refreshes visibility.
    pub fn set_mode(&self, map: &mut DungeonMap, mode: FogMode) {
        info!("Fog of war mode {} -> {}", map.fog_of_war_mode, mode);
        map.fog_of_war_mode = mode;
        self.refresh(map);
    }

    /// Parses and applies a fog mode. Unknown modes leave the map untouched.
    pub fn set_mode_named(&self, map: &mut DungeonMap, mode: &str) -> DelveResult<()> {
        let mode = mode.parse::<FogMode>()?;
        self.set_mode(map, mode);
        Ok(())
    }

    /// Administrative reveal: every tile of the room becomes seen. Idempotent.
    pub fn reveal_room(&self, map: &mut DungeonMap, room_id: u32) -> DelveResult<()> {
        let bounds = map.rooms.room(room_id)?.bounds;
        for pos in bounds.positions() {
            if let Some(tile) = map.tiles.get_mut(pos) {
                tile.mark_visited();
            }
        }
        info!("Revealed room {room_id}");
        Ok(())
    }

    /// Administrative hide: every tile of the room is forgotten. Idempotent.
    ///
    /// The room's own `visited` flag is history and stays as it is.
    pub fn hide_room(&self, map: &mut DungeonMap, room_id: u32) -> DelveResult<()> {
        let bounds = map.rooms.room(room_id)?.bounds;
        for pos in bounds.positions() {
            if let Some(tile) = map.tiles.get_mut(pos) {
                tile.hide();
            }
        }
        info!("Hid room {room_id}");
        Ok(())
    }

    /// Administrative reveal of a single tile. Idempotent.
    pub fn reveal_tile(&self, map: &mut DungeonMap, pos: Position) -> DelveResult<()> {
        map.tiles
            .get_mut(pos)
            .ok_or(DelveError::TileNotFound { x: pos.x, y: pos.y })?
            .mark_visited();
        debug!("Revealed tile {pos}");
        Ok(())
    }
}
