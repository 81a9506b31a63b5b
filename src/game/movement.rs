//! # Movement
//!
//! Validates and executes party moves, finds paths and raises room-entry
//! events.
//!
//! Door and trap checks run along the BFS shortest path from the party to
//! the destination, not along whatever route the caller had in mind. For a
//! single-step move the two coincide; for a long jump the check follows the
//! computed path. Whether long jumps should be hazard-checked this way at
//! all is an open game-design question, so the behaviour is kept as is.

use crate::game::{Direction, DungeonMap, FogOfWarEngine, Position, RoomType, TileType};
use crate::utils::{grid_path, grid_path_exists};
use crate::{DelveError, DelveResult};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What happened when the party crossed an armed trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapOutcome {
    Noticed,
    Triggered,
}

/// An armed trap on the path of a move. Resolution is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapFinding {
    pub x: i32,
    pub y: i32,
    pub outcome: TrapOutcome,
}

/// Unresolved content found on entering a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Encounter {
    /// Enemies present and not yet cleared
    Combat,
    /// NPCs present
    NpcEncounter,
    /// One armed trap inside the room
    Trap { x: i32, y: i32 },
    /// Items present and not yet looted
    Treasure,
}

/// Raised when the party moves into a different room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEntryEvent {
    pub room_id: u32,
    pub room_type: RoomType,
    /// Whether this entry flipped the room to visited
    pub first_visit: bool,
    pub encounters: Vec<Encounter>,
}

/// Outcome of a successful move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub position: Position,
    pub old_room_id: Option<u32>,
    pub new_room_id: Option<u32>,
    pub room_entry_event: Option<RoomEntryEvent>,
    pub trap_findings: Vec<TrapFinding>,
}

/// A neighbouring cell the party could step onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidMove {
    pub direction: Direction,
    pub position: Position,
    pub tile_type: TileType,
    pub room_id: Option<u32>,
    pub visited: bool,
}

/// Stateless movement engine operating on a borrowed [`DungeonMap`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementEngine {
    fog: FogOfWarEngine,
}

impl MovementEngine {
    pub fn new() -> Self {
        Self {
            fog: FogOfWarEngine::new(),
        }
    }

    /// Checks that `pos` is inside the map and not blocked.
    fn check_destination(&self, map: &DungeonMap, pos: Position) -> DelveResult<()> {
        let tile = map
            .tiles
            .get(pos)
            .ok_or(DelveError::OutOfBounds { x: pos.x, y: pos.y })?;
        if tile.is_blocking() {
            return Err(DelveError::Blocked {
                x: pos.x,
                y: pos.y,
                tile_type: tile.tile_type,
            });
        }
        Ok(())
    }

    /// Puts the party on the map, refreshes fog and enters the room there.
    pub fn place_party(
        &self,
        map: &mut DungeonMap,
        pos: Position,
        facing: Direction,
    ) -> DelveResult<Option<RoomEntryEvent>> {
        self.check_destination(map, pos)?;
        map.set_party(pos, facing);
        self.fog.refresh(map);
        match map.room_id_at(pos) {
            Some(room_id) => Ok(Some(self.enter_room(map, room_id)?)),
            None => Ok(None),
        }
    }

    /// Moves the party to an absolute position.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{DungeonMap, MovementEngine, Position, TileType, Direction, DelveError};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut map = DungeonMap::new(5, 1);
    /// for x in 0..5 {
    ///     map.set_tile_type(Position::new(x, 0), TileType::Floor).unwrap();
    /// }
    /// map.set_tile_type(Position::new(2, 0), TileType::DoorLocked).unwrap();
    ///
    /// let engine = MovementEngine::new();
    /// let mut rng = StdRng::seed_from_u64(1);
    /// engine.place_party(&mut map, Position::new(0, 0), Direction::East).unwrap();
    ///
    /// let result = engine.move_to(&mut map, Position::new(4, 0), &mut rng);
    /// assert!(matches!(result, Err(DelveError::DoorLocked { x: 2, y: 0 })));
    /// assert_eq!(map.party_position().unwrap(), Position::new(0, 0));
    /// ```
    pub fn move_to<R: Rng>(
        &self,
        map: &mut DungeonMap,
        target: Position,
        rng: &mut R,
    ) -> DelveResult<MoveResult> {
        let current = map.party_position()?;

        if let Err(err) = self.check_destination(map, target) {
            debug!("Rejected move {current} -> {target}: {err}");
            return Err(err);
        }

        let path = self.calculate_path(map, current, target);
        if let Err(err) = self.check_doors(map, &path) {
            debug!("Rejected move {current} -> {target}: {err}");
            return Err(err);
        }
        let trap_findings = self.check_traps(map, &path, rng);

        let facing = match (map.party, path.len()) {
            // Staying put keeps the current facing
            (Some(party), 0) if target == current => party.facing,
            (_, 0) => Direction::dominant(target - current),
            (_, 1) => Direction::dominant(path[0] - current),
            (_, n) => Direction::dominant(path[n - 1] - path[n - 2]),
        };

        let old_room_id = map.room_id_at(current);
        map.set_party(target, facing);
        let new_room_id = map.room_id_at(target);
        self.fog.refresh(map);

        let room_entry_event = match new_room_id {
            Some(room_id) if old_room_id != new_room_id => Some(self.enter_room(map, room_id)?),
            _ => None,
        };

        debug!(
            "Party moved {current} -> {target} ({} steps, {} traps)",
            path.len(),
            trap_findings.len()
        );

        Ok(MoveResult {
            position: target,
            old_room_id,
            new_room_id,
            room_entry_event,
            trap_findings,
        })
    }

    /// Moves the party one step in `direction`.
    pub fn move_direction<R: Rng>(
        &self,
        map: &mut DungeonMap,
        direction: Direction,
        rng: &mut R,
    ) -> DelveResult<MoveResult> {
        let target = map.party_position()?.step(direction);
        self.move_to(map, target, rng)
    }

    fn check_doors(&self, map: &DungeonMap, path: &[Position]) -> DelveResult<()> {
        for pos in path {
            let Some(tile) = map.tiles.get(*pos) else {
                continue;
            };
            match tile.tile_type {
                TileType::DoorLocked => {
                    return Err(DelveError::DoorLocked { x: pos.x, y: pos.y });
                }
                TileType::DoorSecret if !tile.is_discovered() => {
                    return Err(DelveError::SecretDoorUndiscovered { x: pos.x, y: pos.y });
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn check_traps<R: Rng>(
        &self,
        map: &DungeonMap,
        path: &[Position],
        rng: &mut R,
    ) -> Vec<TrapFinding> {
        path.iter()
            .filter(|pos| map.tiles.tile_type(**pos) == Some(TileType::Trap))
            .map(|pos| TrapFinding {
                x: pos.x,
                y: pos.y,
                outcome: if rng.gen_bool(0.5) {
                    TrapOutcome::Noticed
                } else {
                    TrapOutcome::Triggered
                },
            })
            .collect()
    }

    /// Marks a room visited and reports its unresolved contents.
    fn enter_room(&self, map: &mut DungeonMap, room_id: u32) -> DelveResult<RoomEntryEvent> {
        let room = map.rooms.room(room_id)?;
        let bounds = room.bounds;
        let room_type = room.room_type;

        let mut encounters = Vec::new();
        if room.contents.has_active_enemies() {
            encounters.push(Encounter::Combat);
        }
        if room.contents.has_npcs() {
            encounters.push(Encounter::NpcEncounter);
        }
        encounters.extend(
            bounds
                .positions()
                .filter(|pos| map.tiles.tile_type(*pos) == Some(TileType::Trap))
                .map(|pos| Encounter::Trap { x: pos.x, y: pos.y }),
        );
        if room.contents.has_unlooted_items() {
            encounters.push(Encounter::Treasure);
        }

        let room = map.rooms.room_mut(room_id)?;
        let first_visit = !room.visited;
        room.visited = true;

        debug!(
            "Party entered room {room_id} ({room_type}), {} encounters",
            encounters.len()
        );

        Ok(RoomEntryEvent {
            room_id,
            room_type,
            first_visit,
            encounters,
        })
    }

    /// The cardinal neighbours of the party that pass the bounds and blocked checks.
    pub fn valid_moves(&self, map: &DungeonMap) -> DelveResult<Vec<ValidMove>> {
        let current = map.party_position()?;
        Ok(Direction::all()
            .into_iter()
            .filter_map(|direction| {
                let position = current.step(direction);
                self.check_destination(map, position).ok()?;
                let tile = map.tiles.get(position)?;
                Some(ValidMove {
                    direction,
                    position,
                    tile_type: tile.tile_type,
                    room_id: tile.room_id,
                    visited: tile.is_visited(),
                })
            })
            .collect())
    }

    /// Shortest 4-directional path, start excluded and destination included.
    pub fn calculate_path(&self, map: &DungeonMap, from: Position, to: Position) -> Vec<Position> {
        grid_path(&map.tiles, from, to)
    }

    /// Whether [`MovementEngine::calculate_path`] finds a non-empty path.
    pub fn path_exists(&self, map: &DungeonMap, from: Position, to: Position) -> bool {
        grid_path_exists(&map.tiles, from, to)
    }
}
