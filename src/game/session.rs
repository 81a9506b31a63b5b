//! # Dungeon Session
//!
//! One [`DungeonMap`] shared between threads. Writers (moves, fog overrides)
//! serialize on a write lock; renders and queries take read locks and see a
//! consistent snapshot.

use crate::game::{
    Direction, DungeonMap, FogMode, FogOfWarEngine, MoveResult, MovementEngine, Position,
    RoomSummary, Tile, ValidMove,
};
use crate::generation::{DungeonGenerator, GenerationConfig};
use crate::rendering::{self, RenderFormat, RenderOptions, RenderOutput};
use crate::{DelveError, DelveResult};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A map plus the random source its moves draw trap outcomes from.
#[derive(Debug)]
pub struct DungeonSession {
    map: RwLock<DungeonMap>,
    rng: Mutex<StdRng>,
    movement: MovementEngine,
    fog: FogOfWarEngine,
}

impl DungeonSession {
    /// Wraps an existing map. `seed` drives trap outcomes.
    pub fn new(map: DungeonMap, seed: u64) -> Self {
        Self {
            map: RwLock::new(map),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            movement: MovementEngine::new(),
            fog: FogOfWarEngine::new(),
        }
    }

    /// Generates a fresh map from `config` and wraps it.
    pub fn generate(config: &GenerationConfig) -> Self {
        let map = DungeonGenerator::new().generate_map(config);
        info!(
            "Started session on '{}' ({} rooms)",
            config.template_name,
            map.rooms.len()
        );
        Self::new(map, config.seed)
    }

    fn read(&self) -> DelveResult<RwLockReadGuard<'_, DungeonMap>> {
        self.map
            .read()
            .map_err(|_| DelveError::InvalidState("session map lock poisoned".to_string()))
    }

    fn write(&self) -> DelveResult<RwLockWriteGuard<'_, DungeonMap>> {
        self.map
            .write()
            .map_err(|_| DelveError::InvalidState("session map lock poisoned".to_string()))
    }

    fn rng(&self) -> DelveResult<MutexGuard<'_, StdRng>> {
        self.rng
            .lock()
            .map_err(|_| DelveError::InvalidState("session rng lock poisoned".to_string()))
    }

    pub fn move_to(&self, x: i32, y: i32) -> DelveResult<MoveResult> {
        let mut map = self.write()?;
        let mut rng = self.rng()?;
        self.movement
            .move_to(&mut map, Position::new(x, y), &mut *rng)
    }

    /// Accepts `north|south|east|west` (or their initials).
    pub fn move_direction(&self, direction: &str) -> DelveResult<MoveResult> {
        let direction: Direction = direction.parse()?;
        let mut map = self.write()?;
        let mut rng = self.rng()?;
        self.movement
            .move_direction(&mut map, direction, &mut *rng)
    }

    pub fn valid_moves(&self) -> DelveResult<Vec<ValidMove>> {
        self.movement.valid_moves(&*self.read()?)
    }

    /// Rejects unknown modes without touching the map.
    pub fn set_fog_mode(&self, mode: &str) -> DelveResult<FogMode> {
        let mode: FogMode = mode.parse()?;
        let mut map = self.write()?;
        self.fog.set_mode(&mut map, mode);
        Ok(mode)
    }

    pub fn reveal_room(&self, room_id: u32) -> DelveResult<()> {
        self.fog.reveal_room(&mut *self.write()?, room_id)
    }

    pub fn hide_room(&self, room_id: u32) -> DelveResult<()> {
        self.fog.hide_room(&mut *self.write()?, room_id)
    }

    pub fn reveal_tile(&self, x: i32, y: i32) -> DelveResult<()> {
        self.fog.reveal_tile(&mut *self.write()?, Position::new(x, y))
    }

    /// Tiles visible under the map's current fog mode.
    pub fn visible_tiles(&self) -> DelveResult<Vec<Tile>> {
        let map = self.read()?;
        let tiles = self
            .fog
            .visible_tiles(&map, map.fog_of_war_mode)
            .into_iter()
            .cloned()
            .collect();
        Ok(tiles)
    }

    pub fn render(&self, format: RenderFormat, options: &RenderOptions) -> DelveResult<RenderOutput> {
        Ok(rendering::render(&*self.read()?, format, options))
    }

    /// Renders in the format named by `format` (`text`, `vector`, `sprite-data`).
    pub fn render_named(&self, format: &str, options: &RenderOptions) -> DelveResult<RenderOutput> {
        self.render(format.parse()?, options)
    }

    pub fn room_summaries(&self) -> DelveResult<Vec<RoomSummary>> {
        Ok(self.read()?.room_summaries())
    }

    /// A copy of the map as it is right now.
    pub fn snapshot(&self) -> DelveResult<DungeonMap> {
        Ok(self.read()?.clone())
    }

    /// Runs `f` with exclusive access to the map, for gameplay tile mutations.
    pub fn with_map_mut<T>(&self, f: impl FnOnce(&mut DungeonMap) -> DelveResult<T>) -> DelveResult<T> {
        f(&mut *self.write()?)
    }
}
