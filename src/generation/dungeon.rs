//! # Dungeon Generation
//!
//! Interprets a [`DungeonTemplate`] into a concrete [`DungeonMap`].
//!
//! ## Pipeline
//!
//! 1. Room count from the template range or the caller's override
//! 2. Room typing: entrance first, boss last when the template has one
//! 3. Room sizing from base sizes scaled by difficulty
//! 4. Layout per the template's strategy
//! 5. Connectivity: a path for sequential layouts, otherwise a greedy
//!    nearest-room spanning tree
//! 6. Door typing per side of each connection
//! 7. Rasterization of rooms, corridors and doors
//! 8. Feature dressing and party placement
//!
//! Generation never fails on bad input. Unknown templates, zero or oversized
//! room counts and odd map sizes are normalized before anything is built.

use crate::config::{MAX_ROOMS, MIN_ROOM_DIMENSION};
use crate::game::{
    Direction, DoorType, DungeonMap, MapRoom, MovementEngine, RoomGraph, RoomType, TileType,
};
use crate::generation::{
    fit_layout, layout_rooms, utils, DensityTier, Difficulty, DungeonTemplate, GenerationConfig,
    Generator, RoomSize,
};
use crate::{DelveError, DelveResult};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Template-driven dungeon generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DungeonGenerator {
    movement: MovementEngine,
}

impl DungeonGenerator {
    pub fn new() -> Self {
        Self {
            movement: MovementEngine::new(),
        }
    }

    /// Generates a map from `config`, seeding the random source from `config.seed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{DungeonGenerator, GenerationConfig, RoomType};
    ///
    /// let config = GenerationConfig::for_template("small_dungeon", 1).with_room_count(5);
    /// let map = DungeonGenerator::new().generate_map(&config);
    /// assert_eq!(map.rooms.len(), 5);
    /// assert_eq!(map.rooms.get(0).unwrap().room_type, RoomType::Entrance);
    /// assert_eq!(map.rooms.get(4).unwrap().room_type, RoomType::Boss);
    /// ```
    pub fn generate_map(&self, config: &GenerationConfig) -> DungeonMap {
        let mut rng = utils::create_rng(config);
        self.build(config, &mut rng)
    }

    /// Generates a map drawing every random decision from `rng`.
    pub fn build(&self, config: &GenerationConfig, rng: &mut StdRng) -> DungeonMap {
        let template = config.template();
        let width = config.map_width.unwrap_or(template.width).max(1);
        let height = config.map_height.unwrap_or(template.height).max(1);

        let room_count = self.room_count(template, config.room_count_override, rng);
        let room_types = self.room_types(template, room_count, rng);
        let sizes: Vec<RoomSize> = room_types
            .iter()
            .map(|room_type| self.room_size(*room_type, config.difficulty))
            .collect();
        let mut bounds = layout_rooms(template.layout, &sizes, width, height, rng);
        let (width, height) = fit_layout(&mut bounds, width, height);

        let mut graph = RoomGraph::new();
        for (index, (room_type, bounds)) in room_types.into_iter().zip(bounds).enumerate() {
            graph.push(MapRoom::new(index as u32, room_type, bounds));
        }

        if let Err(err) = self.connect_rooms(&mut graph, template, rng) {
            // Room ids are dense and never self-referencing, so this is unreachable
            warn!("Room connection failed: {err}");
        }

        let mut map = DungeonMap::new(width, height);
        map.rooms = graph;
        self.rasterize(&mut map);
        self.dress(&mut map, template.density, rng);
        self.place_party(&mut map);

        info!(
            "Generated '{}' dungeon: {} rooms, {} connections, {}x{}, seed {}",
            template.name,
            map.rooms.len(),
            map.rooms.connection_count(),
            width,
            height,
            config.seed
        );
        map
    }

    /// Template range draw or normalized override.
    fn room_count(
        &self,
        template: &DungeonTemplate,
        room_count_override: Option<u32>,
        rng: &mut StdRng,
    ) -> u32 {
        match room_count_override {
            Some(count) if (1..=MAX_ROOMS).contains(&count) => count,
            Some(count) => {
                let clamped = count.clamp(1, MAX_ROOMS);
                warn!("Room count {count} out of range, using {clamped}");
                clamped
            }
            None => rng.gen_range(template.min_rooms..=template.max_rooms),
        }
    }

    fn room_types(
        &self,
        template: &DungeonTemplate,
        room_count: u32,
        rng: &mut StdRng,
    ) -> Vec<RoomType> {
        let fillers = template.filler_types();
        let pick = |rng: &mut StdRng| *fillers.choose(rng).unwrap_or(&RoomType::Chamber);

        let mut types = Vec::with_capacity(room_count as usize);
        types.push(RoomType::Entrance);
        if room_count == 1 {
            return types;
        }
        for _ in 1..room_count - 1 {
            types.push(pick(rng));
        }
        let last = if template.has_boss {
            RoomType::Boss
        } else {
            pick(rng)
        };
        types.push(last);
        types
    }

    /// Base size scaled by difficulty, never below 3x3.
    pub fn room_size(&self, room_type: RoomType, difficulty: Difficulty) -> RoomSize {
        let (width, height) = room_type.base_size();
        let scale = |edge: i32| {
            ((edge as f64 * difficulty.size_multiplier()) as i32).max(MIN_ROOM_DIMENSION)
        };
        (scale(width), scale(height))
    }

    fn connect_rooms(
        &self,
        graph: &mut RoomGraph,
        template: &DungeonTemplate,
        rng: &mut StdRng,
    ) -> DelveResult<()> {
        let pairs = if template.layout.is_sequential() {
            (1..graph.len()).map(|index| (index - 1, index)).collect()
        } else {
            nearest_room_tree(graph)
        };

        for (from, to) in pairs {
            let from_type = graph.as_slice()[from].room_type;
            let to_type = graph.as_slice()[to].room_type;
            let from_door = self.door_type(from_type, template.density, rng);
            let to_door = self.door_type(to_type, template.density, rng);
            graph.connect(from as u32, to as u32, from_door, to_door)?;
        }
        Ok(())
    }

    /// Door on one side of a connection, decided by that side's room.
    pub fn door_type(&self, room_type: RoomType, density: DensityTier, rng: &mut StdRng) -> DoorType {
        match room_type {
            RoomType::Trap if rng.gen_bool(0.5) => DoorType::Locked,
            RoomType::Boss if rng.gen_bool(0.7) => DoorType::Locked,
            RoomType::Treasure => {
                if rng.gen_bool(0.3) {
                    DoorType::Secret
                } else {
                    DoorType::Locked
                }
            }
            RoomType::Trap | RoomType::Boss => DoorType::Closed,
            _ if rng.gen_bool(density.lock_chance()) => DoorType::Locked,
            _ => DoorType::Closed,
        }
    }

    /// Paints rooms, then corridors, then doors.
    ///
    /// Rooms are painted from the highest id down, so where rooms overlap the
    /// lower id keeps its cells and the entrance is always whole. Each
    /// undirected connection is drawn once, from the lower room id, with its
    /// door on the cell where the corridor leaves that room. Doors go last so
    /// a later corridor never paves over an earlier door.
    fn rasterize(&self, map: &mut DungeonMap) {
        for room in map.rooms.iter().rev() {
            map.tiles.paint_room(room);
        }

        let mut corridors = Vec::new();
        let mut doors = Vec::new();
        for room in map.rooms.iter() {
            for connection in &room.connections {
                if room.room_id >= connection.target_room_id {
                    continue;
                }
                let Some(target) = map.rooms.get(connection.target_room_id) else {
                    continue;
                };
                corridors.extend(room.corridor_to(target));
                doors.push((
                    room.door_towards(target, connection.direction),
                    connection.door_type.tile_type(),
                ));
            }
        }

        for pos in corridors {
            // Corridor cells outside the grid are clipped
            let _ = map.tiles.set_type(pos, TileType::Floor);
        }
        for (pos, tile_type) in doors {
            let _ = map.tiles.set_type(pos, tile_type);
        }
    }

    /// Places stairs, chests, traps and room furniture on interior floor.
    fn dress(&self, map: &mut DungeonMap, density: DensityTier, rng: &mut StdRng) {
        let last_index = map.rooms.len().saturating_sub(1);
        let plans: Vec<(u32, Vec<TileType>)> = map
            .rooms
            .iter()
            .enumerate()
            .map(|(index, room)| {
                let mut features = Vec::new();
                if index == 0 {
                    features.push(TileType::StairsUp);
                }
                if index == last_index {
                    features.push(TileType::StairsDown);
                }
                match room.room_type {
                    RoomType::Treasure => {
                        features.extend(vec![TileType::Chest; density.chests_per_room()])
                    }
                    RoomType::Trap => features.extend(vec![TileType::Trap; density.traps_per_room()]),
                    RoomType::Shrine => features.push(TileType::Altar),
                    RoomType::Tomb => features.push(TileType::Statue),
                    _ => {}
                }
                (room.room_id, features)
            })
            .collect();

        for (room_id, features) in plans {
            if features.is_empty() {
                continue;
            }
            let Some(room) = map.rooms.get(room_id) else {
                continue;
            };
            let center = room.center();
            let mut spots: Vec<_> = room
                .bounds
                .interior_positions()
                .filter(|pos| *pos != center)
                .filter(|pos| {
                    map.tiles.get(*pos).is_some_and(|tile| {
                        tile.tile_type == TileType::Floor && tile.room_id == Some(room_id)
                    })
                })
                .collect();
            spots.shuffle(rng);

            if spots.len() < features.len() {
                debug!(
                    "Room {room_id} has room for {} of {} features",
                    spots.len(),
                    features.len()
                );
            }
            for (pos, feature) in spots.into_iter().zip(features) {
                let _ = map.tiles.set_type(pos, feature);
            }
        }
    }

    /// Party at the entrance center facing south, fog refreshed.
    fn place_party(&self, map: &mut DungeonMap) {
        let Some(entrance) = map.rooms.get(0) else {
            return;
        };
        let center = entrance.center();
        if let Err(err) = self
            .movement
            .place_party(map, center, Direction::South)
        {
            warn!("Could not place party at {center}: {err}");
        }
    }
}

/// Greedy spanning tree: repeatedly join the unconnected room nearest to
/// any connected one, starting from room 0.
///
/// Returns `(connected, newcomer)` index pairs in join order. Ties go to the
/// lowest index pair.
pub fn nearest_room_tree(graph: &RoomGraph) -> Vec<(usize, usize)> {
    let rooms = graph.as_slice();
    if rooms.is_empty() {
        return Vec::new();
    }

    let mut connected = vec![false; rooms.len()];
    connected[0] = true;
    let mut pairs = Vec::with_capacity(rooms.len() - 1);

    while pairs.len() + 1 < rooms.len() {
        let mut best: Option<(f64, usize, usize)> = None;
        for from in (0..rooms.len()).filter(|index| connected[*index]) {
            for to in (0..rooms.len()).filter(|index| !connected[*index]) {
                let distance = rooms[from].center().euclidean_distance(rooms[to].center());
                if best.map_or(true, |(shortest, _, _)| distance < shortest) {
                    best = Some((distance, from, to));
                }
            }
        }
        let Some((_, from, to)) = best else {
            break;
        };
        connected[to] = true;
        pairs.push((from, to));
    }
    pairs
}

impl Generator<DungeonMap> for DungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<DungeonMap> {
        let map = self.build(config, rng);
        self.validate(&map, config)?;
        Ok(map)
    }

    fn validate(&self, map: &DungeonMap, _config: &GenerationConfig) -> DelveResult<()> {
        map.validate()?;
        if !map.rooms.is_connected() {
            return Err(DelveError::InvalidState(
                "room graph is not connected".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}

/// Generation entry point for external callers.
///
/// Normalizes the template and difficulty names and returns the finished
/// map, which owns both the room graph and the tile grid.
pub fn generate_structure(
    template_name: &str,
    difficulty: &str,
    room_count: Option<u32>,
    seed: u64,
) -> DungeonMap {
    let mut config =
        GenerationConfig::for_template(template_name, seed).with_difficulty(Difficulty::from_name(difficulty));
    config.room_count_override = room_count;
    DungeonGenerator::new().generate_map(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Bounds, FogMode, Position};
    use rand::SeedableRng;

    fn generate(template: &str, seed: u64) -> DungeonMap {
        DungeonGenerator::new().generate_map(&GenerationConfig::for_template(template, seed))
    }

    #[test]
    fn test_small_dungeon_with_override() {
        let config = GenerationConfig::for_template("small_dungeon", 3).with_room_count(5);
        let map = DungeonGenerator::new().generate_map(&config);
        assert_eq!(map.rooms.len(), 5);
        assert_eq!(map.rooms.get(0).unwrap().room_type, RoomType::Entrance);
        assert_eq!(map.rooms.get(4).unwrap().room_type, RoomType::Boss);
        // Five linear rooms do not fit 40 columns, so the map grows to hold them
        assert!(map.width >= 40);
        assert_eq!(map.height, 30);
        for room in map.rooms.iter() {
            assert!(map.tiles.in_bounds(Position::new(room.bounds.x2, room.bounds.y2)));
        }
    }

    #[test]
    fn test_room_count_from_template_range() {
        for seed in 0..20 {
            let map = generate("crypt", seed);
            assert!((5..=8).contains(&map.rooms.len()), "seed {seed}");
        }
    }

    #[test]
    fn test_room_count_is_normalized() {
        let generator = DungeonGenerator::new();
        let mut rng = StdRng::seed_from_u64(0);
        let template = DungeonTemplate::lookup("small_dungeon");
        assert_eq!(generator.room_count(template, Some(0), &mut rng), 1);
        assert_eq!(generator.room_count(template, Some(500), &mut rng), MAX_ROOMS);

        let map = DungeonGenerator::new()
            .generate_map(&GenerationConfig::for_template("small_dungeon", 1).with_room_count(1));
        assert_eq!(map.rooms.len(), 1);
        assert_eq!(map.rooms.connection_count(), 0);
    }

    #[test]
    fn test_no_boss_template() {
        for seed in 0..10 {
            let map = generate("cave_system", seed);
            assert!(map.rooms.iter().all(|room| room.room_type != RoomType::Boss));
            assert!(map
                .rooms
                .iter()
                .skip(1)
                .all(|room| room.room_type != RoomType::Entrance));
        }
    }

    #[test]
    fn test_room_sizes_scale_with_difficulty() {
        let generator = DungeonGenerator::new();
        assert_eq!(generator.room_size(RoomType::Boss, Difficulty::Normal), (13, 11));
        assert_eq!(generator.room_size(RoomType::Boss, Difficulty::Hard), (15, 13));
        assert_eq!(generator.room_size(RoomType::Entrance, Difficulty::Easy), (5, 5));
        assert_eq!(generator.room_size(RoomType::Corridor, Difficulty::Easy), (8, 3));
    }

    #[test]
    fn test_sequential_layout_is_a_path() {
        let config = GenerationConfig::for_template("tower", 4).with_room_count(6);
        let map = DungeonGenerator::new().generate_map(&config);
        for (index, room) in map.rooms.iter().enumerate() {
            let expected = if index == 0 || index == 5 { 1 } else { 2 };
            assert_eq!(room.connections.len(), expected, "room {index}");
        }
        // Vertical stacking means north/south connections only
        assert!(map
            .rooms
            .iter()
            .flat_map(|room| room.connections.iter())
            .all(|connection| matches!(connection.direction, Direction::North | Direction::South)));
    }

    #[test]
    fn test_spanning_tree_for_all_templates() {
        for template in DungeonTemplate::all() {
            for seed in 0..5 {
                let map = generate(template.name, seed);
                assert!(map.rooms.is_connected(), "{} seed {seed}", template.name);
                assert_eq!(map.rooms.connection_count(), map.rooms.len() - 1);
                assert!(map.rooms.first_unreciprocated().is_none());
            }
        }
    }

    #[test]
    fn test_nearest_room_tree_ties_go_low() {
        let mut graph = RoomGraph::new();
        graph.push(MapRoom::new(0, RoomType::Entrance, Bounds::from_origin(10, 10, 3, 3)));
        graph.push(MapRoom::new(1, RoomType::Chamber, Bounds::from_origin(20, 10, 3, 3)));
        graph.push(MapRoom::new(2, RoomType::Chamber, Bounds::from_origin(0, 10, 3, 3)));
        graph.push(MapRoom::new(3, RoomType::Chamber, Bounds::from_origin(40, 10, 3, 3)));
        assert_eq!(nearest_room_tree(&graph), vec![(0, 1), (0, 2), (1, 3)]);
    }

    #[test]
    fn test_door_typing() {
        let generator = DungeonGenerator::new();
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..50 {
            assert_eq!(
                generator.door_type(RoomType::Chamber, DensityTier::Low, &mut rng),
                DoorType::Closed
            );
            assert_ne!(
                generator.door_type(RoomType::Treasure, DensityTier::Low, &mut rng),
                DoorType::Closed
            );
            assert_ne!(
                generator.door_type(RoomType::Boss, DensityTier::High, &mut rng),
                DoorType::Secret
            );
        }
    }

    #[test]
    fn test_rasterization() {
        let map = generate("small_dungeon", 21);
        for room in map.rooms.iter() {
            let center = room.center();
            assert_eq!(map.tiles.tile_type(center), Some(TileType::Floor));
            for connection in &room.connections {
                if room.room_id < connection.target_room_id {
                    let target = map.rooms.get(connection.target_room_id).unwrap();
                    let door = room.door_towards(target, connection.direction);
                    assert!(room.corridor_to(target).contains(&door));
                    assert_eq!(
                        map.tiles.tile_type(door),
                        Some(connection.door_type.tile_type())
                    );
                }
            }
        }
        assert!(map.tiles.iter().any(|tile| tile.tile_type == TileType::Empty));
    }

    #[test]
    fn test_dressing() {
        let map = DungeonGenerator::new()
            .generate_map(&GenerationConfig::for_template("small_dungeon", 2).with_room_count(4));
        let count = |tile_type: TileType| {
            map.tiles
                .iter()
                .filter(|tile| tile.tile_type == tile_type)
                .count()
        };
        assert_eq!(count(TileType::StairsUp), 1);
        assert_eq!(count(TileType::StairsDown), 1);

        let entrance = map.rooms.get(0).unwrap();
        assert!(entrance
            .bounds
            .interior_positions()
            .any(|pos| map.tiles.tile_type(pos) == Some(TileType::StairsUp)));

        for room in map.rooms.iter() {
            assert_eq!(map.tiles.tile_type(room.center()), Some(TileType::Floor));
        }
    }

    #[test]
    fn test_party_placed_at_entrance() {
        let map = generate("medium_dungeon", 5);
        let party = map.party.unwrap();
        let entrance = map.rooms.get(0).unwrap();
        assert_eq!(party.position(), entrance.center());
        assert_eq!(party.facing, Direction::South);
        assert_eq!(party.room_id, Some(0));
        assert!(entrance.visited);
        assert_eq!(map.fog_of_war_mode, FogMode::Partial);
        assert!(map.tiles.get(entrance.center()).unwrap().is_visited());
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generate("large_dungeon", 77), generate("large_dungeon", 77));
    }

    #[test]
    fn test_generator_trait() {
        let generator = DungeonGenerator::new();
        let config = GenerationConfig::for_template("temple", 9);
        let mut rng = utils::create_rng(&config);
        let map = generator.generate(&config, &mut rng).unwrap();
        assert!(generator.validate(&map, &config).is_ok());
        assert_eq!(generator.generator_type(), "DungeonGenerator");
    }

    #[test]
    fn test_generate_structure() {
        let map = generate_structure("nowhere", "brutal", Some(6), 1);
        assert_eq!(map.rooms.len(), 6);
        assert!(map.width >= 60 && map.height >= 40);
    }
}
