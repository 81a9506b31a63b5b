//! End-to-end scenarios covering generation, fog of war and movement.

use delve::{
    Bounds, DelveError, DelveResult, Direction, DoorType, DungeonMap, FogMode, FogOfWarEngine,
    GenerationConfig, MapRoom, MovementEngine, Position, RoomType, TileGrid, TileType,
};
use rand::{rngs::StdRng, SeedableRng};

/// Rooms A and B side by side and joined by an open doorway, with room C
/// below A and connected to nothing.
fn three_room_map() -> DelveResult<DungeonMap> {
    let mut map = DungeonMap::new(10, 10);
    map.add_room(MapRoom::new(0, RoomType::Entrance, Bounds::from_origin(0, 0, 5, 5)));
    map.add_room(MapRoom::new(1, RoomType::Chamber, Bounds::from_origin(5, 0, 5, 5)));
    map.add_room(MapRoom::new(2, RoomType::Treasure, Bounds::from_origin(0, 6, 5, 4)));
    map.rooms.connect(0, 1, DoorType::Open, DoorType::Open)?;
    map.set_tile_type(Position::new(4, 2), TileType::DoorOpen)?;
    map.set_tile_type(Position::new(5, 2), TileType::DoorOpen)?;
    Ok(map)
}

#[test]
fn test_small_dungeon_room_count_override() {
    let config = GenerationConfig::for_template("small_dungeon", 2024).with_room_count(5);
    let map = delve::DungeonGenerator::new().generate_map(&config);

    assert_eq!(map.rooms.len(), 5);
    assert_eq!(map.rooms.get(0).map(|room| room.room_type), Some(RoomType::Entrance));
    assert_eq!(map.rooms.get(4).map(|room| room.room_type), Some(RoomType::Boss));
    assert!(map.rooms.is_connected());
    assert_eq!(map.rooms.connection_count(), 4);
}

#[test]
fn test_generate_structure_matches_config_path() {
    let map = delve::generate_structure("small_dungeon", "normal", Some(5), 2024);
    let config = GenerationConfig::for_template("small_dungeon", 2024).with_room_count(5);
    assert_eq!(map, delve::DungeonGenerator::new().generate_map(&config));
}

#[test]
fn test_full_fog_history_never_reverts() -> DelveResult<()> {
    let mut map = three_room_map()?;
    map.fog_of_war_mode = FogMode::Full;
    let engine = MovementEngine::new();
    let mut rng = StdRng::seed_from_u64(5);

    engine.place_party(&mut map, Position::new(2, 2), Direction::East)?;
    let result = engine.move_to(&mut map, Position::new(7, 2), &mut rng)?;
    assert_eq!(result.old_room_id, Some(0));
    assert_eq!(result.new_room_id, Some(1));

    for room_id in [0, 1] {
        let bounds = map.rooms.room(room_id)?.bounds;
        for pos in bounds.positions() {
            assert!(map.tile(pos)?.is_visited(), "room {room_id} tile {pos} forgotten");
        }
    }

    let room_c = map.rooms.room(2)?.bounds;
    for pos in room_c.positions() {
        let tile = map.tile(pos)?;
        assert!(!tile.is_visited());
        assert!(!tile.is_revealed());
    }
    Ok(())
}

#[test]
fn test_line_of_sight_stops_at_wall() -> DelveResult<()> {
    let mut grid = TileGrid::filled(5, 1, TileType::Floor);
    grid.set_type(Position::new(2, 0), TileType::Wall)?;

    let seen = FogOfWarEngine::new().line_of_sight(&grid, Position::new(0, 0), 4);
    assert_eq!(
        seen,
        vec![Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)]
    );
    Ok(())
}

#[test]
fn test_locked_door_blocks_move() -> DelveResult<()> {
    let mut map = three_room_map()?;
    map.set_tile_type(Position::new(4, 2), TileType::DoorLocked)?;
    let engine = MovementEngine::new();
    let mut rng = StdRng::seed_from_u64(9);
    engine.place_party(&mut map, Position::new(2, 2), Direction::East)?;
    let before = map.party;

    // The locked door is on the only route, so BFS routes through it
    let result = engine.move_to(&mut map, Position::new(7, 2), &mut rng);
    assert!(matches!(result, Err(DelveError::DoorLocked { x: 4, y: 2 })));
    assert_eq!(map.party, before);

    map.unlock_door(Position::new(4, 2))?;
    engine.move_to(&mut map, Position::new(7, 2), &mut rng)?;
    assert_eq!(map.party_position()?, Position::new(7, 2));
    Ok(())
}

#[test]
fn test_none_mode_shows_every_tile() -> DelveResult<()> {
    let mut map = three_room_map()?;
    let engine = FogOfWarEngine::new();
    assert!(engine.visible_tiles(&map, FogMode::Partial).is_empty());

    engine.set_mode(&mut map, FogMode::None);
    assert_eq!(engine.visible_tiles(&map, FogMode::None).len(), map.tiles.len());

    // Forgetting a room does not matter while fog is off
    engine.hide_room(&mut map, 2)?;
    assert_eq!(engine.visible_tiles(&map, FogMode::None).len(), 100);
    Ok(())
}
