//! Property tests for the map invariants that must hold for any seed.

use delve::{
    Direction, DungeonGenerator, DungeonMap, DungeonTemplate, FogMode, FogOfWarEngine,
    GenerationConfig, MovementEngine, Position, Tile,
};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

const TEMPLATE_COUNT: usize = 7;

fn template_name(index: usize) -> &'static str {
    DungeonTemplate::all()[index % TEMPLATE_COUNT].name
}

fn generate(template: usize, seed: u64, rooms: Option<u32>) -> DungeonMap {
    let mut config = GenerationConfig::for_template(template_name(template), seed);
    config.room_count_override = rooms;
    DungeonGenerator::new().generate_map(&config)
}

fn walkable(map: &DungeonMap) -> Vec<Position> {
    map.tiles
        .iter()
        .filter(|tile| !tile.is_blocking())
        .map(Tile::position)
        .collect()
}

#[derive(Debug, Clone)]
enum Action {
    Step(Direction),
    Teleport(usize),
    SetMode(FogMode),
    RevealRoom(u32),
    HideRoom(u32),
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::North),
        Just(Direction::South),
        Just(Direction::East),
        Just(Direction::West),
    ]
}

fn fog_mode() -> impl Strategy<Value = FogMode> {
    prop_oneof![Just(FogMode::None), Just(FogMode::Partial), Just(FogMode::Full)]
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => direction().prop_map(Action::Step),
        2 => any::<usize>().prop_map(Action::Teleport),
        1 => fog_mode().prop_map(Action::SetMode),
        1 => (0u32..8).prop_map(Action::RevealRoom),
        1 => (0u32..8).prop_map(Action::HideRoom),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn connections_are_reciprocal(seed in any::<u64>(), template in 0usize..TEMPLATE_COUNT, rooms in proptest::option::of(1u32..=12)) {
        let map = generate(template, seed, rooms);
        prop_assert_eq!(map.rooms.first_unreciprocated(), None);
        for room in map.rooms.iter() {
            for connection in &room.connections {
                let back = map.rooms.get(connection.target_room_id)
                    .and_then(|target| target.connection_to(room.room_id));
                prop_assert_eq!(back.map(|c| c.direction), Some(connection.direction.opposite()));
            }
        }
    }

    #[test]
    fn room_graph_is_spanning_tree(seed in any::<u64>(), template in 0usize..TEMPLATE_COUNT, rooms in proptest::option::of(1u32..=12)) {
        let map = generate(template, seed, rooms);
        prop_assert!(map.rooms.is_connected(), "{} seed={seed}", template_name(template));
        prop_assert_eq!(map.rooms.connection_count(), map.rooms.len() - 1);
    }

    #[test]
    fn corridors_leave_rooms_through_doors(seed in any::<u64>(), template in 0usize..TEMPLATE_COUNT) {
        let map = generate(template, seed, None);
        for room in map.rooms.iter() {
            for connection in room.connections.iter().filter(|c| room.room_id < c.target_room_id) {
                let target = map.rooms.get(connection.target_room_id).unwrap();
                let exit = room
                    .corridor_to(target)
                    .into_iter()
                    .find(|pos| room.bounds.is_border(*pos));
                if let Some(exit) = exit {
                    prop_assert!(
                        map.tiles.tile_type(exit).is_some_and(|tile_type| tile_type.is_door()),
                        "corridor {} -> {} leaves through {exit} without a door",
                        room.room_id,
                        target.room_id
                    );
                }
            }
        }
    }

    #[test]
    fn visited_implies_revealed(seed in any::<u64>(), template in 0usize..TEMPLATE_COUNT, actions in proptest::collection::vec(action(), 1..40)) {
        let mut map = generate(template, seed, Some(5));
        let movement = MovementEngine::new();
        let fog = FogOfWarEngine::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let targets = walkable(&map);

        for action in actions {
            // Rejected moves are fine; only the flags matter here
            let _ = match action {
                Action::Step(direction) => movement.move_direction(&mut map, direction, &mut rng).map(|_| ()),
                Action::Teleport(index) => {
                    let target = targets[index % targets.len()];
                    movement.move_to(&mut map, target, &mut rng).map(|_| ())
                }
                Action::SetMode(mode) => {
                    fog.set_mode(&mut map, mode);
                    Ok(())
                }
                Action::RevealRoom(room_id) => fog.reveal_room(&mut map, room_id),
                Action::HideRoom(room_id) => fog.hide_room(&mut map, room_id),
            };
            prop_assert!(map.tiles.iter().all(|tile| !tile.is_visited() || tile.is_revealed()));
        }
    }

    #[test]
    fn fog_overrides_are_idempotent(seed in any::<u64>(), room_id in 0u32..5) {
        let fog = FogOfWarEngine::new();
        let mut map = generate(0, seed, Some(5));

        fog.reveal_room(&mut map, room_id).unwrap();
        let once = map.clone();
        fog.reveal_room(&mut map, room_id).unwrap();
        prop_assert_eq!(&map, &once);

        fog.hide_room(&mut map, room_id).unwrap();
        let once = map.clone();
        fog.hide_room(&mut map, room_id).unwrap();
        prop_assert_eq!(&map, &once);
    }

    #[test]
    fn paths_are_valid(seed in any::<u64>(), template in 0usize..TEMPLATE_COUNT, from in any::<usize>(), to in any::<usize>()) {
        let map = generate(template, seed, None);
        let movement = MovementEngine::new();
        let targets = walkable(&map);
        let start = targets[from % targets.len()];
        let goal = targets[to % targets.len()];

        let path = movement.calculate_path(&map, start, goal);
        prop_assert_eq!(movement.path_exists(&map, start, goal), !path.is_empty());
        if path.is_empty() {
            return Ok(());
        }

        prop_assert!(start.is_cardinal_neighbor(path[0]));
        prop_assert_eq!(path.last().copied(), Some(goal));
        prop_assert!(path.windows(2).all(|pair| pair[0].is_cardinal_neighbor(pair[1])));
        prop_assert!(path.iter().all(|pos| !map.tiles.is_blocked(*pos)));
        prop_assert!(path.len() >= start.manhattan_distance(goal) as usize);
    }
}
