//! # Rooms
//!
//! Rectangular rooms, their door-typed connections and the room graph.
//!
//! Rooms are the structural element of a generated map. Each connection is
//! stored on both rooms with opposite directions, so the graph can be walked
//! from either side.

use crate::game::{Direction, DoorType, Position};
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Purpose of a room, which drives its size, door typing and dressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    /// Where the party arrives; always room 0
    Entrance,
    /// Standard room with no special properties
    Chamber,
    /// Room with the dungeon's strongest enemy
    Boss,
    /// Room containing treasure or valuable items
    Treasure,
    /// Room seeded with traps
    Trap,
    /// Long, narrow connecting hall
    Corridor,
    /// Shrine with an altar
    Shrine,
    Library,
    Prison,
    /// Burial chamber with a statue
    Tomb,
}

impl RoomType {
    /// Base outer dimensions (walls included) before difficulty scaling.
    pub fn base_size(self) -> (i32, i32) {
        match self {
            RoomType::Entrance => (7, 7),
            RoomType::Chamber => (9, 7),
            RoomType::Boss => (13, 11),
            RoomType::Treasure => (7, 5),
            RoomType::Trap => (7, 7),
            RoomType::Corridor => (11, 3),
            RoomType::Shrine => (7, 7),
            RoomType::Library => (9, 9),
            RoomType::Prison => (8, 6),
            RoomType::Tomb => (7, 9),
        }
    }

    /// Wire name of the room type.
    pub fn as_str(self) -> &'static str {
        match self {
            RoomType::Entrance => "entrance",
            RoomType::Chamber => "chamber",
            RoomType::Boss => "boss",
            RoomType::Treasure => "treasure",
            RoomType::Trap => "trap",
            RoomType::Corridor => "corridor",
            RoomType::Shrine => "shrine",
            RoomType::Library => "library",
            RoomType::Prison => "prison",
            RoomType::Tomb => "tomb",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = DelveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entrance" => Ok(RoomType::Entrance),
            "chamber" => Ok(RoomType::Chamber),
            "boss" => Ok(RoomType::Boss),
            "treasure" => Ok(RoomType::Treasure),
            "trap" => Ok(RoomType::Trap),
            "corridor" => Ok(RoomType::Corridor),
            "shrine" => Ok(RoomType::Shrine),
            "library" => Ok(RoomType::Library),
            "prison" => Ok(RoomType::Prison),
            "tomb" => Ok(RoomType::Tomb),
            other => Err(DelveError::InvalidState(format!("unknown room type '{other}'"))),
        }
    }
}

/// Inclusive rectangle in map space. Always `x1 <= x2` and `y1 <= y2`.
///
/// Deserialized corners are normalized the same way [`Bounds::new`] does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "BoundsRecord")]
pub struct Bounds {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

#[derive(Deserialize)]
struct BoundsRecord {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl From<BoundsRecord> for Bounds {
    fn from(record: BoundsRecord) -> Self {
        Bounds::new(record.x1, record.y1, record.x2, record.y2)
    }
}

impl Bounds {
    /// Creates bounds from two corners in any order.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Creates bounds from a top-left corner and outer dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Bounds, Position};
    ///
    /// let bounds = Bounds::from_origin(2, 3, 5, 4);
    /// assert_eq!(bounds, Bounds::new(2, 3, 6, 6));
    /// assert_eq!(bounds.center(), Position::new(4, 4));
    /// ```
    pub fn from_origin(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width.max(1) - 1, y + height.max(1) - 1)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1 + 1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1 + 1
    }

    /// Center cell, rounding towards the top-left.
    pub fn center(&self) -> Position {
        Position::new(
            (self.x1 + self.x2).div_euclid(2),
            (self.y1 + self.y2).div_euclid(2),
        )
    }

    /// Checks if a position is inside these bounds (border included).
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x1 && pos.x <= self.x2 && pos.y >= self.y1 && pos.y <= self.y2
    }

    /// Checks if a position is on the border of these bounds.
    pub fn is_border(&self, pos: Position) -> bool {
        self.contains(pos)
            && (pos.x == self.x1 || pos.x == self.x2 || pos.y == self.y1 || pos.y == self.y2)
    }

    /// Returns the bounds moved by `(dx, dy)`.
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    /// All positions covered, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let Bounds { x1, y1, x2, y2 } = *self;
        (y1..=y2).flat_map(move |y| (x1..=x2).map(move |x| Position::new(x, y)))
    }

    /// Positions strictly inside the border.
    pub fn interior_positions(&self) -> impl Iterator<Item = Position> {
        let Bounds { x1, y1, x2, y2 } = *self;
        ((y1 + 1)..y2).flat_map(move |y| ((x1 + 1)..x2).map(move |x| Position::new(x, y)))
    }

    /// The border cell a door facing `direction` sits on, level with the center.
    pub fn door_position(&self, direction: Direction) -> Position {
        let center = self.center();
        match direction {
            Direction::North => Position::new(center.x, self.y1),
            Direction::South => Position::new(center.x, self.y2),
            Direction::East => Position::new(self.x2, center.y),
            Direction::West => Position::new(self.x1, center.y),
        }
    }
}

/// One side of a connection between two rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub direction: Direction,
    pub target_room_id: u32,
    pub door_type: DoorType,
}

/// Identifier of externally owned room content.
pub type ContentId = Uuid;

/// Creates a new unique content ID.
pub fn new_content_id() -> ContentId {
    Uuid::new_v4()
}

/// Opaque reference to an enemy, NPC or item owned by an external system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub id: ContentId,
    /// Where to draw a marker, if the owner placed it on the grid
    pub position: Option<Position>,
}

impl ContentRef {
    /// Creates an unplaced content reference with a fresh id.
    pub fn new() -> Self {
        Self {
            id: new_content_id(),
            position: None,
        }
    }

    /// Creates a content reference placed at `position`.
    pub fn at(position: Position) -> Self {
        Self {
            id: new_content_id(),
            position: Some(position),
        }
    }
}

impl Default for ContentRef {
    fn default() -> Self {
        Self::new()
    }
}

/// What an external system has put in a room.
///
/// The core only inspects whether unresolved content exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomContents {
    pub enemies: Vec<ContentRef>,
    pub npcs: Vec<ContentRef>,
    pub items: Vec<ContentRef>,
    /// Enemies have been dealt with
    pub cleared: bool,
    /// Items have been taken
    pub looted: bool,
}

impl RoomContents {
    pub fn has_active_enemies(&self) -> bool {
        !self.enemies.is_empty() && !self.cleared
    }

    pub fn has_npcs(&self) -> bool {
        !self.npcs.is_empty()
    }

    pub fn has_unlooted_items(&self) -> bool {
        !self.items.is_empty() && !self.looted
    }
}

/// A rectangular room on the map.
///
/// Serializes to the wire record
/// `{room_id, room_type, bounds, connections, visited}`. Contents belong to
/// external collaborators and are not part of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRoom {
    pub room_id: u32,
    pub room_type: RoomType,
    pub bounds: Bounds,
    pub connections: Vec<Connection>,
    /// Flips true on first entry and never reverts
    pub visited: bool,
    #[serde(skip)]
    pub contents: RoomContents,
}

impl MapRoom {
    /// Creates an unconnected, unvisited room.
    pub fn new(room_id: u32, room_type: RoomType, bounds: Bounds) -> Self {
        Self {
            room_id,
            room_type,
            bounds,
            connections: Vec::new(),
            visited: false,
            contents: RoomContents::default(),
        }
    }

    pub fn center(&self) -> Position {
        self.bounds.center()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.bounds.contains(pos)
    }

    /// The connection leading to `target_room_id`, if any.
    pub fn connection_to(&self, target_room_id: u32) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|connection| connection.target_room_id == target_room_id)
    }

    pub fn is_connected_to(&self, target_room_id: u32) -> bool {
        self.connection_to(target_room_id).is_some()
    }

    /// The L-shaped corridor from this room's center to `other`'s center.
    ///
    /// A horizontal run along this room's center row, then a vertical run
    /// along the other room's center column. Both ends are included.
    pub fn corridor_to(&self, other: &MapRoom) -> Vec<Position> {
        let from = self.center();
        let to = other.center();
        let mut path = Vec::new();

        let step_x = (to.x - from.x).signum();
        let mut x = from.x;
        loop {
            path.push(Position::new(x, from.y));
            if x == to.x {
                break;
            }
            x += step_x;
        }

        let step_y = (to.y - from.y).signum();
        let mut y = from.y;
        while y != to.y {
            y += step_y;
            path.push(Position::new(to.x, y));
        }

        path
    }

    /// Where the door towards `other` goes: the cell at which the corridor
    /// from [`MapRoom::corridor_to`] crosses this room's border.
    ///
    /// When the corridor never crosses the border (overlapping rooms) the
    /// door falls back to the wall facing `direction`.
    pub fn door_towards(&self, other: &MapRoom, direction: Direction) -> Position {
        self.corridor_to(other)
            .into_iter()
            .find(|pos| self.bounds.is_border(*pos))
            .unwrap_or_else(|| self.bounds.door_position(direction))
    }

    /// Summary used for UI state sync.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.room_id,
            room_type: self.room_type,
            bounds: self.bounds,
            visited: self.visited,
            cleared: self.contents.cleared,
        }
    }
}

/// Per-room state pushed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: u32,
    pub room_type: RoomType,
    pub bounds: Bounds,
    pub visited: bool,
    pub cleared: bool,
}

/// Ordered collection of rooms and their connections.
///
/// Deserialization goes through [`RoomGraph::from_rooms`], so loaded graphs
/// are checked like built ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MapRoom>", into = "Vec<MapRoom>")]
pub struct RoomGraph {
    rooms: Vec<MapRoom>,
}

impl TryFrom<Vec<MapRoom>> for RoomGraph {
    type Error = DelveError;

    fn try_from(rooms: Vec<MapRoom>) -> Result<Self, Self::Error> {
        RoomGraph::from_rooms(rooms)
    }
}

impl From<RoomGraph> for Vec<MapRoom> {
    fn from(graph: RoomGraph) -> Self {
        graph.rooms
    }
}

impl RoomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from existing rooms, rejecting duplicate ids and
    /// connections whose reciprocal is missing.
    pub fn from_rooms(rooms: Vec<MapRoom>) -> DelveResult<Self> {
        let graph = Self { rooms };
        let mut seen = HashSet::new();
        for room in &graph.rooms {
            if !seen.insert(room.room_id) {
                return Err(DelveError::InvalidState(format!(
                    "duplicate room id {}",
                    room.room_id
                )));
            }
        }
        if let Some((room_id, target)) = graph.first_unreciprocated() {
            return Err(DelveError::InvalidState(format!(
                "connection {room_id} -> {target} has no reciprocal"
            )));
        }
        Ok(graph)
    }

    /// Appends a room.
    pub fn push(&mut self, room: MapRoom) {
        self.rooms.push(room);
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MapRoom> {
        self.rooms.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, MapRoom> {
        self.rooms.iter_mut()
    }

    pub fn as_slice(&self) -> &[MapRoom] {
        &self.rooms
    }

    pub fn get(&self, room_id: u32) -> Option<&MapRoom> {
        self.rooms.iter().find(|room| room.room_id == room_id)
    }

    pub fn get_mut(&mut self, room_id: u32) -> Option<&mut MapRoom> {
        self.rooms.iter_mut().find(|room| room.room_id == room_id)
    }

    /// Gets a room or reports `RoomNotFound`.
    pub fn room(&self, room_id: u32) -> DelveResult<&MapRoom> {
        self.get(room_id).ok_or(DelveError::RoomNotFound(room_id))
    }

    /// Gets a mutable room or reports `RoomNotFound`.
    pub fn room_mut(&mut self, room_id: u32) -> DelveResult<&mut MapRoom> {
        self.get_mut(room_id).ok_or(DelveError::RoomNotFound(room_id))
    }

    /// Connects two rooms in both directions.
    ///
    /// The direction stored on `from` is the dominant axis between the two
    /// centers; `to` receives the opposite. Each side carries its own door
    /// type. Connecting an already connected pair is a no-op.
    pub fn connect(
        &mut self,
        from: u32,
        to: u32,
        from_door: DoorType,
        to_door: DoorType,
    ) -> DelveResult<Direction> {
        if from == to {
            return Err(DelveError::InvalidState(format!(
                "room {from} cannot connect to itself"
            )));
        }
        let from_center = self.room(from)?.center();
        let to_center = self.room(to)?.center();
        let direction = Direction::dominant(to_center - from_center);

        let source = self.room_mut(from)?;
        if source.is_connected_to(to) {
            return Ok(direction);
        }
        source.connections.push(Connection {
            direction,
            target_room_id: to,
            door_type: from_door,
        });
        self.room_mut(to)?.connections.push(Connection {
            direction: direction.opposite(),
            target_room_id: from,
            door_type: to_door,
        });
        Ok(direction)
    }

    /// Number of undirected connections.
    pub fn connection_count(&self) -> usize {
        self.rooms
            .iter()
            .map(|room| room.connections.len())
            .sum::<usize>()
            / 2
    }

    /// Whether every room is reachable from the first room.
    pub fn is_connected(&self) -> bool {
        let Some(first) = self.rooms.first() else {
            return true;
        };

        let mut seen = HashSet::from([first.room_id]);
        let mut queue = VecDeque::from([first.room_id]);
        while let Some(room_id) = queue.pop_front() {
            if let Some(room) = self.get(room_id) {
                for connection in &room.connections {
                    if seen.insert(connection.target_room_id) {
                        queue.push_back(connection.target_room_id);
                    }
                }
            }
        }
        self.rooms.iter().all(|room| seen.contains(&room.room_id))
    }

    /// First connection lacking an opposite-direction reciprocal, if any.
    pub fn first_unreciprocated(&self) -> Option<(u32, u32)> {
        for room in &self.rooms {
            for connection in &room.connections {
                let reciprocal = self
                    .get(connection.target_room_id)
                    .and_then(|target| target.connection_to(room.room_id))
                    .map(|back| back.direction == connection.direction.opposite())
                    .unwrap_or(false);
                if !reciprocal {
                    return Some((room.room_id, connection.target_room_id));
                }
            }
        }
        None
    }

    /// Summaries of every room, in order.
    pub fn summaries(&self) -> Vec<RoomSummary> {
        self.rooms.iter().map(MapRoom::summary).collect()
    }
}

impl<'a> IntoIterator for &'a RoomGraph {
    type Item = &'a MapRoom;
    type IntoIter = std::slice::Iter<'a, MapRoom>;

    fn into_iter(self) -> Self::IntoIter {
        self.rooms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: u32, x: i32, y: i32) -> MapRoom {
        MapRoom::new(id, RoomType::Chamber, Bounds::from_origin(x, y, 5, 5))
    }

    #[test]
    fn test_bounds_geometry() {
        let bounds = Bounds::from_origin(5, 5, 10, 8);
        assert_eq!(bounds, Bounds::new(5, 5, 14, 12));
        assert_eq!(bounds.width(), 10);
        assert_eq!(bounds.height(), 8);
        assert_eq!(bounds.center(), Position::new(9, 8));

        assert!(bounds.contains(Position::new(5, 5))); // Top-left corner
        assert!(bounds.contains(Position::new(14, 12))); // Bottom-right corner
        assert!(!bounds.contains(Position::new(15, 12)));

        assert!(bounds.is_border(Position::new(10, 5)));
        assert!(!bounds.is_border(Position::new(7, 7)));
    }

    #[test]
    fn test_bounds_positions() {
        let bounds = Bounds::from_origin(0, 0, 4, 4);
        assert_eq!(bounds.positions().count(), 16);
        assert_eq!(bounds.interior_positions().count(), 4);
        assert!(bounds
            .interior_positions()
            .all(|pos| !bounds.is_border(pos)));
    }

    #[test]
    fn test_bounds_normalize_corner_order() {
        let bounds = Bounds::new(8, 9, 2, 3);
        assert_eq!((bounds.x1, bounds.y1, bounds.x2, bounds.y2), (2, 3, 8, 9));
    }

    #[test]
    fn test_center_of_negative_bounds_rounds_down() {
        let bounds = Bounds::new(-5, -4, -2, -1);
        assert_eq!(bounds.center(), Position::new(-4, -3));
    }

    #[test]
    fn test_door_positions() {
        let bounds = Bounds::from_origin(0, 0, 5, 5);
        assert_eq!(bounds.door_position(Direction::North), Position::new(2, 0));
        assert_eq!(bounds.door_position(Direction::South), Position::new(2, 4));
        assert_eq!(bounds.door_position(Direction::East), Position::new(4, 2));
        assert_eq!(bounds.door_position(Direction::West), Position::new(0, 2));
    }

    #[test]
    fn test_connect_stores_reciprocal() {
        let mut graph = RoomGraph::new();
        graph.push(room(0, 0, 0));
        graph.push(room(1, 10, 1));

        let direction = graph
            .connect(0, 1, DoorType::Closed, DoorType::Locked)
            .unwrap();
        assert_eq!(direction, Direction::East);

        let back = graph.get(1).unwrap().connection_to(0).unwrap();
        assert_eq!(back.direction, Direction::West);
        assert_eq!(back.door_type, DoorType::Locked);
        assert_eq!(graph.connection_count(), 1);
        assert!(graph.first_unreciprocated().is_none());

        // Reconnecting is a no-op
        graph.connect(1, 0, DoorType::Open, DoorType::Open).unwrap();
        assert_eq!(graph.connection_count(), 1);
    }

    #[test]
    fn test_connect_unknown_room() {
        let mut graph = RoomGraph::new();
        graph.push(room(0, 0, 0));
        assert!(matches!(
            graph.connect(0, 7, DoorType::Closed, DoorType::Closed),
            Err(DelveError::RoomNotFound(7))
        ));
    }

    #[test]
    fn test_graph_connectivity() {
        let mut graph = RoomGraph::new();
        graph.push(room(0, 0, 0));
        graph.push(room(1, 0, 10));
        graph.push(room(2, 10, 10));
        assert!(!graph.is_connected());

        graph.connect(0, 1, DoorType::Closed, DoorType::Closed).unwrap();
        graph.connect(1, 2, DoorType::Closed, DoorType::Closed).unwrap();
        assert!(graph.is_connected());
        assert_eq!(graph.get(0).unwrap().connections[0].direction, Direction::South);
    }

    #[test]
    fn test_corridor_is_l_shaped() {
        let a = room(0, 0, 0); // center (2, 2)
        let b = room(1, 10, 6); // center (12, 8)
        let corridor = a.corridor_to(&b);

        assert_eq!(corridor.first(), Some(&Position::new(2, 2)));
        assert_eq!(corridor.last(), Some(&Position::new(12, 8)));
        assert!(corridor.contains(&Position::new(12, 2))); // Corner
        assert_eq!(corridor.len(), 10 + 6 + 1);
        for pair in corridor.windows(2) {
            assert!(pair[0].is_cardinal_neighbor(pair[1]));
        }
    }

    #[test]
    fn test_door_sits_where_corridor_leaves() {
        let a = room(0, 0, 0); // center (2, 2)
        let below = room(1, 7, 8); // center (9, 10), mostly south
        let door = a.door_towards(&below, Direction::South);
        // The corridor runs east along row 2 first, so it leaves through the east wall
        assert_eq!(door, Position::new(4, 2));
        assert!(a.corridor_to(&below).contains(&door));

        let straight_below = room(1, 0, 8);
        assert_eq!(
            a.door_towards(&straight_below, Direction::South),
            Position::new(2, 4)
        );

        // Same center: nothing to cross, so the facing wall is used
        let twin = room(1, 0, 0);
        assert_eq!(a.door_towards(&twin, Direction::East), Position::new(4, 2));
    }

    #[test]
    fn test_from_rooms_rejects_one_sided_connection() {
        let mut a = room(0, 0, 0);
        a.connections.push(Connection {
            direction: Direction::East,
            target_room_id: 1,
            door_type: DoorType::Closed,
        });
        let b = room(1, 10, 0);
        assert!(RoomGraph::from_rooms(vec![a, b]).is_err());
        assert!(RoomGraph::from_rooms(vec![room(0, 0, 0), room(0, 5, 5)]).is_err());
    }

    #[test]
    fn test_room_contents_flags() {
        let mut contents = RoomContents::default();
        assert!(!contents.has_active_enemies());

        contents.enemies.push(ContentRef::new());
        contents.items.push(ContentRef::at(Position::new(1, 1)));
        assert!(contents.has_active_enemies());
        assert!(contents.has_unlooted_items());

        contents.cleared = true;
        contents.looted = true;
        assert!(!contents.has_active_enemies());
        assert!(!contents.has_unlooted_items());
    }

    #[test]
    fn test_room_wire_shape_skips_contents() {
        let mut room = room(3, 1, 1);
        room.contents.npcs.push(ContentRef::new());
        let json = serde_json::to_value(&room).unwrap();
        assert_eq!(json["room_id"], 3);
        assert_eq!(json["room_type"], "chamber");
        assert_eq!(json["bounds"]["x2"], 5);
        assert!(json.get("contents").is_none());
    }
}
