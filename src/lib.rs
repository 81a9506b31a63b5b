//! # Delve
//!
//! A procedural dungeon core: builds grid-based dungeons from named templates,
//! tracks what the party has actually seen of them, and resolves party
//! movement and line of sight in real time.
//!
//! ## Architecture Overview
//!
//! The crate is organised leaf-first:
//!
//! - **Game Model**: [`TileGrid`], [`RoomGraph`] and the [`DungeonMap`]
//!   aggregate that owns them together with the single [`PartyPosition`]
//! - **Generation System**: [`DungeonGenerator`] interprets a [`DungeonTemplate`]
//!   into a concrete map (layout, connectivity, door typing, rasterization)
//! - **Fog of War**: [`FogOfWarEngine`] owns the three visibility modes and
//!   answers line-of-sight queries
//! - **Movement**: [`MovementEngine`] validates moves, runs BFS pathfinding,
//!   checks doors and traps along the path and raises room-entry events
//! - **Rendering System**: text, vector and sprite-data renderers, all pure
//!   functions of a map snapshot
//!
//! Engines are stateless values that receive the map explicitly. A
//! [`DungeonSession`] wraps one map behind a lock for callers that share it
//! between threads.
//!
//! ## Example
//!
//! ```
//! use delve::{DungeonGenerator, GenerationConfig, MovementEngine, Direction};
//!
//! let config = GenerationConfig::for_template("small_dungeon", 7).with_room_count(3);
//! let mut map = DungeonGenerator::new().generate_map(&config);
//! assert_eq!(map.rooms.len(), 3);
//!
//! let mut rng = delve::generation::utils::create_rng(&config);
//! let _ = MovementEngine::new().move_direction(&mut map, Direction::South, &mut rng);
//! ```

pub mod game;
pub mod generation;
pub mod rendering;
pub mod utils;

pub use game::*;
pub use generation::*;
pub use rendering::*;
pub use utils::*;

/// Core error type for the Delve dungeon engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Target coordinates lie outside the map dimensions
    #[error("Position ({x}, {y}) is out of bounds")]
    OutOfBounds { x: i32, y: i32 },

    /// Target tile type forbids entry
    #[error("Position ({x}, {y}) is blocked by {tile_type}")]
    Blocked {
        x: i32,
        y: i32,
        tile_type: game::TileType,
    },

    /// A locked door lies on the path to the destination
    #[error("A locked door at ({x}, {y}) blocks the way")]
    DoorLocked { x: i32, y: i32 },

    /// An undiscovered secret door lies on the path to the destination
    #[error("An undiscovered secret door at ({x}, {y}) blocks the way")]
    SecretDoorUndiscovered { x: i32, y: i32 },

    /// Unrecognized fog-of-war mode
    #[error("Invalid fog mode: {0}")]
    InvalidFogMode(String),

    /// Coordinate has no tile record
    #[error("No tile at ({x}, {y})")]
    TileNotFound { x: i32, y: i32 },

    /// Referenced room does not exist on the map
    #[error("Room {0} not found")]
    RoomNotFound(u32),

    /// The map has no party placed on it yet
    #[error("No party position on this map")]
    NoPartyPosition,

    /// Unrecognized render format
    #[error("Invalid render format: {0}")]
    InvalidFormat(String),

    /// Map state is structurally invalid
    #[error("Invalid map state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine configuration constants.
pub mod config {
    /// Default map width in tiles when a template does not specify one
    pub const DEFAULT_MAP_WIDTH: u32 = 60;

    /// Default map height in tiles when a template does not specify one
    pub const DEFAULT_MAP_HEIGHT: u32 = 40;

    /// Largest room count a generation request may ask for
    pub const MAX_ROOMS: u32 = 40;

    /// Smallest room edge length (walls included)
    pub const MIN_ROOM_DIMENSION: i32 = 3;

    /// Gap between consecutive rooms in linear and vertical layouts
    pub const LINEAR_GAP: i32 = 3;

    /// Corridor gap between a branch room and its parent
    pub const BRANCH_GAP: i32 = 4;

    /// Maximum jitter applied per axis by the organic layout
    pub const ORGANIC_JITTER: i32 = 2;

    /// Default radius for line-of-sight queries
    pub const DEFAULT_SIGHT_RADIUS: i32 = 8;
}
