//! # Dungeon Templates
//!
//! Named generation presets. A template fixes the map size, the room-count
//! range, whether the last room is a boss room, the trap and treasure
//! density, the layout strategy and the room types to draw from.

use crate::game::RoomType;
use crate::generation::{DensityTier, LayoutStrategy};
use log::warn;
use serde::Serialize;

/// Template used when a request names one that does not exist.
pub const DEFAULT_TEMPLATE: &str = "medium_dungeon";

/// A named generation preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DungeonTemplate {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub min_rooms: u32,
    pub max_rooms: u32,
    pub has_boss: bool,
    pub density: DensityTier,
    pub layout: LayoutStrategy,
    /// Room types this template may use, entrance and boss included
    pub room_types: &'static [RoomType],
}

const TEMPLATES: &[DungeonTemplate] = &[
    DungeonTemplate {
        name: "small_dungeon",
        width: 40,
        height: 30,
        min_rooms: 3,
        max_rooms: 5,
        has_boss: true,
        density: DensityTier::Low,
        layout: LayoutStrategy::Linear,
        room_types: &[
            RoomType::Entrance,
            RoomType::Chamber,
            RoomType::Treasure,
            RoomType::Trap,
            RoomType::Boss,
        ],
    },
    DungeonTemplate {
        name: "medium_dungeon",
        width: 60,
        height: 40,
        min_rooms: 5,
        max_rooms: 8,
        has_boss: true,
        density: DensityTier::Medium,
        layout: LayoutStrategy::Branching,
        room_types: &[
            RoomType::Entrance,
            RoomType::Chamber,
            RoomType::Treasure,
            RoomType::Trap,
            RoomType::Library,
            RoomType::Shrine,
            RoomType::Boss,
        ],
    },
    DungeonTemplate {
        name: "large_dungeon",
        width: 80,
        height: 50,
        min_rooms: 8,
        max_rooms: 12,
        has_boss: true,
        density: DensityTier::High,
        layout: LayoutStrategy::Organic,
        room_types: &[
            RoomType::Entrance,
            RoomType::Chamber,
            RoomType::Treasure,
            RoomType::Trap,
            RoomType::Library,
            RoomType::Shrine,
            RoomType::Prison,
            RoomType::Corridor,
            RoomType::Boss,
        ],
    },
    DungeonTemplate {
        name: "cave_system",
        width: 60,
        height: 40,
        min_rooms: 4,
        max_rooms: 8,
        has_boss: false,
        density: DensityTier::Medium,
        layout: LayoutStrategy::Organic,
        room_types: &[
            RoomType::Entrance,
            RoomType::Chamber,
            RoomType::Trap,
            RoomType::Treasure,
            RoomType::Corridor,
        ],
    },
    DungeonTemplate {
        name: "tower",
        width: 30,
        height: 70,
        min_rooms: 4,
        max_rooms: 7,
        has_boss: true,
        density: DensityTier::Medium,
        layout: LayoutStrategy::Vertical,
        room_types: &[
            RoomType::Entrance,
            RoomType::Chamber,
            RoomType::Library,
            RoomType::Shrine,
            RoomType::Treasure,
            RoomType::Boss,
        ],
    },
    DungeonTemplate {
        name: "temple",
        width: 60,
        height: 50,
        min_rooms: 5,
        max_rooms: 9,
        has_boss: true,
        density: DensityTier::Medium,
        layout: LayoutStrategy::Symmetrical,
        room_types: &[
            RoomType::Entrance,
            RoomType::Shrine,
            RoomType::Chamber,
            RoomType::Library,
            RoomType::Treasure,
            RoomType::Boss,
        ],
    },
    DungeonTemplate {
        name: "crypt",
        width: 60,
        height: 40,
        min_rooms: 5,
        max_rooms: 8,
        has_boss: true,
        density: DensityTier::High,
        layout: LayoutStrategy::Branching,
        room_types: &[
            RoomType::Entrance,
            RoomType::Tomb,
            RoomType::Chamber,
            RoomType::Trap,
            RoomType::Prison,
            RoomType::Treasure,
            RoomType::Boss,
        ],
    },
];

impl DungeonTemplate {
    /// Every built-in template.
    pub fn all() -> &'static [DungeonTemplate] {
        TEMPLATES
    }

    /// Exact lookup by name.
    pub fn find(name: &str) -> Option<&'static DungeonTemplate> {
        TEMPLATES.iter().find(|template| template.name == name)
    }

    /// Lookup by name, falling back to [`DEFAULT_TEMPLATE`].
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::DungeonTemplate;
    ///
    /// assert_eq!(DungeonTemplate::lookup("tower").name, "tower");
    /// assert_eq!(DungeonTemplate::lookup("nowhere").name, "medium_dungeon");
    /// ```
    pub fn lookup(name: &str) -> &'static DungeonTemplate {
        match Self::find(name) {
            Some(template) => template,
            None => {
                warn!("Unknown template '{name}', using {DEFAULT_TEMPLATE}");
                Self::default_template()
            }
        }
    }

    fn default_template() -> &'static DungeonTemplate {
        // medium_dungeon is the second entry of the table
        &TEMPLATES[1]
    }

    /// Room types interior and non-boss final rooms may draw from.
    ///
    /// Never empty: a vocabulary with nothing but entrance and boss yields
    /// plain chambers.
    pub fn filler_types(&self) -> Vec<RoomType> {
        let fillers: Vec<RoomType> = self
            .room_types
            .iter()
            .copied()
            .filter(|room_type| !matches!(room_type, RoomType::Entrance | RoomType::Boss))
            .collect();
        if fillers.is_empty() {
            vec![RoomType::Chamber]
        } else {
            fillers
        }
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        TEMPLATES.iter().map(|template| template.name)
    }
}
