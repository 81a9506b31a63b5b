//! # Rendering Module
//!
//! Side-effect-free views of a [`DungeonMap`]: a text grid, a vector scene
//! and sprite-sheet records.
//!
//! Every renderer asks [`FogOfWarEngine::visibility`] how to present a tile
//! and never inspects the `visited`/`revealed` flags itself, so the three
//! back ends always agree with each other and with the fog engine.

pub mod sprite;
pub mod text;
pub mod vector;

pub use sprite::*;
pub use text::*;
pub use vector::*;

use crate::game::{DungeonMap, FogMode, FogOfWarEngine, Position, Tile, TileType, Visibility};
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output formats a map can be rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderFormat {
    Text,
    Vector,
    SpriteData,
}

impl RenderFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            RenderFormat::Text => "text",
            RenderFormat::Vector => "vector",
            RenderFormat::SpriteData => "sprite-data",
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderFormat {
    type Err = DelveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "ascii" => Ok(RenderFormat::Text),
            "vector" | "svg" => Ok(RenderFormat::Vector),
            "sprite-data" | "sprite_data" | "sprites" => Ok(RenderFormat::SpriteData),
            _ => Err(DelveError::InvalidFormat(s.to_string())),
        }
    }
}

/// Knobs shared by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Edge length of one tile in vector units
    pub tile_size: f32,
    /// Draw the party marker
    pub show_party: bool,
    /// Draw enemy and NPC markers
    pub show_contents: bool,
    /// Render as if the map were in this fog mode
    pub fog_mode: Option<FogMode>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tile_size: 16.0,
            show_party: true,
            show_contents: true,
            fog_mode: None,
        }
    }
}

impl RenderOptions {
    /// The fog mode renderers should apply to `map`.
    pub fn effective_fog_mode(&self, map: &DungeonMap) -> FogMode {
        self.fog_mode.unwrap_or(map.fog_of_war_mode)
    }
}

/// A rendered view, tagged with its format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", content = "data", rename_all = "kebab-case")]
pub enum RenderOutput {
    Text(String),
    Vector(VectorScene),
    SpriteData(Vec<SpriteRecord>),
}

impl RenderOutput {
    pub fn format(&self) -> RenderFormat {
        match self {
            RenderOutput::Text(_) => RenderFormat::Text,
            RenderOutput::Vector(_) => RenderFormat::Vector,
            RenderOutput::SpriteData(_) => RenderFormat::SpriteData,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RenderOutput::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Human-readable form: the text grid, SVG markup or JSON sprite records.
    pub fn to_display_string(&self) -> DelveResult<String> {
        match self {
            RenderOutput::Text(text) => Ok(text.clone()),
            RenderOutput::Vector(scene) => Ok(scene.to_svg()),
            RenderOutput::SpriteData(records) => Ok(serde_json::to_string_pretty(records)?),
        }
    }
}

/// Renders `map` in `format`.
///
/// # Examples
///
/// ```
/// use delve::{render, DungeonMap, RenderFormat, RenderOptions};
///
/// let map = DungeonMap::new(3, 2);
/// let output = render(&map, RenderFormat::Text, &RenderOptions::default());
/// assert_eq!(output.as_text(), Some("   \n   "));
/// ```
pub fn render(map: &DungeonMap, format: RenderFormat, options: &RenderOptions) -> RenderOutput {
    match format {
        RenderFormat::Text => RenderOutput::Text(render_text(map, options)),
        RenderFormat::Vector => RenderOutput::Vector(render_vector(map, options)),
        RenderFormat::SpriteData => RenderOutput::SpriteData(render_sprites(map, options)),
    }
}

/// Renders `map` in the format named by `format`.
pub fn render_named(
    map: &DungeonMap,
    format: &str,
    options: &RenderOptions,
) -> DelveResult<RenderOutput> {
    Ok(render(map, format.parse()?, options))
}

/// Kinds of room content drawn on top of tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Enemy,
    Npc,
}

/// Positioned room content to overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMarker {
    pub position: Position,
    pub kind: MarkerKind,
}

/// Enemy and NPC markers for rooms the party has visited, or every room
/// when fog is off. Cleared rooms show no enemies; content without a
/// position is not drawn.
pub fn content_markers(map: &DungeonMap, mode: FogMode) -> Vec<ContentMarker> {
    let mut markers = Vec::new();
    for room in map.rooms.iter() {
        if !(room.visited || mode == FogMode::None) {
            continue;
        }
        let enemies = if room.contents.cleared {
            &[][..]
        } else {
            &room.contents.enemies[..]
        };
        let tagged = enemies
            .iter()
            .map(|content| (content, MarkerKind::Enemy))
            .chain(room.contents.npcs.iter().map(|content| (content, MarkerKind::Npc)));
        for (content, kind) in tagged {
            if let Some(position) = content.position {
                markers.push(ContentMarker { position, kind });
            }
        }
    }
    markers
}

/// Visibility of a tile as every renderer must see it.
pub(crate) fn tile_visibility(tile: &Tile, mode: FogMode) -> Visibility {
    FogOfWarEngine::visibility(tile, mode)
}

/// Undiscovered secret doors are drawn as the wall they pretend to be.
pub(crate) fn apparent_type(tile: &Tile) -> TileType {
    if tile.tile_type == TileType::DoorSecret && !tile.is_discovered() {
        TileType::Wall
    } else {
        tile.tile_type
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::two_room_map;
    use super::*;
    use crate::game::ContentRef;

    #[test]
    fn test_format_parsing() {
        assert_eq!("text".parse::<RenderFormat>().unwrap(), RenderFormat::Text);
        assert_eq!(
            "Sprite-Data".parse::<RenderFormat>().unwrap(),
            RenderFormat::SpriteData
        );
        assert!(matches!(
            "hologram".parse::<RenderFormat>(),
            Err(DelveError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_render_dispatch() {
        let map = two_room_map();
        let options = RenderOptions::default();
        for format in [RenderFormat::Text, RenderFormat::Vector, RenderFormat::SpriteData] {
            assert_eq!(render(&map, format, &options).format(), format);
        }
        assert!(render_named(&map, "nope", &options).is_err());
    }

    #[test]
    fn test_render_does_not_mutate() {
        let map = two_room_map();
        let before = map.clone();
        let options = RenderOptions::default();
        let _ = render(&map, RenderFormat::Text, &options);
        let _ = render(&map, RenderFormat::Vector, &options);
        let _ = render(&map, RenderFormat::SpriteData, &options);
        assert_eq!(map, before);
    }

    #[test]
    fn test_content_markers_follow_visits() {
        let mut map = two_room_map();
        map.room_contents_mut(0)
            .unwrap()
            .enemies
            .push(ContentRef::at(Position::new(1, 1)));
        map.room_contents_mut(1)
            .unwrap()
            .npcs
            .push(ContentRef::at(Position::new(9, 2)));
        map.room_contents_mut(1).unwrap().npcs.push(ContentRef::new());

        let markers = content_markers(&map, FogMode::Partial);
        assert_eq!(
            markers,
            vec![ContentMarker {
                position: Position::new(1, 1),
                kind: MarkerKind::Enemy
            }]
        );
        assert_eq!(content_markers(&map, FogMode::None).len(), 2);

        map.mark_room_cleared(0).unwrap();
        assert!(content_markers(&map, FogMode::Partial).is_empty());
    }

    #[test]
    fn test_output_serializes_with_format_tag() {
        let map = two_room_map();
        let output = render(&map, RenderFormat::Text, &RenderOptions::default());
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["format"], "text");
        assert!(json["data"].is_string());
    }
}
