//! # Text Renderer
//!
//! One character per tile, rows separated by newlines.

use crate::game::{DungeonMap, TileType, Visibility};
use crate::rendering::{apparent_type, content_markers, tile_visibility, MarkerKind, RenderOptions};

/// Glyph for a tile seen first hand or with fog off.
pub fn tile_glyph(tile_type: TileType) -> char {
    match tile_type {
        TileType::Floor => '.',
        TileType::Wall => '#',
        TileType::DoorClosed => '+',
        TileType::DoorOpen => '\'',
        TileType::DoorLocked => '=',
        TileType::DoorSecret => '*',
        TileType::StairsUp => '<',
        TileType::StairsDown => '>',
        TileType::Trap => '^',
        TileType::TrapDisabled => '_',
        TileType::Chest => '$',
        TileType::ChestOpen => 'u',
        TileType::Water => '~',
        TileType::Pit => 'O',
        TileType::Pillar => 'I',
        TileType::Altar => 'A',
        TileType::Statue => '&',
        TileType::Empty => ' ',
    }
}

/// Glyph for a tile known about but not seen.
pub const REVEALED_GLYPH: char = '?';
/// Glyph for a tile the party knows nothing about.
pub const HIDDEN_GLYPH: char = ' ';
pub const PARTY_GLYPH: char = '@';
pub const ENEMY_GLYPH: char = 'E';
pub const NPC_GLYPH: char = 'N';

/// Renders the map as a text grid.
///
/// # Examples
///
/// ```
/// use delve::{render_text, DungeonMap, FogMode, Position, RenderOptions, TileType};
///
/// let mut map = DungeonMap::new(3, 1);
/// map.fog_of_war_mode = FogMode::None;
/// map.set_tile_type(Position::new(1, 0), TileType::Floor).unwrap();
/// assert_eq!(render_text(&map, &RenderOptions::default()), " . ");
/// ```
pub fn render_text(map: &DungeonMap, options: &RenderOptions) -> String {
    let mode = options.effective_fog_mode(map);
    let width = map.tiles.width() as usize;
    let height = map.tiles.height() as usize;

    let mut rows: Vec<Vec<char>> = (0..height as i32)
        .map(|y| {
            map.tiles
                .row(y)
                .iter()
                .map(|tile| match tile_visibility(tile, mode) {
                    Visibility::Hidden => HIDDEN_GLYPH,
                    Visibility::Revealed => REVEALED_GLYPH,
                    Visibility::Visible => tile_glyph(apparent_type(tile)),
                })
                .collect()
        })
        .collect();

    let mut put = |x: i32, y: i32, glyph: char| {
        if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
            rows[y as usize][x as usize] = glyph;
        }
    };

    if options.show_contents {
        for marker in content_markers(map, mode) {
            let glyph = match marker.kind {
                MarkerKind::Enemy => ENEMY_GLYPH,
                MarkerKind::Npc => NPC_GLYPH,
            };
            put(marker.position.x, marker.position.y, glyph);
        }
    }

    // Party goes last so nothing can cover it
    if options.show_party {
        if let Some(party) = map.party {
            put(party.x, party.y, PARTY_GLYPH);
        }
    }

    rows.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
