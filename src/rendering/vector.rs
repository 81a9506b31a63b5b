//! # Vector Renderer
//!
//! Emits shape primitives per tile and entity. The scene serializes to JSON
//! for clients that draw it themselves, or to a standalone SVG document.

use crate::game::{DungeonMap, TileType, Visibility};
use crate::rendering::{apparent_type, content_markers, tile_visibility, MarkerKind, RenderOptions};
use crate::DelveResult;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Opacity of the shade laid over tiles that are revealed but not visited.
pub const REVEALED_OVERLAY_OPACITY: f32 = 0.5;

/// A drawing primitive in scene units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: String,
        opacity: f32,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: String,
        opacity: f32,
    },
    /// SVG path data, stroked and unfilled
    Path {
        d: String,
        stroke: String,
        stroke_width: f32,
    },
}

impl Shape {
    fn rect(x: f32, y: f32, size: f32, fill: &str) -> Self {
        Shape::Rect {
            x,
            y,
            width: size,
            height: size,
            fill: fill.to_string(),
            opacity: 1.0,
        }
    }

    fn circle(cx: f32, cy: f32, r: f32, fill: &str) -> Self {
        Shape::Circle {
            cx,
            cy,
            r,
            fill: fill.to_string(),
            opacity: 1.0,
        }
    }

    fn path(d: String, stroke: &str, stroke_width: f32) -> Self {
        Shape::Path {
            d,
            stroke: stroke.to_string(),
            stroke_width,
        }
    }

    fn write_svg(&self, out: &mut String) -> std::fmt::Result {
        match self {
            Shape::Rect {
                x,
                y,
                width,
                height,
                fill,
                opacity,
            } => writeln!(
                out,
                r#"  <rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{fill}" opacity="{opacity}"/>"#
            ),
            Shape::Circle {
                cx,
                cy,
                r,
                fill,
                opacity,
            } => writeln!(
                out,
                r#"  <circle cx="{cx}" cy="{cy}" r="{r}" fill="{fill}" opacity="{opacity}"/>"#
            ),
            Shape::Path {
                d,
                stroke,
                stroke_width,
            } => writeln!(
                out,
                r#"  <path d="{d}" stroke="{stroke}" stroke-width="{stroke_width}" fill="none"/>"#
            ),
        }
    }
}

/// A full vector view of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorScene {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub shapes: Vec<Shape>,
}

impl VectorScene {
    /// Renders the scene as an SVG document.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_svg(&mut out);
        out
    }

    fn write_svg(&self, out: &mut String) -> std::fmt::Result {
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        )?;
        writeln!(
            out,
            r#"  <rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            self.width, self.height, self.background
        )?;
        for shape in &self.shapes {
            shape.write_svg(out)?;
        }
        writeln!(out, "</svg>")
    }

    pub fn to_json(&self) -> DelveResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Base fill for a tile type.
pub fn tile_fill(tile_type: TileType) -> &'static str {
    match tile_type {
        TileType::Wall => "#4a4a4a",
        TileType::Water => "#2b5d8a",
        TileType::Pit => "#111111",
        TileType::Empty => "#000000",
        _ => "#9c8f7a",
    }
}

/// Renders the map as a vector scene.
pub fn render_vector(map: &DungeonMap, options: &RenderOptions) -> VectorScene {
    let mode = options.effective_fog_mode(map);
    let size = options.tile_size;
    let mut shapes = Vec::new();

    for tile in map.tiles.iter() {
        let visibility = tile_visibility(tile, mode);
        if visibility == Visibility::Hidden {
            continue;
        }
        let tile_type = apparent_type(tile);
        if tile_type == TileType::Empty {
            continue;
        }
        let x = tile.x as f32 * size;
        let y = tile.y as f32 * size;
        shapes.push(Shape::rect(x, y, size, tile_fill(tile_type)));
        shapes.extend(feature_shapes(tile_type, x, y, size));

        if visibility == Visibility::Revealed {
            shapes.push(Shape::Rect {
                x,
                y,
                width: size,
                height: size,
                fill: "#000000".to_string(),
                opacity: REVEALED_OVERLAY_OPACITY,
            });
        }
    }

    let center = |x: i32, y: i32| ((x as f32 + 0.5) * size, (y as f32 + 0.5) * size);

    if options.show_contents {
        for marker in content_markers(map, mode) {
            let (cx, cy) = center(marker.position.x, marker.position.y);
            let fill = match marker.kind {
                MarkerKind::Enemy => "#c0392b",
                MarkerKind::Npc => "#27ae60",
            };
            shapes.push(Shape::circle(cx, cy, size * 0.35, fill));
        }
    }

    if options.show_party {
        if let Some(party) = map.party {
            let (cx, cy) = center(party.x, party.y);
            shapes.push(Shape::circle(cx, cy, size * 0.4, "#f1c40f"));
            let delta = party.facing.to_delta();
            let (tx, ty) = (
                cx + delta.x as f32 * size * 0.5,
                cy + delta.y as f32 * size * 0.5,
            );
            shapes.push(Shape::path(
                format!("M {cx} {cy} L {tx} {ty}"),
                "#000000",
                size / 8.0,
            ));
        }
    }

    VectorScene {
        width: map.tiles.width() as f32 * size,
        height: map.tiles.height() as f32 * size,
        background: "#000000".to_string(),
        shapes,
    }
}

/// Extra shapes drawn on top of a tile's base rectangle.
fn feature_shapes(tile_type: TileType, x: f32, y: f32, size: f32) -> Vec<Shape> {
    let inset = size * 0.2;
    let inner = size - 2.0 * inset;
    let (cx, cy) = (x + size / 2.0, y + size / 2.0);
    let stroke = size / 8.0;

    match tile_type {
        TileType::DoorClosed | TileType::DoorLocked | TileType::DoorSecret => {
            let fill = match tile_type {
                TileType::DoorLocked => "#8e2b1f",
                TileType::DoorSecret => "#5d4b7a",
                _ => "#7a5230",
            };
            let mut shapes = vec![Shape::Rect {
                x: x + inset / 2.0,
                y: y + inset / 2.0,
                width: size - inset,
                height: size - inset,
                fill: fill.to_string(),
                opacity: 1.0,
            }];
            if tile_type == TileType::DoorLocked {
                shapes.push(Shape::circle(cx, cy, size * 0.1, "#f1c40f"));
            }
            shapes
        }
        TileType::DoorOpen => vec![Shape::path(
            format!("M {} {} L {} {}", x + inset, y + inset, x + inset, y + size - inset),
            "#7a5230",
            stroke,
        )],
        TileType::StairsUp | TileType::StairsDown => {
            let steps = 3;
            let mut d = String::new();
            for step in 0..steps {
                let sy = y + inset + inner * step as f32 / steps as f32;
                let _ = write!(d, "M {} {sy} L {} {sy} ", x + inset, x + size - inset);
            }
            let stroke_color = if tile_type == TileType::StairsUp {
                "#ecf0f1"
            } else {
                "#34495e"
            };
            vec![Shape::path(d.trim_end().to_string(), stroke_color, stroke)]
        }
        TileType::Trap | TileType::TrapDisabled => {
            let color = if tile_type == TileType::Trap {
                "#c0392b"
            } else {
                "#7f8c8d"
            };
            vec![Shape::path(
                format!(
                    "M {} {} L {} {} M {} {} L {} {}",
                    x + inset,
                    y + inset,
                    x + size - inset,
                    y + size - inset,
                    x + size - inset,
                    y + inset,
                    x + inset,
                    y + size - inset
                ),
                color,
                stroke,
            )]
        }
        TileType::Chest | TileType::ChestOpen => {
            let fill = if tile_type == TileType::Chest {
                "#d4a017"
            } else {
                "#6e5a1e"
            };
            vec![Shape::Rect {
                x: x + inset,
                y: y + inset * 1.5,
                width: inner,
                height: inner - inset,
                fill: fill.to_string(),
                opacity: 1.0,
            }]
        }
        TileType::Pillar => vec![Shape::circle(cx, cy, size * 0.35, "#7f8c8d")],
        TileType::Altar => vec![Shape::circle(cx, cy, size * 0.3, "#ecf0f1")],
        TileType::Statue => vec![Shape::circle(cx, cy, size * 0.3, "#95a5a6")],
        _ => Vec::new(),
    }
}
