//! Wire types of the level and asset service

use dungeon_core::Material;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Body of `POST /dungeon`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonRequest {
    pub seed: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl DungeonRequest {
    /// Request the window `[x, y, w, h]` for `seed`
    pub fn new(seed: impl Into<String>, window: [i32; 4]) -> Self {
        let [x, y, w, h] = window;
        Self {
            seed: seed.into(),
            x,
            y,
            w,
            h,
        }
    }
}

/// One generated dungeon cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub key: String,
    pub x: i32,
    pub y: i32,
    pub symbol: String,
    #[serde(default)]
    pub kind: String,
}

/// Generated dungeon: tiles keyed by tile key, in the order the server sent them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonMap {
    pub seed: String,
    #[serde(default)]
    pub tiles: IndexMap<String, Tile>,
}

impl DungeonMap {
    /// Flatten the tile map into display order (response order)
    pub fn flatten_tiles(&self) -> Vec<Tile> {
        self.tiles.values().cloned().collect()
    }
}

/// Material entry returned by `GET /materials`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDescriptor {
    pub shader: String,
    #[serde(default)]
    pub props: serde_json::Value,
}

impl MaterialDescriptor {
    /// Build a render material, reading `props.color` as `"#rrggbb"` or `0xrrggbb`
    ///
    /// Missing or malformed colors fall back to white.
    pub fn to_material(&self) -> Material {
        let color = self
            .props
            .get("color")
            .and_then(parse_color)
            .unwrap_or([1.0, 1.0, 1.0, 1.0]);
        Material::new(self.shader.clone(), color)
    }
}

fn parse_color(value: &serde_json::Value) -> Option<[f32; 4]> {
    let rgb = match value {
        serde_json::Value::String(s) => u32::from_str_radix(s.strip_prefix('#')?, 16).ok()?,
        serde_json::Value::Number(n) => u32::try_from(n.as_u64()?).ok()?,
        _ => return None,
    };
    if rgb > 0xFF_FFFF {
        return None;
    }
    let channel = |shift: u32| ((rgb >> shift) & 0xFF) as f32 / 255.0;
    Some([channel(16), channel(8), channel(0), 1.0])
}

/// Object descriptor returned by `GET /object/{id}`
///
/// Only `id` and `name` are interpreted; everything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
