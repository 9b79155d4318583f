#![warn(missing_docs)]

//! Tiled map loader, sprite atlas and culling renderer for Macroquad.
//!
//! A [`TileWorld`] owns the active [`TileMap`] snapshot and a [`Camera`]; a
//! [`SpriteAtlas`] owns textures and sprite regions. Each frame the world draws
//! its map through the atlas onto a [`DrawBackend`] ([`MacroquadBackend`] on
//! screen, [`RecordingBackend`] headless).

pub mod atlas;
mod camera;
mod config;
mod error;
pub mod loader;
pub mod map;
mod properties;
pub mod render;
mod tile;
mod world;

pub use atlas::{Borders, Sprite, SpriteAtlas, SpriteId};
pub use camera::Camera;
pub use config::ViewConfig;
pub use error::MapError;
pub use loader::{load_map, load_map_from_str, MapFormat};
pub use map::{
    Layer, LayerId, LayerKind, ObjectLayer, ObjectShape, Orientation, TileLayer, TileMap, TileMapBuilder,
    TileObject, TilesetRef,
};
pub use properties::{Properties, Property, PropertyValue};
pub use render::backend::{DrawBackend, DrawCall, MacroquadBackend, RecordingBackend, TextureDraw};
pub use render::{FrameStats, MapRenderer};
pub use tile::Tile;
pub use world::TileWorld;
