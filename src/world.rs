use std::path::Path;
use std::sync::Arc;

use log::info;
use macroquad::prelude::*;

use crate::atlas::SpriteAtlas;
use crate::camera::Camera;
use crate::config::ViewConfig;
use crate::error::MapError;
use crate::loader::load_map;
use crate::map::{TileMap, TileObject};
use crate::render::backend::DrawBackend;
use crate::render::{FrameStats, MapRenderer};

/// Owns the active map snapshot and the camera looking at it.
///
/// Loading builds a complete new snapshot before swapping it in, so the
/// renderer and queries only ever see a whole map (or none).
#[derive(Debug, Clone)]
pub struct TileWorld {
    map: Option<Arc<TileMap>>,
    camera: Camera,
    renderer: MapRenderer,
}

impl Default for TileWorld {
    fn default() -> Self {
        Self::new(&ViewConfig::default())
    }
}

impl TileWorld {
    /// World with no map loaded.
    pub fn new(cfg: &ViewConfig) -> Self {
        TileWorld {
            map: None,
            camera: Camera::from_config(cfg),
            renderer: MapRenderer::new(cfg),
        }
    }

    /// Loads a map file and makes it active. On error the current map stays.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), MapError> {
        let map = load_map(path)?;
        self.replace(map);
        Ok(())
    }

    /// Makes an already built map active.
    pub fn replace(&mut self, map: TileMap) {
        if self.map.is_some() {
            info!("replacing active map");
        }
        self.map = Some(Arc::new(map));
    }

    /// Drops the active map.
    pub fn clear(&mut self) {
        self.map = None;
    }

    /// The active map, if any.
    pub fn map(&self) -> Option<&Arc<TileMap>> {
        self.map.as_ref()
    }

    /// Current camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera, e.g. to change zoom.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Centres the camera on `point` (usually the player).
    pub fn set_visible_point(&mut self, point: Vec2) {
        self.camera.target = point;
    }

    /// Follows a window resize.
    pub fn resize(&mut self, screen_size: Vec2) {
        self.camera.resize(screen_size);
    }

    /// Objects of all object layers whose type tag equals `kind`, in layer
    /// then declaration order. Empty when no map is loaded.
    pub fn query_objects_by_type(&self, kind: &str) -> Vec<&TileObject> {
        match &self.map {
            Some(map) => map.objects_by_type(kind).collect(),
            None => Vec::new(),
        }
    }

    /// True when `point` lies within the pixel extent of a tile layer of the active map.
    pub fn point_in_map(&self, point: Vec2) -> bool {
        self.map.as_ref().is_some_and(|m| m.contains_point(point))
    }

    /// Draws the active map through `atlas`. Nothing is drawn without a map.
    pub fn draw<B: DrawBackend>(
        &self,
        backend: &mut B,
        atlas: &SpriteAtlas<B::Texture>,
    ) -> Result<FrameStats, MapError> {
        match &self.map {
            Some(map) => self.renderer.draw(backend, atlas, &self.camera, map),
            None => Ok(FrameStats::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Layer, LayerKind, ObjectLayer, Orientation, TileLayer};
    use crate::properties::Properties;
    use crate::render::backend::RecordingBackend;
    use crate::tile::Tile;

    fn small_map() -> TileMap {
        let mut b = TileMap::builder(Orientation::Orthogonal, 2, 2, 16, 16);
        b.push_layer(Layer {
            id: 1,
            name: "ground".into(),
            width: 2,
            height: 2,
            visible: true,
            opacity: 1.0,
            offset: Vec2::ZERO,
            properties: Properties::new(),
            kind: LayerKind::Tiles(TileLayer {
                tile_size: vec2(16.0, 16.0),
                tiles: vec![Tile::from_raw(1); 4],
            }),
        })
        .unwrap();
        b.push_layer(Layer {
            id: 2,
            name: "things".into(),
            width: 2,
            height: 2,
            visible: true,
            opacity: 1.0,
            offset: Vec2::ZERO,
            properties: Properties::new(),
            kind: LayerKind::Objects(ObjectLayer {
                objects: vec![TileObject {
                    id: 3,
                    kind: "door".into(),
                    ..Default::default()
                }],
            }),
        })
        .unwrap();
        b.build()
    }

    #[test]
    fn empty_world_answers_neutrally() {
        let world = TileWorld::default();
        assert!(world.map().is_none());
        assert!(!world.point_in_map(vec2(0.0, 0.0)));
        assert!(world.query_objects_by_type("door").is_empty());

        let atlas: SpriteAtlas<u8> = SpriteAtlas::new();
        let mut rec = RecordingBackend::new();
        assert_eq!(world.draw(&mut rec, &atlas).unwrap(), FrameStats::default());
        assert!(rec.calls.is_empty());
    }

    #[test]
    fn queries_follow_the_active_map() {
        let mut world = TileWorld::default();
        world.replace(small_map());
        assert!(world.point_in_map(vec2(0.0, 0.0)));
        assert!(!world.point_in_map(vec2(-1.0, 3.0)));
        assert_eq!(world.query_objects_by_type("door")[0].id, 3);

        world.clear();
        assert!(!world.point_in_map(vec2(0.0, 0.0)));
        assert!(world.query_objects_by_type("door").is_empty());
    }

    #[test]
    fn failed_load_keeps_previous_map() {
        let mut world = TileWorld::default();
        world.replace(small_map());
        let before = Arc::clone(world.map().unwrap());

        let missing = std::env::temp_dir().join("tileworld_does_not_exist.tmx");
        let err = world.load(&missing).unwrap_err();
        assert!(matches!(err, MapError::Io { .. }));
        assert!(Arc::ptr_eq(world.map().unwrap(), &before));
        assert_eq!(world.query_objects_by_type("door").len(), 1);
    }

    #[test]
    fn set_visible_point_moves_the_camera() {
        let mut world = TileWorld::new(&ViewConfig {
            screen_width: 100.0,
            screen_height: 50.0,
            ..Default::default()
        });
        world.set_visible_point(vec2(500.0, 500.0));
        assert_eq!(world.camera().view_rect(), Rect::new(450.0, 475.0, 100.0, 50.0));

        world.resize(vec2(200.0, 100.0));
        assert_eq!(world.camera().view_rect(), Rect::new(400.0, 450.0, 200.0, 100.0));
    }

    #[test]
    fn draw_uses_the_world_camera() {
        let mut world = TileWorld::new(&ViewConfig {
            screen_width: 8.0,
            screen_height: 8.0,
            ..Default::default()
        });
        world.replace(small_map());
        world.set_visible_point(vec2(8.0, 8.0));

        let mut atlas = SpriteAtlas::new();
        atlas.register_texture(0, 'a');
        atlas.add_grid_sprites(0, Vec2::ZERO, vec2(16.0, 16.0), 1, 1);

        let mut rec = RecordingBackend::new();
        let stats = world.draw(&mut rec, &atlas).unwrap();
        // view is [4,12] on both axes: only the first cell is visible
        assert_eq!(stats.tiles_drawn, 1);
        assert_eq!(stats.tiles_culled, 3);
        let (tex, p) = rec.quads().next().unwrap();
        assert_eq!(*tex, 'a');
        assert_eq!(p.dest, Rect::new(0.0, 0.0, 16.0, 16.0));
    }
}
