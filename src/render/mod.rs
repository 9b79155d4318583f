//! Per-frame map drawing: projection, view culling and dispatch to the atlas.

pub mod backend;
pub mod cull;

use macroquad::prelude::*;

use crate::atlas::SpriteAtlas;
use crate::camera::Camera;
use crate::config::ViewConfig;
use crate::error::MapError;
use crate::map::{Layer, LayerKind, ObjectLayer, ObjectShape, Orientation, TileLayer, TileMap};

use self::backend::DrawBackend;
use self::cull::{is_visible, tile_dest_rect};

/// Counters for one [`MapRenderer::draw`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Non-empty cells that passed culling and were handed to the atlas.
    pub tiles_drawn: usize,
    /// Non-empty cells outside the view.
    pub tiles_culled: usize,
    /// Text objects drawn.
    pub labels_drawn: usize,
}

/// Draws tile layers through a [`SpriteAtlas`] and text objects as labels.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRenderer {
    /// Font size for text objects.
    pub label_font_size: f32,
    /// Base color for text objects.
    pub label_color: Color,
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new(&ViewConfig::default())
    }
}

impl MapRenderer {
    /// Renderer using the label settings of `cfg`.
    pub fn new(cfg: &ViewConfig) -> Self {
        MapRenderer {
            label_font_size: cfg.label_font_size,
            label_color: cfg.label_color(),
        }
    }

    /// Draws every visible layer of `map` in file order.
    ///
    /// Cells whose sprite id is unknown to the atlas are skipped. A sprite
    /// referencing an unregistered texture aborts the frame with
    /// [`MapError::UnregisteredTexture`].
    ///
    /// Text labels are drawn in world coordinates like the tiles, so they
    /// move and scale with the camera rather than staying fixed on screen.
    pub fn draw<B: DrawBackend>(
        &self,
        backend: &mut B,
        atlas: &SpriteAtlas<B::Texture>,
        camera: &Camera,
        map: &TileMap,
    ) -> Result<FrameStats, MapError> {
        let view = camera.view_rect();
        let mut stats = FrameStats::default();

        for layer in map.layers().iter().filter(|l| l.visible) {
            match &layer.kind {
                LayerKind::Tiles(tiles) => {
                    self.draw_tiles(backend, atlas, map.orientation(), layer, tiles, &view, &mut stats)?
                }
                LayerKind::Objects(objects) => self.draw_labels(backend, layer, objects, &mut stats),
            }
        }
        Ok(stats)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_tiles<B: DrawBackend>(
        &self,
        backend: &mut B,
        atlas: &SpriteAtlas<B::Texture>,
        orientation: Orientation,
        layer: &Layer,
        tiles: &TileLayer,
        view: &Rect,
        stats: &mut FrameStats,
    ) -> Result<(), MapError> {
        if layer.width == 0 {
            return Ok(());
        }
        let tint = with_opacity(WHITE, layer.opacity);

        for (idx, tile) in tiles.tiles.iter().enumerate() {
            let Some(sprite) = tile.sprite() else {
                continue;
            };
            let col = (idx % layer.width as usize) as u32;
            let row = (idx / layer.width as usize) as u32;

            let mut dest = tile_dest_rect(orientation, col, row, tiles.tile_size);
            dest.x += layer.offset.x;
            dest.y += layer.offset.y;

            if !is_visible(&dest, view) {
                stats.tiles_culled += 1;
                continue;
            }
            atlas.draw_sprite(backend, sprite, dest, 0.0, tint)?;
            stats.tiles_drawn += 1;
        }
        Ok(())
    }

    fn draw_labels<B: DrawBackend>(
        &self,
        backend: &mut B,
        layer: &Layer,
        objects: &ObjectLayer,
        stats: &mut FrameStats,
    ) {
        let color = with_opacity(self.label_color, layer.opacity);
        for obj in objects.objects.iter().filter(|o| o.visible) {
            // other shapes are data for gameplay code, not drawn here
            let ObjectShape::Text(text) = &obj.shape else {
                continue;
            };
            if text.is_empty() {
                continue;
            }
            let pos = vec2(obj.bounds.x, obj.bounds.y) + layer.offset;
            backend.draw_text(text, pos, self.label_font_size, color);
            stats.labels_drawn += 1;
        }
    }
}

fn with_opacity(color: Color, opacity: f32) -> Color {
    Color {
        a: color.a * opacity.clamp(0.0, 1.0),
        ..color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::Borders;
    use crate::map::TileObject;
    use crate::properties::Properties;
    use crate::render::backend::RecordingBackend;
    use crate::tile::Tile;

    fn atlas() -> SpriteAtlas<u32> {
        let mut a = SpriteAtlas::new();
        a.register_texture(0, 0);
        a.add_grid_sprites(0, Vec2::ZERO, vec2(16.0, 16.0), 4, 1);
        a
    }

    fn tiles(id: u32, w: u32, h: u32, raw: &[u32]) -> Layer {
        Layer {
            id,
            name: "ground".into(),
            width: w,
            height: h,
            visible: true,
            opacity: 1.0,
            offset: Vec2::ZERO,
            properties: Properties::new(),
            kind: LayerKind::Tiles(TileLayer {
                tile_size: vec2(16.0, 16.0),
                tiles: raw.iter().copied().map(Tile::from_raw).collect(),
            }),
        }
    }

    fn labels(id: u32, objs: Vec<TileObject>) -> Layer {
        Layer {
            id,
            name: "labels".into(),
            width: 0,
            height: 0,
            visible: true,
            opacity: 1.0,
            offset: Vec2::ZERO,
            properties: Properties::new(),
            kind: LayerKind::Objects(ObjectLayer { objects: objs }),
        }
    }

    fn camera_over(view: Rect) -> Camera {
        let mut cam = Camera::new(vec2(view.w, view.h));
        cam.target = vec2(view.x + view.w / 2.0, view.y + view.h / 2.0);
        cam
    }

    #[test]
    fn draws_non_empty_cells_with_their_sprite() {
        let mut b = TileMap::builder(Orientation::Orthogonal, 2, 2, 16, 16);
        b.push_layer(tiles(1, 2, 2, &[1, 0, 0, 4])).unwrap();
        let map = b.build();

        let mut rec = RecordingBackend::new();
        let stats = MapRenderer::default()
            .draw(&mut rec, &atlas(), &camera_over(Rect::new(0.0, 0.0, 64.0, 64.0)), &map)
            .unwrap();

        assert_eq!(stats.tiles_drawn, 2);
        let quads: Vec<_> = rec.quads().map(|(_, p)| *p).collect();
        assert_eq!(quads[0].dest, Rect::new(0.0, 0.0, 16.0, 16.0));
        assert_eq!(quads[0].source.x, 0.0);
        assert_eq!(quads[1].dest, Rect::new(16.0, 16.0, 16.0, 16.0));
        assert_eq!(quads[1].source.x, 48.0);
        assert_eq!(quads[1].tint, WHITE);
    }

    #[test]
    fn culls_cells_outside_the_view() {
        let mut b = TileMap::builder(Orientation::Orthogonal, 10, 1, 16, 16);
        b.push_layer(tiles(1, 10, 1, &[1; 10])).unwrap();
        let map = b.build();

        // view covers x in [0, 40]: columns 0, 1 and 2 overlap
        let mut rec = RecordingBackend::new();
        let stats = MapRenderer::default()
            .draw(&mut rec, &atlas(), &camera_over(Rect::new(0.0, 0.0, 40.0, 40.0)), &map)
            .unwrap();

        assert_eq!(stats.tiles_drawn, 3);
        assert_eq!(stats.tiles_culled, 7);
        assert_eq!(rec.quads().count(), 3);
    }

    #[test]
    fn isometric_projection_positions_cells() {
        let mut b = TileMap::builder(Orientation::Isometric, 2, 1, 32, 32);
        let mut layer = tiles(1, 2, 1, &[0, 1]);
        if let LayerKind::Tiles(t) = &mut layer.kind {
            t.tile_size = vec2(32.0, 32.0);
        }
        b.push_layer(layer).unwrap();
        let map = b.build();

        let mut rec = RecordingBackend::new();
        MapRenderer::default()
            .draw(&mut rec, &atlas(), &camera_over(Rect::new(-100.0, -100.0, 200.0, 200.0)), &map)
            .unwrap();

        let (_, p) = rec.quads().next().unwrap();
        assert_eq!(p.dest, Rect::new(0.0, 16.0, 32.0, 32.0));
    }

    #[test]
    fn skips_hidden_layers_and_unknown_sprites() {
        let mut b = TileMap::builder(Orientation::Orthogonal, 2, 1, 16, 16);
        let mut hidden = tiles(1, 2, 1, &[1, 1]);
        hidden.visible = false;
        b.push_layer(hidden).unwrap();
        // gid 100 has no sprite in the atlas
        b.push_layer(tiles(2, 2, 1, &[100, 2])).unwrap();
        let map = b.build();

        let mut rec = RecordingBackend::new();
        MapRenderer::default()
            .draw(&mut rec, &atlas(), &camera_over(Rect::new(0.0, 0.0, 64.0, 64.0)), &map)
            .unwrap();

        let quads: Vec<_> = rec.quads().map(|(_, p)| *p).collect();
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].source.x, 16.0);
    }

    #[test]
    fn layers_draw_in_file_order_with_offset_and_opacity() {
        let mut b = TileMap::builder(Orientation::Orthogonal, 1, 1, 16, 16);
        b.push_layer(tiles(5, 1, 1, &[1])).unwrap();
        let mut top = tiles(2, 1, 1, &[2]);
        top.offset = vec2(4.0, 8.0);
        top.opacity = 0.5;
        b.push_layer(top).unwrap();
        let map = b.build();

        let mut rec = RecordingBackend::new();
        MapRenderer::default()
            .draw(&mut rec, &atlas(), &camera_over(Rect::new(0.0, 0.0, 64.0, 64.0)), &map)
            .unwrap();

        let quads: Vec<_> = rec.quads().map(|(_, p)| *p).collect();
        assert_eq!(quads[0].source.x, 0.0);
        assert_eq!(quads[1].source.x, 16.0);
        assert_eq!(quads[1].dest, Rect::new(4.0, 8.0, 16.0, 16.0));
        assert_eq!(quads[1].tint.a, 0.5);
    }

    #[test]
    fn only_text_objects_are_drawn() {
        let mut b = TileMap::builder(Orientation::Orthogonal, 1, 1, 16, 16);
        b.push_layer(labels(
            1,
            vec![
                TileObject {
                    bounds: Rect::new(10.0, 20.0, 50.0, 10.0),
                    shape: ObjectShape::Text("Welcome".into()),
                    ..Default::default()
                },
                TileObject {
                    shape: ObjectShape::Ellipse,
                    ..Default::default()
                },
                TileObject {
                    visible: false,
                    shape: ObjectShape::Text("hidden".into()),
                    ..Default::default()
                },
            ],
        ))
        .unwrap();
        let map = b.build();

        let mut rec = RecordingBackend::new();
        let stats = MapRenderer::default()
            .draw(&mut rec, &atlas(), &camera_over(Rect::new(0.0, 0.0, 64.0, 64.0)), &map)
            .unwrap();

        assert_eq!(stats.labels_drawn, 1);
        assert_eq!(rec.texts().collect::<Vec<_>>(), vec!["Welcome"]);
        assert!(matches!(
            &rec.calls[0],
            backend::DrawCall::Text { position, .. } if *position == vec2(10.0, 20.0)
        ));
    }

    #[test]
    fn unregistered_texture_aborts_the_frame() {
        let mut a: SpriteAtlas<u32> = SpriteAtlas::new();
        a.add_sprite(3, Rect::new(0.0, 0.0, 16.0, 16.0), Vec2::ZERO, Borders::default());

        let mut b = TileMap::builder(Orientation::Orthogonal, 1, 1, 16, 16);
        b.push_layer(tiles(1, 1, 1, &[1])).unwrap();
        let map = b.build();

        let mut rec = RecordingBackend::new();
        let err = MapRenderer::default()
            .draw(&mut rec, &a, &camera_over(Rect::new(0.0, 0.0, 64.0, 64.0)), &map)
            .unwrap_err();
        assert!(matches!(err, MapError::UnregisteredTexture(3)));
    }
}
