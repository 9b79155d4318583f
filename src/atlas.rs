//! Sprite registry over shared textures.
//!
//! A sprite is a rectangular region of a registered texture. Sprites get
//! consecutive ids starting at 0 and are never removed, so an id handed out
//! once stays valid for the life of the atlas. Tile layers index this
//! registry directly: a tile with sprite index `n` draws sprite `n`.

use std::collections::HashMap;

use anyhow::Context;
use log::{debug, trace};
use macroquad::prelude::*;

use crate::error::MapError;
use crate::render::backend::{DrawBackend, TextureDraw};

/// Sprite id, the position of the sprite in registration order.
pub type SpriteId = usize;

/// Nine-slice insets in source pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Borders {
    /// Left inset.
    pub left: f32,
    /// Top inset.
    pub top: f32,
    /// Right inset.
    pub right: f32,
    /// Bottom inset.
    pub bottom: f32,
}

impl Borders {
    /// Same inset on all four sides.
    pub const fn uniform(v: f32) -> Self {
        Borders {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }
}

/// A registered texture region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    /// Texture the region belongs to.
    pub texture: u32,
    /// Pixel rectangle inside the texture.
    pub source: Rect,
    /// Pivot used by [`SpriteAtlas::draw_sprite`] and [`SpriteAtlas::draw_sprite_at`].
    pub origin: Vec2,
    /// Nine-slice insets.
    pub borders: Borders,
}

/// Texture bindings plus the append-only sprite list.
pub struct SpriteAtlas<T = Texture2D> {
    textures: HashMap<u32, T>,
    sprites: Vec<Sprite>,
}

impl<T> Default for SpriteAtlas<T> {
    fn default() -> Self {
        SpriteAtlas {
            textures: HashMap::new(),
            sprites: Vec::new(),
        }
    }
}

impl<T> SpriteAtlas<T> {
    /// Empty atlas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handle` to `texture_id`, replacing any previous binding.
    pub fn register_texture(&mut self, texture_id: u32, handle: T) {
        if self.textures.insert(texture_id, handle).is_some() {
            debug!("texture {texture_id} rebound");
        }
    }

    /// True once `texture_id` has been registered.
    pub fn has_texture(&self, texture_id: u32) -> bool {
        self.textures.contains_key(&texture_id)
    }

    /// Registers a sprite and returns its id.
    pub fn add_sprite(&mut self, texture_id: u32, source: Rect, origin: Vec2, borders: Borders) -> SpriteId {
        let id = self.sprites.len();
        self.sprites.push(Sprite {
            texture: texture_id,
            source,
            origin,
            borders,
        });
        id
    }

    /// Slices a uniform grid starting at `origin` into `cols * rows` sprites, row by row.
    pub fn add_grid_sprites(
        &mut self,
        texture_id: u32,
        origin: Vec2,
        cell: Vec2,
        cols: u32,
        rows: u32,
    ) -> Vec<SpriteId> {
        let mut ids = Vec::with_capacity(cols as usize * rows as usize);
        for row in 0..rows {
            for col in 0..cols {
                let source = Rect::new(
                    origin.x + col as f32 * cell.x,
                    origin.y + row as f32 * cell.y,
                    cell.x,
                    cell.y,
                );
                ids.push(self.add_sprite(texture_id, source, Vec2::ZERO, Borders::default()));
            }
        }
        debug!(
            "texture {texture_id}: registered {} grid sprites ({cols}x{rows} of {}x{})",
            ids.len(),
            cell.x,
            cell.y
        );
        ids
    }

    /// Number of registered sprites.
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// Sprite by id.
    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(id)
    }

    /// Sprite by id, as an error when out of range.
    pub fn try_sprite(&self, id: SpriteId) -> Result<&Sprite, MapError> {
        self.sprite(id).ok_or(MapError::InvalidId(id))
    }

    /// Resolves a sprite and its texture. `Ok(None)` for unknown sprite ids.
    fn resolve(&self, id: SpriteId) -> Result<Option<(&Sprite, &T)>, MapError> {
        let Some(sprite) = self.sprite(id) else {
            trace!("skipping draw of unknown sprite {id}");
            return Ok(None);
        };
        let texture = self
            .textures
            .get(&sprite.texture)
            .ok_or(MapError::UnregisteredTexture(sprite.texture))?;
        Ok(Some((sprite, texture)))
    }

    /// Draws a sprite into `dest`, rotated `rotation` degrees around its origin.
    ///
    /// Unknown sprite ids draw nothing. Fails only when the sprite's texture
    /// was never registered.
    pub fn draw_sprite<B>(
        &self,
        backend: &mut B,
        id: SpriteId,
        dest: Rect,
        rotation: f32,
        tint: Color,
    ) -> Result<(), MapError>
    where
        B: DrawBackend<Texture = T>,
    {
        if let Some((sprite, texture)) = self.resolve(id)? {
            backend.draw_texture(
                texture,
                &TextureDraw {
                    source: sprite.source,
                    dest,
                    origin: sprite.origin,
                    rotation,
                    tint,
                },
            );
        }
        Ok(())
    }

    /// Draws a sprite at `position`, scaled uniformly, unrotated.
    pub fn draw_sprite_at<B>(
        &self,
        backend: &mut B,
        id: SpriteId,
        position: Vec2,
        scale: f32,
        tint: Color,
    ) -> Result<(), MapError>
    where
        B: DrawBackend<Texture = T>,
    {
        let Some(sprite) = self.sprite(id) else {
            return Ok(());
        };
        let dest = Rect::new(
            position.x,
            position.y,
            sprite.source.w * scale,
            sprite.source.h * scale,
        );
        self.draw_sprite(backend, id, dest, 0.0, tint)
    }

    /// Draws a resizable panel: corners at native size, edges stretched along
    /// one axis, center stretched along both.
    ///
    /// When `dest` is smaller than the insets on an axis, the insets on that
    /// axis shrink proportionally.
    pub fn draw_nine_slice<B>(
        &self,
        backend: &mut B,
        id: SpriteId,
        dest: Rect,
        tint: Color,
    ) -> Result<(), MapError>
    where
        B: DrawBackend<Texture = T>,
    {
        let Some((sprite, texture)) = self.resolve(id)? else {
            return Ok(());
        };
        let src = sprite.source;
        let b = sprite.borders;

        let (dl, dr) = fit_insets(b.left, b.right, dest.w);
        let (dt, db) = fit_insets(b.top, b.bottom, dest.h);

        let src_cols = [
            (src.x, b.left),
            (src.x + b.left, src.w - b.left - b.right),
            (src.x + src.w - b.right, b.right),
        ];
        let src_rows = [
            (src.y, b.top),
            (src.y + b.top, src.h - b.top - b.bottom),
            (src.y + src.h - b.bottom, b.bottom),
        ];
        let dest_cols = [
            (dest.x, dl),
            (dest.x + dl, dest.w - dl - dr),
            (dest.x + dest.w - dr, dr),
        ];
        let dest_rows = [
            (dest.y, dt),
            (dest.y + dt, dest.h - dt - db),
            (dest.y + dest.h - db, db),
        ];

        for ((sy, sh), (dy, dh)) in src_rows.into_iter().zip(dest_rows) {
            for ((sx, sw), (dx, dw)) in src_cols.into_iter().zip(dest_cols) {
                if sw <= 0.0 || sh <= 0.0 || dw <= 0.0 || dh <= 0.0 {
                    continue;
                }
                backend.draw_texture(
                    texture,
                    &TextureDraw {
                        source: Rect::new(sx, sy, sw, sh),
                        dest: Rect::new(dx, dy, dw, dh),
                        origin: Vec2::ZERO,
                        rotation: 0.0,
                        tint,
                    },
                );
            }
        }
        Ok(())
    }

    /// Repeats a sprite over `dest` row by row, clipping the right and bottom edges.
    pub fn draw_tiled<B>(
        &self,
        backend: &mut B,
        id: SpriteId,
        dest: Rect,
        tint: Color,
    ) -> Result<(), MapError>
    where
        B: DrawBackend<Texture = T>,
    {
        let Some((sprite, texture)) = self.resolve(id)? else {
            return Ok(());
        };
        let src = sprite.source;
        if src.w <= 0.0 || src.h <= 0.0 || dest.w <= 0.0 || dest.h <= 0.0 {
            return Ok(());
        }

        // integer steps: f32 offsets stop advancing past 2^24
        let cols = (dest.w / src.w).ceil() as usize;
        let rows = (dest.h / src.h).ceil() as usize;
        for row in 0..rows {
            let y = row as f32 * src.h;
            let h = src.h.min(dest.h - y);
            for col in 0..cols {
                let x = col as f32 * src.w;
                let w = src.w.min(dest.w - x);
                backend.draw_texture(
                    texture,
                    &TextureDraw {
                        source: Rect::new(src.x, src.y, w, h),
                        dest: Rect::new(dest.x + x, dest.y + y, w, h),
                        origin: Vec2::ZERO,
                        rotation: 0.0,
                        tint,
                    },
                );
            }
        }
        Ok(())
    }
}

impl SpriteAtlas<Texture2D> {
    /// Loads an image from disk and registers it under `texture_id` with nearest filtering.
    pub async fn load_texture(&mut self, texture_id: u32, path: &str) -> anyhow::Result<()> {
        let tex = macroquad::texture::load_texture(path)
            .await
            .with_context(|| format!("Loading texture {path}"))?;
        tex.set_filter(FilterMode::Nearest);
        self.register_texture(texture_id, tex);
        Ok(())
    }
}

/// Shrinks a pair of insets so they fit in `extent`.
fn fit_insets(a: f32, b: f32, extent: f32) -> (f32, f32) {
    let sum = a + b;
    if sum > extent && sum > 0.0 {
        let k = extent.max(0.0) / sum;
        (a * k, b * k)
    } else {
        (a, b)
    }
}
