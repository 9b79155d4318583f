//! Host rendering surfaces.

use macroquad::prelude::*;

/// One textured quad: `source` region of the texture stretched onto `dest`.
///
/// `origin` is the pivot relative to `dest`'s top-left corner; the quad is
/// placed at `dest.point() - origin` and rotated `rotation` degrees around `dest.point()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureDraw {
    /// Pixel region inside the texture.
    pub source: Rect,
    /// Destination rectangle.
    pub dest: Rect,
    /// Pivot, relative to `dest`.
    pub origin: Vec2,
    /// Degrees, clockwise.
    pub rotation: f32,
    /// Color multiplier.
    pub tint: Color,
}

/// The surface sprites and labels end up on.
pub trait DrawBackend {
    /// Texture handle type the host registers with the atlas.
    type Texture;

    /// Draws part of a texture.
    fn draw_texture(&mut self, texture: &Self::Texture, params: &TextureDraw);

    /// Draws a text label whose top-left corner is at `position`.
    fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color);
}

/// Draws straight to the current macroquad camera.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacroquadBackend;

impl DrawBackend for MacroquadBackend {
    type Texture = Texture2D;

    fn draw_texture(&mut self, texture: &Texture2D, p: &TextureDraw) {
        draw_texture_ex(
            texture,
            p.dest.x - p.origin.x,
            p.dest.y - p.origin.y,
            p.tint,
            DrawTextureParams {
                dest_size: Some(vec2(p.dest.w, p.dest.h)),
                source: Some(p.source),
                rotation: p.rotation.to_radians(),
                pivot: Some(vec2(p.dest.x, p.dest.y)),
                ..Default::default()
            },
        );
    }

    fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color) {
        // macroquad positions text by its baseline
        let dims = measure_text(text, None, font_size as u16, 1.0);
        macroquad::text::draw_text(text, position.x, position.y + dims.offset_y, font_size, color);
    }
}

/// A call captured by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall<T> {
    /// A textured quad.
    Texture {
        /// Handle the atlas resolved for the sprite.
        texture: T,
        /// Quad parameters.
        params: TextureDraw,
    },
    /// A text label.
    Text {
        /// Label text.
        text: String,
        /// Top-left corner.
        position: Vec2,
        /// Font size in pixels.
        font_size: f32,
        /// Text color.
        color: Color,
    },
}

/// Records draw calls instead of rendering them, for headless hosts and tests.
#[derive(Debug, Clone)]
pub struct RecordingBackend<T> {
    /// Calls in dispatch order.
    pub calls: Vec<DrawCall<T>>,
}

impl<T> Default for RecordingBackend<T> {
    fn default() -> Self {
        RecordingBackend { calls: Vec::new() }
    }
}

impl<T> RecordingBackend<T> {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded quads, in order.
    pub fn quads(&self) -> impl Iterator<Item = (&T, &TextureDraw)> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Texture { texture, params } => Some((texture, params)),
            DrawCall::Text { .. } => None,
        })
    }

    /// Recorded label texts, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Text { text, .. } => Some(text.as_str()),
            DrawCall::Texture { .. } => None,
        })
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl<T: Clone> DrawBackend for RecordingBackend<T> {
    type Texture = T;

    fn draw_texture(&mut self, texture: &T, params: &TextureDraw) {
        self.calls.push(DrawCall::Texture {
            texture: texture.clone(),
            params: *params,
        });
    }

    fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color) {
        self.calls.push(DrawCall::Text {
            text: text.to_owned(),
            position,
            font_size,
            color,
        });
    }
}
