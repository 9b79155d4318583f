use macroquad::prelude::*;

use crate::config::ViewConfig;

/// 2D camera: `target` is the world point shown at `offset` on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World point the camera follows.
    pub target: Vec2,
    /// Screen position of `target`, usually the viewport centre.
    pub offset: Vec2,
    /// World-to-screen scale.
    pub zoom: f32,
    /// Viewport size in pixels.
    pub screen_size: Vec2,
}

impl Camera {
    /// Camera centred on the world origin.
    pub fn new(screen_size: Vec2) -> Self {
        Camera {
            target: Vec2::ZERO,
            offset: screen_size / 2.0,
            zoom: 1.0,
            screen_size,
        }
    }

    /// Camera sized and zoomed from a [`ViewConfig`].
    pub fn from_config(cfg: &ViewConfig) -> Self {
        Camera {
            zoom: cfg.zoom,
            ..Camera::new(cfg.screen_size())
        }
    }

    fn effective_zoom(&self) -> f32 {
        if self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        }
    }

    /// World-space rectangle currently on screen.
    pub fn view_rect(&self) -> Rect {
        let zoom = self.effective_zoom();
        let origin = self.target - self.offset / zoom;
        let size = self.screen_size / zoom;
        Rect::new(origin.x, origin.y, size.x, size.y)
    }

    /// Follows a window resize, keeping the target centred.
    pub fn resize(&mut self, screen_size: Vec2) {
        self.screen_size = screen_size;
        self.offset = screen_size / 2.0;
    }

    /// Equivalent macroquad camera, for `set_camera` before drawing.
    pub fn to_camera2d(&self) -> Camera2D {
        let view = self.view_rect();
        // from_display_rect flips y in macroquad 0.4; keep y pointing down
        Camera2D {
            target: view.center(),
            zoom: vec2(2.0 / view.w, 2.0 / view.h),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_rect_centres_on_target() {
        let mut cam = Camera::new(vec2(800.0, 600.0));
        cam.target = vec2(1000.0, 500.0);
        assert_eq!(cam.view_rect(), Rect::new(600.0, 200.0, 800.0, 600.0));
    }

    #[test]
    fn zoom_shrinks_view() {
        let mut cam = Camera::new(vec2(800.0, 600.0));
        cam.zoom = 2.0;
        assert_eq!(cam.view_rect(), Rect::new(-200.0, -150.0, 400.0, 300.0));
    }

    #[test]
    fn non_positive_zoom_acts_as_one() {
        let mut cam = Camera::new(vec2(100.0, 100.0));
        cam.zoom = 0.0;
        assert_eq!(cam.view_rect(), Rect::new(-50.0, -50.0, 100.0, 100.0));
    }

    #[test]
    fn camera2d_matches_view_rect() {
        let mut cam = Camera::new(vec2(200.0, 100.0));
        cam.target = vec2(50.0, 25.0);
        let c = cam.to_camera2d();
        assert_eq!(c.target, vec2(50.0, 25.0));
        assert_eq!(c.zoom, vec2(0.01, 0.02));
    }
}
