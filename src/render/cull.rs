//! Grid-to-world projection and view culling.

use macroquad::prelude::*;

use crate::map::Orientation;

/// Destination rect of grid cell `(col, row)` before layer offsets.
///
/// Isometric maps reuse the rectangular grid: each cell is shifted half a tile
/// per column/row, which lays the tiles out as a diamond. The rect keeps the
/// raw tile size; isometric art is expected to be authored as diamonds.
#[inline]
pub fn tile_dest_rect(orientation: Orientation, col: u32, row: u32, tile_size: Vec2) -> Rect {
    let (col, row) = (col as f32, row as f32);
    let (x, y) = match orientation {
        Orientation::Orthogonal => (col * tile_size.x, row * tile_size.y),
        Orientation::Isometric => {
            let half_w = tile_size.x / 2.0;
            let half_h = tile_size.y / 2.0;
            (
                col * half_w - row * half_w - half_w,
                row * half_h + col * half_h,
            )
        }
    };
    Rect::new(x, y, tile_size.x, tile_size.y)
}

/// True unless `dest` lies entirely outside `view` on some side.
#[inline]
pub fn is_visible(dest: &Rect, view: &Rect) -> bool {
    view.overlaps(dest)
}
