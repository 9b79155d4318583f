const FLIP_H: u32 = 0x8000_0000; // bit 31
const FLIP_V: u32 = 0x4000_0000; // bit 30
const FLIP_D: u32 = 0x2000_0000; // bit 29
const GID_MASK: u32 = 0x1FFF_FFFF; // lower 29 bits

/// One cell of a tile layer.
///
/// `sprite_index` indexes the sprite atlas; `-1` means the cell is empty.
/// Flip flags are decoded from the packed gid but are not applied when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Atlas sprite id, or `-1` for an empty cell.
    pub sprite_index: i32,
    /// Mirrored along the vertical axis.
    pub flip_horizontal: bool,
    /// Mirrored along the horizontal axis.
    pub flip_vertical: bool,
    /// Mirrored along the anti-diagonal (x/y swap).
    pub flip_diagonal: bool,
}

impl Tile {
    /// The empty cell.
    pub const EMPTY: Tile = Tile {
        sprite_index: -1,
        flip_horizontal: false,
        flip_vertical: false,
        flip_diagonal: false,
    };

    /// Decodes a raw packed gid as stored in layer data.
    pub fn from_raw(raw: u32) -> Self {
        let gid = raw & GID_MASK;
        Tile {
            // gid fits in 29 bits, so the cast is lossless.
            sprite_index: if gid == 0 { -1 } else { gid as i32 - 1 },
            flip_horizontal: raw & FLIP_H != 0,
            flip_vertical: raw & FLIP_V != 0,
            flip_diagonal: raw & FLIP_D != 0,
        }
    }

    /// The sprite id to draw, if any.
    #[inline]
    pub fn sprite(self) -> Option<usize> {
        usize::try_from(self.sprite_index).ok()
    }

    /// True for cells that draw nothing.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.sprite_index < 0
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_horizontal_flip_and_index() {
        let t = Tile::from_raw(0x8000_0005);
        assert_eq!(t.sprite_index, 4);
        assert!(t.flip_horizontal);
        assert!(!t.flip_vertical);
        assert!(!t.flip_diagonal);
    }

    #[test]
    fn zero_is_empty() {
        let t = Tile::from_raw(0);
        assert_eq!(t.sprite_index, -1);
        assert!(t.is_empty());
        assert_eq!(t.sprite(), None);
    }

    #[test]
    fn flags_without_gid_still_empty() {
        let t = Tile::from_raw(FLIP_H | FLIP_V | FLIP_D);
        assert_eq!(t.sprite_index, -1);
        assert!(t.flip_horizontal && t.flip_vertical && t.flip_diagonal);
    }

    #[test]
    fn first_gid_maps_to_sprite_zero() {
        assert_eq!(Tile::from_raw(1).sprite(), Some(0));
        assert_eq!(Tile::from_raw(0x6000_0003).sprite(), Some(2));
    }
}
