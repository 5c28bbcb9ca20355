/// display width in pixels
pub const WIDTH: usize = 64;

/// display height in pixels
pub const HEIGHT: usize = 32;

/// size of the packed plane: one bit per pixel
pub const FRAMEBUFFER_BYTES: usize = WIDTH * HEIGHT / 8;

/// 64x32 monochrome pixels, packed eight to a byte, most significant bit
/// leftmost, rows top to bottom. This is the layout `Display::draw` expects.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    plane: [u8; FRAMEBUFFER_BYTES],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                f.write_str(if self.pixel(x, y) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            plane: [0; FRAMEBUFFER_BYTES],
        }
    }

    pub fn clear(&mut self) {
        self.plane = [0; FRAMEBUFFER_BYTES];
    }

    /// lit or not; coordinates wrap like sprite drawing does
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let (byte, bit) = Self::locate(x, y);
        self.plane[byte] & bit != 0
    }

    /// XOR `rows` (one byte per row, MSB leftmost) onto the plane with its
    /// top-left corner at (x, y). Every pixel wraps around both edges.
    /// All 8 x rows.len() cells count as touched, zero sprite bits included:
    /// returns true if any of them was already lit before the draw.
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        let mut collision = false;
        for (dy, row) in rows.iter().enumerate() {
            for dx in 0..8 {
                let (byte, bit) = Self::locate(x + dx, y + dy);
                collision |= self.plane[byte] & bit != 0;
                if row & (0x80 >> dx) != 0 {
                    self.plane[byte] ^= bit;
                }
            }
        }
        collision
    }

    /// the packed plane, for renderers
    pub fn as_bytes(&self) -> &[u8] {
        &self.plane
    }

    /// coordinates of every lit pixel, row by row
    pub fn lit_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..HEIGHT)
            .flat_map(|y| (0..WIDTH).map(move |x| (x, y)))
            .filter(move |&(x, y)| self.pixel(x, y))
    }

    fn locate(x: usize, y: usize) -> (usize, u8) {
        let n = (y % HEIGHT) * WIDTH + (x % WIDTH);
        (n / 8, 0x80 >> (n % 8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_blank() {
        let fb = Framebuffer::new();
        assert_eq!(fb.as_bytes(), &[0; 256]);
        assert_eq!(fb.lit_pixels().count(), 0);
    }

    #[test]
    fn test_packing_is_msb_first() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(1, 1, &[0x80]);
        // row 1 starts at byte 8; x=1 is the second bit from the top
        assert_eq!(fb.as_bytes()[8], 0x40);
        assert!(fb.pixel(1, 1));
    }

    #[test]
    fn test_draw_then_redraw_restores_and_collides() {
        let mut fb = Framebuffer::new();
        let sprite = [0xF0, 0x90, 0x90, 0x90, 0xF0];
        assert!(!fb.draw_sprite(10, 5, &sprite));
        assert_eq!(fb.lit_pixels().count(), 14);
        assert!(fb.draw_sprite(10, 5, &sprite));
        assert_eq!(fb, Framebuffer::new());
    }

    #[test]
    fn test_lit_pixel_under_zero_bit_collides() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw_sprite(0, 0, &[0xF0]));
        assert!(fb.draw_sprite(0, 0, &[0x0F]));
        assert_eq!(fb.as_bytes()[0], 0xFF);
    }

    #[test]
    fn test_lit_pixels_outside_sprite_box_do_not_collide() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(8, 0, &[0x80]);
        fb.draw_sprite(0, 1, &[0x80]);
        assert!(!fb.draw_sprite(0, 0, &[0x00]));
        assert_eq!(fb.lit_pixels().count(), 2);
    }

    #[test]
    fn test_wraps_both_edges() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(60, 30, &[0xFF; 4]);
        let lit: Vec<_> = fb.lit_pixels().collect();
        assert_eq!(lit.len(), 32);
        for (x, y) in lit {
            assert!([60, 61, 62, 63, 0, 1, 2, 3].contains(&x));
            assert!([30, 31, 0, 1].contains(&y));
        }
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(0, 0, &[0xFF, 0xFF]);
        fb.clear();
        assert_eq!(fb, Framebuffer::new());
    }
}
