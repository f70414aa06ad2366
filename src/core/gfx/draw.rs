//=========================================================================
// Draw Lists and Software Composition
//
// A frame is a list of blit commands composed into a CPU framebuffer,
// which the present target then consumes. Pixels are packed 0xAARRGGBB.
//
//=========================================================================

use crate::core::gfx::texture::Texture;

//=== DrawCommand =========================================================

/// One blit: a texture placed at surface coordinates.
#[derive(Debug, Clone, Copy)]
pub struct DrawCommand {
    pub texture: super::TextureKey,
    pub x: i32,
    pub y: i32,
}

/// The per-frame command list. An empty list is a valid frame.
pub type DrawList = Vec<DrawCommand>;

//=== Framebuffer =========================================================

/// CPU-side composition target.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, argb: u32) {
        self.pixels.fill(argb);
    }

    /// Blits a texture at `(x, y)` with clipping. Fully transparent
    /// source pixels are skipped; no blending beyond that.
    pub fn blit(&mut self, texture: &Texture, x: i32, y: i32) {
        let src = texture.pixels();

        for row in 0..texture.height() as i32 {
            let dst_y = y + row;
            if dst_y < 0 || dst_y >= self.height as i32 {
                continue;
            }

            for col in 0..texture.width() as i32 {
                let dst_x = x + col;
                if dst_x < 0 || dst_x >= self.width as i32 {
                    continue;
                }

                let s = ((row as u32 * texture.width() + col as u32) * 4) as usize;
                let (r, g, b, a) = (src[s], src[s + 1], src[s + 2], src[s + 3]);
                if a == 0 {
                    continue;
                }

                let d = (dst_y as u32 * self.width + dst_x as u32) as usize;
                self.pixels[d] =
                    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32;
            }
        }
    }

    /// Packed pixel at `(x, y)`; `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
