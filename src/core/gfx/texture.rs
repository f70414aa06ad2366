//=========================================================================
// Texture
//
// A decoded image resource ready for composition. Backing storage is a
// CPU-side RGBA8 buffer, so textures survive present-target recreation;
// they are destroyed on explicit release or when the surface itself is
// torn down.
//
// Decoding is synchronous and blocking with respect to the caller.
//
//=========================================================================

use std::path::Path;

use log::debug;

use crate::core::error::SurfaceError;

slotmap::new_key_type! {
    /// Generational key addressing one loaded texture.
    pub struct TextureKey;
}

//=== PixelFormat =========================================================

/// Pixel layout of a texture's backing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit RGBA, row-major, no padding.
    Rgba8,
}

//=== Texture =============================================================

/// One decoded image resource.
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl Texture {
    /// Decodes an image asset from disk.
    ///
    /// # Errors
    ///
    /// - [`SurfaceError::AssetNotFound`] if the path does not exist.
    /// - [`SurfaceError::DecodeError`] if the bytes are not a decodable
    ///   image.
    pub fn from_path(path: &Path) -> Result<Self, SurfaceError> {
        if !path.exists() {
            return Err(SurfaceError::AssetNotFound(path.to_path_buf()));
        }

        let decoded = image::open(path).map_err(|source| SurfaceError::DecodeError {
            path: path.to_path_buf(),
            source,
        })?;

        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        debug!(target: "gfx", "Decoded {} ({}x{})", path.display(), width, height);

        Ok(Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            pixels: rgba.into_raw(),
        })
    }

    /// Builds a solid-color texture without touching the filesystem.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity((width * height) as usize * 4);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
