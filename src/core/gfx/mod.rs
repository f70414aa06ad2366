//=========================================================================
// Asset & Surface Manager
//
// Owns the single application surface and every decoded texture, and
// composes frames for the present target.
//
// Architecture:
//   SurfaceManager
//     ├─ backend: Box<dyn SurfaceBackend>   (headless or winit)
//     ├─ surface: Option<Surface>           (+ boxed present target)
//     └─ textures: SlotMap<TextureKey, Texture>
//
// Texture backing is CPU-side, so textures survive present-target
// recreation; they are destroyed on release or surface teardown. Stale
// texture keys in a draw list are skipped with a warning rather than
// dereferenced.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod backend;
pub mod draw;
pub mod surface;
pub mod texture;

//=== Standard Library Imports ============================================

use std::path::Path;

//=== External Crates =====================================================

use log::{debug, info, warn};
use slotmap::SlotMap;

//=== Internal Dependencies ===============================================

use crate::core::error::SurfaceError;
pub use backend::{HeadlessBackend, PresentTarget, SurfaceBackend};
pub use draw::{DrawCommand, DrawList, Framebuffer};
pub use surface::{Surface, SurfaceDescriptor};
pub use texture::{PixelFormat, Texture, TextureKey};

// Frames clear to opaque black before composition.
const CLEAR_COLOR: u32 = 0xff00_0000;

//=== SurfaceManager ======================================================

/// Surface lifecycle, texture loading, and frame presentation.
///
/// # Contract
///
/// - [`create_surface`](Self::create_surface) fails with
///   `CreationFailed` if the backend refuses or a surface already
///   exists; exactly one surface lives at a time.
/// - [`load_texture`](Self::load_texture) decodes synchronously and
///   registers nothing on failure.
/// - [`release_texture`](Self::release_texture) is idempotent.
/// - [`present`](Self::present) composes the draw list and flips; a lost
///   target surfaces as `RenderTargetLost`, recoverable through
///   [`recreate_surface`](Self::recreate_surface).
pub struct SurfaceManager {
    backend: Box<dyn SurfaceBackend>,
    surface: Option<Surface>,
    target: Option<Box<dyn PresentTarget>>,
    textures: SlotMap<TextureKey, Texture>,
}

impl SurfaceManager {
    //--- Construction -----------------------------------------------------

    pub fn new(backend: Box<dyn SurfaceBackend>) -> Self {
        Self {
            backend,
            surface: None,
            target: None,
            textures: SlotMap::with_key(),
        }
    }

    //--- Surface Lifecycle ------------------------------------------------

    /// Creates the application surface.
    pub fn create_surface(
        &mut self,
        width: u32,
        height: u32,
        title: &str,
    ) -> Result<&Surface, SurfaceError> {
        if self.surface.is_some() {
            return Err(SurfaceError::CreationFailed(
                "a surface already exists".into(),
            ));
        }

        let descriptor = SurfaceDescriptor::new(width, height, title);
        let target = self.backend.create_target(&descriptor)?;

        info!(target: "gfx", "Surface created: {}x{} '{}'", width, height, title);
        self.target = Some(target);
        Ok(self.surface.insert(Surface::new(descriptor)))
    }

    /// Rebuilds the present target after `RenderTargetLost`, keeping the
    /// surface identity and every loaded texture.
    pub fn recreate_surface(&mut self) -> Result<(), SurfaceError> {
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| SurfaceError::CreationFailed("no surface to recreate".into()))?;

        let target = self.backend.create_target(surface.descriptor())?;
        self.target = Some(target);
        surface.set_active(true);

        info!(target: "gfx", "Surface recreated: {}x{}", surface.width(), surface.height());
        Ok(())
    }

    /// Applies a host-reported window resize: updates the descriptor and
    /// rebuilds the target at the new size.
    pub fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| SurfaceError::CreationFailed("no surface to resize".into()))?;

        surface.resize(width, height);
        let target = self.backend.create_target(surface.descriptor())?;
        self.target = Some(target);
        surface.set_active(true);

        debug!(target: "gfx", "Surface resized to {}x{}", width, height);
        Ok(())
    }

    /// Tears the surface down, releasing the target and every texture.
    /// Idempotent; called during shutdown.
    pub fn destroy_surface(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.set_active(false);
            self.target = None;

            let released = self.textures.len();
            self.textures.clear();
            info!(
                target: "gfx",
                "Surface destroyed, {} texture(s) released",
                released
            );
        }
    }

    //--- Textures ---------------------------------------------------------

    /// Decodes an image asset and registers it. Requires a live surface.
    pub fn load_texture(&mut self, path: &Path) -> Result<TextureKey, SurfaceError> {
        if self.surface.is_none() {
            return Err(SurfaceError::CreationFailed(
                "cannot load textures without a surface".into(),
            ));
        }

        let texture = Texture::from_path(path)?;
        info!(
            target: "gfx",
            "Loaded texture {} ({}x{})",
            path.display(),
            texture.width(),
            texture.height()
        );
        Ok(self.textures.insert(texture))
    }

    /// Releases a texture. Idempotent: stale keys are a no-op.
    pub fn release_texture(&mut self, key: TextureKey) {
        if self.textures.remove(key).is_some() {
            debug!(target: "gfx", "Released texture {:?}", key);
        }
    }

    /// Looks up a loaded texture.
    pub fn texture(&self, key: TextureKey) -> Option<&Texture> {
        self.textures.get(key)
    }

    /// Number of currently registered textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    //--- Presentation -----------------------------------------------------

    /// Composes the draw list into a frame and flips it to the target.
    ///
    /// An empty draw list is a valid frame. Commands naming released
    /// textures are skipped with a warning.
    pub fn present(&mut self, draw_list: &[DrawCommand]) -> Result<(), SurfaceError> {
        let surface = self
            .surface
            .as_mut()
            .ok_or(SurfaceError::RenderTargetLost)?;
        let target = self.target.as_mut().ok_or(SurfaceError::RenderTargetLost)?;

        let mut frame = Framebuffer::new(surface.width(), surface.height());
        frame.clear(CLEAR_COLOR);

        for command in draw_list {
            match self.textures.get(command.texture) {
                Some(texture) => frame.blit(texture, command.x, command.y),
                None => {
                    warn!(
                        target: "gfx",
                        "Draw command references released texture {:?}, skipping",
                        command.texture
                    );
                }
            }
        }

        match target.present(&frame) {
            Ok(()) => Ok(()),
            Err(e) => {
                if e.is_recoverable() {
                    surface.set_active(false);
                }
                Err(e)
            }
        }
    }

    //--- Queries ----------------------------------------------------------

    /// The application surface, if one exists.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn manager() -> (SurfaceManager, HeadlessBackend) {
        let backend = HeadlessBackend::new();
        (SurfaceManager::new(Box::new(backend.clone())), backend)
    }

    fn png_fixture(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("crustlib-gfx-tests");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        img.save(&path).unwrap();
        path
    }

    //=====================================================================
    // Surface Lifecycle
    //=====================================================================

    #[test]
    fn create_surface_reports_descriptor() {
        let (mut manager, _) = manager();
        let surface = manager.create_surface(800, 600, "demo").unwrap();
        assert_eq!(surface.width(), 800);
        assert_eq!(surface.height(), 600);
        assert_eq!(surface.title(), "demo");
    }

    #[test]
    fn second_surface_is_refused() {
        let (mut manager, _) = manager();
        manager.create_surface(800, 600, "demo").unwrap();

        assert!(matches!(
            manager.create_surface(100, 100, "other"),
            Err(SurfaceError::CreationFailed(_))
        ));
    }

    #[test]
    fn backend_refusal_surfaces_as_creation_failed() {
        let (mut manager, backend) = manager();
        backend.fail_next_create();

        assert!(matches!(
            manager.create_surface(800, 600, "demo"),
            Err(SurfaceError::CreationFailed(_))
        ));
        assert!(manager.surface().is_none());
    }

    #[test]
    fn destroy_surface_releases_textures() {
        let (mut manager, _) = manager();
        manager.create_surface(800, 600, "demo").unwrap();
        manager.load_texture(&png_fixture("destroy.png")).unwrap();
        assert_eq!(manager.texture_count(), 1);

        manager.destroy_surface();
        assert!(manager.surface().is_none());
        assert_eq!(manager.texture_count(), 0);

        // Idempotent.
        manager.destroy_surface();
    }

    #[test]
    fn resize_updates_surface_dimensions() {
        let (mut manager, _) = manager();
        manager.create_surface(800, 600, "demo").unwrap();

        manager.resize_surface(1024, 768).unwrap();
        let surface = manager.surface().unwrap();
        assert_eq!(surface.width(), 1024);
        assert_eq!(surface.height(), 768);
    }

    //=====================================================================
    // Textures
    //=====================================================================

    #[test]
    fn missing_asset_registers_no_partial_texture() {
        let (mut manager, _) = manager();
        manager.create_surface(800, 600, "demo").unwrap();

        let missing = std::env::temp_dir().join("crustlib-gfx-tests/missing.png");
        let _ = fs::remove_file(&missing);

        assert!(matches!(
            manager.load_texture(&missing),
            Err(SurfaceError::AssetNotFound(_))
        ));
        assert_eq!(manager.texture_count(), 0);
    }

    #[test]
    fn load_without_surface_is_refused() {
        let (mut manager, _) = manager();
        assert!(matches!(
            manager.load_texture(&png_fixture("early.png")),
            Err(SurfaceError::CreationFailed(_))
        ));
    }

    #[test]
    fn release_texture_is_idempotent() {
        let (mut manager, _) = manager();
        manager.create_surface(800, 600, "demo").unwrap();
        let key = manager.load_texture(&png_fixture("release.png")).unwrap();

        manager.release_texture(key);
        assert_eq!(manager.texture_count(), 0);
        assert!(manager.texture(key).is_none());

        manager.release_texture(key);
    }

    //=====================================================================
    // Presentation
    //=====================================================================

    #[test]
    fn empty_draw_list_presents() {
        let (mut manager, backend) = manager();
        manager.create_surface(800, 600, "demo").unwrap();

        manager.present(&[]).unwrap();
        assert_eq!(backend.presented_frames(), 1);
    }

    #[test]
    fn presented_frame_contains_blitted_texture() {
        let (mut manager, backend) = manager();
        manager.create_surface(8, 8, "demo").unwrap();
        let key = manager.load_texture(&png_fixture("blit.png")).unwrap();

        manager
            .present(&[DrawCommand {
                texture: key,
                x: 1,
                y: 1,
            }])
            .unwrap();

        let frame = backend.last_frame().unwrap();
        assert_eq!(frame.pixel(1, 1), Some(0xffff0000));
        assert_eq!(frame.pixel(0, 0), Some(CLEAR_COLOR));
    }

    #[test]
    fn stale_texture_key_is_skipped_not_fatal() {
        let (mut manager, backend) = manager();
        manager.create_surface(8, 8, "demo").unwrap();
        let key = manager.load_texture(&png_fixture("stale.png")).unwrap();
        manager.release_texture(key);

        manager
            .present(&[DrawCommand {
                texture: key,
                x: 0,
                y: 0,
            }])
            .unwrap();
        assert_eq!(backend.presented_frames(), 1);
    }

    #[test]
    fn lost_target_recovers_via_recreate() {
        let (mut manager, backend) = manager();
        manager.create_surface(8, 8, "demo").unwrap();
        let key = manager.load_texture(&png_fixture("lost.png")).unwrap();

        backend.invalidate();
        assert!(matches!(
            manager.present(&[]),
            Err(SurfaceError::RenderTargetLost)
        ));
        assert!(!manager.surface().unwrap().is_active());

        manager.recreate_surface().unwrap();
        assert!(manager.surface().unwrap().is_active());

        // Textures survive recreation.
        assert!(manager.texture(key).is_some());
        manager.present(&[]).unwrap();
    }

    #[test]
    fn present_without_surface_is_target_lost() {
        let (mut manager, _) = manager();
        assert!(matches!(
            manager.present(&[]),
            Err(SurfaceError::RenderTargetLost)
        ));
    }
}
