//=========================================================================
// Surface Backend Traits
//
// The seam between the surface manager and whatever owns the real
// presentation target. Mirrors the device-side backend split: the
// manager does all bookkeeping and composition, the backend only knows
// how to create a target and accept a finished frame.
//
// Implementations:
// - `HeadlessBackend` (below): software target for tests and headless
//   runs, with scripting hooks for creation failure and target loss.
// - `WinitBackend` (platform layer): a real OS window.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

//=== Internal Dependencies ===============================================

use crate::core::error::SurfaceError;
use crate::core::gfx::draw::Framebuffer;
use crate::core::gfx::surface::SurfaceDescriptor;

//=== Traits ==============================================================

/// One created presentation target.
pub trait PresentTarget {
    /// Consumes a composed frame.
    ///
    /// Fails with [`SurfaceError::RenderTargetLost`] when the underlying
    /// target became invalid; the manager recovers by recreating it.
    fn present(&mut self, frame: &Framebuffer) -> Result<(), SurfaceError>;
}

/// Creates presentation targets for the application surface.
pub trait SurfaceBackend {
    fn create_target(
        &mut self,
        descriptor: &SurfaceDescriptor,
    ) -> Result<Box<dyn PresentTarget>, SurfaceError>;
}

//=== HeadlessBackend =====================================================

/// Software present target factory.
///
/// Clones share state, so a test keeps one clone for scripting while the
/// manager owns the other: [`fail_next_create`](Self::fail_next_create)
/// forces the next creation to fail, [`invalidate`](Self::invalidate)
/// makes the next present report a lost target.
#[derive(Clone, Default)]
pub struct HeadlessBackend {
    fail_next_create: Arc<AtomicBool>,
    lost: Arc<AtomicBool>,
    presented: Arc<AtomicU64>,
    last_frame: Arc<Mutex<Option<Framebuffer>>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Scripting hooks --------------------------------------------------

    /// Forces the next `create_target` call to fail.
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    /// Makes the next present on any live target report target loss.
    pub fn invalidate(&self) {
        self.lost.store(true, Ordering::SeqCst);
    }

    //--- Observations -----------------------------------------------------

    /// Total frames successfully presented across all targets.
    pub fn presented_frames(&self) -> u64 {
        self.presented.load(Ordering::SeqCst)
    }

    /// Copy of the most recently presented frame.
    pub fn last_frame(&self) -> Option<Framebuffer> {
        self.last_frame.lock().unwrap().clone()
    }
}

impl SurfaceBackend for HeadlessBackend {
    fn create_target(
        &mut self,
        descriptor: &SurfaceDescriptor,
    ) -> Result<Box<dyn PresentTarget>, SurfaceError> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(SurfaceError::CreationFailed(format!(
                "headless target refused for '{}'",
                descriptor.title
            )));
        }

        Ok(Box::new(HeadlessTarget {
            lost: Arc::clone(&self.lost),
            presented: Arc::clone(&self.presented),
            last_frame: Arc::clone(&self.last_frame),
        }))
    }
}

//=== HeadlessTarget ======================================================

struct HeadlessTarget {
    lost: Arc<AtomicBool>,
    presented: Arc<AtomicU64>,
    last_frame: Arc<Mutex<Option<Framebuffer>>>,
}

impl PresentTarget for HeadlessTarget {
    fn present(&mut self, frame: &Framebuffer) -> Result<(), SurfaceError> {
        if self.lost.swap(false, Ordering::SeqCst) {
            return Err(SurfaceError::RenderTargetLost);
        }

        *self.last_frame.lock().unwrap() = Some(frame.clone());
        self.presented.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
