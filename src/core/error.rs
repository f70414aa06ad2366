//=========================================================================
// Error Taxonomy
//
// Every failure the core can produce, grouped by the component that
// raises it. The application loop uses these types to make its routing
// decision: continue, recover, or shut down.
//
// Routing policy:
// - Device errors are never fatal to the loop. The offending handle is
//   closed and the loop continues.
// - `RenderTargetLost` is recoverable by recreating the surface.
// - Every other surface error is fatal and triggers shutdown.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::path::PathBuf;

//=== External Crates =====================================================

use thiserror::Error;

//=== DeviceError =========================================================

/// Failures raised by the device input bridge.
///
/// None of these variants is fatal to the application loop: the loop
/// logs the error, closes the affected handle where appropriate, and
/// keeps running.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// No connected HID device matched the requested identifiers.
    #[error("no HID device matching {vendor_id:04x}:{product_id:04x}")]
    NotFound { vendor_id: u16, product_id: u16 },

    /// The device vanished mid-operation (unplugged, powered off).
    ///
    /// The bridge closes the handle before surfacing this error, so the
    /// caller holds a stale key afterwards.
    #[error("device disconnected during I/O")]
    Disconnected,

    /// The key refers to a handle that was never opened or has already
    /// been closed. State is untouched; the operation did nothing.
    #[error("operation on an unopened or closed device handle")]
    InvalidHandle,

    /// No input report arrived within the requested bound.
    ///
    /// The handle remains open and usable.
    #[error("no data within {timeout_ms}ms")]
    Timeout { timeout_ms: u32 },
}

//=== SurfaceError ========================================================

/// Failures raised by the asset and surface manager.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The present target could not be created (or a second surface was
    /// requested while one already exists). Fatal.
    #[error("surface creation failed: {0}")]
    CreationFailed(String),

    /// The asset path does not exist. No partial texture is registered.
    #[error("asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    /// The asset exists but could not be decoded. Fatal.
    #[error("failed to decode {}", path.display())]
    DecodeError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The present target became invalid (window resized away, host
    /// surface torn down). Recoverable by recreating the surface.
    #[error("render target lost")]
    RenderTargetLost,
}

impl SurfaceError {
    /// Whether this error can be recovered from without shutting down.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SurfaceError::RenderTargetLost)
    }
}

//=== CoreError ===========================================================

/// Union of all component errors, as seen by the application loop.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

impl CoreError {
    /// Whether the loop must transition to `ShuttingDown` on this error.
    ///
    /// Device errors never are. Surface errors are fatal unless they are
    /// recoverable (`RenderTargetLost`, which the loop answers with a
    /// surface recreation attempt instead).
    pub fn is_fatal(&self) -> bool {
        match self {
            CoreError::Device(_) => false,
            CoreError::Surface(e) => !e.is_recoverable(),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
