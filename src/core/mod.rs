//=========================================================================
// Core Systems
//
// The three components of the native application core, in dependency
// order:
//
//   device  — Device Input Bridge (raw HID behind a backend trait)
//   gfx     — Asset & Surface Manager (surface, textures, composition)
//   (app)   — Application Loop Controller, at the crate root, drives
//             both from a single-threaded fixed-step loop
//
// Plus the shared ambient pieces: the error taxonomy, the host event
// vocabulary, the subsystem manifest, and frame timing.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod config;
pub mod device;
pub mod error;
pub mod gfx;
pub mod host;
pub mod tick;

//=== Public API ==========================================================

pub use config::{CoreConfig, Subsystem};
pub use error::{CoreError, DeviceError, SurfaceError};
pub use host::HostEvent;
pub use tick::{FixedTimestep, FrameTick};
