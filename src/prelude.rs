//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use crustlib::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Loop controller
pub use crate::app::{App, AppBuilder, AppDelegate, FrameContext, LoopState, TickControl};

// Configuration and host events
pub use crate::core::config::{CoreConfig, Subsystem};
pub use crate::core::host::HostEvent;
pub use crate::core::tick::FrameTick;

// Errors
pub use crate::core::error::{CoreError, DeviceError, SurfaceError};

// Device input bridge
pub use crate::core::device::{DeviceBridge, DeviceKey, HidBackend, SimulatedHid};

// Asset & surface manager
pub use crate::core::gfx::{
    DrawCommand, DrawList, HeadlessBackend, SurfaceDescriptor, SurfaceManager, Texture, TextureKey,
};
