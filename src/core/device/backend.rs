//=========================================================================
// HID Backend Traits
//
// The seam between the device bridge and whatever actually talks to
// hardware. The bridge owns handle bookkeeping and error routing; a
// backend only knows how to open a device by identifier and push bytes
// through it.
//
// Implementations:
// - `SimulatedHid` (sim.rs): scripted in-memory devices for tests and
//   headless runs.
// - `HidapiBackend` (hid.rs): real hardware via the `hidapi` crate,
//   behind the `hidapi-backend` feature.
//
//=========================================================================

use crate::core::error::DeviceError;

//=== DeviceIo ============================================================

/// Raw I/O on one opened device.
///
/// `read` blocks the calling thread for at most `timeout_ms`; a timeout
/// of zero is the non-blocking probe. Implementations surface
/// `Disconnected` for any transport-level failure and `Timeout` when no
/// report arrived in time.
pub trait DeviceIo {
    /// Reads one input report into `buf`, returning the byte count.
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, DeviceError>;

    /// Writes one output report, returning the bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, DeviceError>;
}

//=== HidBackend ==========================================================

/// Opens devices by vendor/product identifier.
///
/// Enumeration is not guaranteed stable across calls; callers re-open by
/// identifier rather than caching handles indefinitely.
pub trait HidBackend {
    /// Opens the first device matching the identifiers.
    fn open(&mut self, vendor_id: u16, product_id: u16)
        -> Result<Box<dyn DeviceIo>, DeviceError>;
}
