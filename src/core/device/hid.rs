//=========================================================================
// hidapi Backend
//
// Real hardware access through the `hidapi` crate. Feature-gated so the
// core builds headless without native HID libraries present.
//
// Error mapping:
// - open failure / device absent        -> DeviceError::NotFound
// - read_timeout returning zero bytes   -> DeviceError::Timeout
// - any transport error during I/O      -> DeviceError::Disconnected
//
//=========================================================================

use hidapi::{HidApi, HidDevice, HidError};
use log::debug;

use crate::core::device::backend::{DeviceIo, HidBackend};
use crate::core::error::DeviceError;

//=== HidapiBackend =======================================================

/// HID backend over a shared `hidapi` context.
pub struct HidapiBackend {
    api: HidApi,
}

impl HidapiBackend {
    /// Initializes the hidapi context.
    ///
    /// Fails with the raw library error if the platform HID layer cannot
    /// be brought up at all; this is a startup concern, not part of the
    /// per-device taxonomy.
    pub fn new() -> Result<Self, HidError> {
        Ok(Self {
            api: HidApi::new()?,
        })
    }
}

impl HidBackend for HidapiBackend {
    fn open(
        &mut self,
        vendor_id: u16,
        product_id: u16,
    ) -> Result<Box<dyn DeviceIo>, DeviceError> {
        // Refresh so a recently plugged device is visible.
        let _ = self.api.refresh_devices();

        let device = self.api.open(vendor_id, product_id).map_err(|e| {
            debug!(target: "device", "hidapi open {:04x}:{:04x} failed: {}", vendor_id, product_id, e);
            DeviceError::NotFound {
                vendor_id,
                product_id,
            }
        })?;

        Ok(Box::new(HidapiIo { device }))
    }
}

//=== HidapiIo ============================================================

struct HidapiIo {
    device: HidDevice,
}

impl DeviceIo for HidapiIo {
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, DeviceError> {
        match self.device.read_timeout(buf, timeout_ms as i32) {
            // hidapi reports a timeout as a successful zero-byte read.
            Ok(0) => Err(DeviceError::Timeout { timeout_ms }),
            Ok(n) => Ok(n),
            Err(e) => {
                debug!(target: "device", "hidapi read failed: {}", e);
                Err(DeviceError::Disconnected)
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, DeviceError> {
        self.device.write(data).map_err(|e| {
            debug!(target: "device", "hidapi write failed: {}", e);
            DeviceError::Disconnected
        })
    }
}
