//=========================================================================
// Device Input Bridge
//
// Typed, ownership-safe wrapper over raw HID device access.
//
// Architecture:
//   DeviceBridge
//     ├─ backend: Box<dyn HidBackend>     (sim or hidapi)
//     └─ handles: SlotMap<DeviceKey, DeviceHandle>
//
// Handles are addressed by generational keys: once a device is closed,
// its key goes stale and every further operation fails with
// `InvalidHandle` instead of touching another device's state. The bridge
// is exclusive to the loop thread; no locking inside.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod backend;
pub mod sim;

#[cfg(feature = "hidapi-backend")]
pub mod hid;

//=== External Crates =====================================================

use log::{debug, info, warn};
use slotmap::SlotMap;

//=== Internal Dependencies ===============================================

use crate::core::error::DeviceError;
pub use backend::{DeviceIo, HidBackend};
pub use sim::SimulatedHid;

#[cfg(feature = "hidapi-backend")]
pub use hid::HidapiBackend;

// Largest input report the bridge accepts. Raw HID reports are small;
// 256 bytes covers report id plus the biggest descriptors in the wild.
const MAX_REPORT_LEN: usize = 256;

slotmap::new_key_type! {
    /// Generational key addressing one open device handle.
    pub struct DeviceKey;
}

//=== DeviceHandle ========================================================

/// One open HID device, owned exclusively by the bridge.
struct DeviceHandle {
    vendor_id: u16,
    product_id: u16,
    io: Box<dyn DeviceIo>,
}

//=== DeviceBridge ========================================================

/// Owns every open device handle and routes raw I/O through the backend.
///
/// # Contract
///
/// - [`open`](Self::open) fails with `NotFound` when no device matches.
/// - [`read`](Self::read) blocks up to `timeout_ms` (zero = non-blocking
///   probe) and fails with `Timeout` when no report arrives; the handle
///   stays open.
/// - Any transport failure surfaces as `Disconnected` and the bridge
///   closes the handle before returning, so the loop never has to.
/// - [`close`](Self::close) is idempotent; stale keys are a no-op.
/// - Every operation on a never-opened or closed key fails with
///   `InvalidHandle` and never blocks.
pub struct DeviceBridge {
    backend: Box<dyn HidBackend>,
    handles: SlotMap<DeviceKey, DeviceHandle>,
}

impl DeviceBridge {
    //--- Construction -----------------------------------------------------

    pub fn new(backend: Box<dyn HidBackend>) -> Self {
        Self {
            backend,
            handles: SlotMap::with_key(),
        }
    }

    //--- Operations -------------------------------------------------------

    /// Opens the first device matching the identifiers.
    pub fn open(&mut self, vendor_id: u16, product_id: u16) -> Result<DeviceKey, DeviceError> {
        let io = self.backend.open(vendor_id, product_id)?;
        let key = self.handles.insert(DeviceHandle {
            vendor_id,
            product_id,
            io,
        });

        info!(target: "device", "Opened {:04x}:{:04x}", vendor_id, product_id);
        Ok(key)
    }

    /// Reads one input report, blocking up to `timeout_ms`.
    pub fn read(&mut self, key: DeviceKey, timeout_ms: u32) -> Result<Vec<u8>, DeviceError> {
        let handle = self.handles.get_mut(key).ok_or(DeviceError::InvalidHandle)?;

        let mut buf = [0u8; MAX_REPORT_LEN];
        match handle.io.read(&mut buf, timeout_ms) {
            Ok(n) => Ok(buf[..n].to_vec()),
            Err(DeviceError::Disconnected) => {
                self.drop_handle(key);
                Err(DeviceError::Disconnected)
            }
            Err(e) => Err(e),
        }
    }

    /// Writes one output report, returning the bytes accepted.
    pub fn write(&mut self, key: DeviceKey, data: &[u8]) -> Result<usize, DeviceError> {
        let handle = self.handles.get_mut(key).ok_or(DeviceError::InvalidHandle)?;

        match handle.io.write(data) {
            Ok(n) => Ok(n),
            Err(DeviceError::Disconnected) => {
                self.drop_handle(key);
                Err(DeviceError::Disconnected)
            }
            Err(e) => Err(e),
        }
    }

    /// Closes a handle. Idempotent: closing a stale key does nothing.
    pub fn close(&mut self, key: DeviceKey) {
        if self.handles.remove(key).is_some() {
            debug!(target: "device", "Closed handle {:?}", key);
        }
    }

    /// Closes every open handle. Called during shutdown.
    pub fn close_all(&mut self) {
        let count = self.handles.len();
        self.handles.clear();
        if count > 0 {
            info!(target: "device", "Closed {} open device handle(s)", count);
        }
    }

    /// Closes every handle matching the identifiers. Driven by host
    /// detach notifications; returns the number of handles closed.
    pub fn detach_matching(&mut self, vendor_id: u16, product_id: u16) -> usize {
        let stale: Vec<DeviceKey> = self
            .handles
            .iter()
            .filter(|(_, h)| h.vendor_id == vendor_id && h.product_id == product_id)
            .map(|(k, _)| k)
            .collect();

        for key in &stale {
            self.handles.remove(*key);
        }

        if !stale.is_empty() {
            warn!(
                target: "device",
                "Host detached {:04x}:{:04x}, closed {} handle(s)",
                vendor_id, product_id, stale.len()
            );
        }
        stale.len()
    }

    //--- Queries ----------------------------------------------------------

    /// Whether the key refers to an open handle.
    pub fn is_open(&self, key: DeviceKey) -> bool {
        self.handles.contains_key(key)
    }

    /// Number of currently open handles.
    pub fn open_count(&self) -> usize {
        self.handles.len()
    }

    //--- Internal Helpers -------------------------------------------------

    fn drop_handle(&mut self, key: DeviceKey) {
        if let Some(handle) = self.handles.remove(key) {
            warn!(
                target: "device",
                "Device {:04x}:{:04x} disconnected, handle closed",
                handle.vendor_id, handle.product_id
            );
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge_with_device(vendor_id: u16, product_id: u16) -> (DeviceBridge, SimulatedHid) {
        let sim = SimulatedHid::new();
        sim.attach(vendor_id, product_id);
        (DeviceBridge::new(Box::new(sim.clone())), sim)
    }

    //=====================================================================
    // Open / Close
    //=====================================================================

    #[test]
    fn open_then_close_leaves_no_open_handle() {
        let (mut bridge, _sim) = bridge_with_device(0x1234, 0x5678);

        let key = bridge.open(0x1234, 0x5678).unwrap();
        assert_eq!(bridge.open_count(), 1);

        bridge.close(key);
        assert_eq!(bridge.open_count(), 0);

        // Idempotent: closing again is a no-op.
        bridge.close(key);
        assert_eq!(bridge.open_count(), 0);
    }

    #[test]
    fn open_missing_device_fails_with_not_found() {
        let (mut bridge, _sim) = bridge_with_device(0x1234, 0x5678);

        assert!(matches!(
            bridge.open(0x9999, 0x9999),
            Err(DeviceError::NotFound { .. })
        ));
        assert_eq!(bridge.open_count(), 0);
    }

    //=====================================================================
    // Stale Handles
    //=====================================================================

    #[test]
    fn read_on_closed_handle_fails_with_invalid_handle() {
        let (mut bridge, _sim) = bridge_with_device(0x1234, 0x5678);

        let key = bridge.open(0x1234, 0x5678).unwrap();
        bridge.close(key);

        assert!(matches!(
            bridge.read(key, 1000),
            Err(DeviceError::InvalidHandle)
        ));
    }

    #[test]
    fn write_on_closed_handle_fails_with_invalid_handle() {
        let (mut bridge, _sim) = bridge_with_device(0x1234, 0x5678);

        let key = bridge.open(0x1234, 0x5678).unwrap();
        bridge.close(key);

        assert!(matches!(
            bridge.write(key, &[1, 2]),
            Err(DeviceError::InvalidHandle)
        ));
    }

    #[test]
    fn reopened_device_gets_a_fresh_key() {
        let (mut bridge, _sim) = bridge_with_device(0x1234, 0x5678);

        let first = bridge.open(0x1234, 0x5678).unwrap();
        bridge.close(first);

        let second = bridge.open(0x1234, 0x5678).unwrap();
        assert_ne!(first, second);
        assert!(!bridge.is_open(first));
        assert!(bridge.is_open(second));
    }

    //=====================================================================
    // I/O
    //=====================================================================

    #[test]
    fn read_with_no_data_times_out_and_handle_stays_open() {
        let (mut bridge, _sim) = bridge_with_device(0x1234, 0x5678);
        let key = bridge.open(0x1234, 0x5678).unwrap();

        match bridge.read(key, 100) {
            Err(DeviceError::Timeout { timeout_ms }) => assert_eq!(timeout_ms, 100),
            other => panic!("expected Timeout, got {:?}", other),
        }
        assert!(bridge.is_open(key));
    }

    #[test]
    fn read_returns_queued_report() {
        let (mut bridge, sim) = bridge_with_device(0x1234, 0x5678);
        let key = bridge.open(0x1234, 0x5678).unwrap();

        sim.queue_report(0x1234, 0x5678, &[0x1b, 0x02]);
        assert_eq!(bridge.read(key, 0).unwrap(), vec![0x1b, 0x02]);
    }

    #[test]
    fn write_reports_bytes_written() {
        let (mut bridge, sim) = bridge_with_device(0x1234, 0x5678);
        let key = bridge.open(0x1234, 0x5678).unwrap();

        assert_eq!(bridge.write(key, &[0x01, 0x02, 0x03]).unwrap(), 3);
        assert_eq!(sim.take_written(0x1234, 0x5678), vec![vec![0x01, 0x02, 0x03]]);
    }

    #[test]
    fn disconnect_during_read_closes_the_handle() {
        let (mut bridge, sim) = bridge_with_device(0x1234, 0x5678);
        let key = bridge.open(0x1234, 0x5678).unwrap();

        sim.detach(0x1234, 0x5678);

        assert!(matches!(
            bridge.read(key, 0),
            Err(DeviceError::Disconnected)
        ));
        assert!(!bridge.is_open(key));

        // The stale key now fails with InvalidHandle, not Disconnected.
        assert!(matches!(
            bridge.read(key, 0),
            Err(DeviceError::InvalidHandle)
        ));
    }

    //=====================================================================
    // Host Detach / Shutdown
    //=====================================================================

    #[test]
    fn detach_matching_closes_only_matching_handles() {
        let sim = SimulatedHid::new();
        sim.attach(0x1234, 0x5678);
        sim.attach(0xaaaa, 0xbbbb);
        let mut bridge = DeviceBridge::new(Box::new(sim));

        let a = bridge.open(0x1234, 0x5678).unwrap();
        let b = bridge.open(0xaaaa, 0xbbbb).unwrap();

        assert_eq!(bridge.detach_matching(0x1234, 0x5678), 1);
        assert!(!bridge.is_open(a));
        assert!(bridge.is_open(b));
    }

    #[test]
    fn close_all_empties_the_bridge() {
        let (mut bridge, _sim) = bridge_with_device(0x1234, 0x5678);
        bridge.open(0x1234, 0x5678).unwrap();
        bridge.open(0x1234, 0x5678).unwrap();

        bridge.close_all();
        assert_eq!(bridge.open_count(), 0);
    }
}
