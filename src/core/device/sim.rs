//=========================================================================
// Simulated HID Backend
//
// Scripted in-memory devices. A test attaches devices, queues input
// reports, and pulls written output back out; the bridge sees the same
// contract the hardware backend provides. The simulated clock treats
// every read timeout as expiring immediately, so reads never block.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

//=== Internal Dependencies ===============================================

use crate::core::device::backend::{DeviceIo, HidBackend};
use crate::core::error::DeviceError;

//=== Device State ========================================================

#[derive(Default)]
struct SimDeviceState {
    connected: bool,
    reports: VecDeque<Vec<u8>>,
    written: Vec<Vec<u8>>,
}

type SharedDevices = Arc<Mutex<HashMap<(u16, u16), SimDeviceState>>>;

//=== SimulatedHid ========================================================

/// In-memory HID backend with test-side scripting hooks.
///
/// Cloning yields another handle onto the same simulated bus, so a test
/// can keep one clone for scripting while the bridge owns the other.
#[derive(Clone, Default)]
pub struct SimulatedHid {
    devices: SharedDevices,
}

impl SimulatedHid {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Scripting hooks --------------------------------------------------

    /// Plugs in a device with the given identifiers.
    pub fn attach(&self, vendor_id: u16, product_id: u16) {
        let mut devices = self.devices.lock().unwrap();
        let state = devices.entry((vendor_id, product_id)).or_default();
        state.connected = true;
    }

    /// Unplugs a device. Subsequent I/O on open handles reports
    /// `Disconnected`.
    pub fn detach(&self, vendor_id: u16, product_id: u16) {
        let mut devices = self.devices.lock().unwrap();
        if let Some(state) = devices.get_mut(&(vendor_id, product_id)) {
            state.connected = false;
        }
    }

    /// Queues one input report for the next read.
    pub fn queue_report(&self, vendor_id: u16, product_id: u16, report: &[u8]) {
        let mut devices = self.devices.lock().unwrap();
        if let Some(state) = devices.get_mut(&(vendor_id, product_id)) {
            state.reports.push_back(report.to_vec());
        }
    }

    /// Drains everything the application has written to a device.
    pub fn take_written(&self, vendor_id: u16, product_id: u16) -> Vec<Vec<u8>> {
        let mut devices = self.devices.lock().unwrap();
        devices
            .get_mut(&(vendor_id, product_id))
            .map(|state| std::mem::take(&mut state.written))
            .unwrap_or_default()
    }
}

impl HidBackend for SimulatedHid {
    fn open(
        &mut self,
        vendor_id: u16,
        product_id: u16,
    ) -> Result<Box<dyn DeviceIo>, DeviceError> {
        let devices = self.devices.lock().unwrap();
        match devices.get(&(vendor_id, product_id)) {
            Some(state) if state.connected => Ok(Box::new(SimDeviceIo {
                devices: Arc::clone(&self.devices),
                vendor_id,
                product_id,
            })),
            _ => Err(DeviceError::NotFound {
                vendor_id,
                product_id,
            }),
        }
    }
}

//=== SimDeviceIo =========================================================

struct SimDeviceIo {
    devices: SharedDevices,
    vendor_id: u16,
    product_id: u16,
}

impl DeviceIo for SimDeviceIo {
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, DeviceError> {
        let mut devices = self.devices.lock().unwrap();
        let state = devices
            .get_mut(&(self.vendor_id, self.product_id))
            .ok_or(DeviceError::Disconnected)?;

        if !state.connected {
            return Err(DeviceError::Disconnected);
        }

        match state.reports.pop_front() {
            Some(report) => {
                let n = report.len().min(buf.len());
                buf[..n].copy_from_slice(&report[..n]);
                Ok(n)
            }
            None => Err(DeviceError::Timeout { timeout_ms }),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, DeviceError> {
        let mut devices = self.devices.lock().unwrap();
        let state = devices
            .get_mut(&(self.vendor_id, self.product_id))
            .ok_or(DeviceError::Disconnected)?;

        if !state.connected {
            return Err(DeviceError::Disconnected);
        }

        state.written.push(data.to_vec());
        Ok(data.len())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_unknown_device_is_not_found() {
        let mut backend = SimulatedHid::new();
        match backend.open(0xdead, 0xbeef) {
            Err(DeviceError::NotFound {
                vendor_id,
                product_id,
            }) => {
                assert_eq!(vendor_id, 0xdead);
                assert_eq!(product_id, 0xbeef);
            }
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn queued_reports_come_back_in_order() {
        let mut backend = SimulatedHid::new();
        backend.attach(0x1234, 0x5678);
        backend.queue_report(0x1234, 0x5678, &[1, 2, 3]);
        backend.queue_report(0x1234, 0x5678, &[4]);

        let mut io = backend.open(0x1234, 0x5678).unwrap();
        let mut buf = [0u8; 8];

        let n = io.read(&mut buf, 0).unwrap();
        assert_eq!(&buf[..n], &[1, 2, 3]);

        let n = io.read(&mut buf, 0).unwrap();
        assert_eq!(&buf[..n], &[4]);
    }

    #[test]
    fn empty_queue_times_out_immediately() {
        let mut backend = SimulatedHid::new();
        backend.attach(0x1234, 0x5678);
        let mut io = backend.open(0x1234, 0x5678).unwrap();

        let mut buf = [0u8; 8];
        match io.read(&mut buf, 100) {
            Err(DeviceError::Timeout { timeout_ms }) => assert_eq!(timeout_ms, 100),
            other => panic!("expected Timeout, got {:?}", other),
        }
    }

    #[test]
    fn detach_turns_io_into_disconnected() {
        let mut backend = SimulatedHid::new();
        backend.attach(0x1234, 0x5678);
        let mut io = backend.open(0x1234, 0x5678).unwrap();

        backend.detach(0x1234, 0x5678);

        let mut buf = [0u8; 8];
        assert!(matches!(io.read(&mut buf, 0), Err(DeviceError::Disconnected)));
        assert!(matches!(io.write(&[0xff]), Err(DeviceError::Disconnected)));
    }

    #[test]
    fn writes_are_observable_from_the_scripting_side() {
        let mut backend = SimulatedHid::new();
        backend.attach(0x1234, 0x5678);
        let mut io = backend.open(0x1234, 0x5678).unwrap();

        assert_eq!(io.write(&[0xaa, 0xbb]).unwrap(), 2);

        let written = backend.take_written(0x1234, 0x5678);
        assert_eq!(written, vec![vec![0xaa, 0xbb]]);
        assert!(backend.take_written(0x1234, 0x5678).is_empty());
    }
}
