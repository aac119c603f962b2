//! Device runtime abstraction.
//!
//! The real driver sits behind `AcceleratorRuntime`; the node wires in
//! whichever implementation its deployment has. `StaticRuntime` models a
//! device with a fixed capacity for tests and accelerator-less hosts.

use parking_lot::Mutex;

use crate::AcceleratorError;

/// Point-in-time device snapshot, recomputed on every check.
#[derive(Debug, Clone, Copy)]
pub struct DeviceStatus {
    pub functional: bool,
    pub free_bytes: u64,
    pub total_bytes: u64,
}

/// Driver-facing contract of an accelerator device.
///
/// `status` is read-only and may be called concurrently; `compact` mutates
/// device-global state and is serialized by the [`Accelerator`] above it.
///
/// [`Accelerator`]: crate::Accelerator
pub trait AcceleratorRuntime: Send + Sync {
    /// Reports the current device status.
    ///
    /// # Errors
    /// Returns `AcceleratorError::Driver` if the device cannot be probed at
    /// all; a healthy probe of a non-functional device is `Ok`.
    fn status(&self) -> Result<DeviceStatus, AcceleratorError>;

    /// Reserves `bytes` of device memory for a transferred object.
    ///
    /// # Errors
    /// Returns `AcceleratorError::Driver` on a device fault.
    fn transfer(&self, bytes: u64) -> Result<(), AcceleratorError>;

    /// Compacts device memory, returning the bytes made free.
    ///
    /// # Errors
    /// Returns `AcceleratorError::Driver` on a device fault.
    fn compact(&self) -> Result<u64, AcceleratorError>;
}

/// The no-device runtime: reports a permanently non-functional accelerator.
pub struct NullRuntime;

impl AcceleratorRuntime for NullRuntime {
    fn status(&self) -> Result<DeviceStatus, AcceleratorError> {
        Ok(DeviceStatus {
            functional: false,
            free_bytes: 0,
            total_bytes: 0,
        })
    }

    fn transfer(&self, _bytes: u64) -> Result<(), AcceleratorError> {
        Err(AcceleratorError::Driver("no device present".into()))
    }

    fn compact(&self) -> Result<u64, AcceleratorError> {
        Ok(0)
    }
}

/// An in-process device model with a fixed capacity.
///
/// Placements consume memory and compaction releases it, which is enough to
/// exercise every probe/place/reclaim path without real hardware.
pub struct StaticRuntime {
    state: Mutex<StaticState>,
}

#[derive(Debug)]
struct StaticState {
    functional: bool,
    used_bytes: u64,
    reclaimable_bytes: u64,
    total_bytes: u64,
}

impl StaticRuntime {
    pub fn new(total_bytes: u64) -> Self {
        Self {
            state: Mutex::new(StaticState {
                functional: true,
                used_bytes: 0,
                reclaimable_bytes: 0,
                total_bytes,
            }),
        }
    }

    /// Marks the device as failed; subsequent probes report non-functional.
    pub fn set_functional(&self, functional: bool) {
        self.state.lock().functional = functional;
    }

    /// Records an allocation that compaction can later release.
    pub fn allocate(&self, bytes: u64) {
        let mut state = self.state.lock();
        let bytes = bytes.min(state.total_bytes - state.used_bytes);
        state.used_bytes += bytes;
        state.reclaimable_bytes += bytes;
    }
}

impl AcceleratorRuntime for StaticRuntime {
    fn status(&self) -> Result<DeviceStatus, AcceleratorError> {
        let state = self.state.lock();
        Ok(DeviceStatus {
            functional: state.functional,
            free_bytes: state.total_bytes - state.used_bytes,
            total_bytes: state.total_bytes,
        })
    }

    fn transfer(&self, bytes: u64) -> Result<(), AcceleratorError> {
        self.allocate(bytes);
        Ok(())
    }

    fn compact(&self) -> Result<u64, AcceleratorError> {
        let mut state = self.state.lock();
        let freed = state.reclaimable_bytes;
        state.used_bytes -= freed;
        state.reclaimable_bytes = 0;
        Ok(freed)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn static_runtime_reclaims_what_it_allocated() {
        let runtime = StaticRuntime::new(1000);
        runtime.allocate(400);

        let status = runtime.status().unwrap();
        assert_eq!(status.free_bytes, 600);

        assert_eq!(runtime.compact().unwrap(), 400);
        assert_eq!(runtime.status().unwrap().free_bytes, 1000);
    }

    #[test]
    fn allocation_saturates_at_capacity() {
        let runtime = StaticRuntime::new(100);
        runtime.allocate(250);
        assert_eq!(runtime.status().unwrap().free_bytes, 0);
    }
}
