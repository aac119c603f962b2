use std::sync::Arc;

use log::{debug, warn};
use ndarray::Array1;
use neural::Network;
use parking_lot::Mutex;
use protocol::Limits;
use protocol::specs::DeviceKind;

use crate::{AcceleratorError, AcceleratorRuntime, DeviceStatus};

/// An object with a known device representation.
pub trait Transferable {
    const KIND: &'static str;

    /// Device footprint in bytes; `None` when the object has no device
    /// representation.
    fn device_bytes(&self) -> Option<u64>;
}

impl Transferable for &Network {
    const KIND: &'static str = "network";

    fn device_bytes(&self) -> Option<u64> {
        Some(self.num_params() as u64 * 4)
    }
}

impl Transferable for &[f32] {
    const KIND: &'static str = "tensor";

    fn device_bytes(&self) -> Option<u64> {
        Some(self.len() as u64 * 4)
    }
}

/// An object after placement, on whichever device it landed.
#[derive(Debug)]
pub struct Placed<T> {
    pub value: T,
    pub device: DeviceKind,
}

/// Result of one placed forward pass.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output: Vec<f32>,
    pub loss: f32,
    pub device: DeviceKind,
}

/// The process-wide accelerator gatekeeper.
///
/// Probing reads a fresh snapshot and may run concurrently; every operation
/// that mutates device-global state (transfers, compaction) is serialized
/// behind one lock.
pub struct Accelerator {
    runtime: Arc<dyn AcceleratorRuntime>,
    limits: Limits,
    device_lock: Mutex<()>,
}

impl Accelerator {
    pub fn new(runtime: Arc<dyn AcceleratorRuntime>, limits: Limits) -> Self {
        Self {
            runtime,
            limits,
            device_lock: Mutex::new(()),
        }
    }

    /// Reports whether the device is usable right now.
    ///
    /// True only when the runtime is functional, free memory clears the
    /// configured floor, and the free/total ratio clears the usage ceiling.
    ///
    /// # Errors
    /// Returns `AcceleratorError::Driver` when the device cannot be probed;
    /// a healthy probe of an unusable device is `Ok(false)`.
    pub fn probe(&self) -> Result<bool, AcceleratorError> {
        Ok(self.inspect()?.0)
    }

    /// Availability verdict together with the snapshot it was derived from.
    ///
    /// # Errors
    /// Returns `AcceleratorError::Driver` when the device cannot be probed.
    pub fn inspect(&self) -> Result<(bool, DeviceStatus), AcceleratorError> {
        let status = self.runtime.status()?;

        let available = status.functional
            && status.total_bytes > 0
            && status.free_bytes >= self.limits.min_memory_available
            && status.free_bytes as f64 / status.total_bytes as f64
                >= 1.0 - self.limits.max_memory_usage;

        Ok((available, status))
    }

    /// Places an object on the device when it is usable, on the host
    /// otherwise.
    ///
    /// Unavailability is a routing decision, never a failure: the object
    /// comes back unchanged with `DeviceKind::Host`. A probe fault degrades
    /// to host placement the same way.
    ///
    /// # Errors
    /// Returns `AcceleratorError::UnsupportedTransfer` for an object with no
    /// device representation, `AcceleratorError::Driver` if the transfer
    /// itself faults.
    pub fn place<T: Transferable>(&self, value: T) -> Result<Placed<T>, AcceleratorError> {
        let available = match self.probe() {
            Ok(available) => available,
            Err(e) => {
                warn!("probe failed during placement, staying on host: {e}");
                false
            }
        };

        if !available {
            return Ok(Placed {
                value,
                device: DeviceKind::Host,
            });
        }

        let bytes = value
            .device_bytes()
            .ok_or(AcceleratorError::UnsupportedTransfer(T::KIND))?;

        let _guard = self.device_lock.lock();
        self.runtime.transfer(bytes)?;
        debug!("transferred {bytes} byte {} to the accelerator", T::KIND);

        Ok(Placed {
            value,
            device: DeviceKind::Accelerator,
        })
    }

    /// Best-effort memory compaction.
    ///
    /// # Returns
    /// `Ok(false)` when the device is absent or non-functional.
    ///
    /// # Errors
    /// Returns `AcceleratorError::Driver` on a device fault during
    /// compaction.
    pub fn reclaim(&self) -> Result<bool, AcceleratorError> {
        let status = self.runtime.status()?;
        if !status.functional {
            return Ok(false);
        }

        let _guard = self.device_lock.lock();
        let freed = self.runtime.compact()?;
        debug!("compaction freed {freed} bytes");
        Ok(true)
    }

    /// One placed forward pass with a squared-distance loss.
    ///
    /// Operand shapes are checked against the network before anything is
    /// transferred; memory is reclaimed before and after the pass; the
    /// output is returned in host representation.
    ///
    /// # Errors
    /// Returns `AcceleratorError::ShapeMismatch` on a misshapen operand,
    /// `AcceleratorError::Driver` on a device fault.
    pub fn run(
        &self,
        network: &Network,
        input: &[f32],
        target: &[f32],
    ) -> Result<RunOutcome, AcceleratorError> {
        if input.len() != network.input_dim() {
            return Err(AcceleratorError::ShapeMismatch {
                what: "input",
                got: input.len(),
                expected: network.input_dim(),
            });
        }
        if target.len() != network.output_dim() {
            return Err(AcceleratorError::ShapeMismatch {
                what: "target",
                got: target.len(),
                expected: network.output_dim(),
            });
        }

        self.reclaim()?;

        let placed_network = self.place(network)?;
        let _placed_input = self.place(input)?;
        let _placed_target = self.place(target)?;

        let x = Array1::from_vec(input.to_vec());
        let output = placed_network
            .value
            .forward(x.view())
            .map_err(|e| AcceleratorError::BadNetwork(e.to_string()))?;

        let loss = output
            .iter()
            .zip(target)
            .map(|(o, t)| (o - t).powi(2))
            .sum();

        self.reclaim()?;

        Ok(RunOutcome {
            output: output.to_vec(),
            loss,
            device: placed_network.device,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{NullRuntime, StaticRuntime};
    use protocol::specs::model::{ActivationSpec, LayerKind, LayerSpec};

    fn small_limits() -> Limits {
        Limits {
            min_memory_available: 64,
            max_memory_usage: 0.9,
            ..Limits::default()
        }
    }

    fn identity_network() -> Network {
        let specs = [LayerSpec {
            kind: LayerKind::Dense,
            input_dim: 2,
            output_dim: 2,
            activation: ActivationSpec::Identity,
        }];
        Network::build(&specs, &Limits::default(), Some(5)).unwrap()
    }

    #[test]
    fn non_functional_runtime_probes_false_and_place_is_identity() {
        let runtime = Arc::new(StaticRuntime::new(1 << 20));
        runtime.set_functional(false);
        let accelerator = Accelerator::new(runtime, small_limits());

        assert!(!accelerator.probe().unwrap());

        let tensor = [1.0_f32, 2.0, 3.0];
        let placed = accelerator.place(&tensor[..]).unwrap();
        assert_eq!(placed.device, DeviceKind::Host);
        assert_eq!(placed.value, &tensor[..]);
    }

    #[test]
    fn probe_respects_the_memory_floor() {
        let runtime = Arc::new(StaticRuntime::new(32));
        let accelerator = Accelerator::new(runtime, small_limits());
        // 32 total < 64 byte floor.
        assert!(!accelerator.probe().unwrap());
    }

    #[test]
    fn probe_respects_the_usage_ceiling() {
        let runtime = Arc::new(StaticRuntime::new(1000));
        runtime.allocate(950);
        let limits = Limits {
            min_memory_available: 10,
            max_memory_usage: 0.9,
            ..Limits::default()
        };
        let accelerator = Accelerator::new(runtime.clone(), limits);

        // 5% free is under the 10% floor implied by the ceiling.
        assert!(!accelerator.probe().unwrap());

        runtime.compact().unwrap();
        assert!(accelerator.probe().unwrap());
    }

    #[test]
    fn reclaim_reports_false_without_a_device() {
        let accelerator = Accelerator::new(Arc::new(NullRuntime), small_limits());
        assert!(!accelerator.reclaim().unwrap());
    }

    #[test]
    fn placement_on_an_available_device_consumes_memory() {
        let runtime = Arc::new(StaticRuntime::new(1 << 20));
        let accelerator = Accelerator::new(runtime.clone(), small_limits());

        let tensor = vec![0.0_f32; 256];
        let placed = accelerator.place(&tensor[..]).unwrap();
        assert_eq!(placed.device, DeviceKind::Accelerator);

        let status = runtime.status().unwrap();
        assert_eq!(status.free_bytes, (1 << 20) - 1024);
    }

    #[test]
    fn run_checks_shapes_before_any_transfer() {
        let runtime = Arc::new(StaticRuntime::new(1 << 20));
        let accelerator = Accelerator::new(runtime.clone(), small_limits());
        let network = identity_network();

        let err = accelerator
            .run(&network, &[1.0, 2.0, 3.0], &[0.0, 0.0])
            .unwrap_err();
        assert!(matches!(
            err,
            AcceleratorError::ShapeMismatch { what: "input", .. }
        ));
        // Nothing was transferred.
        assert_eq!(runtime.status().unwrap().free_bytes, 1 << 20);
    }

    #[test]
    fn run_reclaims_after_the_pass() {
        let runtime = Arc::new(StaticRuntime::new(1 << 20));
        let accelerator = Accelerator::new(runtime.clone(), small_limits());
        let network = identity_network();

        let outcome = accelerator.run(&network, &[1.0, 0.5], &[1.0, 0.5]).unwrap();
        assert_eq!(outcome.output.len(), 2);
        assert_eq!(outcome.device, DeviceKind::Accelerator);
        assert!(outcome.loss.is_finite());

        // The trailing reclaim released every placement.
        assert_eq!(runtime.status().unwrap().free_bytes, 1 << 20);
    }

    #[derive(Debug)]
    struct Opaque;

    impl Transferable for Opaque {
        const KIND: &'static str = "opaque";

        fn device_bytes(&self) -> Option<u64> {
            None
        }
    }

    #[test]
    fn unrepresentable_kinds_fail_transfer() {
        let runtime = Arc::new(StaticRuntime::new(1 << 20));
        let accelerator = Accelerator::new(runtime, small_limits());

        let err = accelerator.place(Opaque).unwrap_err();
        assert!(matches!(
            err,
            AcceleratorError::UnsupportedTransfer("opaque")
        ));
    }
}
