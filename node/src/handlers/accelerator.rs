use std::sync::Arc;

use accel::{Accelerator, AcceleratorError};
use neural::Network;
use protocol::Limits;
use protocol::specs::accelerator::{AcceleratorPayload, ProbeData, ReclaimData, RunData};

/// Resource checks, reclamation, and placed forward passes.
pub struct AcceleratorHandler {
    limits: Limits,
    accelerator: Arc<Accelerator>,
}

impl AcceleratorHandler {
    pub fn new(limits: Limits, accelerator: Arc<Accelerator>) -> Self {
        Self {
            limits,
            accelerator,
        }
    }

    /// Executes one accelerator action.
    ///
    /// # Errors
    /// Returns `AcceleratorError` on an undecodable payload, a driver fault,
    /// or a run request with an invalid network or misshapen operands.
    pub fn handle(
        &self,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, AcceleratorError> {
        let payload: AcceleratorPayload = serde_json::from_value(payload.clone())
            .map_err(|e| AcceleratorError::Payload(e.to_string()))?;

        match payload {
            AcceleratorPayload::Probe => {
                let (available, status) = self.accelerator.inspect()?;
                encode(ProbeData {
                    available,
                    free_bytes: status.free_bytes,
                    total_bytes: status.total_bytes,
                })
            }
            AcceleratorPayload::Reclaim => encode(ReclaimData {
                reclaimed: self.accelerator.reclaim()?,
            }),
            AcceleratorPayload::Run {
                network,
                input,
                target,
            } => {
                let network = Network::build(&network, &self.limits, None)
                    .map_err(|e| AcceleratorError::BadNetwork(e.to_string()))?;
                let outcome = self.accelerator.run(&network, &input, &target)?;
                encode(RunData {
                    output: outcome.output,
                    loss: outcome.loss,
                    device: outcome.device,
                })
            }
        }
    }
}

fn encode<T: serde::Serialize>(data: T) -> Result<serde_json::Value, AcceleratorError> {
    serde_json::to_value(data).map_err(|e| AcceleratorError::Payload(e.to_string()))
}
