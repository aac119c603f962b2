use std::sync::Arc;

use accel::Accelerator;
use log::warn;
use neural::{ModelError, Network};
use protocol::Limits;
use protocol::specs::DeviceKind;
use protocol::specs::model::{ModelPayload, NetworkData, NetworkDescription, TrainData};

/// Network construction and training.
pub struct ModelHandler {
    limits: Limits,
    accelerator: Arc<Accelerator>,
}

impl ModelHandler {
    pub fn new(limits: Limits, accelerator: Arc<Accelerator>) -> Self {
        Self {
            limits,
            accelerator,
        }
    }

    /// Builds a network from the payload and, when training parameters and
    /// data are present, trains it.
    ///
    /// # Errors
    /// Returns `ModelError` on an undecodable payload, an invalid spec
    /// sequence, or a failed training run. No partial result is produced.
    pub fn handle(&self, payload: &serde_json::Value) -> Result<serde_json::Value, ModelError> {
        let payload: ModelPayload = serde_json::from_value(payload.clone())
            .map_err(|e| ModelError::Payload(e.to_string()))?;

        let seed = payload.params.as_ref().and_then(|p| p.seed);
        let mut network = Network::build(&payload.layers, &self.limits, seed)?;
        let device = self.place(&network);

        match (payload.params, payload.data) {
            (Some(params), Some(data)) => {
                let report = neural::train(&mut network, &params, &data, &self.limits)?;
                encode(TrainData {
                    network: describe(&network, device),
                    weights: report.weights,
                    accuracy: report.accuracy,
                    loss: report.loss,
                })
            }
            (None, None) => encode(NetworkData {
                network: describe(&network, device),
            }),
            _ => Err(ModelError::Payload(
                "params and data must be provided together".to_string(),
            )),
        }
    }

    /// Routes the network to the accelerator when one is usable.
    ///
    /// Placement is transparent to the caller: the response has the same
    /// shape wherever the network landed, and a device fault degrades to the
    /// host path.
    fn place(&self, network: &Network) -> DeviceKind {
        match self.accelerator.place(network) {
            Ok(placed) => placed.device,
            Err(e) => {
                warn!("placement failed, keeping the network on the host: {e}");
                DeviceKind::Host
            }
        }
    }
}

fn describe(network: &Network, device: DeviceKind) -> NetworkDescription {
    NetworkDescription {
        layers: network.describe(),
        num_params: network.num_params(),
        device,
    }
}

fn encode<T: serde::Serialize>(data: T) -> Result<serde_json::Value, ModelError> {
    serde_json::to_value(data).map_err(|e| ModelError::Payload(e.to_string()))
}
