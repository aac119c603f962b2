//! Wire schema of the model module: network construction and training.

use serde::{Deserialize, Serialize};

use super::DeviceKind;

/// Recognized layer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Dense,
}

/// Recognized activation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationSpec {
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
    Identity,
}

/// One layer of a network request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    pub kind: LayerKind,
    pub input_dim: usize,
    pub output_dim: usize,
    pub activation: ActivationSpec,
}

/// Recognized loss functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    Crossentropy,
    Mse,
}

/// Training configuration carried alongside the training data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingParams {
    pub epochs: usize,
    pub learning_rate: f32,
    pub loss: LossKind,
    /// Optional seed for deterministic initialization.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// One `(input, target)` training pair.
pub type Sample = (Vec<f32>, Vec<f32>);

/// Payload of a model instruction.
///
/// `layers` alone requests construction; adding `params` and `data` requests
/// construction followed by training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPayload {
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub params: Option<TrainingParams>,
    #[serde(default)]
    pub data: Option<Vec<Sample>>,
}

/// Dimensional shape of one constructed layer, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerShape {
    pub input_dim: usize,
    pub output_dim: usize,
    pub activation: ActivationSpec,
}

/// Description of a constructed network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDescription {
    pub layers: Vec<LayerShape>,
    pub num_params: usize,
    pub device: DeviceKind,
}

/// Result of a construction-only request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkData {
    pub network: NetworkDescription,
}

/// Result of a training request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainData {
    pub network: NetworkDescription,
    pub weights: Vec<f32>,
    pub accuracy: f32,
    pub loss: f32,
}
