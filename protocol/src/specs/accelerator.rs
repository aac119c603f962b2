//! Wire schema of the accelerator module: resource check, reclamation, and
//! placed forward passes.

use serde::{Deserialize, Serialize};

use super::DeviceKind;
use super::model::LayerSpec;

/// Payload of an accelerator instruction, discriminated by `action`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AcceleratorPayload {
    /// Availability and memory snapshot.
    Probe,
    /// Best-effort memory compaction.
    Reclaim,
    /// One placed forward pass with a distance loss.
    Run {
        network: Vec<LayerSpec>,
        input: Vec<f32>,
        target: Vec<f32>,
    },
}

/// Result of a probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeData {
    pub available: bool,
    pub free_bytes: u64,
    pub total_bytes: u64,
}

/// Result of a reclamation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReclaimData {
    pub reclaimed: bool,
}

/// Result of a placed forward pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunData {
    pub output: Vec<f32>,
    pub loss: f32,
    pub device: DeviceKind,
}
