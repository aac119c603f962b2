use serde::{Deserialize, Serialize};

/// Fixed resource ceilings consulted by the validator and every handler.
///
/// Loaded once at startup and passed by value into components; never mutated
/// afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Largest accepted wire frame, in bytes.
    pub max_payload_size: usize,
    /// Largest accepted layer count per network.
    pub max_layers: usize,
    /// Largest accepted layer width.
    pub max_neurons: usize,
    /// Largest accepted training epoch count.
    pub max_epochs: usize,
    /// Smallest accepted training set.
    pub min_data_size: usize,
    /// Largest accepted circuit width.
    pub max_qubits: usize,
    /// Largest accepted gate count per circuit.
    pub max_gates: usize,
    /// Largest accepted shot count per execution.
    pub max_shots: u64,
    /// Free accelerator memory required for the device to count as available.
    pub min_memory_available: u64,
    /// Highest tolerated used/total memory ratio on the accelerator.
    pub max_memory_usage: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_payload_size: 4 * 1024 * 1024,
            max_layers: 16,
            max_neurons: 4096,
            max_epochs: 1000,
            min_data_size: 10,
            max_qubits: 20,
            max_gates: 128,
            max_shots: 100_000,
            min_memory_available: 256 * 1024 * 1024,
            max_memory_usage: 0.9,
        }
    }
}
