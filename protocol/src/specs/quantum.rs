//! Wire schema of the quantum module: circuit construction and execution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Recognized gate kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    H,
    X,
    Y,
    Z,
    T,
    S,
    Cnot,
}

/// One gate of a circuit request. Qubit indices are 1-based on the wire;
/// `cnot` takes `(control, target)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSpec {
    pub kind: GateKind,
    pub qubits: Vec<usize>,
}

/// Requested execution target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    Simulator,
    Hardware,
}

/// Payload of a quantum instruction.
///
/// `n_qubits` and `gates` alone request construction; adding `n_shots`
/// requests construction followed by execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantumPayload {
    pub n_qubits: usize,
    pub gates: Vec<GateSpec>,
    #[serde(default)]
    pub n_shots: Option<u64>,
    #[serde(default)]
    pub backend: Option<TargetSpec>,
}

/// Description of a constructed circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitDescription {
    pub n_qubits: usize,
    pub gates: Vec<GateSpec>,
}

/// Result of a construction-only request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitData {
    pub circuit: CircuitDescription,
}

/// Observed-bitstring frequency counts of one execution.
///
/// The counts always sum to exactly `shots`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionData {
    pub results: BTreeMap<String, u64>,
    pub shots: u64,
}
