mod backend;
mod circuit;
mod error;
mod state;

pub use backend::{HardwareBackend, Target, resolve_target};
pub use circuit::{Circuit, Gate};
pub use error::QuantumError;
pub use state::StateVector;

use protocol::specs::quantum::ExecutionData;
use rand::Rng;

/// Simulates `shots` independent measurements of the circuit's final state.
///
/// Every shot lands in exactly one bitstring bucket, so the returned counts
/// always sum to `shots`.
pub fn simulate(circuit: &Circuit, shots: u64) -> ExecutionData {
    simulate_with_rng(circuit, shots, &mut rand::rng())
}

/// Simulation entry point with a caller-supplied random source.
pub fn simulate_with_rng<R: Rng>(circuit: &Circuit, shots: u64, rng: &mut R) -> ExecutionData {
    let mut state = StateVector::new(circuit.n_qubits());
    for gate in circuit.gates() {
        state.apply(gate);
    }

    let mut results = std::collections::BTreeMap::new();
    for _ in 0..shots {
        let outcome = state.sample(rng);
        *results.entry(state.bitstring(outcome)).or_insert(0) += 1;
    }

    ExecutionData { results, shots }
}
