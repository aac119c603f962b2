use protocol::Limits;
use protocol::specs::quantum::{CircuitData, QuantumPayload};
use qsim::{Circuit, HardwareBackend, QuantumError, Target, resolve_target};

/// Circuit construction and execution.
pub struct QuantumHandler {
    limits: Limits,
    credential: Option<String>,
    hardware: Option<Box<dyn HardwareBackend>>,
}

impl QuantumHandler {
    pub fn new(limits: Limits, credential: Option<String>) -> Self {
        Self {
            limits,
            credential,
            hardware: None,
        }
    }

    /// Wires in a hardware backend for credentialed hardware requests.
    pub fn with_hardware(mut self, backend: Box<dyn HardwareBackend>) -> Self {
        self.hardware = Some(backend);
        self
    }

    /// Builds a circuit from the payload and, when a shot count is present,
    /// executes it.
    ///
    /// # Errors
    /// Returns `QuantumError` on an undecodable payload, an invalid circuit,
    /// a bad shot count, or an unsatisfiable hardware request. A hardware
    /// request never falls back to the simulator.
    pub fn handle(&self, payload: &serde_json::Value) -> Result<serde_json::Value, QuantumError> {
        let payload: QuantumPayload = serde_json::from_value(payload.clone())
            .map_err(|e| QuantumError::Payload(e.to_string()))?;

        let circuit = Circuit::build(payload.n_qubits, &payload.gates, &self.limits)?;

        let Some(shots) = payload.n_shots else {
            return encode(CircuitData {
                circuit: circuit.describe(),
            });
        };

        Circuit::check_shots(shots, &self.limits)?;

        let data = match resolve_target(payload.backend, self.credential.as_deref())? {
            Target::Simulator => qsim::simulate(&circuit, shots),
            Target::Hardware => self
                .hardware
                .as_ref()
                .ok_or(QuantumError::BackendUnavailable)?
                .execute(&circuit, shots)?,
        };

        encode(data)
    }
}

fn encode<T: serde::Serialize>(data: T) -> Result<serde_json::Value, QuantumError> {
    serde_json::to_value(data).map_err(|e| QuantumError::Payload(e.to_string()))
}
