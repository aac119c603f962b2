use protocol::specs::quantum::{ExecutionData, TargetSpec};

use crate::{Circuit, QuantumError};

/// Resolved execution target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Simulator,
    Hardware,
}

/// A remote quantum device a node may be wired to.
pub trait HardwareBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Submits a circuit for `shots` measurements on the device.
    ///
    /// # Errors
    /// Returns `QuantumError` on device rejection or transport failure.
    fn execute(&self, circuit: &Circuit, shots: u64) -> Result<ExecutionData, QuantumError>;
}

/// Resolves the requested target against the configured credential.
///
/// Fail-closed: a hardware request without a credential is an error, never a
/// silent simulator fallback.
///
/// # Errors
/// Returns `QuantumError::MissingCredential` for an uncredentialed hardware
/// request.
pub fn resolve_target(
    requested: Option<TargetSpec>,
    credential: Option<&str>,
) -> Result<Target, QuantumError> {
    match requested.unwrap_or(TargetSpec::Simulator) {
        TargetSpec::Simulator => Ok(Target::Simulator),
        TargetSpec::Hardware => {
            if credential.is_none() {
                return Err(QuantumError::MissingCredential);
            }
            Ok(Target::Hardware)
        }
    }
}
