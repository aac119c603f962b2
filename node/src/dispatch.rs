use std::sync::Arc;

use accel::Accelerator;
use log::debug;
use protocol::{Envelope, Instruction, Module};
use qsim::HardwareBackend;

use crate::NodeConfig;
use crate::handlers::{AcceleratorHandler, ModelHandler, QuantumHandler};

/// Routes validated instructions to their handlers and normalizes every
/// outcome into a response envelope.
///
/// No handler failure escapes this boundary: typed errors become error
/// envelopes with a category-tagged message, and panics are absorbed by the
/// blocking-pool join in the connection loop above.
pub struct Dispatcher {
    allowed: Vec<Module>,
    model: ModelHandler,
    accelerator: AcceleratorHandler,
    quantum: QuantumHandler,
}

impl Dispatcher {
    pub fn new(config: &NodeConfig, accelerator: Arc<Accelerator>) -> Self {
        Self {
            allowed: config.allowed_modules.clone(),
            model: ModelHandler::new(config.limits, Arc::clone(&accelerator)),
            accelerator: AcceleratorHandler::new(config.limits, accelerator),
            quantum: QuantumHandler::new(config.limits, config.quantum_credential.clone()),
        }
    }

    /// Wires a hardware backend into the quantum handler.
    pub fn with_hardware(mut self, backend: Box<dyn HardwareBackend>) -> Self {
        self.quantum = self.quantum.with_hardware(backend);
        self
    }

    /// Dispatches one instruction and wraps the result.
    ///
    /// Always returns an envelope; an unregistered module (unreachable after
    /// validation, kept as defense in depth) yields an error envelope like
    /// any handler failure.
    pub fn dispatch(&self, instruction: &Instruction) -> Envelope {
        if !self.allowed.contains(&instruction.module) {
            return Envelope::error(format!(
                "unsupported module: {}",
                instruction.module.as_str()
            ));
        }

        let result = match instruction.module {
            Module::Model => self
                .model
                .handle(&instruction.payload)
                .map_err(|e| format!("model error: {e}")),
            Module::Accelerator => self
                .accelerator
                .handle(&instruction.payload)
                .map_err(|e| format!("accelerator error: {e}")),
            Module::Quantum => self
                .quantum
                .handle(&instruction.payload)
                .map_err(|e| format!("quantum error: {e}")),
        };

        match result {
            Ok(data) => Envelope::success(data),
            Err(message) => {
                debug!(module = instruction.module.as_str(); "instruction failed: {message}");
                Envelope::error(message)
            }
        }
    }
}
