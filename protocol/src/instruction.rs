use serde::{Deserialize, Serialize};

/// The compute domains a node can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Model,
    Accelerator,
    Quantum,
}

impl Module {
    /// Parses a wire-level module name.
    ///
    /// # Returns
    /// The matching module, or `None` for an unrecognized name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "model" => Some(Module::Model),
            "accelerator" => Some(Module::Accelerator),
            "quantum" => Some(Module::Quantum),
            _ => None,
        }
    }

    /// Returns the wire-level module name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Model => "model",
            Module::Accelerator => "accelerator",
            Module::Quantum => "quantum",
        }
    }
}

/// A validated request naming a target module and a structured payload.
///
/// The payload is kept opaque here; decoding it into a typed spec is the
/// owning handler's job, so module-specific rules stay local to the handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub module: Module,
    pub payload: serde_json::Value,
}
