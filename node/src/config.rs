use std::env;

use protocol::{Limits, Module};
use serde::Deserialize;

/// Immutable node configuration, loaded once at startup and injected into
/// every component.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    /// Modules this node is willing to serve.
    pub allowed_modules: Vec<Module>,
    pub limits: Limits,
    /// Connections silent for this long are closed.
    pub idle_timeout_secs: u64,
    /// Credential gating hardware-backend quantum execution.
    pub quantum_credential: Option<String>,
    /// When set, the node models an accelerator of this capacity; absent
    /// means no device.
    pub accelerator_capacity_bytes: Option<u64>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            allowed_modules: vec![Module::Model, Module::Accelerator, Module::Quantum],
            limits: Limits::default(),
            idle_timeout_secs: 300,
            quantum_credential: None,
            accelerator_capacity_bytes: None,
        }
    }
}

impl NodeConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns a human-readable string if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("cannot read '{path}': {e}"))?;
        serde_json::from_str(&content).map_err(|e| format!("invalid config: {e}"))
    }

    /// Applies `HOST`, `PORT` and `QUANTUM_CREDENTIAL` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = env::var("HOST") {
            self.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.port = port;
            }
        }
        if let Ok(credential) = env::var("QUANTUM_CREDENTIAL") {
            self.quantum_credential = Some(credential);
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
