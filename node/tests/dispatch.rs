use std::sync::Arc;

use accel::{Accelerator, AcceleratorRuntime, NullRuntime, StaticRuntime};
use node::{Dispatcher, NodeConfig};
use protocol::{Instruction, Module, Status};
use serde_json::json;

fn dispatcher_with(config: &NodeConfig, runtime: Arc<dyn AcceleratorRuntime>) -> Dispatcher {
    let accelerator = Arc::new(Accelerator::new(runtime, config.limits));
    Dispatcher::new(config, accelerator)
}

fn default_dispatcher() -> Dispatcher {
    dispatcher_with(&NodeConfig::default(), Arc::new(NullRuntime))
}

fn instruction(module: Module, payload: serde_json::Value) -> Instruction {
    Instruction { module, payload }
}

#[test]
fn two_layer_build_succeeds_in_order() {
    let dispatcher = default_dispatcher();
    let envelope = dispatcher.dispatch(&instruction(
        Module::Model,
        json!({
            "layers": [
                { "kind": "dense", "input_dim": 784, "output_dim": 128, "activation": "relu" },
                { "kind": "dense", "input_dim": 128, "output_dim": 10, "activation": "softmax" },
            ]
        }),
    ));

    assert_eq!(envelope.status, Status::Success);
    let network = &envelope.data.unwrap()["network"];
    let layers = network["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0]["input_dim"], 784);
    assert_eq!(layers[0]["output_dim"], 128);
    assert_eq!(layers[1]["output_dim"], 10);
    assert_eq!(network["device"], "host");
}

#[test]
fn mismatched_layers_yield_a_model_error() {
    let dispatcher = default_dispatcher();
    let envelope = dispatcher.dispatch(&instruction(
        Module::Model,
        json!({
            "layers": [
                { "kind": "dense", "input_dim": 4, "output_dim": 8, "activation": "relu" },
                { "kind": "dense", "input_dim": 6, "output_dim": 2, "activation": "identity" },
            ]
        }),
    ));

    assert_eq!(envelope.status, Status::Error);
    let message = envelope.message.unwrap();
    assert!(message.starts_with("model error:"), "message: {message}");
    assert!(envelope.data.is_none());
}

#[test]
fn training_returns_weights_and_accuracy() {
    let dispatcher = default_dispatcher();
    let data: Vec<_> = (0..12)
        .map(|i| {
            let x = i as f32 / 12.0;
            json!([[x], [2.0 * x]])
        })
        .collect();

    let envelope = dispatcher.dispatch(&instruction(
        Module::Model,
        json!({
            "layers": [
                { "kind": "dense", "input_dim": 1, "output_dim": 1, "activation": "identity" },
            ],
            "params": { "epochs": 20, "learning_rate": 0.05, "loss": "mse", "seed": 4 },
            "data": data,
        }),
    ));

    assert_eq!(envelope.status, Status::Success);
    let data = envelope.data.unwrap();
    assert_eq!(data["weights"].as_array().unwrap().len(), 2);
    assert!(data["accuracy"].is_number());
    assert!(data["loss"].is_number());
}

#[test]
fn params_without_data_are_rejected() {
    let dispatcher = default_dispatcher();
    let envelope = dispatcher.dispatch(&instruction(
        Module::Model,
        json!({
            "layers": [
                { "kind": "dense", "input_dim": 1, "output_dim": 1, "activation": "identity" },
            ],
            "params": { "epochs": 5, "learning_rate": 0.1, "loss": "mse" },
        }),
    ));
    assert_eq!(envelope.status, Status::Error);
}

#[test]
fn bell_pair_counts_sum_to_the_shot_request() {
    let dispatcher = default_dispatcher();
    let envelope = dispatcher.dispatch(&instruction(
        Module::Quantum,
        json!({
            "n_qubits": 2,
            "gates": [
                { "kind": "h", "qubits": [1] },
                { "kind": "cnot", "qubits": [1, 2] },
            ],
            "n_shots": 100,
        }),
    ));

    assert_eq!(envelope.status, Status::Success);
    let data = envelope.data.unwrap();
    assert_eq!(data["shots"], 100);

    let results = data["results"].as_object().unwrap();
    let total: u64 = results.values().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(total, 100);
    for bitstring in results.keys() {
        assert_eq!(bitstring.len(), 2);
    }
}

#[test]
fn build_only_quantum_requests_echo_the_circuit() {
    let dispatcher = default_dispatcher();
    let envelope = dispatcher.dispatch(&instruction(
        Module::Quantum,
        json!({
            "n_qubits": 3,
            "gates": [{ "kind": "x", "qubits": [2] }],
        }),
    ));

    assert_eq!(envelope.status, Status::Success);
    let data = envelope.data.unwrap();
    assert_eq!(data["circuit"]["n_qubits"], 3);
    assert_eq!(data["circuit"]["gates"][0]["kind"], "x");
}

#[test]
fn hardware_requests_without_a_credential_fail_closed() {
    let dispatcher = default_dispatcher();
    let envelope = dispatcher.dispatch(&instruction(
        Module::Quantum,
        json!({
            "n_qubits": 1,
            "gates": [{ "kind": "h", "qubits": [1] }],
            "n_shots": 10,
            "backend": "hardware",
        }),
    ));

    assert_eq!(envelope.status, Status::Error);
    assert!(envelope.message.unwrap().contains("credential"));
}

#[test]
fn credentialed_hardware_requests_without_a_backend_are_errors() {
    let mut config = NodeConfig::default();
    config.quantum_credential = Some("token".to_string());
    let dispatcher = dispatcher_with(&config, Arc::new(NullRuntime));

    let envelope = dispatcher.dispatch(&instruction(
        Module::Quantum,
        json!({
            "n_qubits": 1,
            "gates": [{ "kind": "h", "qubits": [1] }],
            "n_shots": 10,
            "backend": "hardware",
        }),
    ));

    assert_eq!(envelope.status, Status::Error);
    assert!(envelope.message.unwrap().contains("backend"));
}

#[test]
fn probe_reports_an_absent_device_as_unavailable() {
    let dispatcher = default_dispatcher();
    let envelope = dispatcher.dispatch(&instruction(Module::Accelerator, json!({ "action": "probe" })));

    assert_eq!(envelope.status, Status::Success);
    let data = envelope.data.unwrap();
    assert_eq!(data["available"], false);
}

#[test]
fn run_on_an_available_device_reports_the_accelerator() {
    let config = NodeConfig::default();
    let runtime = Arc::new(StaticRuntime::new(
        config.limits.min_memory_available * 16,
    ));
    let dispatcher = dispatcher_with(&config, runtime);

    let envelope = dispatcher.dispatch(&instruction(
        Module::Accelerator,
        json!({
            "action": "run",
            "network": [
                { "kind": "dense", "input_dim": 2, "output_dim": 2, "activation": "identity" },
            ],
            "input": [1.0, 0.0],
            "target": [0.0, 1.0],
        }),
    ));

    assert_eq!(envelope.status, Status::Success);
    let data = envelope.data.unwrap();
    assert_eq!(data["output"].as_array().unwrap().len(), 2);
    assert_eq!(data["device"], "accelerator");
    assert!(data["loss"].is_number());
}

#[test]
fn disallowed_modules_are_refused_at_the_dispatch_boundary() {
    let mut config = NodeConfig::default();
    config.allowed_modules = vec![Module::Model];
    let dispatcher = dispatcher_with(&config, Arc::new(NullRuntime));

    let envelope = dispatcher.dispatch(&instruction(Module::Quantum, json!({})));
    assert_eq!(envelope.status, Status::Error);
    assert!(envelope.message.unwrap().contains("unsupported module"));
}

#[test]
fn undecodable_payloads_become_error_envelopes() {
    let dispatcher = default_dispatcher();
    let envelope = dispatcher.dispatch(&instruction(
        Module::Quantum,
        json!({ "circuits": "three of them please" }),
    ));

    assert_eq!(envelope.status, Status::Error);
    assert!(envelope.message.unwrap().starts_with("quantum error:"));
}
