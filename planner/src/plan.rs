//! Decomposition of a goal into per-module sub-tasks.

use std::collections::HashSet;

use log::debug;
use protocol::specs::model::{ActivationSpec, LayerKind, LayerSpec, ModelPayload};
use protocol::specs::quantum::{GateKind, GateSpec, QuantumPayload};
use protocol::{Instruction, Module};

use crate::knowledge::{KnowledgeSource, Relationship};

/// Default shot count for decomposed circuit tasks.
const DEFAULT_SHOTS: u64 = 128;

/// One unit of work addressed to a single module.
#[derive(Debug, Clone)]
pub struct SubTask {
    pub id: usize,
    pub module: Module,
    pub payload: serde_json::Value,
}

impl SubTask {
    pub fn instruction(&self) -> Instruction {
        Instruction {
            module: self.module,
            payload: self.payload.clone(),
        }
    }
}

/// Turns goals into sub-task lists by consulting a knowledge source.
pub struct Planner<K> {
    knowledge: K,
}

impl<K: KnowledgeSource> Planner<K> {
    pub fn new(knowledge: K) -> Self {
        Self { knowledge }
    }

    /// Decomposes one goal into sub-tasks, one per compute-relevant
    /// relationship of the matching concepts.
    pub fn decompose(&self, goal: &str) -> Vec<SubTask> {
        self.decompose_all(&[goal])
    }

    /// Decomposes several goals with one shared id sequence.
    pub fn decompose_all(&self, goals: &[&str]) -> Vec<SubTask> {
        let mut tasks = Vec::new();
        let mut seen = HashSet::new();

        for goal in goals {
            for concept in self.knowledge.query(goal) {
                let mut relationships = concept.relationships.clone();
                relationships.extend(self.knowledge.infer(&concept.name));

                for relationship in relationships {
                    if !seen.insert(relationship.clone()) {
                        continue;
                    }
                    if let Some(task) = task_for(&relationship, tasks.len()) {
                        debug!(
                            "goal '{goal}': {} task from {} -> {}",
                            task.module.as_str(),
                            relationship.kind,
                            relationship.target
                        );
                        tasks.push(task);
                    }
                }
            }
        }

        tasks
    }
}

/// Maps one relationship onto a sub-task, when it names a compute domain.
fn task_for(relationship: &Relationship, id: usize) -> Option<SubTask> {
    match relationship.kind.as_str() {
        "neural_model" => {
            let (input, output) = parse_dims(&relationship.target)?;
            Some(model_task(id, input, output))
        }
        "quantum_circuit" => {
            let n_qubits = relationship.target.parse().unwrap_or(2);
            Some(circuit_task(id, n_qubits, DEFAULT_SHOTS))
        }
        "accelerator_check" => Some(probe_task(id)),
        _ => None,
    }
}

/// Parses a `"IxO"` dimension pair.
fn parse_dims(target: &str) -> Option<(usize, usize)> {
    let (input, output) = target.split_once('x')?;
    let input = input.parse().ok().filter(|&d| d > 0)?;
    let output = output.parse().ok().filter(|&d| d > 0)?;
    Some((input, output))
}

/// A two-layer classifier template for the given dimensions.
pub fn model_task(id: usize, input: usize, output: usize) -> SubTask {
    let hidden = ((input + output) / 2).max(1);
    let payload = ModelPayload {
        layers: vec![
            LayerSpec {
                kind: LayerKind::Dense,
                input_dim: input,
                output_dim: hidden,
                activation: ActivationSpec::Relu,
            },
            LayerSpec {
                kind: LayerKind::Dense,
                input_dim: hidden,
                output_dim: output,
                activation: ActivationSpec::Softmax,
            },
        ],
        params: None,
        data: None,
    };

    SubTask {
        id,
        module: Module::Model,
        payload: encode(&payload),
    }
}

/// An entangling circuit template over `n_qubits`.
pub fn circuit_task(id: usize, n_qubits: usize, shots: u64) -> SubTask {
    let mut gates = vec![GateSpec {
        kind: GateKind::H,
        qubits: vec![1],
    }];
    for qubit in 2..=n_qubits {
        gates.push(GateSpec {
            kind: GateKind::Cnot,
            qubits: vec![1, qubit],
        });
    }

    let payload = QuantumPayload {
        n_qubits: n_qubits.max(1),
        gates,
        n_shots: Some(shots),
        backend: None,
    };

    SubTask {
        id,
        module: Module::Quantum,
        payload: encode(&payload),
    }
}

/// An availability probe.
pub fn probe_task(id: usize) -> SubTask {
    SubTask {
        id,
        module: Module::Accelerator,
        payload: serde_json::json!({ "action": "probe" }),
    }
}

fn encode<T: serde::Serialize>(payload: &T) -> serde_json::Value {
    // SAFETY: the payload Serialize impls are derived and have no non-string
    //         map keys, so serialization cannot fail.
    serde_json::to_value(payload).unwrap()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::knowledge::StaticKnowledge;

    fn kb() -> StaticKnowledge {
        let mut kb = StaticKnowledge::new();
        kb.relate("digit_recognition", "neural_model", "16x4");
        kb.relate("digit_recognition", "accelerator_check", "");
        kb.relate("entangled_link", "quantum_circuit", "2");
        kb
    }

    #[test]
    fn decompose_emits_one_task_per_compute_relationship() {
        let planner = Planner::new(kb());
        let tasks = planner.decompose("digit_recognition");

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].module, Module::Model);
        assert_eq!(tasks[1].module, Module::Accelerator);
        assert_eq!(tasks[0].id, 0);
        assert_eq!(tasks[1].id, 1);
    }

    #[test]
    fn model_tasks_chain_their_layers() {
        let planner = Planner::new(kb());
        let tasks = planner.decompose("digit_recognition");

        let layers = tasks[0].payload["layers"].as_array().unwrap();
        assert_eq!(layers[0]["input_dim"], 16);
        assert_eq!(layers[0]["output_dim"], layers[1]["input_dim"]);
        assert_eq!(layers[1]["output_dim"], 4);
    }

    #[test]
    fn decompose_all_shares_one_id_sequence() {
        let planner = Planner::new(kb());
        let tasks = planner.decompose_all(&["digit_recognition", "entangled_link"]);

        assert_eq!(tasks.len(), 3);
        let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(tasks[2].module, Module::Quantum);
        assert_eq!(tasks[2].payload["n_shots"], DEFAULT_SHOTS);
    }

    #[test]
    fn unrelated_relationships_are_ignored() {
        let mut kb = StaticKnowledge::new();
        kb.relate("archive", "stored_in", "warehouse");
        let planner = Planner::new(kb);
        assert!(planner.decompose("archive").is_empty());
    }

    #[test]
    fn malformed_dimension_targets_are_skipped() {
        let mut kb = StaticKnowledge::new();
        kb.relate("broken", "neural_model", "16by4");
        let planner = Planner::new(kb);
        assert!(planner.decompose("broken").is_empty());
    }
}
