//! Read-side interface to the knowledge base.
//!
//! The store itself is an external collaborator; the planner only consumes
//! these two lookups. `StaticKnowledge` is the in-memory implementation used
//! by tests and the demo binary.

use std::collections::HashMap;

/// One directed relationship of a concept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relationship {
    pub kind: String,
    pub target: String,
}

/// A concept with its direct relationships.
#[derive(Debug, Clone)]
pub struct Concept {
    pub name: String,
    pub relationships: Vec<Relationship>,
}

/// Opaque read service the planner decomposes against.
pub trait KnowledgeSource {
    /// Concepts whose names match the pattern.
    fn query(&self, pattern: &str) -> Vec<Concept>;

    /// Relationships that hold for a concept, direct or derived.
    fn infer(&self, concept: &str) -> Vec<Relationship>;
}

/// In-memory knowledge source.
#[derive(Debug, Default)]
pub struct StaticKnowledge {
    concepts: HashMap<String, Vec<Relationship>>,
}

impl StaticKnowledge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `concept --kind--> target`.
    pub fn relate(&mut self, concept: &str, kind: &str, target: &str) {
        self.concepts
            .entry(concept.to_string())
            .or_default()
            .push(Relationship {
                kind: kind.to_string(),
                target: target.to_string(),
            });
    }
}

impl KnowledgeSource for StaticKnowledge {
    fn query(&self, pattern: &str) -> Vec<Concept> {
        let mut names: Vec<_> = self
            .concepts
            .keys()
            .filter(|name| name.as_str() == pattern || name.contains(pattern))
            .cloned()
            .collect();
        names.sort();

        names
            .into_iter()
            .map(|name| {
                let relationships = self.concepts[&name].clone();
                Concept {
                    name,
                    relationships,
                }
            })
            .collect()
    }

    fn infer(&self, concept: &str) -> Vec<Relationship> {
        // Direct relationships plus one transitive hop through each target.
        let Some(direct) = self.concepts.get(concept) else {
            return Vec::new();
        };

        let mut out = direct.clone();
        for relationship in direct {
            if let Some(transitive) = self.concepts.get(&relationship.target) {
                out.extend(transitive.iter().cloned());
            }
        }
        out
    }
}
