use ndarray::{Array1, Array2, ArrayView1};
use ndarray_rand::RandomExt;
use protocol::Limits;
use protocol::specs::model::{LayerShape, LayerSpec};
use rand::SeedableRng;
use rand::distr::StandardUniform;
use rand::rngs::StdRng;

use crate::{Activation, ModelError};

/// One dense layer: `a = act(W x + b)`.
#[derive(Debug, Clone)]
pub(crate) struct Dense {
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
    pub activation: Activation,
}

impl Dense {
    fn init(input: usize, output: usize, activation: Activation, rng: &mut StdRng) -> Self {
        // Xavier-style uniform init scaled by fan-in and fan-out.
        let limit = (6.0 / (input + output) as f32).sqrt();
        let weights = Array2::random_using((output, input), StandardUniform, rng)
            .mapv(|u: f32| (2.0 * u - 1.0) * limit);

        Self {
            weights,
            bias: Array1::zeros(output),
            activation,
        }
    }

    /// Returns the weighted sums and activations for one input.
    pub fn forward(&self, x: &ArrayView1<f32>) -> (Array1<f32>, Array1<f32>) {
        let z = self.weights.dot(x) + &self.bias;
        let a = self.activation.apply(&z);
        (z, a)
    }
}

/// Intermediate values of one forward pass, kept for backpropagation.
pub(crate) struct Trace {
    /// Input plus every layer activation, in order.
    pub activations: Vec<Array1<f32>>,
    /// Weighted sums per layer.
    pub weighted_sums: Vec<Array1<f32>>,
}

/// A dense feed-forward network built from a validated spec sequence.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Dense>,
    specs: Vec<LayerSpec>,
}

impl Network {
    /// Validates a spec sequence without constructing anything.
    ///
    /// Checks every layer's width range first, then the adjacency chain,
    /// failing on the first offending index.
    ///
    /// # Errors
    /// Returns `ModelError` naming the first violated constraint.
    pub fn validate_specs(specs: &[LayerSpec], limits: &Limits) -> Result<(), ModelError> {
        if specs.is_empty() {
            return Err(ModelError::EmptyNetwork);
        }
        if specs.len() > limits.max_layers {
            return Err(ModelError::TooManyLayers {
                got: specs.len(),
                max: limits.max_layers,
            });
        }

        for (index, spec) in specs.iter().enumerate() {
            for dim in [spec.input_dim, spec.output_dim] {
                if dim == 0 || dim > limits.max_neurons {
                    return Err(ModelError::LayerWidth {
                        index,
                        dim,
                        max: limits.max_neurons,
                    });
                }
            }
        }

        for (index, pair) in specs.windows(2).enumerate() {
            if pair[0].output_dim != pair[1].input_dim {
                return Err(ModelError::DimensionMismatch {
                    index,
                    output: pair[0].output_dim,
                    input: pair[1].input_dim,
                });
            }
        }

        Ok(())
    }

    /// Builds a network after validating the whole spec sequence.
    ///
    /// # Arguments
    /// * `specs` - Ordered layer specifications.
    /// * `limits` - The resource ceiling table.
    /// * `seed` - Optional seed for deterministic initialization.
    ///
    /// # Errors
    /// Returns `ModelError` if any spec or the adjacency chain is invalid;
    /// nothing is constructed in that case.
    pub fn build(specs: &[LayerSpec], limits: &Limits, seed: Option<u64>) -> Result<Self, ModelError> {
        Self::validate_specs(specs, limits)?;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let layers = specs
            .iter()
            .map(|s| {
                Dense::init(
                    s.input_dim,
                    s.output_dim,
                    Activation::from(s.activation),
                    &mut rng,
                )
            })
            .collect();

        Ok(Self {
            layers,
            specs: specs.to_vec(),
        })
    }

    pub fn input_dim(&self) -> usize {
        self.specs[0].input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.specs[self.specs.len() - 1].output_dim
    }

    /// Dimensional shape of the network, one `(input, output)` pair per layer.
    pub fn shape(&self) -> Vec<(usize, usize)> {
        self.specs
            .iter()
            .map(|s| (s.input_dim, s.output_dim))
            .collect()
    }

    /// Per-layer shapes in wire form.
    pub fn describe(&self) -> Vec<LayerShape> {
        self.specs
            .iter()
            .map(|s| LayerShape {
                input_dim: s.input_dim,
                output_dim: s.output_dim,
                activation: s.activation,
            })
            .collect()
    }

    /// Total scalar parameter count (weights plus biases).
    pub fn num_params(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.bias.len())
            .sum()
    }

    /// Flattens all parameters into one vector, layer by layer, weights
    /// before biases.
    pub fn flat_weights(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.num_params());
        for layer in &self.layers {
            out.extend(layer.weights.iter());
            out.extend(layer.bias.iter());
        }
        out
    }

    /// Computes the network output for one input.
    ///
    /// # Errors
    /// Returns `ModelError::InputShape` if `x` does not match the input width.
    pub fn forward(&self, x: ArrayView1<f32>) -> Result<Array1<f32>, ModelError> {
        if x.len() != self.input_dim() {
            return Err(ModelError::InputShape {
                got: x.len(),
                expected: self.input_dim(),
            });
        }

        let mut a = x.to_owned();
        for layer in &self.layers {
            let view = a.view();
            let (_z, next) = layer.forward(&view);
            a = next;
        }
        Ok(a)
    }

    /// Forward pass that records the per-layer values backpropagation needs.
    pub(crate) fn forward_trace(&self, x: ArrayView1<f32>) -> Trace {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut weighted_sums = Vec::with_capacity(self.layers.len());

        activations.push(x.to_owned());
        for layer in &self.layers {
            let prev = activations[activations.len() - 1].view();
            let (z, a) = layer.forward(&prev);
            weighted_sums.push(z);
            activations.push(a);
        }

        Trace {
            activations,
            weighted_sums,
        }
    }

    pub(crate) fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Dense] {
        &mut self.layers
    }
}
