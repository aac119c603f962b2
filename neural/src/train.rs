use log::debug;
use ndarray::{Array1, Array2};
use protocol::Limits;
use protocol::specs::model::{LossKind, Sample, TrainingParams};

use crate::{Activation, ModelError, Network};

const PRED_EPS: f32 = 1e-7;
/// Distance under which a regression prediction counts as correct.
const REGRESSION_TOLERANCE: f32 = 0.1;

/// Outcome of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub weights: Vec<f32>,
    pub accuracy: f32,
    pub loss: f32,
}

/// Trains a network with per-sample gradient descent.
///
/// All parameters and samples are validated before the first pass touches the
/// network, so a rejected call leaves the network untouched and fails
/// identically when repeated.
///
/// # Arguments
/// * `network` - The network to train in place.
/// * `params` - Epochs, learning rate, loss selection, optional seed.
/// * `data` - `(input, target)` pairs.
/// * `limits` - The resource ceiling table.
///
/// # Errors
/// Returns `ModelError` for out-of-range parameters, an undersized or
/// misshapen training set, or a non-finite loss during a pass. No partial
/// result is returned on error.
pub fn train(
    network: &mut Network,
    params: &TrainingParams,
    data: &[Sample],
    limits: &Limits,
) -> Result<TrainReport, ModelError> {
    if params.epochs == 0 || params.epochs > limits.max_epochs {
        return Err(ModelError::BadEpochs {
            got: params.epochs,
            max: limits.max_epochs,
        });
    }
    if !params.learning_rate.is_finite() || params.learning_rate <= 0.0 {
        return Err(ModelError::BadLearningRate(params.learning_rate));
    }
    if data.len() < limits.min_data_size {
        return Err(ModelError::TooFewSamples {
            got: data.len(),
            min: limits.min_data_size,
        });
    }

    let samples = check_samples(network, data)?;

    let mut accuracy = 0.0;
    let mut epoch_loss = 0.0;

    for epoch in 1..=params.epochs {
        epoch_loss = 0.0;
        let mut correct = 0usize;

        for (x, y) in &samples {
            let sample_loss = step(network, params, x, y)?;
            epoch_loss += sample_loss;

            match params.loss {
                LossKind::Crossentropy => {
                    let y_pred = network.forward(x.view())?;
                    if argmax(&y_pred) == argmax(y) {
                        correct += 1;
                    }
                }
                LossKind::Mse => {
                    if sample_loss.sqrt() < REGRESSION_TOLERANCE {
                        correct += 1;
                    }
                }
            }
        }

        epoch_loss /= samples.len() as f32;
        if !epoch_loss.is_finite() {
            return Err(ModelError::NonFiniteLoss { epoch });
        }

        accuracy = correct as f32 / samples.len() as f32;
        debug!(
            "epoch {epoch}/{}: loss {epoch_loss:.6}, accuracy {accuracy:.3}",
            params.epochs
        );
    }

    Ok(TrainReport {
        weights: network.flat_weights(),
        accuracy,
        loss: epoch_loss,
    })
}

/// Validates every sample's shape and converts it for ndarray math.
fn check_samples(
    network: &Network,
    data: &[Sample],
) -> Result<Vec<(Array1<f32>, Array1<f32>)>, ModelError> {
    data.iter()
        .enumerate()
        .map(|(index, (input, target))| {
            if input.len() != network.input_dim() {
                return Err(ModelError::SampleShape {
                    index,
                    what: "input",
                    got: input.len(),
                    expected: network.input_dim(),
                });
            }
            if target.len() != network.output_dim() {
                return Err(ModelError::SampleShape {
                    index,
                    what: "target",
                    got: target.len(),
                    expected: network.output_dim(),
                });
            }
            Ok((
                Array1::from_vec(input.clone()),
                Array1::from_vec(target.clone()),
            ))
        })
        .collect()
}

/// One forward/backward pass over a single sample. Returns the sample loss.
fn step(
    network: &mut Network,
    params: &TrainingParams,
    x: &Array1<f32>,
    y: &Array1<f32>,
) -> Result<f32, ModelError> {
    let trace = network.forward_trace(x.view());
    let y_pred = &trace.activations[trace.activations.len() - 1];

    let sample_loss = loss(params.loss, y_pred, y);

    let nlayers = network.layers().len();
    let last = &network.layers()[nlayers - 1];

    // The softmax/crossentropy pair collapses to `a - y` at the output.
    let mut delta = match (params.loss, last.activation) {
        (LossKind::Crossentropy, Activation::Softmax) => y_pred - y,
        _ => {
            let dloss = loss_prime(params.loss, y_pred, y);
            let z = &trace.weighted_sums[nlayers - 1];
            dloss * last.activation.derivative(z, y_pred)
        }
    };

    for idx in (0..nlayers).rev() {
        // Propagate through this layer's weights before they are updated.
        let delta_prev = (idx > 0).then(|| {
            let back = network.layers()[idx].weights.t().dot(&delta);
            let below = &network.layers()[idx - 1];
            let z = &trace.weighted_sums[idx - 1];
            let a = &trace.activations[idx];
            back * below.activation.derivative(z, a)
        });

        let a_prev = &trace.activations[idx];
        let grad_w = outer(&delta, a_prev);

        let layer = &mut network.layers_mut()[idx];
        layer.weights.scaled_add(-params.learning_rate, &grad_w);
        layer.bias.scaled_add(-params.learning_rate, &delta);

        if let Some(d) = delta_prev {
            delta = d;
        }
    }

    Ok(sample_loss)
}

fn loss(kind: LossKind, y_pred: &Array1<f32>, y: &Array1<f32>) -> f32 {
    match kind {
        LossKind::Mse => (y_pred - y).pow2().sum(),
        LossKind::Crossentropy => -y
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| t * p.max(PRED_EPS).ln())
            .sum::<f32>(),
    }
}

fn loss_prime(kind: LossKind, y_pred: &Array1<f32>, y: &Array1<f32>) -> Array1<f32> {
    match kind {
        LossKind::Mse => (y_pred - y).mapv(|v| 2.0 * v),
        LossKind::Crossentropy => y_pred
            .iter()
            .zip(y.iter())
            .map(|(&p, &t)| -t / p.max(PRED_EPS))
            .collect(),
    }
}

fn outer(u: &Array1<f32>, v: &Array1<f32>) -> Array2<f32> {
    Array2::from_shape_fn((u.len(), v.len()), |(i, j)| u[i] * v[j])
}

fn argmax(a: &Array1<f32>) -> usize {
    let mut best = 0;
    for (i, &v) in a.iter().enumerate() {
        if v > a[best] {
            best = i;
        }
    }
    best
}
