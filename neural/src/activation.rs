use ndarray::Array1;
use protocol::specs::model::ActivationSpec;

/// Runtime activation function built from a wire spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
    Identity,
}

impl From<ActivationSpec> for Activation {
    fn from(spec: ActivationSpec) -> Self {
        match spec {
            ActivationSpec::Relu => Activation::Relu,
            ActivationSpec::Sigmoid => Activation::Sigmoid,
            ActivationSpec::Tanh => Activation::Tanh,
            ActivationSpec::Softmax => Activation::Softmax,
            ActivationSpec::Identity => Activation::Identity,
        }
    }
}

impl Activation {
    pub fn spec(&self) -> ActivationSpec {
        match self {
            Activation::Relu => ActivationSpec::Relu,
            Activation::Sigmoid => ActivationSpec::Sigmoid,
            Activation::Tanh => ActivationSpec::Tanh,
            Activation::Softmax => ActivationSpec::Softmax,
            Activation::Identity => ActivationSpec::Identity,
        }
    }

    /// Applies the activation to a weighted-sum vector.
    pub fn apply(&self, z: &Array1<f32>) -> Array1<f32> {
        match self {
            Activation::Relu => z.mapv(|v| v.max(0.0)),
            Activation::Sigmoid => z.mapv(sigmoid),
            Activation::Tanh => z.mapv(f32::tanh),
            Activation::Identity => z.clone(),
            Activation::Softmax => {
                // Shift by the max for numerical stability.
                let max = z.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
                let exps = z.mapv(|v| (v - max).exp());
                let sum = exps.sum();
                exps / sum
            }
        }
    }

    /// Elementwise derivative given the weighted sums `z` and the already
    /// computed activations `a`.
    ///
    /// Softmax uses the diagonal of its jacobian; the softmax/crossentropy
    /// pair short-circuits this in the training loop.
    pub fn derivative(&self, z: &Array1<f32>, a: &Array1<f32>) -> Array1<f32> {
        match self {
            Activation::Relu => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Sigmoid | Activation::Softmax => a.mapv(|s| s * (1.0 - s)),
            Activation::Tanh => a.mapv(|t| 1.0 - t * t),
            Activation::Identity => Array1::ones(z.len()),
        }
    }
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn softmax_sums_to_one() {
        let z = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let a = Activation::Softmax.apply(&z);
        assert!((a.sum() - 1.0).abs() < 1e-6);
        assert!(a.iter().all(|&p| p > 0.0));
    }

    #[test]
    fn relu_clamps_negatives() {
        let z = Array1::from_vec(vec![-1.0, 0.5]);
        let a = Activation::Relu.apply(&z);
        assert_eq!(a.to_vec(), vec![0.0, 0.5]);
    }
}
