use std::{error::Error, fmt};

/// All errors the model module can produce.
#[derive(Debug)]
pub enum ModelError {
    /// The payload did not decode into the model schema.
    Payload(String),
    /// The network has no layers.
    EmptyNetwork,
    /// The layer count exceeds the ceiling.
    TooManyLayers { got: usize, max: usize },
    /// A layer dimension is zero or exceeds the width ceiling.
    LayerWidth {
        index: usize,
        dim: usize,
        max: usize,
    },
    /// Adjacent layers do not chain.
    DimensionMismatch {
        index: usize,
        output: usize,
        input: usize,
    },
    /// The input vector does not match the network's input width.
    InputShape { got: usize, expected: usize },
    /// The epoch count is zero or exceeds the ceiling.
    BadEpochs { got: usize, max: usize },
    /// The learning rate is not a positive finite number.
    BadLearningRate(f32),
    /// The training set is smaller than the floor.
    TooFewSamples { got: usize, min: usize },
    /// One training sample does not match the network's shape.
    SampleShape {
        index: usize,
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// The loss stopped being finite during a pass.
    NonFiniteLoss { epoch: usize },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Payload(detail) => write!(f, "invalid payload: {detail}"),
            ModelError::EmptyNetwork => f.write_str("network must have at least one layer"),
            ModelError::TooManyLayers { got, max } => {
                write!(f, "too many layers: got {got}, max {max}")
            }
            ModelError::LayerWidth { index, dim, max } => {
                write!(f, "layer {index} width {dim} outside 1..={max}")
            }
            ModelError::DimensionMismatch {
                index,
                output,
                input,
            } => write!(
                f,
                "layer {index} output dim {output} does not match next input dim {input}"
            ),
            ModelError::InputShape { got, expected } => {
                write!(f, "input length {got} does not match network input {expected}")
            }
            ModelError::BadEpochs { got, max } => {
                write!(f, "epochs {got} outside 1..={max}")
            }
            ModelError::BadLearningRate(lr) => {
                write!(f, "learning rate {lr} must be positive and finite")
            }
            ModelError::TooFewSamples { got, min } => {
                write!(f, "training set of {got} samples is below the {min} sample floor")
            }
            ModelError::SampleShape {
                index,
                what,
                got,
                expected,
            } => write!(
                f,
                "sample {index} {what} length {got} does not match network {expected}"
            ),
            ModelError::NonFiniteLoss { epoch } => {
                write!(f, "loss diverged at epoch {epoch}")
            }
        }
    }
}

impl Error for ModelError {}
