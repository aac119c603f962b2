use std::{error::Error, fmt};

/// All errors the accelerator module can produce.
///
/// Plain unavailability is not an error anywhere in this module; it is a
/// routing decision reported through return values.
#[derive(Debug)]
pub enum AcceleratorError {
    /// The payload did not decode into the accelerator schema.
    Payload(String),
    /// The device driver failed while being probed or driven.
    Driver(String),
    /// A transfer was requested for an object kind the device cannot hold.
    UnsupportedTransfer(&'static str),
    /// An operand does not match the network it is run against.
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// The network spec carried by a run request is invalid.
    BadNetwork(String),
}

impl fmt::Display for AcceleratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceleratorError::Payload(detail) => write!(f, "invalid payload: {detail}"),
            AcceleratorError::Driver(detail) => write!(f, "driver fault: {detail}"),
            AcceleratorError::UnsupportedTransfer(kind) => {
                write!(f, "cannot transfer object kind: {kind}")
            }
            AcceleratorError::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "{what} length {got} does not match network {expected}"),
            AcceleratorError::BadNetwork(detail) => write!(f, "invalid network: {detail}"),
        }
    }
}

impl Error for AcceleratorError {}
