use std::{error::Error, fmt, io};

/// All errors the planning-side client can produce.
#[derive(Debug)]
pub enum PlannerError {
    /// Failed to reach a compute node.
    ConnectionFailed { addr: String, source: io::Error },
    /// The node closed the connection before responding.
    ClosedByPeer,
    /// No response arrived within the idle window.
    ResponseTimeout,
    /// The node's response frame exceeds the payload ceiling.
    OversizedResponse { len: usize },
    /// The node's response is not a valid envelope.
    InvalidResponse(String),
    /// An underlying I/O error not covered by the above variants.
    Io(io::Error),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::ConnectionFailed { addr, source } => {
                write!(f, "connection failed to {addr}: {source}")
            }
            PlannerError::ClosedByPeer => {
                f.write_str("node closed the connection before responding")
            }
            PlannerError::ResponseTimeout => f.write_str("timed out waiting for a response"),
            PlannerError::OversizedResponse { len } => {
                write!(f, "oversized response frame of {len} bytes")
            }
            PlannerError::InvalidResponse(detail) => write!(f, "invalid response: {detail}"),
            PlannerError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for PlannerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PlannerError::ConnectionFailed { source, .. } => Some(source),
            PlannerError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PlannerError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
