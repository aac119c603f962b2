use serde::{Deserialize, Serialize};

/// Outcome tag of a response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
}

/// The uniform success/error wrapper returned for every instruction.
///
/// Exactly one envelope is emitted per instruction, even on internal failure.
/// An error envelope always carries a message and no data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    /// Wraps a handler result in a success envelope.
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            status: Status::Success,
            message: None,
            data: Some(data),
        }
    }

    /// Wraps a failure reason in an error envelope.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
