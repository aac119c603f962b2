//! Typed payload schemas for each module.
//!
//! Every payload a module accepts is a closed schema decoded with serde;
//! there is no free-form instruction text anywhere on the wire.

pub mod accelerator;
pub mod model;
pub mod quantum;

use serde::{Deserialize, Serialize};

/// Where an object ended up after placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Host,
    Accelerator,
}
