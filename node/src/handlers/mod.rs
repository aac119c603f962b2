//! Payload-level handlers, one per module.
//!
//! Each handler decodes its module's typed payload, applies the module's own
//! validation rules, drives the matching compute crate, and returns the wire
//! form of the result. All handlers share one lifecycle: a request is
//! validated in full before execution starts, and a failure is terminal for
//! that request.

mod accelerator;
mod model;
mod quantum;

pub use accelerator::AcceleratorHandler;
pub use model::ModelHandler;
pub use quantum::QuantumHandler;
