mod accelerator;
mod error;
mod runtime;

pub use accelerator::{Accelerator, Placed, RunOutcome, Transferable};
pub use error::AcceleratorError;
pub use runtime::{AcceleratorRuntime, DeviceStatus, NullRuntime, StaticRuntime};
