mod activation;
mod error;
mod network;
mod train;

pub use activation::Activation;
pub use error::ModelError;
pub use network::Network;
pub use train::{TrainReport, train};
