pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use config::NodeConfig;
pub use dispatch::Dispatcher;
pub use metrics::ConnectionMetrics;
pub use server::{ConnectionContext, handle_connection, serve};
