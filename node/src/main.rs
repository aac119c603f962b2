use std::io;
use std::sync::Arc;

use accel::{Accelerator, AcceleratorRuntime, NullRuntime, StaticRuntime};
use log::info;
use node::{ConnectionContext, Dispatcher, NodeConfig};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => NodeConfig::load(&path).map_err(io::Error::other)?,
        None => NodeConfig::default(),
    };
    config.apply_env_overrides();

    let runtime: Arc<dyn AcceleratorRuntime> = match config.accelerator_capacity_bytes {
        Some(bytes) => Arc::new(StaticRuntime::new(bytes)),
        None => Arc::new(NullRuntime),
    };
    let accelerator = Arc::new(Accelerator::new(runtime, config.limits));

    let dispatcher = Dispatcher::new(&config, accelerator);
    let ctx = Arc::new(ConnectionContext::new(&config, dispatcher));

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("listening at {addr}");

    tokio::select! {
        ret = node::serve(listener, ctx) => ret,
        _ = signal::ctrl_c() => {
            info!("received shutdown signal");
            Ok(())
        }
    }
}
