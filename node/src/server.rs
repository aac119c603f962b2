use std::io;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use protocol::{Envelope, Limits, Module, Status, parse_instruction};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::task;
use tokio::time::timeout;

use crate::{ConnectionMetrics, Dispatcher, NodeConfig};

/// Everything a connection task needs, shared across all connections.
pub struct ConnectionContext {
    pub dispatcher: Dispatcher,
    pub limits: Limits,
    pub allowed: Vec<Module>,
    pub idle_timeout: Duration,
}

impl ConnectionContext {
    pub fn new(config: &NodeConfig, dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            limits: config.limits,
            allowed: config.allowed_modules.clone(),
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
        }
    }
}

/// Accepts connections forever, one task per connection.
///
/// # Errors
/// Returns `io::Error` only when accepting itself fails; per-connection
/// faults never reach this loop.
pub async fn serve(listener: TcpListener, ctx: Arc<ConnectionContext>) -> io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        info!("connection from {peer}");

        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            let (rx, tx) = stream.into_split();
            match handle_connection(rx, tx, ctx).await {
                Ok(metrics) => info!(
                    "connection {peer} closed: {} instruction(s), {} error(s)",
                    metrics.received, metrics.errors
                ),
                Err(e) => warn!("connection {peer} dropped: {e}"),
            }
        });
    }
}

/// Serves one connection: one instruction per line in, exactly one envelope
/// per instruction out, strictly in order.
///
/// Malformed input and handler failures produce error envelopes and leave
/// the connection open; only transport-level I/O failures (or the idle
/// timeout) end it.
///
/// # Errors
/// Returns `io::Error` when the underlying read or write fails.
pub async fn handle_connection<R, W>(
    rx: R,
    tx: W,
    ctx: Arc<ConnectionContext>,
) -> io::Result<ConnectionMetrics>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (mut receiver, mut sender) = protocol::channel(rx, tx, ctx.limits.max_payload_size);
    let mut metrics = ConnectionMetrics::default();

    loop {
        eprintln!("DBG: top of loop, waiting recv");
        let frame = match timeout(ctx.idle_timeout, receiver.recv()).await {
            Err(_) => {
                info!("closing idle connection");
                break;
            }
            Ok(Ok(None)) => {
                debug!("peer closed the connection");
                break;
            }
            Ok(Ok(Some(frame))) => frame,
            Ok(Err(e)) => return Err(e),
        };

        let envelope = match parse_instruction(&frame, &ctx.limits, &ctx.allowed) {
            Ok(instruction) => {
                metrics.bump(instruction.module);

                // Handler work is CPU-bound; run it on the blocking pool so
                // other connections keep being served. A panicking handler
                // surfaces here as a join error, not a dead connection.
                let task_ctx = Arc::clone(&ctx);
                match task::spawn_blocking(move || task_ctx.dispatcher.dispatch(&instruction)).await
                {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        warn!("handler task failed: {e}");
                        Envelope::error(format!("internal error: {e}"))
                    }
                }
            }
            Err(e) => {
                metrics.bump_rejected();
                Envelope::error(format!("validation error: {e}"))
            }
        };

        if envelope.status == Status::Error {
            metrics.bump_error();
        }
        eprintln!("DBG: about to send envelope status={:?}", envelope.status);
        sender.send(&envelope).await?;
        eprintln!("DBG: sent envelope");
    }

    Ok(metrics)
}
