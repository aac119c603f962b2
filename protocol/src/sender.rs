//! The sending end of the line-delimited transport.

use std::io;

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// The sending end handle of the communication.
///
/// Serializes one JSON object per line and flushes after every frame, so a
/// response is fully on the wire before the peer's next read.
pub struct LineSender<W>
where
    W: AsyncWrite + Unpin,
{
    tx: W,
    buf: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> LineSender<W> {
    pub(super) fn new(tx: W) -> Self {
        Self {
            tx,
            buf: Vec::new(),
        }
    }

    /// Sends `msg` as one newline-terminated JSON frame.
    ///
    /// # Arguments
    /// * `msg` - A serializable object.
    ///
    /// # Returns
    /// A result object that returns `io::Error` on failure.
    pub async fn send<T: Serialize>(&mut self, msg: &T) -> io::Result<()> {
        let Self { tx, buf } = self;

        buf.clear();
        serde_json::to_writer(&mut *buf, msg)?;
        buf.push(b'\n');

        tx.write_all(buf).await?;
        tx.flush().await
    }
}
