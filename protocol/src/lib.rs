mod envelope;
mod instruction;
mod limits;
mod receiver;
mod sender;
pub mod specs;
mod validate;

use tokio::io::{AsyncRead, AsyncWrite};

pub use envelope::{Envelope, Status};
pub use instruction::{Instruction, Module};
pub use limits::Limits;
pub use receiver::{Frame, LineReceiver};
pub use sender::LineSender;
pub use validate::{ValidationError, parse_instruction};

/// Creates both ends of a line-delimited communication channel.
///
/// # Arguments
/// * `rx` - An async readable.
/// * `tx` - An async writable.
/// * `max_frame` - Largest inbound frame, in bytes, buffered before the
///   receiver reports the frame as oversized.
///
/// # Returns
/// The receiving and sending halves of the channel.
pub fn channel<R, W>(rx: R, tx: W, max_frame: usize) -> (LineReceiver<R>, LineSender<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    (LineReceiver::new(rx, max_frame), LineSender::new(tx))
}
