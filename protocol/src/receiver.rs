//! The receiving end of the line-delimited transport.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// One inbound wire frame.
///
/// An oversized frame is consumed up to its terminating newline so the stream
/// stays framed, but only the first `max_frame` bytes are ever buffered; the
/// payload itself is discarded.
#[derive(Debug)]
pub enum Frame {
    Line(Vec<u8>),
    Oversized { len: usize },
}

/// The receiving end handle of the communication.
pub struct LineReceiver<R: AsyncRead + Unpin> {
    rx: BufReader<R>,
    max_frame: usize,
    line: Vec<u8>,
    overflow: usize,
}

impl<R: AsyncRead + Unpin> LineReceiver<R> {
    pub(super) fn new(rx: R, max_frame: usize) -> Self {
        Self {
            rx: BufReader::new(rx),
            max_frame,
            line: Vec::new(),
            overflow: 0,
        }
    }

    /// Waits for the next newline-delimited frame.
    ///
    /// Cancel-safe: a partially read frame is retained and completed by the
    /// next call.
    ///
    /// # Returns
    /// `Ok(None)` on a clean end of stream, otherwise one `Frame` per line.
    pub async fn recv(&mut self) -> io::Result<Option<Frame>> {
        loop {
            let Self {
                rx,
                max_frame,
                line,
                overflow,
            } = self;

            let chunk = rx.fill_buf().await?;
            if chunk.is_empty() {
                if line.is_empty() && *overflow == 0 {
                    return Ok(None);
                }
                // Peer closed after an unterminated frame; deliver what we have.
                return Ok(Some(self.take_frame()));
            }

            match chunk.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    Self::buffer_bytes(line, overflow, *max_frame, &chunk[..pos]);
                    rx.consume(pos + 1);
                    return Ok(Some(self.take_frame()));
                }
                None => {
                    let n = chunk.len();
                    Self::buffer_bytes(line, overflow, *max_frame, chunk);
                    rx.consume(n);
                }
            }
        }
    }

    /// Buffers up to the frame cap; bytes past it are only counted.
    fn buffer_bytes(line: &mut Vec<u8>, overflow: &mut usize, max_frame: usize, bytes: &[u8]) {
        let room = (max_frame + 1).saturating_sub(line.len());
        let kept = room.min(bytes.len());
        line.extend_from_slice(&bytes[..kept]);
        *overflow += bytes.len() - kept;
    }

    fn take_frame(&mut self) -> Frame {
        let total = self.line.len() + self.overflow;
        self.overflow = 0;

        let mut bytes = std::mem::take(&mut self.line);
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }

        if total > self.max_frame {
            Frame::Oversized { len: total }
        } else {
            Frame::Line(bytes)
        }
    }
}
