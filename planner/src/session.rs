use std::time::Duration;

use futures::future::join_all;
use log::debug;
use protocol::{Envelope, Frame, LineReceiver, LineSender, Limits};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{
    TcpStream,
    tcp::{OwnedReadHalf, OwnedWriteHalf},
};
use tokio::time::timeout;

use crate::{PlannerError, SubTask};

/// How long a session waits for a response before giving up.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Result of one submitted sub-task.
#[derive(Debug)]
pub struct TaskOutcome {
    pub id: usize,
    pub envelope: Envelope,
}

/// One connection to a compute node.
///
/// Instructions on a session run strictly in order: each submission writes
/// one line and reads exactly one envelope back before the next begins.
pub struct Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    rx: LineReceiver<R>,
    tx: LineSender<W>,
    idle_timeout: Duration,
}

impl Session<OwnedReadHalf, OwnedWriteHalf> {
    /// Connects to a node.
    ///
    /// # Errors
    /// Returns `PlannerError::ConnectionFailed` naming the address.
    pub async fn connect(addr: &str, max_frame: usize) -> Result<Self, PlannerError> {
        let stream =
            TcpStream::connect(addr)
                .await
                .map_err(|source| PlannerError::ConnectionFailed {
                    addr: addr.to_string(),
                    source,
                })?;
        let (rx, tx) = stream.into_split();
        Ok(Self::from_channel(protocol::channel(rx, tx, max_frame)))
    }
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wraps an already established channel, mainly for tests over in-memory
    /// streams.
    pub fn from_channel((rx, tx): (LineReceiver<R>, LineSender<W>)) -> Self {
        Self {
            rx,
            tx,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Overrides how long the session waits for each response.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Submits one sub-task and waits for its envelope.
    ///
    /// # Errors
    /// Returns `PlannerError` on transport failure, a closed peer, a silent
    /// peer, or an undecodable response.
    pub async fn submit(&mut self, task: &SubTask) -> Result<Envelope, PlannerError> {
        self.tx.send(&task.instruction()).await?;

        let frame = timeout(self.idle_timeout, self.rx.recv())
            .await
            .map_err(|_| PlannerError::ResponseTimeout)??;

        match frame {
            None => Err(PlannerError::ClosedByPeer),
            Some(Frame::Oversized { len }) => Err(PlannerError::OversizedResponse { len }),
            Some(Frame::Line(bytes)) => serde_json::from_slice(&bytes)
                .map_err(|e| PlannerError::InvalidResponse(e.to_string())),
        }
    }

    /// Runs a whole plan sequentially on this session, preserving order.
    ///
    /// A task-level error envelope does not stop the plan; deciding to
    /// retry, skip, or abort stays with the caller.
    ///
    /// # Errors
    /// Returns `PlannerError` on the first transport-level failure.
    pub async fn run_plan(&mut self, tasks: &[SubTask]) -> Result<Vec<TaskOutcome>, PlannerError> {
        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            debug!(
                "submitting task {} to module {}",
                task.id,
                task.module.as_str()
            );
            let envelope = self.submit(task).await?;
            outcomes.push(TaskOutcome {
                id: task.id,
                envelope,
            });
        }
        Ok(outcomes)
    }
}

/// Fans independent sub-tasks out over one connection each, concurrently.
///
/// Outcomes come back in task order; each entry is that task's envelope or
/// the failure that kept it from completing.
pub async fn submit_all(
    addr: &str,
    tasks: Vec<SubTask>,
    limits: &Limits,
) -> Vec<Result<TaskOutcome, PlannerError>> {
    let submissions = tasks.into_iter().map(|task| async move {
        let mut session = Session::connect(addr, limits.max_payload_size).await?;
        let envelope = session.submit(&task).await?;
        Ok(TaskOutcome {
            id: task.id,
            envelope,
        })
    });

    join_all(submissions).await
}
