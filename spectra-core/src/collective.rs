//! # Collective Module
//!
//! Message-passing collectives for the distributed back-end.
//!
//! The distributed protocol only relies on the [`Collective`] trait:
//! - `broadcast`: one-to-all, blocking, every rank ends with the root's data
//! - `gather`: all-to-one, blocking, contributions placed by bin offset
//!
//! A gather ends with a completion step: the root answers every other rank
//! with `Done` once the spectrum is assembled, or `Abort` if it is not, so
//! every rank of a failed round returns an error.
//!
//! [`channel_group`] provides an in-process implementation where each rank
//! owns a crossbeam inbox and holds a sender to every other rank. Any
//! blocking receive is bounded by the group timeout, so a dead peer turns
//! into a [`FftError::CollectiveFailure`] instead of a hang.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::trace;

use crate::complex::ComplexSample;
use crate::error::{FftError, Result};
use crate::partition::WorkerSlice;

/// Collective communication over a fixed group of ranks.
pub trait Collective {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    /// Distributes the root's samples to every rank.
    ///
    /// The root passes `Some(data)`; other ranks pass `None`. Every rank
    /// returns its own copy of the root's data.
    fn broadcast(&self, root: usize, data: Option<&[ComplexSample]>) -> Result<Vec<ComplexSample>>;

    /// Collects each rank's bins at the root.
    ///
    /// `slices[r]` is the slice owned by rank `r`; `local` must hold exactly
    /// `slices[self.rank()].len()` bins. The root returns the assembled
    /// buffer. Other ranks return `None` only after the root confirms the
    /// gather completed. Ranks with an empty slice send nothing.
    fn gather(
        &self,
        root: usize,
        local: &[ComplexSample],
        slices: &[WorkerSlice],
    ) -> Result<Option<Vec<ComplexSample>>>;

    /// Tells every other rank that this rank has given up on the round.
    ///
    /// Peers blocked in a collective fail instead of waiting for the timeout.
    fn abort(&self, _reason: &str) {}
}

#[derive(Debug)]
enum Message {
    Broadcast { from: usize, samples: Vec<ComplexSample> },
    Gather { from: usize, samples: Vec<ComplexSample> },
    Done { from: usize },
    Abort { from: usize, reason: String },
}

impl Message {
    fn from_rank(&self) -> usize {
        match self {
            Message::Broadcast { from, .. }
            | Message::Gather { from, .. }
            | Message::Done { from }
            | Message::Abort { from, .. } => *from,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Message::Broadcast { .. } => "broadcast",
            Message::Gather { .. } => "gather",
            Message::Done { .. } => "done",
            Message::Abort { .. } => "abort",
        }
    }
}

/// One rank's view of an in-process channel group.
#[derive(Debug)]
pub struct ChannelEndpoint {
    rank: usize,
    inbox: Receiver<Message>,
    /// Sender into every rank's inbox, indexed by rank.
    peers: Vec<Sender<Message>>,
    timeout: Duration,
}

/// Builds `size` connected endpoints, returned in rank order.
///
/// # Arguments
/// * `size` - Number of ranks in the group (at least one)
/// * `timeout` - Upper bound on how long a collective waits for its peers
pub fn channel_group(size: usize, timeout: Duration) -> Result<Vec<ChannelEndpoint>> {
    if size == 0 {
        return Err(FftError::InvalidInput(
            "worker group must have at least one member".into(),
        ));
    }

    let (senders, receivers): (Vec<_>, Vec<_>) =
        (0..size).map(|_| crossbeam_channel::unbounded()).unzip();

    Ok(receivers
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| ChannelEndpoint {
            rank,
            inbox,
            peers: senders.clone(),
            timeout,
        })
        .collect())
}

impl ChannelEndpoint {
    fn check_root(&self, op: &'static str, root: usize) -> Result<()> {
        if root >= self.size() {
            return Err(FftError::InvalidInput(format!(
                "{op} root {root} outside group of {}",
                self.size()
            )));
        }
        Ok(())
    }

    fn send(&self, op: &'static str, to: usize, message: Message) -> Result<()> {
        self.peers[to]
            .send(message)
            .map_err(|_| FftError::collective(op, format!("rank {to} is unreachable")))
    }

    /// Blocks for the next message; an abort from a peer becomes an error.
    fn recv(&self, op: &'static str, deadline: Instant) -> Result<Message> {
        let message = self.inbox.recv_deadline(deadline).map_err(|e| match e {
            RecvTimeoutError::Timeout => FftError::collective(
                op,
                format!("rank {} timed out after {:?}", self.rank, self.timeout),
            ),
            RecvTimeoutError::Disconnected => {
                FftError::collective(op, format!("rank {} lost its peers", self.rank))
            }
        })?;
        match message {
            Message::Abort { from, reason } => Err(FftError::collective(
                op,
                format!("rank {from} aborted the round: {reason}"),
            )),
            message => Ok(message),
        }
    }

    fn unexpected(&self, op: &'static str, message: &Message) -> FftError {
        FftError::collective(
            op,
            format!(
                "rank {} got unexpected {} message from rank {}",
                self.rank,
                message.kind(),
                message.from_rank()
            ),
        )
    }

    /// Root side of a gather: collects every non-empty contribution.
    fn collect(
        &self,
        root: usize,
        local: &[ComplexSample],
        slices: &[WorkerSlice],
    ) -> Result<Vec<ComplexSample>> {
        let total = slices.iter().map(|s| s.end_bin).max().unwrap_or(0);
        let mut out = vec![ComplexSample::new(0.0, 0.0); total];
        out[slices[root].range()].copy_from_slice(local);

        let mut received: Vec<bool> = slices.iter().map(WorkerSlice::is_empty).collect();
        received[root] = true;
        let mut pending = received.iter().filter(|done| !**done).count();

        let deadline = Instant::now() + self.timeout;
        while pending > 0 {
            let (from, samples) = match self.recv("gather", deadline)? {
                Message::Gather { from, samples } if from < self.size() && !received[from] => {
                    (from, samples)
                }
                other => return Err(self.unexpected("gather", &other)),
            };
            let slice = slices[from];
            if samples.len() != slice.len() {
                return Err(FftError::collective(
                    "gather",
                    format!("rank {from} sent {} bins, expected {}", samples.len(), slice.len()),
                ));
            }
            out[slice.range()].copy_from_slice(&samples);
            received[from] = true;
            pending -= 1;
            trace!(from, start = slice.start_bin, len = slice.len(), "gather received");
        }

        Ok(out)
    }
}

impl Collective for ChannelEndpoint {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn broadcast(&self, root: usize, data: Option<&[ComplexSample]>) -> Result<Vec<ComplexSample>> {
        self.check_root("broadcast", root)?;

        if self.rank == root {
            let data = data.ok_or_else(|| {
                FftError::InvalidInput("broadcast root has no data to send".into())
            })?;
            for to in (0..self.size()).filter(|&r| r != root) {
                let message = Message::Broadcast {
                    from: self.rank,
                    samples: data.to_vec(),
                };
                self.send("broadcast", to, message)?;
            }
            trace!(rank = self.rank, len = data.len(), "broadcast sent");
            return Ok(data.to_vec());
        }

        match self.recv("broadcast", Instant::now() + self.timeout)? {
            Message::Broadcast { from, samples } if from == root => {
                trace!(rank = self.rank, len = samples.len(), "broadcast received");
                Ok(samples)
            }
            other => Err(self.unexpected("broadcast", &other)),
        }
    }

    fn gather(
        &self,
        root: usize,
        local: &[ComplexSample],
        slices: &[WorkerSlice],
    ) -> Result<Option<Vec<ComplexSample>>> {
        self.check_root("gather", root)?;
        if slices.len() != self.size() {
            return Err(FftError::InvalidInput(format!(
                "gather needs {} slices, got {}",
                self.size(),
                slices.len()
            )));
        }
        let own = slices[self.rank];
        if local.len() != own.len() {
            return Err(FftError::InvalidInput(format!(
                "rank {} holds {} bins but owns {}",
                self.rank,
                local.len(),
                own.len()
            )));
        }

        if self.rank != root {
            if !own.is_empty() {
                let message = Message::Gather {
                    from: self.rank,
                    samples: local.to_vec(),
                };
                self.send("gather", root, message)?;
            }
            return match self.recv("gather", Instant::now() + self.timeout)? {
                Message::Done { from } if from == root => Ok(None),
                other => Err(self.unexpected("gather", &other)),
            };
        }

        match self.collect(root, local, slices) {
            Ok(out) => {
                for to in (0..self.size()).filter(|&r| r != root) {
                    // A rank that already left the round is not waiting for the verdict.
                    let _ = self.peers[to].send(Message::Done { from: self.rank });
                }
                Ok(Some(out))
            }
            Err(e) => {
                self.abort(&e.to_string());
                Err(e)
            }
        }
    }

    fn abort(&self, reason: &str) {
        for to in (0..self.size()).filter(|&r| r != self.rank) {
            // A peer that already left the round has nothing to be told.
            let _ = self.peers[to].send(Message::Abort {
                from: self.rank,
                reason: reason.to_string(),
            });
        }
    }
}
