//! Message feeds drained by the UI loop.
//!
//! Producers never touch the engine directly. They hand messages to a feed,
//! and the loop drains the feed between input polls and pushes each message
//! through the controller.

use crossbeam_channel::{bounded, Receiver, SendError, Sender, TryRecvError};

/// Upper bound on messages delivered per drain, so a busy producer cannot
/// starve input handling.
pub const DRAIN_BATCH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// More messages may arrive.
    Open,
    /// The producer is gone; nothing more will arrive.
    Closed,
}

pub trait Feed<M> {
    /// Deliver whatever is ready right now without blocking.
    fn drain(&mut self, deliver: &mut dyn FnMut(M)) -> FeedStatus;
}

/// Fixed set of messages delivered on the first drain.
#[derive(Debug, Clone)]
pub struct StaticFeed<M> {
    pending: Vec<M>,
}

impl<M> StaticFeed<M> {
    pub fn new(messages: Vec<M>) -> Self {
        Self { pending: messages }
    }
}

impl<M> Feed<M> for StaticFeed<M> {
    fn drain(&mut self, deliver: &mut dyn FnMut(M)) -> FeedStatus {
        for message in self.pending.drain(..) {
            deliver(message);
        }
        FeedStatus::Closed
    }
}

/// Producer half of a [`ChannelFeed`]. Clone it for each producer thread.
#[derive(Debug)]
pub struct Feeder<M> {
    tx: Sender<M>,
}

impl<M> Clone for Feeder<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M> Feeder<M> {
    /// Blocks while the channel is full. Fails only once the UI side is gone.
    pub fn send(&self, message: M) -> Result<(), SendError<M>> {
        self.tx.send(message)
    }
}

/// Consumer half, drained on the UI thread.
#[derive(Debug)]
pub struct ChannelFeed<M> {
    rx: Receiver<M>,
    batch: usize,
}

impl<M> ChannelFeed<M> {
    #[must_use]
    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = batch.max(1);
        self
    }
}

/// Bounded hand-off between producer threads and the UI loop.
pub fn channel<M>(capacity: usize) -> (Feeder<M>, ChannelFeed<M>) {
    let (tx, rx) = bounded(capacity.max(1));
    (
        Feeder { tx },
        ChannelFeed {
            rx,
            batch: DRAIN_BATCH,
        },
    )
}

impl<M> Feed<M> for ChannelFeed<M> {
    fn drain(&mut self, deliver: &mut dyn FnMut(M)) -> FeedStatus {
        for _ in 0..self.batch {
            match self.rx.try_recv() {
                Ok(message) => deliver(message),
                Err(TryRecvError::Empty) => return FeedStatus::Open,
                Err(TryRecvError::Disconnected) => return FeedStatus::Closed,
            }
        }
        FeedStatus::Open
    }
}
