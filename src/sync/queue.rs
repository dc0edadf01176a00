use std::collections::VecDeque;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use super::inbound::Position;

/// A host-history mutation waiting in the operation queue
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryOp {
    Push { path: String, state: Value },
    Replace { path: String, state: Value },
    Back,
    /// Check that the host landed on the entry of `target` after a pop,
    /// backing further while it sits above it.
    Verify { target: Position, attempt: usize },
}

impl HistoryOp {
    pub fn kind_name(&self) -> &'static str {
        match self {
            HistoryOp::Push { .. } => "push",
            HistoryOp::Replace { .. } => "replace",
            HistoryOp::Back => "back",
            HistoryOp::Verify { .. } => "verify",
        }
    }
}

/// FIFO of pending operations, one in flight at a time.
///
/// An operation is considered finished only after the settle delay has
/// elapsed since it started, so the host's notification for it lands before
/// the next operation runs.
#[derive(Debug)]
pub struct OperationQueue<T> {
    pending: VecDeque<T>,
    settle_delay: Duration,
    busy_until: Option<Instant>,
}

impl<T> OperationQueue<T> {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            pending: VecDeque::new(),
            settle_delay,
            busy_until: None,
        }
    }

    pub fn enqueue(&mut self, op: T) {
        self.pending.push_back(op);
    }

    /// Run `op` before anything already queued. Used for the continuation
    /// of an operation that is still in flight.
    pub fn enqueue_front(&mut self, op: T) {
        self.pending.push_front(op);
    }

    /// Take the next operation if the previous one has settled, starting its
    /// own settle window.
    pub fn next_ready(&mut self, now: Instant) -> Option<T> {
        if self.busy_until.is_some_and(|until| now < until) {
            return None;
        }
        let op = self.pending.pop_front()?;
        self.busy_until = Some(now + self.settle_delay);
        Some(op)
    }

    /// When the next queued operation may start, if any is queued.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.pending.is_empty() {
            return None;
        }
        Some(self.busy_until.unwrap_or_else(Instant::now))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
