//! Bidirectional sync between the navigation stack and host history
//!
//! - Stack mutations made through [`HistorySync`] are translated into queued
//!   host-history writes (`outbound`).
//! - Host traversals (native back/forward) are reconciled into stack actions
//!   (`inbound`).
//! - Every entry carries an encoded stack position (`codec`) so the stack can
//!   be rebuilt after a restart (`startup`).
//!
//! Self-caused notifications on either side are absorbed by the
//! [`EchoGuard`], so each transition is applied exactly once.

pub mod codec;
pub mod debt;
pub mod error;
pub mod guard;
pub mod inbound;
pub mod outbound;
pub mod queue;
pub mod startup;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::Config;
use crate::history::{HistoryNotification, HostHistory};
use crate::route::{RouteTable, RoutesContext};
use crate::stack::{Activity, ActivityAction, NavigationStack, StepAction};

pub use codec::{decode, encode, HistoryPayload};
pub use debt::ReplaceDebt;
pub use error::SyncError;
pub use guard::{EchoGuard, EchoKind};
pub use inbound::{classify, Position, Transition};
pub use queue::{HistoryOp, OperationQueue};
pub use startup::InitialContext;

/// Counters describing what the engine has done so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Push/replace/back operations executed against the host
    pub history_writes: usize,
    /// Notifications and stack events swallowed as self-caused
    pub echoes_suppressed: usize,
    /// Stack actions issued to follow a host traversal
    pub inbound_actions: usize,
}

/// Keeps a [`NavigationStack`] and a [`HostHistory`] in sync.
pub struct HistorySync<H: HostHistory> {
    history: H,
    stack: NavigationStack,
    config: Config,
    routes: Arc<RouteTable>,
    guard: EchoGuard,
    debt: ReplaceDebt,
    queue: OperationQueue<HistoryOp>,
    notifications: mpsc::UnboundedReceiver<HistoryNotification>,
    failures: Vec<SyncError>,
    stats: SyncStats,
}

impl<H: HostHistory> HistorySync<H> {
    /// Rebuild the stack from the host's current entry and start syncing.
    pub fn new(history: H, config: Config) -> Result<Self, SyncError> {
        Self::with_initial_context(history, config, InitialContext::default())
    }

    /// Like [`HistorySync::new`], with an externally supplied initial path
    /// (for example the request path of a server render).
    pub fn with_initial_context(
        mut history: H,
        config: Config,
        context: InitialContext,
    ) -> Result<Self, SyncError> {
        config.validate()?;
        let routes = Arc::new(config.routes.clone());
        let events = startup::initial_events(&history.location(), &config, &context)?;

        let mut stack = NavigationStack::new();
        for event in events {
            event.apply(&mut stack)?;
        }

        let notifications = history.listen();
        let mut sync = Self {
            history,
            stack,
            queue: OperationQueue::new(config.settle_delay),
            config,
            routes,
            guard: EchoGuard::new(),
            debt: ReplaceDebt::new(),
            notifications,
            failures: Vec::new(),
            stats: SyncStats::default(),
        };

        sync.write_root_entry()?;
        sync.pump();
        Ok(sync)
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    /// The currently visible activity
    pub fn active(&self) -> Option<&Activity> {
        self.stack.active()
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Route table for the rendering layer
    pub fn routes(&self) -> RoutesContext {
        RoutesContext::new(Arc::clone(&self.routes))
    }

    pub fn guard(&self) -> &EchoGuard {
        &self.guard
    }

    pub fn debt(&self) -> &ReplaceDebt {
        &self.debt
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Whether every queued history operation has been issued
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drain failures recorded by queued operations.
    pub fn take_failures(&mut self) -> Vec<SyncError> {
        std::mem::take(&mut self.failures)
    }

    pub fn push(&mut self, action: ActivityAction) -> Result<(), SyncError> {
        self.apply_push(action)?;
        self.pump();
        Ok(())
    }

    pub fn replace(&mut self, action: ActivityAction) -> Result<(), SyncError> {
        let action = self.before_replace(action)?;
        let event = self.stack.replace(action)?;
        self.translate(&event)?;
        self.pump();
        Ok(())
    }

    pub fn step_push(&mut self, action: StepAction) -> Result<(), SyncError> {
        self.apply_step_push(action)?;
        self.pump();
        Ok(())
    }

    pub fn step_replace(&mut self, action: StepAction) -> Result<(), SyncError> {
        self.before_step(&action)?;
        let event = self.stack.step_replace(action)?;
        self.translate(&event)?;
        self.pump();
        Ok(())
    }

    /// Pop the active activity and collapse all of its history entries.
    /// Returns `false` when only the root activity is left.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.before_pop();
        let popped = self.stack.pop();
        if let Some(event) = &popped {
            let result = self.translate(event);
            self.record(result);
        }
        self.pump();
        popped.is_some()
    }

    /// Pop the last step of the active activity. Returns `false` when only
    /// the activity's implicit step is left.
    pub fn step_pop(&mut self) -> bool {
        self.before_step_pop();
        let popped = self.stack.step_pop();
        if let Some(event) = &popped {
            let result = self.translate(event);
            self.record(result);
        }
        self.pump();
        popped.is_some()
    }

    /// Reconcile every host notification received so far.
    pub fn process_notifications(&mut self) {
        while let Ok(notification) = self.notifications.try_recv() {
            self.reconcile(notification);
        }
    }

    /// Run every queued operation whose turn has come.
    pub fn pump(&mut self) {
        loop {
            self.process_notifications();
            let Some(op) = self.queue.next_ready(Instant::now()) else {
                break;
            };

            tracing::debug!(op = op.kind_name(), pending = self.queue.len(), "Running history op");
            let result = self.execute(op);
            self.record(result);
        }
    }

    /// Drive the queue until every operation has been issued, waiting out
    /// settle delays on the tokio timer.
    pub async fn settle(&mut self) {
        loop {
            self.pump();
            match self.queue.next_deadline() {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => break,
            }
        }
    }

    fn execute(&mut self, op: HistoryOp) -> Result<(), SyncError> {
        match op {
            HistoryOp::Push { path, state } => {
                let path = self.host_path(&path);
                self.history.push(&path, state)?;
            }
            HistoryOp::Replace { path, state } => {
                let path = self.host_path(&path);
                self.history.replace(&path, state)?;
            }
            HistoryOp::Back => {
                if self.history.position() == Some(0) {
                    tracing::debug!("Already at the first history entry, skipping back");
                    self.guard.withdraw(EchoKind::Pop);
                    return Ok(());
                }
                if let Err(error) = self.history.back() {
                    self.guard.withdraw(EchoKind::Pop);
                    return Err(error.into());
                }
            }
            HistoryOp::Verify { target, attempt } => return self.verify(target, attempt),
        }
        self.stats.history_writes += 1;
        Ok(())
    }

    /// After a pop, make sure the host sits on the entry of `target`.
    /// Foreign entries, and entries newer than `target` (left behind by a
    /// forward jump over several entries), are skipped by backing further,
    /// at most `max_gap_retries` times.
    fn verify(&mut self, target: Position, attempt: usize) -> Result<(), SyncError> {
        let location = self.history.location();
        let ahead = match decode(location.state.as_ref()) {
            Some(payload) => matches!(
                classify(&target, &Position::from(&payload)),
                Transition::Forward | Transition::StepForward
            ),
            None => true,
        };
        if !ahead {
            return Ok(());
        }
        if attempt >= self.config.max_gap_retries || self.history.position() == Some(0) {
            return Err(SyncError::ReconciliationGap { attempts: attempt });
        }

        tracing::debug!(attempt, path = %location.path(), "Skipping history entry above the popped-to position");
        self.guard.expect(EchoKind::Pop);
        self.queue.enqueue_front(HistoryOp::Verify {
            target,
            attempt: attempt + 1,
        });
        self.queue.enqueue_front(HistoryOp::Back);
        Ok(())
    }

    fn record(&mut self, result: Result<(), SyncError>) {
        if let Err(error) = result {
            tracing::warn!(error = %error, "History sync failed");
            self.failures.push(error);
        }
    }
}
