//! History to stack: reconciling host traversals.
//!
//! A traversal lands on an entry carrying an encoded stack position. Comparing
//! it with the live position (activity ids first, then step ids) tells which
//! way the user moved; the stack is then popped or replayed forward until it
//! matches the entry.

use std::cmp::Ordering;

use super::codec::{decode, ActivitySnapshot, HistoryPayload, StepSnapshot};
use super::guard::EchoKind;
use super::{HistorySync, SyncError};
use crate::history::{HistoryAction, HistoryNotification, HostHistory};
use crate::stack::{Activity, NavId};

/// A point in the stack: an activity and one of its steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub activity_id: NavId,
    pub step_id: NavId,
}

impl Position {
    pub fn new(activity_id: impl Into<NavId>, step_id: impl Into<NavId>) -> Self {
        Self {
            activity_id: activity_id.into(),
            step_id: step_id.into(),
        }
    }

    /// Where the stack currently is within `activity`
    pub fn of(activity: &Activity) -> Self {
        Self {
            activity_id: activity.id.clone(),
            step_id: activity.last_step().id.clone(),
        }
    }
}

impl From<&HistoryPayload> for Position {
    fn from(payload: &HistoryPayload) -> Self {
        Self {
            activity_id: payload.activity.id.clone(),
            step_id: payload.step_id().clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    NoOp,
    Backward,
    Forward,
    StepBackward,
    StepForward,
}

/// Direction of travel from `current` to `target`.
pub fn classify(current: &Position, target: &Position) -> Transition {
    match target.activity_id.cmp(&current.activity_id) {
        Ordering::Less => Transition::Backward,
        Ordering::Greater => Transition::Forward,
        Ordering::Equal => match target.step_id.cmp(&current.step_id) {
            Ordering::Less => Transition::StepBackward,
            Ordering::Greater => Transition::StepForward,
            Ordering::Equal => Transition::NoOp,
        },
    }
}

impl<H: HostHistory> HistorySync<H> {
    pub(super) fn reconcile(&mut self, notification: HistoryNotification) {
        // Push and replace notifications are always echoes of our own writes.
        if notification.action != HistoryAction::Pop {
            self.stats.echoes_suppressed += 1;
            return;
        }
        if self.guard.try_consume(EchoKind::Pop) {
            self.stats.echoes_suppressed += 1;
            return;
        }

        let Some(target) = decode(notification.location.state.as_ref()) else {
            tracing::debug!(
                path = %notification.location.path(),
                "Traversal to an entry without sync state"
            );
            return;
        };

        let transition = match self.stack.active() {
            Some(active) => classify(&Position::of(active), &Position::from(&target)),
            None => Transition::Forward,
        };
        tracing::debug!(
            ?transition,
            activity = %target.activity.id,
            step = %target.step_id(),
            "Reconciling traversal"
        );

        let result = match transition {
            Transition::NoOp => Ok(()),
            Transition::Backward => self.reconcile_backward(&target),
            Transition::Forward => self.reconcile_forward(&target),
            Transition::StepBackward | Transition::StepForward => self.align_steps(&target),
        };
        self.record(result);
    }

    fn reconcile_backward(&mut self, target: &HistoryPayload) -> Result<(), SyncError> {
        while self
            .stack
            .active()
            .is_some_and(|active| active.id > target.activity.id)
        {
            let Some(event) = self.stack.dispatch_popped() else {
                break;
            };
            self.stats.inbound_actions += 1;
            self.translate(&event)?;
        }

        // Entries of a replaced activity, or of one lost to a restart.
        if self.stack.find(&target.activity.id).is_none() {
            self.guarded_push(&target.activity)?;
        }
        self.align_steps(target)
    }

    fn reconcile_forward(&mut self, target: &HistoryPayload) -> Result<(), SyncError> {
        self.guarded_push(&target.activity)?;
        if let Some(step) = target.explicit_step() {
            self.guarded_step_push(step)?;
        }
        Ok(())
    }

    /// Pop steps above the target step, then replay the target step if the
    /// stack does not already show it.
    fn align_steps(&mut self, target: &HistoryPayload) -> Result<(), SyncError> {
        let target_step = target.step_id();
        while self.stack.active().is_some_and(|active| {
            active.steps.len() > 1 && &active.last_step().id > target_step
        }) {
            let Some(event) = self.stack.step_pop() else {
                break;
            };
            self.stats.inbound_actions += 1;
            self.translate(&event)?;
        }

        let shows_target = self
            .stack
            .active()
            .map_or(true, |active| &active.last_step().id == target_step);
        if !shows_target {
            if let Some(step) = target.explicit_step() {
                self.guarded_step_push(step)?;
            }
        }
        Ok(())
    }

    /// Push an activity without writing it back to history.
    fn guarded_push(&mut self, snapshot: &ActivitySnapshot) -> Result<(), SyncError> {
        let Some(action) = snapshot.entered_by.activity_action() else {
            return Ok(());
        };

        self.guard.expect(EchoKind::Push);
        self.stats.inbound_actions += 1;
        if let Err(error) = self.apply_push(action.clone()) {
            self.guard.withdraw(EchoKind::Push);
            return Err(error);
        }
        Ok(())
    }

    /// Push a step without writing it back to history.
    fn guarded_step_push(&mut self, snapshot: &StepSnapshot) -> Result<(), SyncError> {
        let Some(action) = snapshot.entered_by.step_action() else {
            return Ok(());
        };

        self.guard.expect(EchoKind::Push);
        self.stats.inbound_actions += 1;
        if let Err(error) = self.apply_step_push(action.clone()) {
            self.guard.withdraw(EchoKind::Push);
            return Err(error);
        }
        Ok(())
    }
}
