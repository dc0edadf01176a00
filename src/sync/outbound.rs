//! Stack to history: hooks run around stack mutations and the translation of
//! stack events into queued history operations.

use super::codec::encode;
use super::guard::EchoKind;
use super::inbound::Position;
use super::queue::HistoryOp;
use super::{HistorySync, SyncError};
use crate::history::HostHistory;
use crate::stack::{Activity, ActivityAction, StackError, StackEvent, Step, StepAction};

/// Which host primitive writes an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Push,
    Replace,
}

impl<H: HostHistory> HistorySync<H> {
    pub(super) fn apply_push(&mut self, action: ActivityAction) -> Result<(), SyncError> {
        let action = self.before_push(action)?;
        let event = self.stack.push(action)?;
        self.translate(&event)
    }

    pub(super) fn apply_step_push(&mut self, action: StepAction) -> Result<(), SyncError> {
        self.before_step(&action)?;
        let event = self.stack.step_push(action)?;
        self.translate(&event)
    }

    /// Attach the path the activity will be shown at.
    pub(super) fn before_push(&self, mut action: ActivityAction) -> Result<ActivityAction, SyncError> {
        let path = self
            .routes
            .path_for(&action.activity_name, &action.activity_params)?;
        action.activity_context.path = Some(path);
        Ok(action)
    }

    /// Check that the active activity's route can be filled with the step's
    /// params. A step is only shown when it can get a history entry.
    pub(super) fn before_step(&self, action: &StepAction) -> Result<(), SyncError> {
        let active = self.stack.active().ok_or(StackError::Empty)?;
        self.routes.path_for(&active.name, &action.step_params)?;
        Ok(())
    }

    /// Attach the path and move the replaced activity's entries onto the
    /// replacement as debt.
    pub(super) fn before_replace(
        &mut self,
        action: ActivityAction,
    ) -> Result<ActivityAction, SyncError> {
        let action = self.before_push(action)?;
        if self.stack.find(&action.activity_id).is_some() {
            return Err(StackError::DuplicateActivity(action.activity_id).into());
        }
        let replaced = self.stack.active().ok_or(StackError::Empty)?;

        let debt = self.debt.record_replace(replaced, &action.activity_id);
        if debt > 1 {
            tracing::debug!(
                replaced = %replaced.id,
                replacement = %action.activity_id,
                debt,
                "Carrying history entries over to replacement"
            );
        }
        Ok(action)
    }

    /// Queue one back per history entry the active activity owns, followed by
    /// a check that the host landed on the entry of the activity below it.
    pub(super) fn before_pop(&mut self) {
        let activities = self.stack.activities();
        let Some(active) = activities.last() else {
            return;
        };
        let count = self.debt.settle_pop(active);
        if count == 0 {
            return;
        }
        let below = activities.iter().rev().nth(1).map(Position::of);

        tracing::debug!(activity = %active.id, count, "Collapsing activity entries");
        self.guard.expect_many(EchoKind::Pop, count);
        for _ in 0..count {
            self.queue.enqueue(HistoryOp::Back);
        }
        if let Some(target) = below {
            self.queue.enqueue(HistoryOp::Verify { target, attempt: 0 });
        }
    }

    pub(super) fn before_step_pop(&mut self) {
        let Some(activity) = self.stack.active() else {
            return;
        };
        let steps = &activity.steps;
        if steps.len() <= 1 {
            return;
        }
        let target = Position::new(activity.id.clone(), steps[steps.len() - 2].id.clone());

        self.guard.expect(EchoKind::Pop);
        self.queue.enqueue(HistoryOp::Back);
        self.queue.enqueue(HistoryOp::Verify { target, attempt: 0 });
    }

    /// Turn a stack event into the history write that mirrors it.
    pub(super) fn translate(&mut self, event: &StackEvent) -> Result<(), SyncError> {
        tracing::debug!(
            event = event.event_type_name(),
            activity = %event.activity().id,
            "Stack event"
        );

        match event {
            StackEvent::Pushed { activity } => self.write_entry(activity, None, WriteMode::Push),
            StackEvent::StepPushed { activity, step } => {
                self.write_entry(activity, Some(step), WriteMode::Push)
            }
            StackEvent::Replaced { activity } if activity.is_active => {
                self.write_entry(activity, None, WriteMode::Replace)
            }
            StackEvent::StepReplaced { activity, step } if activity.is_active => {
                self.write_entry(activity, Some(step), WriteMode::Replace)
            }
            StackEvent::Popped { activity } => {
                self.debt.forget(&activity.id);
                Ok(())
            }
            StackEvent::Replaced { .. }
            | StackEvent::StepReplaced { .. }
            | StackEvent::StepPopped { .. } => Ok(()),
        }
    }

    fn write_entry(
        &mut self,
        activity: &Activity,
        step: Option<&Step>,
        mode: WriteMode,
    ) -> Result<(), SyncError> {
        if mode == WriteMode::Push && self.guard.try_consume(EchoKind::Push) {
            self.stats.echoes_suppressed += 1;
            return Ok(());
        }

        let path = self.routes.path_for(&activity.name, activity.params())?;
        let state = encode(activity, step);
        let op = match mode {
            WriteMode::Push => HistoryOp::Push { path, state },
            WriteMode::Replace => HistoryOp::Replace { path, state },
        };
        self.queue.enqueue(op);
        Ok(())
    }

    /// Path handed to the host: the route path, or the current pathname with
    /// the route path as fragment in hash mode.
    pub(super) fn host_path(&self, path: &str) -> String {
        if self.config.use_hash {
            format!("{}#{}", self.history.location().pathname, path)
        } else {
            path.to_string()
        }
    }
}
