use thiserror::Error;

use super::events::StackEvent;
use super::id::NavId;
use super::model::{Activity, ActivityAction, EnteredBy, Step, StepAction, TransitionState};

/// Error applying an action to the navigation stack
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StackError {
    #[error("Activity already on the stack: {0}")]
    DuplicateActivity(NavId),
    #[error("Step already on activity {activity}: {step}")]
    DuplicateStep { activity: NavId, step: NavId },
    #[error("Navigation stack is empty")]
    Empty,
}

/// In-memory navigation stack.
///
/// Transitions complete immediately: every live activity is `EnterDone` and
/// popped activities are removed. The last activity is the active one.
#[derive(Debug, Clone, Default)]
pub struct NavigationStack {
    activities: Vec<Activity>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// All live activities, oldest first
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// The currently visible activity
    pub fn active(&self) -> Option<&Activity> {
        self.activities.last()
    }

    pub fn find(&self, id: &NavId) -> Option<&Activity> {
        self.activities.iter().find(|activity| &activity.id == id)
    }

    pub fn push(&mut self, action: ActivityAction) -> Result<StackEvent, StackError> {
        if self.find(&action.activity_id).is_some() {
            return Err(StackError::DuplicateActivity(action.activity_id));
        }

        let activity = Activity::from_action(action.clone(), EnteredBy::Pushed(action));
        self.enter(activity.clone());
        Ok(StackEvent::Pushed { activity })
    }

    /// Replace the active activity with a new one.
    pub fn replace(&mut self, action: ActivityAction) -> Result<StackEvent, StackError> {
        if self.activities.is_empty() {
            return Err(StackError::Empty);
        }
        if self.find(&action.activity_id).is_some() {
            return Err(StackError::DuplicateActivity(action.activity_id));
        }

        self.activities.pop();
        let activity = Activity::from_action(action.clone(), EnteredBy::Replaced(action));
        self.enter(activity.clone());
        Ok(StackEvent::Replaced { activity })
    }

    pub fn step_push(&mut self, action: StepAction) -> Result<StackEvent, StackError> {
        let activity = self.active_mut()?;
        if activity.find_step(&action.step_id).is_some() {
            return Err(StackError::DuplicateStep {
                activity: activity.id.clone(),
                step: action.step_id,
            });
        }

        let step = Step::from_action(action.clone(), EnteredBy::StepPushed(action));
        activity.steps.push(step.clone());
        Ok(StackEvent::StepPushed {
            activity: activity.clone(),
            step,
        })
    }

    /// Replace the last step of the active activity, synthetic step included.
    pub fn step_replace(&mut self, action: StepAction) -> Result<StackEvent, StackError> {
        let activity = self.active_mut()?;
        let last = activity.steps.len() - 1;
        let duplicate = activity
            .steps
            .iter()
            .take(last)
            .any(|step| step.id == action.step_id);
        if duplicate {
            return Err(StackError::DuplicateStep {
                activity: activity.id.clone(),
                step: action.step_id,
            });
        }

        let step = Step::from_action(action.clone(), EnteredBy::StepReplaced(action));
        activity.steps[last] = step.clone();
        Ok(StackEvent::StepReplaced {
            activity: activity.clone(),
            step,
        })
    }

    /// Pop the active activity. The root activity is never popped.
    pub fn pop(&mut self) -> Option<StackEvent> {
        if self.activities.len() <= 1 {
            return None;
        }
        self.dispatch_popped()
    }

    /// Remove the active activity unconditionally.
    ///
    /// Used when the host history has already moved behind the active
    /// activity; the stack may be left empty until the caller pushes the
    /// activity the history landed on.
    pub fn dispatch_popped(&mut self) -> Option<StackEvent> {
        let mut activity = self.activities.pop()?;
        activity.is_active = false;
        activity.transition_state = TransitionState::ExitDone;
        if let Some(next) = self.activities.last_mut() {
            next.is_active = true;
        }
        Some(StackEvent::Popped { activity })
    }

    /// Pop the last step of the active activity. The zeroth step is never popped.
    pub fn step_pop(&mut self) -> Option<StackEvent> {
        let activity = self.activities.last_mut()?;
        if activity.steps.len() <= 1 {
            return None;
        }
        let step = activity.steps.pop()?;
        Some(StackEvent::StepPopped {
            activity: activity.clone(),
            step,
        })
    }

    fn enter(&mut self, activity: Activity) {
        for existing in &mut self.activities {
            existing.is_active = false;
        }
        self.activities.push(activity);
    }

    fn active_mut(&mut self) -> Result<&mut Activity, StackError> {
        self.activities.last_mut().ok_or(StackError::Empty)
    }
}
