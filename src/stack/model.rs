use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::NavId;

/// Activity and step parameters, kept in key order so filled paths are stable.
pub type Params = BTreeMap<String, String>;

/// Context attached to an activity when it is pushed or replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityContext {
    /// Path resolved from the activity's route before the action was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Payload of a push or replace of an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityAction {
    pub activity_id: NavId,
    pub activity_name: String,
    #[serde(default)]
    pub activity_params: Params,
    #[serde(default)]
    pub activity_context: ActivityContext,
}

impl ActivityAction {
    pub fn new(activity_id: impl Into<NavId>, activity_name: impl Into<String>) -> Self {
        Self {
            activity_id: activity_id.into(),
            activity_name: activity_name.into(),
            activity_params: Params::new(),
            activity_context: ActivityContext::default(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.activity_params.insert(key.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.activity_params = params;
        self
    }
}

/// Payload of a push or replace of a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepAction {
    pub step_id: NavId,
    #[serde(default)]
    pub step_params: Params,
}

impl StepAction {
    pub fn new(step_id: impl Into<NavId>) -> Self {
        Self {
            step_id: step_id.into(),
            step_params: Params::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.step_params.insert(key.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.step_params = params;
        self
    }
}

/// The action that created an activity or step, replayable to recreate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum EnteredBy {
    Pushed(ActivityAction),
    Replaced(ActivityAction),
    StepPushed(StepAction),
    StepReplaced(StepAction),
}

impl EnteredBy {
    /// The activity action, for `Pushed` and `Replaced`
    pub fn activity_action(&self) -> Option<&ActivityAction> {
        match self {
            EnteredBy::Pushed(action) | EnteredBy::Replaced(action) => Some(action),
            EnteredBy::StepPushed(_) | EnteredBy::StepReplaced(_) => None,
        }
    }

    /// The step action, for `StepPushed` and `StepReplaced`
    pub fn step_action(&self) -> Option<&StepAction> {
        match self {
            EnteredBy::StepPushed(action) | EnteredBy::StepReplaced(action) => Some(action),
            EnteredBy::Pushed(_) | EnteredBy::Replaced(_) => None,
        }
    }

    pub fn is_replaced(&self) -> bool {
        matches!(self, EnteredBy::Replaced(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionState {
    EnterActive,
    EnterDone,
    ExitActive,
    ExitDone,
}

/// In-place navigation within an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: NavId,
    pub params: Params,
    pub entered_by: EnteredBy,
}

impl Step {
    /// The implicit zeroth step every activity starts with.
    pub(crate) fn synthetic(action: &ActivityAction, entered_by: EnteredBy) -> Self {
        Self {
            id: action.activity_id.clone(),
            params: action.activity_params.clone(),
            entered_by,
        }
    }

    pub(crate) fn from_action(action: StepAction, entered_by: EnteredBy) -> Self {
        Self {
            id: action.step_id,
            params: action.step_params,
            entered_by,
        }
    }

    /// Whether this step was created by a step push or step replace
    pub fn is_explicit(&self) -> bool {
        self.entered_by.step_action().is_some()
    }
}

/// One screen of the navigation stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: NavId,
    pub name: String,
    pub steps: Vec<Step>,
    pub transition_state: TransitionState,
    pub is_active: bool,
    pub entered_by: EnteredBy,
    pub context: ActivityContext,
}

impl Activity {
    pub(crate) fn from_action(action: ActivityAction, entered_by: EnteredBy) -> Self {
        let step = Step::synthetic(&action, entered_by.clone());
        Self {
            id: action.activity_id,
            name: action.activity_name,
            steps: vec![step],
            transition_state: TransitionState::EnterDone,
            is_active: true,
            entered_by,
            context: action.activity_context,
        }
    }

    /// Parameters currently visible for this activity: those of its last step.
    pub fn params(&self) -> &Params {
        // Every activity is created with a synthetic step and the last step
        // is never popped.
        &self.steps[self.steps.len() - 1].params
    }

    pub fn last_step(&self) -> &Step {
        &self.steps[self.steps.len() - 1]
    }

    pub fn find_step(&self, id: &NavId) -> Option<&Step> {
        self.steps.iter().find(|step| &step.id == id)
    }
}
