use super::model::{Activity, Step};

/// Lifecycle events emitted by the navigation stack after a mutation lands.
///
/// Each event carries a snapshot of the affected activity as it is after the
/// mutation (for pops, as it was when removed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackEvent {
    Pushed { activity: Activity },
    Replaced { activity: Activity },
    StepPushed { activity: Activity, step: Step },
    StepReplaced { activity: Activity, step: Step },
    Popped { activity: Activity },
    StepPopped { activity: Activity, step: Step },
}

impl StackEvent {
    /// Get a human-readable event name for logging
    pub fn event_type_name(&self) -> &'static str {
        match self {
            StackEvent::Pushed { .. } => "Pushed",
            StackEvent::Replaced { .. } => "Replaced",
            StackEvent::StepPushed { .. } => "StepPushed",
            StackEvent::StepReplaced { .. } => "StepReplaced",
            StackEvent::Popped { .. } => "Popped",
            StackEvent::StepPopped { .. } => "StepPopped",
        }
    }

    pub fn activity(&self) -> &Activity {
        match self {
            StackEvent::Pushed { activity }
            | StackEvent::Replaced { activity }
            | StackEvent::StepPushed { activity, .. }
            | StackEvent::StepReplaced { activity, .. }
            | StackEvent::Popped { activity }
            | StackEvent::StepPopped { activity, .. } => activity,
        }
    }
}
