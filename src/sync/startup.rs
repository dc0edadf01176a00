//! Rebuilding the stack when the engine starts
//!
//! The host's current entry decides the initial stack: an entry written by a
//! previous run is replayed as-is, otherwise its path is matched against the
//! route table, and the fallback activity is used when nothing matches.

use super::codec::{decode, encode};
use super::queue::HistoryOp;
use super::{HistorySync, SyncError};
use crate::config::Config;
use crate::history::{HostHistory, Location};
use crate::stack::{
    generate_id, ActivityAction, NavigationStack, StackError, StackEvent, StepAction,
};

/// Externally supplied startup information
#[derive(Debug, Clone, Default)]
pub struct InitialContext {
    /// Path to start from instead of the host's location, for example the
    /// request path when rendering on a server
    pub request_path: Option<String>,
}

impl InitialContext {
    pub fn with_request_path(path: impl Into<String>) -> Self {
        Self {
            request_path: Some(path.into()),
        }
    }
}

/// Stack action used to build the initial stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialEvent {
    Pushed(ActivityAction),
    StepPushed(StepAction),
}

impl InitialEvent {
    pub fn apply(self, stack: &mut NavigationStack) -> Result<StackEvent, StackError> {
        match self {
            InitialEvent::Pushed(action) => stack.push(action),
            InitialEvent::StepPushed(action) => stack.step_push(action),
        }
    }
}

/// Path the initial route match runs against.
pub fn resolve_initial_path(location: &Location, config: &Config, context: &InitialContext) -> String {
    if let Some(path) = &context.request_path {
        return path.clone();
    }
    if config.use_hash {
        let fragment = location.hash.strip_prefix('#').unwrap_or(&location.hash);
        if fragment.is_empty() {
            return "/".to_string();
        }
        return fragment.to_string();
    }
    format!("{}{}", location.pathname, location.search)
}

/// Actions that rebuild the stack for the host's current entry.
///
/// A stored entry restores its activity and at most the one step it points
/// at; earlier steps of that activity are not restored. Their entries stay in
/// the host history, and a later step pop backs over them until it reaches
/// the activity's own entry.
pub fn initial_events(
    location: &Location,
    config: &Config,
    context: &InitialContext,
) -> Result<Vec<InitialEvent>, SyncError> {
    if let Some(payload) = decode(location.state.as_ref()) {
        let mut events = Vec::with_capacity(2);
        if let Some(action) = payload.activity.entered_by.activity_action() {
            events.push(InitialEvent::Pushed(action.clone()));
        }
        if let Some(step) = payload.explicit_step().and_then(|s| s.entered_by.step_action()) {
            events.push(InitialEvent::StepPushed(step.clone()));
        }
        tracing::debug!(activity = %payload.activity.id, "Restoring stack from history entry");
        return Ok(events);
    }

    let path = resolve_initial_path(location, config, context);
    let mut action = match config.routes.match_path(&path) {
        Some((name, params)) => {
            tracing::debug!(path = %path, activity = %name, "Initial path matched");
            let mut action = ActivityAction::new(generate_id(), name).with_params(params);
            action.activity_context.path = Some(path);
            action
        }
        None => {
            tracing::debug!(
                path = %path,
                fallback = %config.fallback_activity,
                "No route matches initial path"
            );
            ActivityAction::new(generate_id(), config.fallback_activity.clone())
        }
    };
    if action.activity_context.path.is_none() {
        action.activity_context.path = Some(config.routes.fallback_path(&action.activity_name)?);
    }

    Ok(vec![InitialEvent::Pushed(action)])
}

impl<H: HostHistory> HistorySync<H> {
    /// Overwrite the host's current entry with the encoded root position so a
    /// later traversal back to it can be classified.
    pub(super) fn write_root_entry(&mut self) -> Result<(), SyncError> {
        let Some(active) = self.stack.active() else {
            return Ok(());
        };
        let path = self
            .routes
            .path_for(&active.name, active.params())
            .or_else(|error| active.context.path.clone().ok_or(error))?;
        let state = encode(active, Some(active.last_step()));
        self.queue.enqueue(HistoryOp::Replace { path, state });
        Ok(())
    }
}
