//! History entry payload codec
//!
//! Each history entry written by the engine carries enough of the active
//! activity and step to either match it against the live stack by id or
//! recreate it from scratch after a restart.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stack::{Activity, EnteredBy, NavId, Params, Step};

/// Value of the tag field marking entries written by this engine
pub const PAYLOAD_TAG: &str = "history-sync/v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    pub id: NavId,
    pub name: String,
    pub params: Params,
    pub entered_by: EnteredBy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub id: NavId,
    pub params: Params,
    pub entered_by: EnteredBy,
}

/// Decoded history entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPayload {
    pub activity: ActivitySnapshot,
    pub step: Option<StepSnapshot>,
}

impl HistoryPayload {
    /// Id of the step the entry points at; the activity's synthetic step
    /// when the entry carries none.
    pub fn step_id(&self) -> &NavId {
        self.step
            .as_ref()
            .map(|step| &step.id)
            .unwrap_or(&self.activity.id)
    }

    /// The step, if it was created by a step push or step replace and can
    /// therefore be replayed.
    pub fn explicit_step(&self) -> Option<&StepSnapshot> {
        self.step
            .as_ref()
            .filter(|step| step.entered_by.step_action().is_some())
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "__navsync")]
    tag: String,
    activity: ActivitySnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    step: Option<StepSnapshot>,
}

impl From<&Activity> for ActivitySnapshot {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id.clone(),
            name: activity.name.clone(),
            params: activity.params().clone(),
            entered_by: activity.entered_by.clone(),
        }
    }
}

impl From<&Step> for StepSnapshot {
    fn from(step: &Step) -> Self {
        Self {
            id: step.id.clone(),
            params: step.params.clone(),
            entered_by: step.entered_by.clone(),
        }
    }
}

/// Encode a stack position into a history state payload.
pub fn encode(activity: &Activity, step: Option<&Step>) -> Value {
    let envelope = Envelope {
        tag: PAYLOAD_TAG.to_string(),
        activity: activity.into(),
        step: step.map(StepSnapshot::from),
    };
    // Snapshots are string maps and enums; serializing them cannot fail.
    serde_json::to_value(envelope).unwrap_or(Value::Null)
}

/// Decode a history state payload. Absent, foreign and malformed payloads
/// all decode to `None`.
pub fn decode(state: Option<&Value>) -> Option<HistoryPayload> {
    let envelope = Envelope::deserialize(state?).ok()?;
    if envelope.tag != PAYLOAD_TAG {
        return None;
    }
    if envelope.activity.entered_by.activity_action().is_none() {
        return None;
    }

    Some(HistoryPayload {
        activity: envelope.activity,
        step: envelope.step,
    })
}
