use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an activity or step.
///
/// Identifiers are totally ordered by creation time: an activity created
/// later compares greater. Generated ids are time-ordered UUIDs; caller-chosen
/// ids must keep the same property.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavId(String);

impl NavId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NavId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NavId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NavId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Generate a new id that compares greater than every id generated before it.
///
/// Ids are version 7 UUIDs in hyphenated lowercase form: the leading
/// millisecond timestamp keeps string order equal to creation order, also
/// across restarts.
pub fn generate_id() -> NavId {
    NavId(Uuid::now_v7().hyphenated().to_string())
}
