//! Host linear history
//!
//! The flat, append-only session history (push, replace, positional
//! traversal) that the navigation stack is kept in sync with.

pub mod memory;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

pub use memory::MemoryHistory;

/// Error reported by a host history primitive
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History operation rejected: {0}")]
    Rejected(String),
    #[error("History is closed")]
    Closed,
}

/// How the host arrived at a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Push,
    Replace,
    /// Traversal: back, forward or go(n)
    Pop,
}

/// A history entry as seen by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    /// Query string including the leading `?`, or empty
    pub search: String,
    /// Fragment including the leading `#`, or empty
    pub hash: String,
    /// Opaque state payload stored with the entry
    pub state: Option<Value>,
}

impl Location {
    /// Split a path such as `/a/b/?x=1#frag` into its components.
    pub fn parse(path: &str) -> Self {
        let (rest, hash) = match path.find('#') {
            Some(idx) => (&path[..idx], &path[idx..]),
            None => (path, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let pathname = if pathname.is_empty() { "/" } else { pathname };

        Self {
            pathname: pathname.to_string(),
            search: search.to_string(),
            hash: hash.to_string(),
            state: None,
        }
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    /// Full path: pathname, search and hash
    pub fn path(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}

/// Delivered to listeners on every position change
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryNotification {
    pub action: HistoryAction,
    pub location: Location,
}

/// Host history primitives.
///
/// Implementations notify every listener exactly once per net position
/// change (including changes caused by `push` and `replace`).
pub trait HostHistory {
    /// The current entry
    fn location(&self) -> Location;

    /// Append a new entry after the current one, dropping forward entries.
    fn push(&mut self, path: &str, state: Value) -> Result<(), HistoryError>;

    /// Overwrite the current entry.
    fn replace(&mut self, path: &str, state: Value) -> Result<(), HistoryError>;

    /// Move `delta` entries backward (negative) or forward (positive).
    fn go(&mut self, delta: isize) -> Result<(), HistoryError>;

    fn back(&mut self) -> Result<(), HistoryError> {
        self.go(-1)
    }

    fn forward(&mut self) -> Result<(), HistoryError> {
        self.go(1)
    }

    /// Index of the current entry, when the host exposes it.
    fn position(&self) -> Option<usize> {
        None
    }

    /// Subscribe to position changes.
    fn listen(&mut self) -> mpsc::UnboundedReceiver<HistoryNotification>;
}
