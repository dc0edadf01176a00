use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use super::{HistoryAction, HistoryError, HistoryNotification, HostHistory, Location};

/// In-memory session history.
///
/// Clones share the same entries, so a test (or an embedding host) can drive
/// native back/forward on one handle while the sync engine holds another.
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Arc<Mutex<MemoryHistoryInner>>,
}

struct MemoryHistoryInner {
    entries: Vec<Location>,
    index: usize,
    listeners: Vec<mpsc::UnboundedSender<HistoryNotification>>,
}

impl MemoryHistory {
    /// A history holding a single bare `/` entry
    pub fn new() -> Self {
        Self::with_entries(["/"])
    }

    /// Seed the history with bare entries, positioned on the last one.
    pub fn with_entries<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<Location> = paths
            .into_iter()
            .map(|path| Location::parse(path.as_ref()))
            .collect();
        if entries.is_empty() {
            entries.push(Location::parse("/"));
        }
        let index = entries.len() - 1;

        Self {
            inner: Arc::new(Mutex::new(MemoryHistoryInner {
                entries,
                index,
                listeners: Vec::new(),
            })),
        }
    }

    /// Index of the current entry
    pub fn index(&self) -> usize {
        self.inner.lock().index
    }

    /// Number of entries, forward entries included
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Snapshot of all entries
    pub fn entries(&self) -> Vec<Location> {
        self.inner.lock().entries.clone()
    }

    /// Full path of the current entry
    pub fn path(&self) -> String {
        let inner = self.inner.lock();
        inner.entries[inner.index].path()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHistoryInner {
    fn notify(&mut self, action: HistoryAction) {
        let location = self.entries[self.index].clone();
        self.listeners.retain(|listener| {
            listener
                .send(HistoryNotification {
                    action,
                    location: location.clone(),
                })
                .is_ok()
        });
    }
}

impl HostHistory for MemoryHistory {
    fn location(&self) -> Location {
        let inner = self.inner.lock();
        inner.entries[inner.index].clone()
    }

    fn push(&mut self, path: &str, state: Value) -> Result<(), HistoryError> {
        let mut inner = self.inner.lock();
        let next = inner.index + 1;
        inner.entries.truncate(next);
        inner.entries.push(Location::parse(path).with_state(state));
        inner.index = next;
        inner.notify(HistoryAction::Push);
        Ok(())
    }

    fn replace(&mut self, path: &str, state: Value) -> Result<(), HistoryError> {
        let mut inner = self.inner.lock();
        let index = inner.index;
        inner.entries[index] = Location::parse(path).with_state(state);
        inner.notify(HistoryAction::Replace);
        Ok(())
    }

    fn go(&mut self, delta: isize) -> Result<(), HistoryError> {
        let mut inner = self.inner.lock();
        let last = inner.entries.len() as isize - 1;
        let target = (inner.index as isize + delta).clamp(0, last) as usize;
        if target != inner.index {
            inner.index = target;
            inner.notify(HistoryAction::Pop);
        }
        Ok(())
    }

    fn position(&self) -> Option<usize> {
        Some(self.inner.lock().index)
    }

    fn listen(&mut self) -> mpsc::UnboundedReceiver<HistoryNotification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().listeners.push(tx);
        rx
    }
}
