use std::collections::HashMap;

use crate::stack::{Activity, NavId};

/// Replace debt: history entries left behind by replaces.
///
/// A replace overwrites only the top history entry, so the entries of the
/// replaced activity's earlier steps stay in history. They are charged to
/// the replacing activity and collapsed by its next pop. Debt follows the
/// replace chain: replacing an activity that already carries debt moves all
/// of it to the replacement.
#[derive(Debug, Default, Clone)]
pub struct ReplaceDebt {
    ledger: HashMap<NavId, usize>,
}

impl ReplaceDebt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of history entries belonging to `activity`.
    ///
    /// A pushed activity owns one entry per step. A replace target owns its
    /// debt (which already includes the overwritten top entry) plus one
    /// entry per step pushed after the replace.
    pub fn entries_of(&self, activity: &Activity) -> usize {
        let steps = activity.steps.len();
        match self.ledger.get(&activity.id) {
            Some(debt) => debt + steps.saturating_sub(1),
            None => steps,
        }
    }

    /// Record that `replaced` is about to be replaced by `replacement`.
    pub fn record_replace(&mut self, replaced: &Activity, replacement: &NavId) -> usize {
        let entries = self.entries_of(replaced);
        self.ledger.remove(&replaced.id);
        self.ledger.insert(replacement.clone(), entries);
        entries
    }

    /// Number of back steps needed to pop `activity`; pays its debt down.
    pub fn settle_pop(&mut self, activity: &Activity) -> usize {
        let count = self.entries_of(activity);
        self.ledger.remove(&activity.id);
        count
    }

    /// Drop any debt held by an activity that left the stack.
    pub fn forget(&mut self, activity_id: &NavId) {
        self.ledger.remove(activity_id);
    }

    /// Debt currently charged to an activity
    pub fn owed_by(&self, activity_id: &NavId) -> usize {
        self.ledger.get(activity_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }
}
