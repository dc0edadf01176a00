use thiserror::Error;

use crate::config::ConfigError;
use crate::history::HistoryError;
use crate::route::RouteError;
use crate::stack::StackError;

/// Error raised by the history sync engine
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Route error: {0}")]
    Route(#[from] RouteError),
    #[error("Stack error: {0}")]
    Stack(#[from] StackError),
    #[error("History error: {0}")]
    History(#[from] HistoryError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// Backing out of an activity or step never reached the entry of the
    /// active position.
    #[error("History did not reach the active position after {attempts} extra back steps")]
    ReconciliationGap { attempts: usize },
}
