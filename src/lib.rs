pub mod config;
pub mod history;
pub mod route;
pub mod script;
pub mod stack;
pub mod sync;

pub use config::{Config, ConfigError};
pub use history::{HistoryAction, HistoryNotification, HostHistory, Location, MemoryHistory};
pub use route::{RouteError, RouteTable, RoutesContext};
pub use stack::{
    generate_id, Activity, ActivityAction, NavId, NavigationStack, Params, StackEvent, StepAction,
};
pub use sync::{HistorySync, InitialContext, SyncError, SyncStats};
