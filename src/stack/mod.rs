//! Activity navigation stack
//!
//! A tree-shaped model of "where the user is": an ordered list of activities,
//! each holding an ordered list of steps. Mutations produce [`StackEvent`]s
//! that the history sync engine translates into host-history writes.

pub mod engine;
pub mod events;
pub mod id;
pub mod model;

pub use engine::{NavigationStack, StackError};
pub use events::StackEvent;
pub use id::{generate_id, NavId};
pub use model::{
    Activity, ActivityAction, ActivityContext, EnteredBy, Params, Step, StepAction,
    TransitionState,
};
