pub mod catalogue;
pub mod context;
pub mod error;
pub mod goal;
pub mod manager;
pub mod node;
pub mod types;

pub use context::TickContext;
pub use error::{SchedulerError, SchedulerErrorKind};
pub use goal::Goal;
pub use manager::{ObjectiveManager, SettleReport};
pub use node::Objective;
pub use types::ObjectiveKind;
