//! Async shell around the pure engine: per-match tasks, persistence,
//! bot scheduling and the turn ticker.

mod bot_driver;
pub mod match_task;
pub mod registry;
pub mod store;
mod timer;

pub use match_task::MatchHandle;
pub use registry::MatchRegistry;
pub use store::{GameStore, InMemoryStore};
