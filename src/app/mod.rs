pub mod commands;
mod context;
pub mod sync;

pub use context::AppContext;
pub use sync::{SyncReport, Synchronizer};
