pub mod engine;
pub mod task;

pub use engine::{QueueStatus, RebaseEngine, RebaseHandle};
pub use task::{RebaseError, RebaseOutcome, RebaseState, RebaseTask};
