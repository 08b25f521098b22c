pub mod cache;
pub mod dispatcher;

pub use cache::MemoryDuplicateCache;
pub use dispatcher::{DispatchResult, DispatchStatus, OrderDispatcher};
