pub mod lru;
pub mod task;

pub use lru::LruCache;
pub use task::{Expired, TaskCell, with_deadline};
