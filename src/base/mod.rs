pub mod hash;
pub mod paths;
pub mod position;

pub use hash::ContentHash;
pub use paths::normalize_path;
pub use position::{LineIndex, Position, Span};
