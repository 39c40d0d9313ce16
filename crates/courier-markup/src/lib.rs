pub mod chunk;
pub mod translate;

pub use chunk::{split, ChunkError};
pub use translate::{translate, Dialect};
