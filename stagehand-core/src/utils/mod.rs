//! 工具函数

mod generation;
mod sync;

pub use generation::{Generation, GenerationToken};
pub use sync::{lock, read, write};
