//! 工具函数

mod terminal;
mod text;

pub use terminal::{init_terminal, restore_terminal, Term};
pub use text::{fit_width, timestamp};
