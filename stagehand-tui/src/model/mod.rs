//! Model 层：应用状态

mod app;
mod screen;

pub use app::App;
pub use screen::Screen;
