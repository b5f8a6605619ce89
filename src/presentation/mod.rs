pub mod input;
pub mod ui;

pub use input::*;
pub use ui::*;
