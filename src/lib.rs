pub mod app;
pub mod canvas;
pub mod fill;
pub mod selection;
pub mod utils;

pub use app::{Editor, EngineSettings};
pub use canvas::project::{LayerId, Project};
pub use utils::color::Color;
