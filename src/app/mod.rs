pub mod camera;
pub mod events;
pub mod session;
pub mod settings;
pub mod tools;

pub use session::Editor;
pub use settings::EngineSettings;
