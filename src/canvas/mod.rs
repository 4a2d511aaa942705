pub mod chunk_cache;
pub mod history;
pub mod persist;
pub mod pixel_store;
pub mod project;
