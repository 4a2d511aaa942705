pub mod color;
pub mod exporter;
pub mod geometry;
pub mod profiler;
