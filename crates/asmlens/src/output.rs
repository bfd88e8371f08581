//! Rendering: per-block text generation, color palettes, and column
//! tracking.

pub mod palette;

pub(crate) mod render;

pub use palette::Palette;
