/// Frame, frame-rate and canvas primitives.
pub mod core;
/// Error types shared across the crate.
pub mod error;
/// Display-safe message bounding.
pub mod text;
