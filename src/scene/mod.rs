//! Scene inputs and outputs: the generator-supplied source and the renderer-facing trees.

/// Scene sources, props and color themes.
pub mod source;
/// Visual trees and diagnostic scenes.
pub mod visual;
