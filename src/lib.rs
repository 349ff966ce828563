//! Motionbox is the evaluation core for animated scenes whose logic is written by an outside
//! generator.
//!
//! Scene code is Rhai source. It is screened by a lexical validator, compiled against a closed
//! capability table and then called once per frame. Every frame is a pure function of the frame
//! index, so frames can be rendered in any order or in parallel:
//!
//! - Describe a scene with a [`SceneSource`]
//! - Create a [`SceneSession`] (or [`load`] against a shared [`CapabilityContext`])
//! - Render single frames or ranges into [`VisualOutput`] values
//!
//! Failures never escape as panics or errors from a render call: they come back as a
//! [`DiagnosticScene`] in place of the frame.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Interpolation, easing, spring and stagger math.
pub mod animation;
/// Frame primitives, errors and message bounding.
pub mod foundation;
/// Rectangle placement helpers.
pub mod layout;
/// Supervised rendering, caching and sessions.
pub mod render;
pub mod sandbox;
pub mod scene;
/// Stateless item lifecycle sequencing.
pub mod timeline;

pub use crate::animation::ease::Easing;
pub use crate::animation::interpolate::{
    AnimationSpec, BoundaryPolicy, Extrapolate, InterpolateOptions, interpolate,
};
pub use crate::animation::spring::{SpringConfig, SpringSpec, spring, spring_settle_frames};
pub use crate::animation::stagger::{StaggerPattern, stagger_delay, stagger_offset};
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
pub use crate::foundation::error::{
    CompileErrorKind, ErrorKind, LoadError, MotionError, MotionResult, RenderError,
};
pub use crate::render::cache::{FactoryCache, LoadOutcome};
pub use crate::render::session::{SceneSession, SessionOpts};
pub use crate::render::supervisor::render_frame;
pub use crate::sandbox::capability::{CapabilityContext, CapabilityOptions, SandboxLimits};
pub use crate::sandbox::loader::{SceneFactory, load};
pub use crate::sandbox::validate::validate;
pub use crate::scene::source::{ColorTheme, SceneSource};
pub use crate::scene::visual::{DiagnosticScene, VisualOutput, VisualTree};
pub use crate::timeline::sequencer::{
    AnimationKind, ItemState, Timeline, TimelineConfig, TimelineItem, VisibleItem,
};
