/// Easing curves over normalized progress.
pub mod ease;
/// Keyframe interpolation with boundary policies.
pub mod interpolate;
/// Closed-form damped spring response.
pub mod spring;
/// Per-item delay offsets for batched animations.
pub mod stagger;
