use crate::foundation::core::Fps;
use crate::foundation::error::{MotionError, MotionResult};

/// Upper bound for [`spring_settle_frames`], in seconds of animation.
const MAX_SETTLE_SECS: f64 = 60.0;

/// Damped harmonic oscillator parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// Damping coefficient `c`.
    pub damping: f64,
    /// Spring constant `k`.
    pub stiffness: f64,
    /// Mass `m`.
    pub mass: f64,
    /// Never let the value pass the target.
    pub overshoot_clamping: bool,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            damping: 10.0,
            stiffness: 100.0,
            mass: 1.0,
            overshoot_clamping: false,
        }
    }
}

impl SpringConfig {
    /// Check that all parameters are finite and physically meaningful.
    pub fn validate(&self) -> MotionResult<()> {
        if !(self.damping.is_finite() && self.stiffness.is_finite() && self.mass.is_finite()) {
            return Err(MotionError::animation("spring parameters must be finite"));
        }
        if self.mass <= 0.0 {
            return Err(MotionError::animation("spring mass must be > 0"));
        }
        if self.stiffness < 0.0 || self.damping < 0.0 {
            return Err(MotionError::animation(
                "spring stiffness and damping must be >= 0",
            ));
        }
        Ok(())
    }
}

/// A spring-driven value change starting at `start_frame`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpringSpec {
    /// Frame at which the spring is released.
    #[serde(default)]
    pub start_frame: f64,
    /// Resting value before release.
    #[serde(default)]
    pub from: f64,
    /// Target value.
    #[serde(default = "one")]
    pub to: f64,
    /// Oscillator parameters.
    #[serde(default)]
    pub config: SpringConfig,
}

fn one() -> f64 {
    1.0
}

impl Default for SpringSpec {
    fn default() -> Self {
        Self {
            start_frame: 0.0,
            from: 0.0,
            to: 1.0,
            config: SpringConfig::default(),
        }
    }
}

impl SpringSpec {
    /// Value at `frame`, computed in closed form from the elapsed time since `start_frame`.
    pub fn value_at(&self, frame: f64, fps: Fps) -> f64 {
        let elapsed = fps.frames_to_secs(frame - self.start_frame);
        let p = spring_progress(elapsed, self.config);
        self.from + (self.to - self.from) * p
    }
}

/// Step response of the oscillator from 0 to 1 with `x(0)=0, v(0)=0`, at `t` seconds.
///
/// Negative `t` is before release and returns 0.
pub fn spring_progress(t: f64, config: SpringConfig) -> f64 {
    if t <= 0.0 || !t.is_finite() {
        return 0.0;
    }
    let k = config.stiffness.max(0.0);
    let c = config.damping.max(0.0);
    let m = config.mass.max(1e-9);

    let w0 = (k / m).sqrt();
    if w0 == 0.0 {
        return 1.0;
    }
    let zeta = c / (2.0 * (k * m).sqrt()).max(1e-9);

    let x = if (zeta - 1.0).abs() < 1e-6 {
        // Critically damped.
        let e = (-w0 * t).exp();
        1.0 - e * (1.0 + w0 * t)
    } else if zeta < 1.0 {
        // Underdamped.
        let wd = w0 * (1.0 - zeta * zeta).sqrt();
        let e = (-zeta * w0 * t).exp();
        let c1 = (wd * t).cos();
        let s1 = (wd * t).sin();
        let k = zeta / (1.0 - zeta * zeta).sqrt();
        1.0 - e * (c1 + k * s1)
    } else {
        // Overdamped.
        let z2 = (zeta * zeta - 1.0).sqrt();
        let r1 = -w0 * (zeta - z2);
        let r2 = -w0 * (zeta + z2);
        let c2 = (zeta + z2) / (2.0 * z2);
        let c1 = (zeta - z2) / (2.0 * z2);
        1.0 - (c2 * (r1 * t).exp() - c1 * (r2 * t).exp())
    };

    if config.overshoot_clamping {
        x.min(1.0)
    } else {
        x
    }
}

/// Value of `spec` at `frame`. Convenience wrapper over [`SpringSpec::value_at`].
pub fn spring(frame: f64, fps: Fps, spec: &SpringSpec) -> f64 {
    spec.value_at(frame, fps)
}

/// Number of frames after release until the response stays within `threshold` of the target.
///
/// The search is bounded to one minute of animation; springs that never settle report the bound.
pub fn spring_settle_frames(config: SpringConfig, fps: Fps, threshold: f64) -> MotionResult<u64> {
    config.validate()?;
    if !(threshold.is_finite() && threshold > 0.0) {
        return Err(MotionError::animation("settle threshold must be > 0"));
    }

    let max_frames = fps.secs_to_frames_floor(MAX_SETTLE_SECS);
    let mut settled_from = 0;
    for f in 0..=max_frames {
        let p = spring_progress(fps.frames_to_secs(f as f64), config);
        if (1.0 - p).abs() > threshold {
            settled_from = f + 1;
        }
    }
    Ok(settled_from.min(max_frames))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spring.rs"]
mod tests;
