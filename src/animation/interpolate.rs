use crate::animation::ease::Easing;
use crate::foundation::error::{MotionError, MotionResult};

/// What to do with an input that falls outside the animated range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolate {
    /// Hold the exact boundary value.
    #[default]
    Clamp,
    /// Keep evaluating the boundary segment's curve past its end.
    Extend,
    /// Return the input unchanged.
    Identity,
}

impl Extrapolate {
    /// Parse the names scene code uses.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "clamp" => Some(Self::Clamp),
            "extend" => Some(Self::Extend),
            "identity" => Some(Self::Identity),
            _ => None,
        }
    }
}

/// Per-side extrapolation policy. Both sides clamp unless told otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct BoundaryPolicy {
    /// Policy before the first input point.
    #[serde(default)]
    pub left: Extrapolate,
    /// Policy after the last input point.
    #[serde(default)]
    pub right: Extrapolate,
}

impl BoundaryPolicy {
    /// Clamp on both sides.
    pub fn clamp() -> Self {
        Self::default()
    }

    /// Extend on both sides.
    pub fn extend() -> Self {
        Self {
            left: Extrapolate::Extend,
            right: Extrapolate::Extend,
        }
    }
}

/// Declarative timed value change.
///
/// Evaluation is a pure function of the frame: before `start_frame` the result is `from`, after
/// `end_frame` it is `to`, unless the boundary policy asks for extrapolation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationSpec {
    /// First animated frame.
    pub start_frame: f64,
    /// Frame at which `to` is reached.
    pub end_frame: f64,
    /// Easing applied to linear progress before the value lerp.
    #[serde(default)]
    pub easing: Easing,
    /// Value at and before `start_frame`.
    pub from: f64,
    /// Value at and after `end_frame`.
    pub to: f64,
    /// Out-of-range behavior.
    #[serde(default)]
    pub boundary: BoundaryPolicy,
}

impl AnimationSpec {
    /// Linear, clamped animation over `[start_frame, end_frame]`.
    pub fn new(start_frame: f64, end_frame: f64, from: f64, to: f64) -> MotionResult<Self> {
        let spec = Self {
            start_frame,
            end_frame,
            easing: Easing::Linear,
            from,
            to,
            boundary: BoundaryPolicy::clamp(),
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Animation starting at `start_frame` and lasting `duration` frames.
    pub fn with_duration(start_frame: f64, duration: f64, from: f64, to: f64) -> MotionResult<Self> {
        Self::new(start_frame, start_frame + duration, from, to)
    }

    /// Replace the easing.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Replace the boundary policy.
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Check that the frame window is finite and ordered.
    pub fn validate(&self) -> MotionResult<()> {
        let all = [self.start_frame, self.end_frame, self.from, self.to];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(MotionError::animation(
                "AnimationSpec frames and values must be finite",
            ));
        }
        if self.end_frame < self.start_frame {
            return Err(MotionError::animation(
                "AnimationSpec end_frame must be >= start_frame",
            ));
        }
        Ok(())
    }

    /// Linear progress `clamp((frame-start)/(end-start), 0, 1)`.
    pub fn progress(&self, frame: f64) -> f64 {
        let span = self.end_frame - self.start_frame;
        if span <= 0.0 {
            return if frame < self.start_frame { 0.0 } else { 1.0 };
        }
        ((frame - self.start_frame) / span).clamp(0.0, 1.0)
    }

    /// Value at `frame`.
    pub fn value_at(&self, frame: f64) -> f64 {
        eval_segment(
            frame,
            [self.start_frame, self.end_frame],
            [self.from, self.to],
            self.easing,
            self.boundary,
        )
    }
}

/// Options for [`interpolate`].
#[derive(Clone, Copy, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct InterpolateOptions {
    /// Easing applied inside every segment.
    #[serde(default)]
    pub easing: Easing,
    /// Out-of-range behavior.
    #[serde(flatten)]
    pub boundary: BoundaryPolicy,
}

/// Map `input` through a piecewise curve defined by matching input/output points.
///
/// `input_range` must be strictly increasing and both ranges must have the same length (>= 2).
pub fn interpolate(
    input: f64,
    input_range: &[f64],
    output_range: &[f64],
    opts: InterpolateOptions,
) -> MotionResult<f64> {
    check_ranges(input_range, output_range)?;
    if !input.is_finite() {
        return Err(MotionError::animation("interpolate input must be finite"));
    }

    // Segment whose start is the last point <= input; boundary segments handle outside inputs.
    let last_seg = input_range.len() - 2;
    let seg = input_range[1..]
        .partition_point(|&x| x <= input)
        .min(last_seg);

    // Inner boundaries never extrapolate: only the outermost sides honor the policy.
    let boundary = BoundaryPolicy {
        left: if seg == 0 {
            opts.boundary.left
        } else {
            Extrapolate::Clamp
        },
        right: if seg == last_seg {
            opts.boundary.right
        } else {
            Extrapolate::Clamp
        },
    };

    Ok(eval_segment(
        input,
        [input_range[seg], input_range[seg + 1]],
        [output_range[seg], output_range[seg + 1]],
        opts.easing,
        boundary,
    ))
}

fn check_ranges(input_range: &[f64], output_range: &[f64]) -> MotionResult<()> {
    if input_range.len() < 2 {
        return Err(MotionError::animation(
            "interpolate input_range must have at least 2 points",
        ));
    }
    if input_range.len() != output_range.len() {
        return Err(MotionError::animation(format!(
            "interpolate ranges differ in length ({} vs {})",
            input_range.len(),
            output_range.len()
        )));
    }
    if input_range
        .iter()
        .chain(output_range)
        .any(|v| !v.is_finite())
    {
        return Err(MotionError::animation("interpolate ranges must be finite"));
    }
    if !input_range.windows(2).all(|w| w[0] < w[1]) {
        return Err(MotionError::animation(
            "interpolate input_range must be strictly increasing",
        ));
    }
    Ok(())
}

fn eval_segment(
    input: f64,
    [x0, x1]: [f64; 2],
    [y0, y1]: [f64; 2],
    easing: Easing,
    boundary: BoundaryPolicy,
) -> f64 {
    if input < x0 {
        match boundary.left {
            Extrapolate::Clamp => return y0,
            Extrapolate::Identity => return input,
            Extrapolate::Extend => {}
        }
    }
    if input > x1 {
        match boundary.right {
            Extrapolate::Clamp => return y1,
            Extrapolate::Identity => return input,
            Extrapolate::Extend => {}
        }
    }

    let span = x1 - x0;
    if span <= 0.0 {
        return if input < x0 { y0 } else { y1 };
    }

    let p = (input - x0) / span;
    let eased = if (0.0..=1.0).contains(&p) {
        easing.apply(p)
    } else {
        easing.apply_unclamped(p)
    };
    y0 + (y1 - y0) * eased
}

#[cfg(test)]
#[path = "../../tests/unit/animation/interpolate.rs"]
mod tests;
