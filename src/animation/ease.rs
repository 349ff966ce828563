use std::f64::consts::PI;

const BACK_C1: f64 = 1.70158;
const BACK_C3: f64 = BACK_C1 + 1.0;

const BOUNCE_N1: f64 = 7.5625;
const BOUNCE_D1: f64 = 2.75;

/// Easing functions used to map normalized animation progress.
///
/// The formulas are fixed: rendered output must be reproducible across hosts.
#[derive(Clone, Copy, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// `p`.
    #[default]
    Linear,
    /// Quadratic ease-in, `p²`.
    EaseIn,
    /// Quadratic ease-out, `1-(1-p)²`.
    EaseOut,
    /// Quadratic ease-in/out.
    EaseInOut,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
    /// Four-segment piecewise quadratic bounce.
    BounceOut,
    /// Exponentially decaying sine.
    ElasticOut,
    /// Anticipation / overshoot ("back") ease-out.
    BackOut,
    /// CSS `cubic-bezier(x1, y1, x2, y2)`.
    CubicBezier {
        /// First control point x, in `[0, 1]`.
        x1: f64,
        /// First control point y.
        y1: f64,
        /// Second control point x, in `[0, 1]`.
        x2: f64,
        /// Second control point y.
        y2: f64,
    },
}

impl Easing {
    /// Resolve an easing from the names scene code uses (`"ease_out"`, `"ease-out"`, `"easeOut"`).
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        Some(match key.as_str() {
            "linear" => Self::Linear,
            "easein" | "in" | "inquad" => Self::EaseIn,
            "easeout" | "out" | "outquad" => Self::EaseOut,
            "easeinout" | "inout" | "inoutquad" => Self::EaseInOut,
            "incubic" | "easeincubic" => Self::InCubic,
            "outcubic" | "easeoutcubic" => Self::OutCubic,
            "inoutcubic" | "easeinoutcubic" => Self::InOutCubic,
            "bounce" | "bounceout" => Self::BounceOut,
            "elastic" | "elasticout" => Self::ElasticOut,
            "back" | "backout" | "anticipate" => Self::BackOut,
            _ => return None,
        })
    }

    /// Apply this easing function to normalized progress `p`, clamped to `[0, 1]` first.
    pub fn apply(self, p: f64) -> f64 {
        self.apply_unclamped(p.clamp(0.0, 1.0))
    }

    /// Apply the raw formula without clamping. Used when extrapolation is requested.
    pub fn apply_unclamped(self, p: f64) -> f64 {
        match self {
            Self::Linear => p,
            Self::EaseIn => p * p,
            Self::EaseOut => 1.0 - (1.0 - p) * (1.0 - p),
            Self::EaseInOut => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    1.0 - ((-2.0 * p + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => p * p * p,
            Self::OutCubic => 1.0 - (1.0 - p).powi(3),
            Self::InOutCubic => {
                if p < 0.5 {
                    4.0 * p * p * p
                } else {
                    1.0 - ((-2.0 * p + 2.0).powi(3) / 2.0)
                }
            }
            Self::BounceOut => bounce_out(p),
            Self::ElasticOut => elastic_out(p),
            Self::BackOut => back_out(p),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier_ease(p, x1, y1, x2, y2),
        }
    }
}

fn bounce_out(p: f64) -> f64 {
    if p < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * p * p
    } else if p < 2.0 / BOUNCE_D1 {
        let p = p - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * p * p + 0.75
    } else if p < 2.5 / BOUNCE_D1 {
        let p = p - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * p * p + 0.9375
    } else {
        let p = p - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * p * p + 0.984375
    }
}

fn elastic_out(p: f64) -> f64 {
    if p == 0.0 || p == 1.0 {
        return p;
    }
    2f64.powf(-10.0 * p) * ((p - 0.1) * 5.0 * PI).sin() + 1.0
}

fn back_out(p: f64) -> f64 {
    let q = p - 1.0;
    1.0 + BACK_C3 * q.powi(3) + BACK_C1 * q.powi(2)
}

fn cubic_bezier_ease(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    // Given x in [0,1], solve u such that bx(u)=x, then return by(u).
    fn sample_curve(a1: f64, a2: f64, t: f64) -> f64 {
        let omt = 1.0 - t;
        3.0 * omt * omt * t * a1 + 3.0 * omt * t * t * a2 + t * t * t
    }
    fn sample_curve_derivative(a1: f64, a2: f64, t: f64) -> f64 {
        let omt = 1.0 - t;
        3.0 * omt * omt * a1 + 6.0 * omt * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
    }

    // Bracket with bisection, then polish with a few Newton steps. Fixed iteration counts.
    let mut lo = 0.0;
    let mut hi = 1.0;
    for _ in 0..20 {
        let mid = 0.5 * (lo + hi);
        if sample_curve(x1, x2, mid) < x {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let mut t = 0.5 * (lo + hi);
    for _ in 0..4 {
        let x_t = sample_curve(x1, x2, t) - x;
        let d = sample_curve_derivative(x1, x2, t);
        if d.abs() < 1e-7 {
            break;
        }
        t = (t - x_t / d).clamp(0.0, 1.0);
    }

    sample_curve(y1, y2, t)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
