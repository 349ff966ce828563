//! Helper objects handed to the entry as its `animations` and `layout` arguments.
//!
//! Both are plain values built fresh for every call. The animation kit carries the frame being
//! rendered, so every helper on it is a pure function of that frame.

use crate::animation::ease::Easing;
use crate::animation::interpolate::{
    AnimationSpec, BoundaryPolicy, Extrapolate, InterpolateOptions, interpolate,
};
use crate::animation::spring::{SpringConfig, SpringSpec};
use crate::animation::stagger::{StaggerPattern, stagger_delay};
use crate::foundation::core::{Canvas, Fps};
use crate::layout;
use crate::sandbox::convert::{
    ScriptResult, bounded_count, count, num, num_list, parse, script_err, to_script_value,
};
use crate::timeline::sequencer::{Timeline, TimelineConfig, TimelineItem, annotate};
use kurbo::{Rect, Size};
use rhai::{Array, Dynamic, FLOAT, INT, Map};

/// Frame-bound animation helpers (`animations` argument).
#[derive(Clone, Debug)]
pub struct AnimationKit {
    frame: u64,
    fps: Fps,
    timeline: TimelineConfig,
}

/// Script-facing options for `interpolate` and `animate`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CurveOpts {
    easing: Option<String>,
    extrapolate: Option<String>,
    extrapolate_left: Option<String>,
    extrapolate_right: Option<String>,
}

impl CurveOpts {
    fn resolve(&self) -> ScriptResult<InterpolateOptions> {
        let easing = match &self.easing {
            Some(name) => easing_by_name(name)?,
            None => Easing::Linear,
        };
        let both = match &self.extrapolate {
            Some(name) => extrapolate_by_name(name)?,
            None => Extrapolate::Clamp,
        };
        let side = |v: &Option<String>| match v {
            Some(name) => extrapolate_by_name(name),
            None => Ok(both),
        };
        Ok(InterpolateOptions {
            easing,
            boundary: BoundaryPolicy {
                left: side(&self.extrapolate_left)?,
                right: side(&self.extrapolate_right)?,
            },
        })
    }
}

/// Script-facing `animate` spec: either `end` or `duration` bounds the window.
#[derive(Debug, serde::Deserialize)]
struct AnimateSpec {
    #[serde(default)]
    start: f64,
    end: Option<f64>,
    duration: Option<f64>,
    #[serde(default)]
    from: f64,
    #[serde(default = "one")]
    to: f64,
    #[serde(flatten)]
    curve: CurveOpts,
}

/// Script-facing spring options.
#[derive(Debug, serde::Deserialize)]
struct SpringOpts {
    #[serde(default, alias = "delay")]
    start: f64,
    #[serde(default)]
    from: f64,
    #[serde(default = "one")]
    to: f64,
    #[serde(flatten)]
    config: SpringConfig,
}

fn one() -> f64 {
    1.0
}

/// Resolve an easing name, reporting unknown names to the scene.
pub(crate) fn easing_by_name(name: &str) -> ScriptResult<Easing> {
    Easing::from_name(name).ok_or_else(|| script_err(format!("unknown easing '{name}'")))
}

fn extrapolate_by_name(name: &str) -> ScriptResult<Extrapolate> {
    Extrapolate::from_name(name)
        .ok_or_else(|| script_err(format!("unknown extrapolation '{name}'")))
}

pub(crate) fn pattern_by_name(name: &str) -> ScriptResult<StaggerPattern> {
    StaggerPattern::from_name(name)
        .ok_or_else(|| script_err(format!("unknown stagger pattern '{name}'")))
}

impl AnimationKit {
    /// Kit bound to `frame`.
    pub fn new(frame: u64, fps: Fps, timeline: TimelineConfig) -> Self {
        Self {
            frame,
            fps,
            timeline,
        }
    }

    /// Frame the kit is bound to.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn f(&self) -> f64 {
        self.frame as f64
    }

    /// Value over `[start, start + duration]` from `from` to `to`, clamped outside.
    fn window(
        &self,
        start: f64,
        duration: f64,
        from: f64,
        to: f64,
        easing: Easing,
    ) -> ScriptResult<f64> {
        let spec = AnimationSpec::with_duration(start, duration.max(0.0), from, to)
            .map_err(|e| script_err(e.to_string()))?
            .with_easing(easing);
        Ok(spec.value_at(self.f()))
    }

    /// Linear progress through `[start, start + duration]`.
    pub fn progress(&self, start: f64, duration: f64) -> ScriptResult<f64> {
        self.window(start, duration, 0.0, 1.0, Easing::Linear)
    }

    /// Opacity ramp 0 to 1.
    pub fn fade_in(&self, start: f64, duration: f64, easing: Easing) -> ScriptResult<f64> {
        self.window(start, duration, 0.0, 1.0, easing)
    }

    /// Opacity ramp 1 to 0.
    pub fn fade_out(&self, start: f64, duration: f64, easing: Easing) -> ScriptResult<f64> {
        self.window(start, duration, 1.0, 0.0, easing)
    }

    /// Offset ramp from `distance` to 0.
    pub fn slide_in(&self, start: f64, duration: f64, distance: f64) -> ScriptResult<f64> {
        self.window(start, duration, distance, 0.0, Easing::OutCubic)
    }

    /// Scale ramp from the timeline's `scale_from` to 1, with overshoot.
    pub fn scale_in(&self, start: f64, duration: f64) -> ScriptResult<f64> {
        self.window(start, duration, self.timeline.scale_from, 1.0, Easing::BackOut)
    }

    /// Spring value at the kit's frame.
    pub fn spring(&self, spec: &SpringSpec) -> ScriptResult<f64> {
        spec.config.validate().map_err(|e| script_err(e.to_string()))?;
        Ok(spec.value_at(self.f(), self.fps))
    }

    /// Delay in frames for item `index` of `count`.
    pub fn stagger(&self, index: usize, count: usize, step: f64, pattern: StaggerPattern) -> f64 {
        stagger_delay(index, count, pattern, step)
    }
}

/// Register the `AnimationKit` type and its methods.
pub(crate) fn register_animation_kit(engine: &mut rhai::Engine) {
    engine.register_type_with_name::<AnimationKit>("AnimationKit");
    engine.register_get("frame", |k: &mut AnimationKit| k.frame as INT);
    engine.register_get("fps", |k: &mut AnimationKit| k.fps.as_f64() as FLOAT);
    engine.register_get("time", |k: &mut AnimationKit| {
        k.fps.frames_to_secs(k.f()) as FLOAT
    });

    engine.register_fn(
        "progress",
        |k: &mut AnimationKit, start: Dynamic, duration: Dynamic| -> ScriptResult<FLOAT> {
            k.progress(num(&start, "progress start")?, num(&duration, "progress duration")?)
        },
    );
    engine.register_fn(
        "fade_in",
        |k: &mut AnimationKit, start: Dynamic, duration: Dynamic| -> ScriptResult<FLOAT> {
            k.fade_in(num(&start, "fade_in start")?, num(&duration, "fade_in duration")?, Easing::EaseOut)
        },
    );
    engine.register_fn(
        "fade_in",
        |k: &mut AnimationKit, start: Dynamic, duration: Dynamic, easing: &str| -> ScriptResult<FLOAT> {
            k.fade_in(
                num(&start, "fade_in start")?,
                num(&duration, "fade_in duration")?,
                easing_by_name(easing)?,
            )
        },
    );
    engine.register_fn(
        "fade_out",
        |k: &mut AnimationKit, start: Dynamic, duration: Dynamic| -> ScriptResult<FLOAT> {
            k.fade_out(num(&start, "fade_out start")?, num(&duration, "fade_out duration")?, Easing::EaseIn)
        },
    );
    engine.register_fn(
        "fade_out",
        |k: &mut AnimationKit, start: Dynamic, duration: Dynamic, easing: &str| -> ScriptResult<FLOAT> {
            k.fade_out(
                num(&start, "fade_out start")?,
                num(&duration, "fade_out duration")?,
                easing_by_name(easing)?,
            )
        },
    );
    engine.register_fn(
        "slide_in",
        |k: &mut AnimationKit, start: Dynamic, duration: Dynamic, distance: Dynamic| -> ScriptResult<FLOAT> {
            k.slide_in(
                num(&start, "slide_in start")?,
                num(&duration, "slide_in duration")?,
                num(&distance, "slide_in distance")?,
            )
        },
    );
    engine.register_fn(
        "scale_in",
        |k: &mut AnimationKit, start: Dynamic, duration: Dynamic| -> ScriptResult<FLOAT> {
            k.scale_in(num(&start, "scale_in start")?, num(&duration, "scale_in duration")?)
        },
    );

    engine.register_fn(
        "interpolate",
        |k: &mut AnimationKit, input: Array, output: Array| -> ScriptResult<FLOAT> {
            interpolate_at(k.f(), &input, &output, InterpolateOptions::default())
        },
    );
    engine.register_fn(
        "interpolate",
        |k: &mut AnimationKit, input: Array, output: Array, opts: Map| -> ScriptResult<FLOAT> {
            interpolate_at(k.f(), &input, &output, curve_options(opts)?)
        },
    );
    engine.register_fn(
        "animate",
        |k: &mut AnimationKit, spec: Map| -> ScriptResult<FLOAT> {
            let spec: AnimateSpec = parse(&Dynamic::from_map(spec), "animate")?;
            let end = match (spec.end, spec.duration) {
                (Some(end), _) => end,
                (None, Some(d)) => spec.start + d,
                (None, None) => return Err(script_err("animate: expected `end` or `duration`")),
            };
            let opts = spec.curve.resolve()?;
            let anim = AnimationSpec::new(spec.start, end, spec.from, spec.to)
                .map_err(|e| script_err(e.to_string()))?
                .with_easing(opts.easing)
                .with_boundary(opts.boundary);
            Ok(anim.value_at(k.f()))
        },
    );

    engine.register_fn("spring", |k: &mut AnimationKit| -> ScriptResult<FLOAT> {
        k.spring(&SpringSpec::default())
    });
    engine.register_fn(
        "spring",
        |k: &mut AnimationKit, opts: Map| -> ScriptResult<FLOAT> {
            k.spring(&spring_spec(opts)?)
        },
    );

    engine.register_fn(
        "stagger",
        |k: &mut AnimationKit, index: Dynamic, total: Dynamic, step: Dynamic| -> ScriptResult<FLOAT> {
            Ok(k.stagger(
                count(&index, "stagger index")?,
                count(&total, "stagger count")?,
                num(&step, "stagger step")?,
                StaggerPattern::Sequential,
            ))
        },
    );
    engine.register_fn(
        "stagger",
        |k: &mut AnimationKit, index: Dynamic, total: Dynamic, step: Dynamic, pattern: &str| -> ScriptResult<FLOAT> {
            Ok(k.stagger(
                count(&index, "stagger index")?,
                count(&total, "stagger count")?,
                num(&step, "stagger step")?,
                pattern_by_name(pattern)?,
            ))
        },
    );

    engine.register_fn(
        "item",
        |k: &mut AnimationKit, spec: Map| -> ScriptResult<Dynamic> {
            let item: TimelineItem = parse(&Dynamic::from_map(spec), "timeline item")?;
            item.validate().map_err(|e| script_err(e.to_string()))?;
            item_state(k, &item)
        },
    );
    engine.register_fn(
        "timeline",
        |k: &mut AnimationKit, items: Array| -> ScriptResult<Array> {
            let items = items
                .iter()
                .map(|d| parse::<TimelineItem>(d, "timeline item"))
                .collect::<ScriptResult<Vec<_>>>()?;
            let timeline =
                Timeline::new(items, k.timeline).map_err(|e| script_err(e.to_string()))?;
            timeline
                .visible_at(k.frame)
                .iter()
                .map(to_script_value)
                .collect()
        },
    );
}

/// `interpolate` over script arrays.
pub(crate) fn interpolate_at(
    input: f64,
    input_range: &Array,
    output_range: &Array,
    opts: InterpolateOptions,
) -> ScriptResult<FLOAT> {
    let input_range = num_list(input_range, "interpolate input range")?;
    let output_range = num_list(output_range, "interpolate output range")?;
    interpolate(input, &input_range, &output_range, opts).map_err(|e| script_err(e.to_string()))
}

/// Decode a script options map for `interpolate`.
pub(crate) fn curve_options(opts: Map) -> ScriptResult<InterpolateOptions> {
    let opts: CurveOpts = parse(&Dynamic::from_map(opts), "interpolate options")?;
    opts.resolve()
}

/// Decode a script options map for `spring`.
pub(crate) fn spring_spec(opts: Map) -> ScriptResult<SpringSpec> {
    let opts: SpringOpts = parse(&Dynamic::from_map(opts), "spring options")?;
    Ok(SpringSpec {
        start_frame: opts.start,
        from: opts.from,
        to: opts.to,
        config: opts.config,
    })
}

/// State map of a single item: the visible-set annotation, or `visible: false` with its state.
fn item_state(k: &AnimationKit, item: &TimelineItem) -> ScriptResult<Dynamic> {
    let json = match annotate(item, k.frame, &k.timeline) {
        Some(v) => {
            let mut value = serde_json::to_value(&v).map_err(|e| script_err(e.to_string()))?;
            if let Some(obj) = value.as_object_mut() {
                obj.insert("visible".into(), true.into());
            }
            value
        }
        None => serde_json::json!({
            "id": item.id,
            "content_ref": item.content_ref,
            "state": item.state_at(k.frame),
            "visible": false,
            "opacity": 0.0,
        }),
    };
    to_script_value(&json)
}

/// Placement helpers over a rectangular area (`layout` argument).
#[derive(Clone, Debug)]
pub struct LayoutKit {
    area: Rect,
}

/// Script-facing rectangle.
#[derive(serde::Serialize)]
struct Frame {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl From<Rect> for Frame {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x0,
            y: r.y0,
            width: r.width(),
            height: r.height(),
        }
    }
}

impl LayoutKit {
    /// Kit covering the whole canvas.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            area: canvas.rect(),
        }
    }

    /// Area the kit places into.
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Same kit shrunk by `padding` on every side.
    pub fn inset(&self, padding: f64) -> Self {
        Self {
            area: layout::inset(self.area, padding),
        }
    }
}

fn frame_map(r: Rect) -> ScriptResult<Dynamic> {
    to_script_value(&Frame::from(r))
}

fn frame_list(rects: Vec<Rect>) -> ScriptResult<Array> {
    rects.into_iter().map(frame_map).collect()
}

/// Register the `LayoutKit` type and its methods.
pub(crate) fn register_layout_kit(engine: &mut rhai::Engine, max_items: usize) {
    engine.register_type_with_name::<LayoutKit>("LayoutKit");
    engine.register_get("width", |k: &mut LayoutKit| k.area.width() as FLOAT);
    engine.register_get("height", |k: &mut LayoutKit| k.area.height() as FLOAT);

    engine.register_fn("bounds", |k: &mut LayoutKit| -> ScriptResult<Dynamic> {
        frame_map(k.area)
    });
    engine.register_fn(
        "inset",
        |k: &mut LayoutKit, padding: Dynamic| -> ScriptResult<LayoutKit> {
            Ok(k.inset(num(&padding, "inset padding")?))
        },
    );
    engine.register_fn(
        "center",
        |k: &mut LayoutKit, width: Dynamic, height: Dynamic| -> ScriptResult<Dynamic> {
            let size = Size::new(num(&width, "center width")?, num(&height, "center height")?);
            frame_map(layout::center(k.area, size))
        },
    );
    engine.register_fn(
        "grid",
        move |k: &mut LayoutKit, n: Dynamic, columns: Dynamic| -> ScriptResult<Array> {
            frame_list(layout::grid(
                k.area,
                bounded_count(&n, "grid count", max_items)?,
                count(&columns, "grid columns")?,
                0.0,
            ))
        },
    );
    engine.register_fn(
        "grid",
        move |k: &mut LayoutKit, n: Dynamic, columns: Dynamic, gap: Dynamic| -> ScriptResult<Array> {
            frame_list(layout::grid(
                k.area,
                bounded_count(&n, "grid count", max_items)?,
                count(&columns, "grid columns")?,
                num(&gap, "grid gap")?,
            ))
        },
    );
    engine.register_fn(
        "row",
        move |k: &mut LayoutKit, n: Dynamic, gap: Dynamic| -> ScriptResult<Array> {
            frame_list(layout::row(
                k.area,
                bounded_count(&n, "row count", max_items)?,
                num(&gap, "row gap")?,
            ))
        },
    );
    engine.register_fn(
        "column",
        move |k: &mut LayoutKit, n: Dynamic, gap: Dynamic| -> ScriptResult<Array> {
            frame_list(layout::column(
                k.area,
                bounded_count(&n, "column count", max_items)?,
                num(&gap, "column gap")?,
            ))
        },
    );
}

#[cfg(test)]
#[path = "../../tests/unit/sandbox/kits.rs"]
mod tests;
