//! The closed symbol table scene code runs against.
//!
//! A [`CapabilityContext`] owns a Rhai engine built from scratch: the standard value packages
//! (arithmetic, strings, arrays, maps, math) plus the functions listed in [`CAPABILITIES`].
//! Modules, `eval` and clocks are unavailable, and undeclared variables fail at compile time.

use crate::animation::ease::Easing;
use crate::animation::interpolate::InterpolateOptions;
use crate::animation::stagger::StaggerPattern;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{MotionError, MotionResult};
use crate::sandbox::convert::{ScriptResult, count, num, script_err, to_script_value};
use crate::sandbox::kits::{
    curve_options, easing_by_name, interpolate_at, pattern_by_name, register_animation_kit,
    register_layout_kit, spring_spec,
};
use crate::scene::visual::DIAGNOSTIC_NODE_TYPE;
use crate::timeline::sequencer::TimelineConfig;
use rhai::module_resolvers::DummyModuleResolver;
use rhai::packages::{Package, StandardPackage};
use rhai::{Array, Dynamic, Engine, FLOAT, INT, Map, NativeCallContext};
use CapabilityGroup::{Animation, Drawing, Frame, Layout, Logging};

/// `tracing` target of every event emitted by scene code.
pub const SCENE_LOG_TARGET: &str = "motionbox::scene";

/// Smallest accepted [`SandboxLimits::stack_size`].
const MIN_STACK_SIZE: usize = 1024 * 1024;

/// Resource ceilings applied to every script call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SandboxLimits {
    /// Operation budget per call (load-time body or one render).
    pub max_operations: u64,
    /// Maximum function call nesting.
    pub max_call_levels: usize,
    /// Maximum expression nesting at global level.
    pub max_expr_depth: usize,
    /// Maximum expression nesting inside functions.
    pub max_function_expr_depth: usize,
    /// Maximum string length, in bytes.
    pub max_string_size: usize,
    /// Maximum array length, nested arrays included. Also caps counts passed to layout helpers.
    pub max_array_size: usize,
    /// Maximum number of map entries, nested maps included.
    pub max_map_size: usize,
    /// Maximum container nesting of a returned visual tree.
    pub max_tree_depth: usize,
    /// Stack reserved for every thread that runs scene code, in bytes.
    ///
    /// Nested values are dropped, compared and converted recursively, so nesting depth (bounded
    /// by `max_array_size + max_map_size`) must fit in this stack.
    pub stack_size: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            max_operations: 1_000_000,
            max_call_levels: 48,
            max_expr_depth: 64,
            max_function_expr_depth: 32,
            max_string_size: 64 * 1024,
            max_array_size: 4_096,
            max_map_size: 8_192,
            max_tree_depth: 64,
            stack_size: 64 * 1024 * 1024,
        }
    }
}

impl SandboxLimits {
    fn apply(&self, engine: &mut Engine) {
        engine
            .set_max_operations(self.max_operations)
            .set_max_call_levels(self.max_call_levels)
            .set_max_expr_depths(self.max_expr_depth, self.max_function_expr_depth)
            .set_max_string_size(self.max_string_size)
            .set_max_array_size(self.max_array_size)
            .set_max_map_size(self.max_map_size);
    }
}

/// Everything a [`CapabilityContext`] is built from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CapabilityOptions {
    /// Output frame rate.
    pub fps: Fps,
    /// Output canvas.
    pub canvas: Canvas,
    /// Scene length, in frames.
    pub duration_frames: u64,
    /// Script resource ceilings.
    pub limits: SandboxLimits,
    /// Tag attached to every log event emitted by scene code.
    pub log_tag: String,
    /// Presentation constants for timeline helpers.
    pub timeline: TimelineConfig,
}

impl Default for CapabilityOptions {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            canvas: Canvas::default(),
            duration_frames: 300,
            limits: SandboxLimits::default(),
            log_tag: "scene".to_owned(),
            timeline: TimelineConfig::default(),
        }
    }
}

impl CapabilityOptions {
    /// Check option ranges.
    pub fn validate(&self) -> MotionResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(MotionError::validation("canvas width/height must be > 0"));
        }
        if self.duration_frames == 0 {
            return Err(MotionError::validation("duration_frames must be > 0"));
        }
        let limits = &self.limits;
        // Zero disables a limit in the engine.
        if limits.max_operations == 0
            || limits.max_call_levels == 0
            || limits.max_expr_depth == 0
            || limits.max_function_expr_depth == 0
            || limits.max_string_size == 0
            || limits.max_array_size == 0
            || limits.max_map_size == 0
            || limits.max_tree_depth == 0
        {
            return Err(MotionError::validation("limits must all be > 0"));
        }
        if limits.stack_size < MIN_STACK_SIZE {
            return Err(MotionError::validation(format!(
                "limits.stack_size must be >= {MIN_STACK_SIZE} bytes"
            )));
        }
        if self.log_tag.trim().is_empty() {
            return Err(MotionError::validation("log_tag must be non-empty"));
        }
        Ok(())
    }
}

/// Capability family, used to group the listing shown to generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityGroup {
    /// Frame and output configuration queries.
    Frame,
    /// Pure animation math.
    Animation,
    /// Placement helpers.
    Layout,
    /// Visual tree constructors.
    Drawing,
    /// Tagged log output.
    Logging,
}

/// One named primitive reachable from scene code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Capability {
    /// Name as written in scene code. Members of the entry arguments are prefixed.
    pub name: &'static str,
    /// Family.
    pub group: CapabilityGroup,
    /// Human-readable call forms.
    pub signature: &'static str,
}

const fn cap(name: &'static str, group: CapabilityGroup, signature: &'static str) -> Capability {
    Capability {
        name,
        group,
        signature,
    }
}

/// Every capability, in listing order.
pub const CAPABILITIES: &[Capability] = &[
    cap("current_frame", Frame, "current_frame()"),
    cap("fps", Frame, "fps()"),
    cap("video_config", Frame, "video_config()"),
    cap("interpolate", Animation, "interpolate(frame, input_range, output_range[, options])"),
    cap("spring", Animation, "spring(frame, options)"),
    cap("ease", Animation, "ease(name, p)"),
    cap("ease_in", Animation, "ease_in(p)"),
    cap("ease_out", Animation, "ease_out(p)"),
    cap("ease_in_out", Animation, "ease_in_out(p)"),
    cap("bounce_out", Animation, "bounce_out(p)"),
    cap("elastic_out", Animation, "elastic_out(p)"),
    cap("back_out", Animation, "back_out(p)"),
    cap("cubic_bezier", Animation, "cubic_bezier(x1, y1, x2, y2, p)"),
    cap("stagger_delay", Animation, "stagger_delay(index, count, step[, pattern])"),
    cap("animations.frame", Animation, "animations.frame"),
    cap("animations.fps", Animation, "animations.fps"),
    cap("animations.time", Animation, "animations.time"),
    cap("animations.progress", Animation, "animations.progress(start, duration)"),
    cap("animations.fade_in", Animation, "animations.fade_in(start, duration[, easing])"),
    cap("animations.fade_out", Animation, "animations.fade_out(start, duration[, easing])"),
    cap("animations.slide_in", Animation, "animations.slide_in(start, duration, distance)"),
    cap("animations.scale_in", Animation, "animations.scale_in(start, duration)"),
    cap("animations.interpolate", Animation, "animations.interpolate(input_range, output_range[, options])"),
    cap("animations.animate", Animation, "animations.animate(#{start, end|duration, from, to, easing})"),
    cap("animations.spring", Animation, "animations.spring([options])"),
    cap("animations.stagger", Animation, "animations.stagger(index, count, step[, pattern])"),
    cap("animations.item", Animation, "animations.item(#{id, start_frame, duration, exit_frame, exit_duration, animation})"),
    cap("animations.timeline", Animation, "animations.timeline([items])"),
    cap("layout.width", Layout, "layout.width"),
    cap("layout.height", Layout, "layout.height"),
    cap("layout.bounds", Layout, "layout.bounds()"),
    cap("layout.inset", Layout, "layout.inset(padding)"),
    cap("layout.center", Layout, "layout.center(width, height)"),
    cap("layout.grid", Layout, "layout.grid(count, columns[, gap])"),
    cap("layout.row", Layout, "layout.row(count, gap)"),
    cap("layout.column", Layout, "layout.column(count, gap)"),
    cap("node", Drawing, "node(type, props, children)"),
    cap("rect", Drawing, "rect(props)"),
    cap("circle", Drawing, "circle(props)"),
    cap("text", Drawing, "text(content, props)"),
    cap("image", Drawing, "image(src, props)"),
    cap("line", Drawing, "line(props)"),
    cap("group", Drawing, "group([props,] children)"),
    cap("log", Logging, "log([level,] message)"),
    cap("print", Logging, "print(message)"),
    cap("debug", Logging, "debug(value)"),
];

/// Closed, read-only capability set shared by every frame of a scene.
pub struct CapabilityContext {
    options: CapabilityOptions,
    engine: Engine,
}

impl std::fmt::Debug for CapabilityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityContext")
            .field("options", &self.options)
            .field("capabilities", &CAPABILITIES.len())
            .finish_non_exhaustive()
    }
}

impl CapabilityContext {
    /// Build the engine and its symbol table. Runs once per scene, never per frame.
    #[tracing::instrument(skip_all, fields(log_tag = %options.log_tag))]
    pub fn build(options: CapabilityOptions) -> MotionResult<Self> {
        options.validate()?;

        let mut engine = Engine::new_raw();
        engine.register_global_module(StandardPackage::new().as_shared_module());
        engine
            .set_module_resolver(DummyModuleResolver::new())
            .set_strict_variables(true);
        for symbol in ["eval", "import", "export"] {
            engine.disable_symbol(symbol);
        }
        options.limits.apply(&mut engine);

        register_frame(&mut engine, &options);
        register_animation(&mut engine, options.fps);
        register_drawing(&mut engine);
        register_logging(&mut engine, &options.log_tag);
        register_animation_kit(&mut engine);
        register_layout_kit(&mut engine, options.limits.max_array_size);

        tracing::debug!(capabilities = CAPABILITIES.len(), "capability context built");
        Ok(Self { options, engine })
    }

    /// Capability names, in listing order.
    pub fn names(&self) -> Vec<&'static str> {
        CAPABILITIES.iter().map(|c| c.name).collect()
    }

    /// Full capability table.
    pub fn capabilities(&self) -> &'static [Capability] {
        CAPABILITIES
    }

    /// Return `true` when `name` is part of the table.
    pub fn contains(&self, name: &str) -> bool {
        CAPABILITIES.iter().any(|c| c.name == name)
    }

    /// Options this context was built from.
    pub fn options(&self) -> &CapabilityOptions {
        &self.options
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }
}

fn register_frame(engine: &mut Engine, options: &CapabilityOptions) {
    engine.register_fn("current_frame", |ctx: NativeCallContext| -> ScriptResult<INT> {
        // The frame travels as the call tag; load-time evaluation has none.
        ctx.tag()
            .and_then(|t| t.as_int().ok())
            .ok_or_else(|| script_err("current_frame() is only available while rendering a frame"))
    });

    let fps = options.fps;
    engine.register_fn("fps", move || fps.as_f64() as FLOAT);

    let config = serde_json::json!({
        "fps": options.fps.as_f64(),
        "width": options.canvas.width,
        "height": options.canvas.height,
        "duration_frames": options.duration_frames,
    });
    engine.register_fn("video_config", move || -> ScriptResult<Dynamic> {
        to_script_value(&config)
    });
}

fn register_animation(engine: &mut Engine, fps: Fps) {
    engine.register_fn(
        "interpolate",
        |frame: Dynamic, input: Array, output: Array| -> ScriptResult<FLOAT> {
            interpolate_at(
                num(&frame, "interpolate frame")?,
                &input,
                &output,
                InterpolateOptions::default(),
            )
        },
    );
    engine.register_fn(
        "interpolate",
        |frame: Dynamic, input: Array, output: Array, opts: Map| -> ScriptResult<FLOAT> {
            interpolate_at(num(&frame, "interpolate frame")?, &input, &output, curve_options(opts)?)
        },
    );
    engine.register_fn(
        "spring",
        move |frame: Dynamic, opts: Map| -> ScriptResult<FLOAT> {
            let spec = spring_spec(opts)?;
            spec.config
                .validate()
                .map_err(|e| script_err(e.to_string()))?;
            Ok(spec.value_at(num(&frame, "spring frame")?, fps))
        },
    );

    engine.register_fn("ease", |name: &str, p: Dynamic| -> ScriptResult<FLOAT> {
        Ok(easing_by_name(name)?.apply(num(&p, "ease progress")?))
    });
    let named = [
        ("ease_in", Easing::EaseIn),
        ("ease_out", Easing::EaseOut),
        ("ease_in_out", Easing::EaseInOut),
        ("bounce_out", Easing::BounceOut),
        ("elastic_out", Easing::ElasticOut),
        ("back_out", Easing::BackOut),
    ];
    for (name, easing) in named {
        engine.register_fn(name, move |p: Dynamic| -> ScriptResult<FLOAT> {
            Ok(easing.apply(num(&p, "easing progress")?))
        });
    }
    engine.register_fn(
        "cubic_bezier",
        |x1: Dynamic, y1: Dynamic, x2: Dynamic, y2: Dynamic, p: Dynamic| -> ScriptResult<FLOAT> {
            let easing = Easing::CubicBezier {
                x1: num(&x1, "cubic_bezier x1")?.clamp(0.0, 1.0),
                y1: num(&y1, "cubic_bezier y1")?,
                x2: num(&x2, "cubic_bezier x2")?.clamp(0.0, 1.0),
                y2: num(&y2, "cubic_bezier y2")?,
            };
            Ok(easing.apply(num(&p, "cubic_bezier progress")?))
        },
    );

    engine.register_fn(
        "stagger_delay",
        |index: Dynamic, total: Dynamic, step: Dynamic| -> ScriptResult<FLOAT> {
            stagger(&index, &total, &step, StaggerPattern::Sequential)
        },
    );
    engine.register_fn(
        "stagger_delay",
        |index: Dynamic, total: Dynamic, step: Dynamic, pattern: &str| -> ScriptResult<FLOAT> {
            stagger(&index, &total, &step, pattern_by_name(pattern)?)
        },
    );
}

fn stagger(
    index: &Dynamic,
    total: &Dynamic,
    step: &Dynamic,
    pattern: StaggerPattern,
) -> ScriptResult<FLOAT> {
    Ok(crate::animation::stagger::stagger_delay(
        count(index, "stagger index")?,
        count(total, "stagger count")?,
        pattern,
        num(step, "stagger step")?,
    ))
}

/// `{type, props, children}` node map.
fn node(kind: &str, props: Map, children: Array) -> ScriptResult<Map> {
    if kind.trim().is_empty() {
        return Err(script_err("node type must be non-empty"));
    }
    if kind == DIAGNOSTIC_NODE_TYPE {
        return Err(script_err(format!("node type '{kind}' is reserved")));
    }
    let mut m = Map::new();
    m.insert("type".into(), Dynamic::from(kind.to_owned()));
    m.insert("props".into(), Dynamic::from_map(props));
    m.insert("children".into(), Dynamic::from_array(children));
    Ok(m)
}

fn register_drawing(engine: &mut Engine) {
    engine.register_fn("node", node);
    for kind in ["rect", "circle", "line"] {
        engine.register_fn(kind, move |props: Map| node(kind, props, Array::new()));
    }
    engine.register_fn(
        "text",
        |content: Dynamic, mut props: Map| -> ScriptResult<Map> {
            props.insert("text".into(), Dynamic::from(content.to_string()));
            node("text", props, Array::new())
        },
    );
    engine.register_fn("image", |src: &str, mut props: Map| -> ScriptResult<Map> {
        props.insert("src".into(), Dynamic::from(src.to_owned()));
        node("image", props, Array::new())
    });
    engine.register_fn("group", |children: Array| -> ScriptResult<Map> {
        node("group", Map::new(), children)
    });
    engine.register_fn("group", |props: Map, children: Array| -> ScriptResult<Map> {
        node("group", props, children)
    });
}

fn emit(tag: &str, level: &str, msg: &str) {
    match level.trim().to_ascii_lowercase().as_str() {
        "error" => tracing::error!(target: SCENE_LOG_TARGET, tag, "{msg}"),
        "warn" | "warning" => tracing::warn!(target: SCENE_LOG_TARGET, tag, "{msg}"),
        "debug" => tracing::debug!(target: SCENE_LOG_TARGET, tag, "{msg}"),
        "trace" => tracing::trace!(target: SCENE_LOG_TARGET, tag, "{msg}"),
        _ => tracing::info!(target: SCENE_LOG_TARGET, tag, "{msg}"),
    }
}

fn register_logging(engine: &mut Engine, log_tag: &str) {
    let tag = log_tag.to_owned();
    engine.register_fn("log", move |msg: Dynamic| emit(&tag, "info", &msg.to_string()));
    let tag = log_tag.to_owned();
    engine.register_fn("log", move |level: &str, msg: Dynamic| {
        emit(&tag, level, &msg.to_string())
    });

    let tag = log_tag.to_owned();
    engine.on_print(move |s| emit(&tag, "info", s));
    let tag = log_tag.to_owned();
    engine.on_debug(move |s, _src, pos| {
        tracing::debug!(target: SCENE_LOG_TARGET, tag = %tag, position = %pos, "{s}")
    });
}

#[cfg(test)]
#[path = "../../tests/unit/sandbox/capability.rs"]
mod tests;
