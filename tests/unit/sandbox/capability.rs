use super::*;
use crate::sandbox::convert::to_json;

fn ctx() -> CapabilityContext {
    CapabilityContext::build(CapabilityOptions::default()).unwrap()
}

fn eval_json(ctx: &CapabilityContext, script: &str) -> serde_json::Value {
    let v = ctx.engine().eval::<Dynamic>(script).unwrap();
    to_json(&v).unwrap()
}

#[test]
fn names_are_ordered_and_unique() {
    let ctx = ctx();
    let names = ctx.names();
    assert_eq!(names.first(), Some(&"current_frame"));
    let mut dedup = names.clone();
    dedup.sort_unstable();
    dedup.dedup();
    assert_eq!(dedup.len(), names.len());
    assert!(ctx.contains("layout.grid"));
    assert!(!ctx.contains("fetch"));
}

#[test]
fn options_are_validated() {
    let bad_fps = CapabilityOptions {
        fps: Fps { num: 30, den: 0 },
        ..CapabilityOptions::default()
    };
    assert!(CapabilityContext::build(bad_fps).is_err());

    let bad_tag = CapabilityOptions {
        log_tag: " ".into(),
        ..CapabilityOptions::default()
    };
    assert!(bad_tag.validate().is_err());

    let zero_maps = CapabilityOptions {
        limits: SandboxLimits {
            max_map_size: 0,
            ..SandboxLimits::default()
        },
        ..CapabilityOptions::default()
    };
    assert!(zero_maps.validate().is_err());

    let tiny_stack = CapabilityOptions {
        limits: SandboxLimits {
            stack_size: 64 * 1024,
            ..SandboxLimits::default()
        },
        ..CapabilityOptions::default()
    };
    let err = tiny_stack.validate().unwrap_err();
    assert!(err.to_string().contains("stack_size"));

    let parsed: CapabilityOptions =
        serde_json::from_str(r#"{"duration_frames": 90, "limits": {"max_operations": 500}}"#)
            .unwrap();
    assert_eq!(parsed.duration_frames, 90);
    assert_eq!(parsed.limits.max_operations, 500);
    assert_eq!(parsed.limits.max_call_levels, 48);
    assert_eq!(parsed.fps, Fps::default());
}

#[test]
fn animation_globals_match_host_math() {
    let ctx = ctx();
    let engine = ctx.engine();
    assert_eq!(engine.eval::<FLOAT>("ease_out(0.5)").unwrap(), 0.75);
    assert_eq!(engine.eval::<FLOAT>("ease(\"ease-in\", 0.5)").unwrap(), 0.25);
    assert_eq!(
        engine.eval::<FLOAT>("interpolate(15, [10, 20], [0, 100])").unwrap(),
        50.0
    );
    assert_eq!(
        engine.eval::<FLOAT>("interpolate(30, [10, 20], [0, 100])").unwrap(),
        100.0
    );
    assert_eq!(
        engine
            .eval::<FLOAT>("interpolate(30, [10, 20], [0, 100], #{extrapolate: \"extend\"})")
            .unwrap(),
        200.0
    );
    assert_eq!(engine.eval::<FLOAT>("stagger_delay(3, 6, 5)").unwrap(), 15.0);
    assert_eq!(engine.eval::<FLOAT>("spring(0, #{})").unwrap(), 0.0);
    assert!(engine.eval::<FLOAT>("ease(\"wobble\", 0.5)").is_err());
}

#[test]
fn frame_queries() {
    let ctx = ctx();
    let cfg = eval_json(&ctx, "video_config()");
    assert_eq!(cfg["width"], 1920);
    assert_eq!(cfg["height"], 1080);
    assert_eq!(cfg["duration_frames"], 300);
    assert_eq!(ctx.engine().eval::<FLOAT>("fps()").unwrap(), 30.0);
    // Outside a render call there is no frame.
    assert!(ctx.engine().eval::<INT>("current_frame()").is_err());
}

#[test]
fn drawing_primitives_build_nodes() {
    let ctx = ctx();
    let tree = eval_json(
        &ctx,
        r#"group(#{ id: "root" }, [rect(#{ width: 10 }), text("Hi", #{ size: 32 })])"#,
    );
    assert_eq!(tree["type"], "group");
    assert_eq!(tree["props"]["id"], "root");
    assert_eq!(tree["children"][0]["type"], "rect");
    assert_eq!(tree["children"][1]["props"]["text"], "Hi");
    assert!(
        ctx.engine()
            .eval::<Dynamic>(r#"node("diagnostic", #{}, [])"#)
            .is_err()
    );
}

#[test]
fn closed_surface() {
    let ctx = ctx();
    let engine = ctx.engine();
    // Undeclared variables do not compile.
    assert!(engine.compile("let x = process_env;").is_err());
    // Unregistered functions fail when called.
    assert!(engine.eval::<Dynamic>(r#"open("/etc/passwd")"#).is_err());
    assert!(engine.eval::<Dynamic>(r#"eval("1 + 1")"#).is_err());
    assert!(engine.eval::<Dynamic>(r#"import "fs" as fs; 1"#).is_err());
}

#[test]
fn operation_budget_stops_runaway_loops() {
    let opts = CapabilityOptions {
        limits: SandboxLimits {
            max_operations: 10_000,
            ..SandboxLimits::default()
        },
        ..CapabilityOptions::default()
    };
    let ctx = CapabilityContext::build(opts).unwrap();
    assert!(ctx.engine().eval::<Dynamic>("loop { }").is_err());
}

#[test]
fn logging_is_available_and_returns_unit() {
    let ctx = ctx();
    let out = ctx
        .engine()
        .eval::<Dynamic>(r#"log("hello"); log("warn", 3); print("x"); 1"#)
        .unwrap();
    assert_eq!(out.as_int().unwrap(), 1);
}
