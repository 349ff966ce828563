use super::*;
use crate::foundation::error::ErrorKind;

const STAGGERED: &str = r#"
fn render(props, colors, animations, layout) {
    let cells = layout.inset(40).row(props.count, 16);
    let nodes = [];
    for i in 0..props.count {
        let d = animations.stagger(i, props.count, 4, "from_center");
        let o = animations.fade_in(d, 12);
        nodes.push(rect(#{ x: cells[i].x, opacity: o, fill: colors.primary }));
    }
    group(nodes)
}
"#;

fn session(code: &str, opts: SessionOpts) -> SceneSession {
    let source = SceneSource::new("s", code).with_props(serde_json::json!({"count": 5}));
    let options = CapabilityOptions {
        duration_frames: 48,
        ..CapabilityOptions::default()
    };
    SceneSession::new(source, options, opts).unwrap()
}

fn range(start: u64, end: u64) -> FrameRange {
    FrameRange::new(FrameIndex(start), FrameIndex(end)).unwrap()
}

#[test]
fn parallel_output_matches_sequential() {
    let seq = session(STAGGERED, SessionOpts::default());
    let par = session(
        STAGGERED,
        SessionOpts {
            parallel: true,
            threads: Some(3),
        },
    );
    let a = seq.render_range(range(0, 48)).unwrap();
    let b = par.render_range(range(0, 48)).unwrap();
    assert_eq!(a.len(), 48);
    assert_eq!(a, b);
    assert!(a.iter().all(|o| !o.is_diagnostic()));
}

#[test]
fn out_of_order_frames_match_range_output() {
    let s = session(STAGGERED, SessionOpts::default());
    let all = s.render_range(range(0, 20)).unwrap();
    for f in [19_u64, 3, 11, 0, 3] {
        assert_eq!(s.render_frame(FrameIndex(f)).unwrap(), all[f as usize]);
    }
}

#[test]
fn frames_are_bounded_by_duration() {
    let s = session(STAGGERED, SessionOpts::default());
    assert!(s.render_frame(FrameIndex(48)).is_err());
    assert!(s.render_range(range(40, 49)).is_err());
    assert!(s.render_range(range(5, 5)).is_err());
    let zero_threads = session(
        STAGGERED,
        SessionOpts {
            parallel: true,
            threads: Some(0),
        },
    );
    assert!(zero_threads.render_range(range(0, 2)).is_err());
}

#[test]
fn load_failures_become_diagnostics_with_capabilities() {
    let s = session("fn render(p, c, a, l) { window.alert(1) }", SessionOpts::default());
    assert!(s.factory().is_none());
    let diag = s.load_diagnostic().unwrap();
    assert_eq!(diag.kind, ErrorKind::ValidationRejected);
    assert_eq!(diag.pattern.as_deref(), Some("global-object"));
    assert!(diag.available_capabilities.iter().any(|n| n == "rect"));

    let out = s.render_frame(FrameIndex(0)).unwrap();
    assert_eq!(out.diagnostic(), Some(&diag));
}

#[test]
fn cached_sessions_share_the_factory() {
    let ctx = Arc::new(CapabilityContext::build(CapabilityOptions::default()).unwrap());
    let cache = FactoryCache::new();
    let source = SceneSource::new("s", STAGGERED).with_props(serde_json::json!({"count": 2}));
    let a = SceneSession::with_cache(source.clone(), Arc::clone(&ctx), &cache, SessionOpts::default())
        .unwrap();
    let b = SceneSession::with_cache(source, ctx, &cache, SessionOpts::default()).unwrap();
    assert!(a.factory().is_some());
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(
        a.render_frame(FrameIndex(10)).unwrap(),
        b.render_frame(FrameIndex(10)).unwrap()
    );
}

#[test]
fn props_override_per_call() {
    let s = session(STAGGERED, SessionOpts::default());
    let out = s
        .render_frame_with_props(FrameIndex(30), &serde_json::json!({"count": 2}))
        .unwrap();
    let tree = out.into_tree().into_json();
    assert_eq!(tree["children"].as_array().map(Vec::len), Some(2));
}

#[test]
fn render_pools_use_named_script_sized_threads() {
    assert!(build_thread_pool(Some(0), 8 * 1024 * 1024).is_err());

    let pool = build_thread_pool(Some(2), 8 * 1024 * 1024).unwrap();
    assert_eq!(pool.current_num_threads(), 2);
    let name = pool.install(|| std::thread::current().name().map(str::to_owned));
    assert!(name.is_some_and(|n| n.starts_with("motionbox-render-")));
}
