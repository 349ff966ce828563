use super::*;
use crate::foundation::error::ErrorKind;
use crate::sandbox::capability::CapabilityOptions;
use serde_json::json;

fn ctx() -> Arc<CapabilityContext> {
    Arc::new(CapabilityContext::build(CapabilityOptions::default()).unwrap())
}

fn load_code(code: &str) -> Result<SceneFactory, LoadError> {
    load(&SceneSource::new("test", code), ctx())
}

const TITLE: &str = r#"
fn render(props, colors, animations, layout) {
    let o = animations.fade_in(0, 10);
    text(props.title, #{ opacity: o, color: colors.text, frame: animations.frame })
}
"#;

#[test]
fn loads_and_renders() {
    let source = SceneSource::new("title", TITLE).with_props(json!({"title": "Hello"}));
    let factory = load(&source, ctx()).unwrap();
    assert_eq!(factory.id(), "title");

    let tree = factory.render(5, &serde_json::Value::Null).unwrap().into_json();
    assert_eq!(tree["type"], "text");
    assert_eq!(tree["props"]["text"], "Hello");
    assert_eq!(tree["props"]["opacity"], 0.75);
    assert_eq!(tree["props"]["frame"], 5);
    assert_eq!(tree["props"]["color"], "#f8fafc");
}

#[test]
fn call_props_override_declared_props() {
    let source = SceneSource::new("title", TITLE).with_props(json!({"title": "Hello"}));
    let factory = load(&source, ctx()).unwrap();
    let tree = factory.render(0, &json!({"title": "Bye"})).unwrap().into_json();
    assert_eq!(tree["props"]["text"], "Bye");
}

#[test]
fn current_frame_follows_the_call() {
    let factory = load_code(
        "fn render(p, c, a, l) { #{ \"type\": \"readout\", f: current_frame(), g: a.frame } }",
    )
    .unwrap();
    for frame in [7, 2, 7] {
        let tree = factory.render(frame, &serde_json::Value::Null).unwrap().into_json();
        assert_eq!(tree["f"], frame);
        assert_eq!(tree["g"], frame);
    }
}

#[test]
fn rejected_code_never_compiles() {
    let err = load_code("fn render(p, c, a, l) { eval(\"1\") }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationRejected);
}

#[test]
fn syntax_and_missing_entry_are_distinct() {
    let syntax = load_code("fn render(p, c, a, l) { let = ; }").unwrap_err();
    assert!(matches!(
        syntax,
        LoadError::Compile {
            kind: CompileErrorKind::Syntax,
            ..
        }
    ));

    let missing = load_code("fn draw(p, c, a, l) { #{} }").unwrap_err();
    assert!(matches!(
        missing,
        LoadError::Compile {
            kind: CompileErrorKind::MissingExport,
            ..
        }
    ));

    let arity = load_code("fn render(p) { #{} }").unwrap_err();
    match arity {
        LoadError::Compile { kind, message } => {
            assert_eq!(kind, CompileErrorKind::MissingExport);
            assert!(message.contains("[1]"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unknown_names_fail_at_load_or_render() {
    // Undeclared variable: compile time.
    let err = load_code("fn render(p, c, a, l) { secret }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CompileError);

    // Unknown function: first call.
    let factory = load_code("fn render(p, c, a, l) { read_file(\"x\") }").unwrap();
    let err = factory.render(0, &serde_json::Value::Null).unwrap_err();
    assert!(matches!(err, RenderError::Runtime { frame: 0, .. }));
}

#[test]
fn top_level_runs_once_without_a_frame() {
    let err = load_code("let f = current_frame();\nfn render(p, c, a, l) { #{} }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RuntimeError);

    let err = load_code("throw \"bad setup\";\nfn render(p, c, a, l) { #{} }").unwrap_err();
    assert!(err.to_string().contains("bad setup"));
}

#[test]
fn non_tree_results_are_conversion_errors() {
    let factory = load_code("fn render(p, c, a, l) { 42 }").unwrap();
    assert!(matches!(
        factory.render(3, &serde_json::Value::Null),
        Err(RenderError::Conversion { frame: 3, .. })
    ));
}

#[test]
fn helper_functions_are_callable_from_the_entry() {
    let factory = load_code(
        r#"
        fn card(label, x) { rect(#{ label: label, x: x }) }
        fn render(p, c, a, l) {
            let cells = l.grid(2, 2);
            group([card("a", cells[0].x), card("b", cells[1].x)])
        }
        "#,
    )
    .unwrap();
    let tree = factory.render(0, &serde_json::Value::Null).unwrap().into_json();
    assert_eq!(tree["children"][1]["props"]["x"], 960.0);
}

#[test]
fn deep_results_are_conversion_errors() {
    let factory = load_code(
        r#"
        fn render(p, c, a, l) {
            let x = #{};
            for i in 0..100 { x = #{ c: take(x) }; }
            x
        }
        "#,
    )
    .unwrap();
    let err = factory.render(2, &serde_json::Value::Null).unwrap_err();
    assert!(matches!(err, RenderError::Conversion { frame: 2, .. }));
    assert!(err.to_string().contains("deeper than 64"));
}

#[test]
fn scene_code_cannot_return_diagnostic_nodes() {
    for body in [
        r#"#{ "type": "diagnostic", props: #{ kind: "validation_rejected" }, children: [] }"#,
        r#"group([rect(#{}), #{ "type": "diagnostic", props: #{}, children: [] }])"#,
    ] {
        let factory = load_code(&format!("fn render(p, c, a, l) {{ {body} }}")).unwrap();
        let err = factory.render(0, &serde_json::Value::Null).unwrap_err();
        assert!(matches!(err, RenderError::Conversion { .. }), "{body}");
        assert!(err.to_string().contains("reserved"));
    }
}

#[test]
fn script_threads_report_panics() {
    assert_eq!(on_script_stack(1024 * 1024, || 7), Ok(7));
    let err = on_script_stack(1024 * 1024, || -> u8 { panic!("boom") }).unwrap_err();
    assert_eq!(err, "boom");
}
