use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MotionError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        MotionError::animation("x")
            .to_string()
            .contains("animation error:")
    );
    assert!(
        MotionError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        MotionError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MotionError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn load_error_kinds_map_to_labels() {
    let rejected = LoadError::ValidationRejected {
        pattern: "dynamic-eval".to_owned(),
        excerpt: "eval(".to_owned(),
        line: 1,
    };
    assert_eq!(rejected.kind().label(), "validation_rejected");

    let compile = LoadError::Compile {
        kind: CompileErrorKind::MissingExport,
        message: "no render".to_owned(),
    };
    assert_eq!(compile.kind(), ErrorKind::CompileError);

    let runtime = LoadError::Runtime {
        message: "thrown".to_owned(),
    };
    assert_eq!(runtime.kind().label(), "runtime_error");
}

#[test]
fn render_error_exposes_frame_and_message() {
    let e = RenderError::Runtime {
        frame: 5,
        message: "boom".to_owned(),
    };
    assert_eq!(e.frame(), 5);
    assert_eq!(e.message(), "boom");
    assert_eq!(e.to_string(), "frame 5: boom");
}
