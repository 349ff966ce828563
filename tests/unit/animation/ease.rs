use super::*;

const ALL: [Easing; 10] = [
    Easing::Linear,
    Easing::EaseIn,
    Easing::EaseOut,
    Easing::EaseInOut,
    Easing::InCubic,
    Easing::OutCubic,
    Easing::InOutCubic,
    Easing::BounceOut,
    Easing::ElasticOut,
    Easing::BackOut,
];

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn endpoints_are_stable() {
    for ease in ALL {
        assert!(approx(ease.apply(0.0), 0.0), "{ease:?} at 0");
        assert!(approx(ease.apply(1.0), 1.0), "{ease:?} at 1");
    }
}

#[test]
fn midpoint_matches_closed_forms() {
    assert!(approx(Easing::Linear.apply(0.5), 0.5));
    assert!(approx(Easing::EaseIn.apply(0.5), 0.25));
    assert!(approx(Easing::EaseOut.apply(0.5), 0.75));
    assert!(approx(Easing::EaseInOut.apply(0.5), 0.5));
    assert!(approx(Easing::BounceOut.apply(0.5), 0.765625));
    assert!((Easing::BounceOut.apply(0.5) - 0.766).abs() < 1e-3);

    // sin((0.5 - 0.1) * 5π) = sin(2π) = 0.
    assert!((Easing::ElasticOut.apply(0.5) - 1.0).abs() < 1e-12);

    let c1 = 1.70158;
    let c3 = c1 + 1.0;
    let back = 1.0 + c3 * (-0.5f64).powi(3) + c1 * (-0.5f64).powi(2);
    assert!(approx(Easing::BackOut.apply(0.5), back));
    assert!(Easing::BackOut.apply(0.5) > 1.0);
}

#[test]
fn ease_in_out_branches_meet() {
    assert!(approx(Easing::EaseInOut.apply(0.25), 0.125));
    assert!(approx(Easing::EaseInOut.apply(0.75), 0.875));
}

#[test]
fn bounce_segments_hit_documented_offsets() {
    // Each segment's vertex sits at its offset.
    assert!(approx(Easing::BounceOut.apply(1.5 / 2.75), 0.75));
    assert!(approx(Easing::BounceOut.apply(2.25 / 2.75), 0.9375));
    assert!(approx(Easing::BounceOut.apply(2.625 / 2.75), 0.984375));
}

#[test]
fn apply_clamps_progress() {
    for ease in ALL {
        assert!(approx(ease.apply(-3.0), ease.apply(0.0)));
        assert!(approx(ease.apply(4.0), ease.apply(1.0)));
    }
}

#[test]
fn monotonic_spot_check_for_simple_curves() {
    for ease in [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutCubic,
    ] {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b);
        assert!(b < c);
    }
}

#[test]
fn cubic_bezier_endpoints_and_identity_curve() {
    let ease = Easing::CubicBezier {
        x1: 0.25,
        y1: 0.1,
        x2: 0.25,
        y2: 1.0,
    };
    assert!(approx(ease.apply(0.0), 0.0));
    assert!(approx(ease.apply(1.0), 1.0));

    let identity = Easing::CubicBezier {
        x1: 0.0,
        y1: 0.0,
        x2: 1.0,
        y2: 1.0,
    };
    assert!((identity.apply(0.3) - 0.3).abs() < 1e-6);
}

#[test]
fn names_resolve_with_common_spellings() {
    assert_eq!(Easing::from_name("ease_out"), Some(Easing::EaseOut));
    assert_eq!(Easing::from_name("ease-in-out"), Some(Easing::EaseInOut));
    assert_eq!(Easing::from_name("easeOut"), Some(Easing::EaseOut));
    assert_eq!(Easing::from_name("bounce"), Some(Easing::BounceOut));
    assert_eq!(Easing::from_name("wobble"), None);
}

#[test]
fn serde_uses_snake_case_names() {
    let v: Easing = serde_json::from_str("\"bounce_out\"").unwrap();
    assert_eq!(v, Easing::BounceOut);
    let v: Easing =
        serde_json::from_str(r#"{"cubic_bezier":{"x1":0.4,"y1":0.0,"x2":0.2,"y2":1.0}}"#).unwrap();
    assert!(matches!(v, Easing::CubicBezier { .. }));
}
