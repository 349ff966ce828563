use super::*;

fn reference_item() -> TimelineItem {
    TimelineItem::new("title", 30, 20).with_exit(100, 10)
}

#[test]
fn states_follow_the_windows() {
    let item = reference_item();
    assert_eq!(item.state_at(0), ItemState::NotStarted);
    assert_eq!(item.state_at(29), ItemState::NotStarted);
    assert_eq!(item.state_at(30), ItemState::Entering);
    assert_eq!(item.state_at(49), ItemState::Entering);
    assert_eq!(item.state_at(50), ItemState::Visible);
    assert_eq!(item.state_at(99), ItemState::Visible);
    assert_eq!(item.state_at(100), ItemState::Exiting);
    assert_eq!(item.state_at(110), ItemState::Exiting);
    assert_eq!(item.state_at(111), ItemState::Gone);
}

#[test]
fn direct_query_matches_sequential_evaluation() {
    let item = reference_item();
    let sequential: Vec<ItemState> = (0..=150).map(|f| item.state_at(f)).collect();
    assert_eq!(item.state_at(150), ItemState::Gone);
    assert_eq!(sequential[150], item.state_at(150));

    // Out of order, repeated.
    for f in [150u64, 3, 120, 45, 45, 100, 0, 77] {
        assert_eq!(item.state_at(f), sequential[f as usize]);
    }
}

#[test]
fn phase_progress_is_linear_within_windows() {
    let item = reference_item();
    assert_eq!(item.phase_at(40), (ItemState::Entering, 0.5));
    assert_eq!(item.phase_at(105), (ItemState::Exiting, 0.5));
    assert_eq!(item.phase_at(60), (ItemState::Visible, 1.0));
}

#[test]
fn exit_duration_defaults_to_enter_duration() {
    let mut item = TimelineItem::new("a", 0, 10);
    item.exit_frame = Some(50);
    assert_eq!(item.effective_exit_duration(), 10);
    assert_eq!(item.state_at(60), ItemState::Exiting);
    assert_eq!(item.state_at(61), ItemState::Gone);
}

#[test]
fn zero_length_enter_is_immediately_visible() {
    let item = TimelineItem::new("a", 5, 0);
    assert_eq!(item.state_at(5), ItemState::Visible);
}

#[test]
fn items_without_exit_never_leave() {
    let item = TimelineItem::new("a", 0, 10);
    assert_eq!(item.state_at(u64::MAX), ItemState::Visible);
}

#[test]
fn visible_set_excludes_not_started_and_gone() {
    let items = vec![
        TimelineItem::new("early", 0, 10).with_exit(20, 5),
        TimelineItem::new("mid", 10, 10),
        TimelineItem::new("late", 100, 10),
    ];
    let cfg = TimelineConfig::default();
    let ids: Vec<String> = visible_items(&items, 15, &cfg)
        .into_iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(ids, vec!["early".to_owned(), "mid".to_owned()]);

    let ids: Vec<String> = visible_items(&items, 30, &cfg)
        .into_iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(ids, vec!["mid".to_owned()]);
}

#[test]
fn annotations_follow_the_animation_kind() {
    let cfg = TimelineConfig::default();

    let fade = TimelineItem::new("f", 0, 10);
    let start = annotate(&fade, 0, &cfg).unwrap();
    assert_eq!(start.opacity, 0.0);
    let rest = annotate(&fade, 10, &cfg).unwrap();
    assert_eq!(rest.opacity, 1.0);
    assert_eq!(rest.scale, 1.0);

    let slide = TimelineItem::new("s", 0, 10).with_animation(AnimationKind::SlideUp);
    let start = annotate(&slide, 0, &cfg).unwrap();
    assert_eq!(start.translate_y, cfg.slide_distance);
    let rest = annotate(&slide, 10, &cfg).unwrap();
    assert_eq!(rest.translate_y, 0.0);

    let scale = TimelineItem::new("z", 0, 10)
        .with_exit(20, 10)
        .with_animation(AnimationKind::Scale);
    let start = annotate(&scale, 0, &cfg).unwrap();
    assert!((start.scale - cfg.scale_from).abs() < 1e-12);
    let leaving = annotate(&scale, 30, &cfg).unwrap();
    assert_eq!(leaving.state, ItemState::Exiting);
    assert_eq!(leaving.opacity, 0.0);

    let none = TimelineItem::new("n", 0, 10).with_animation(AnimationKind::None);
    assert_eq!(annotate(&none, 0, &cfg).unwrap().opacity, 1.0);
}

#[test]
fn pop_overshoots_while_entering() {
    let cfg = TimelineConfig::default();
    let item = TimelineItem::new("p", 0, 10).with_animation(AnimationKind::Pop);
    let peak = (0..10)
        .filter_map(|f| annotate(&item, f, &cfg))
        .map(|v| v.scale)
        .fold(f64::MIN, f64::max);
    assert!(peak > 1.0);
}

#[test]
fn timeline_validates_items() {
    let dup = vec![TimelineItem::new("a", 0, 1), TimelineItem::new("a", 2, 1)];
    assert!(Timeline::new(dup, TimelineConfig::default()).is_err());

    let inverted = vec![TimelineItem::new("a", 10, 1).with_exit(5, 1)];
    assert!(Timeline::new(inverted, TimelineConfig::default()).is_err());
}

#[test]
fn timeline_end_frame_requires_every_item_to_exit() {
    let tl = Timeline::new(
        vec![
            TimelineItem::new("a", 0, 5).with_exit(20, 5),
            TimelineItem::new("b", 0, 5).with_exit(40, 10),
        ],
        TimelineConfig::default(),
    )
    .unwrap();
    assert_eq!(tl.end_frame(), Some(50));
    assert_eq!(tl.state_of("b", 45), Some(ItemState::Exiting));

    let open = Timeline::new(
        vec![TimelineItem::new("a", 0, 5)],
        TimelineConfig::default(),
    )
    .unwrap();
    assert_eq!(open.end_frame(), None);
}

#[test]
fn items_deserialize_with_defaults() {
    let item: TimelineItem = serde_json::from_str(
        r#"{"id":"x","start_frame":30,"duration":20,"exit_frame":100,"exit_duration":10}"#,
    )
    .unwrap();
    assert_eq!(item, reference_item());
    assert_eq!(item.animation, AnimationKind::Fade);
}
