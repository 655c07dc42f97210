use folio_reveal_core::{
    ChangeOp, GroupId, GroupKind, GroupSpec, Inputs, Intersection, LoopKind, RegistryBuilder,
    RevealConfig, RevealEngine, RevealEvent, RevealKind,
};

fn fade_engine(index: usize) -> (RevealEngine, GroupId) {
    let mut b = RegistryBuilder::new();
    let g = b.group(GroupSpec::new(GroupKind::Fade));
    b.member_at(g, "card", RevealKind::FadeCard, index).unwrap();
    (
        RevealEngine::new(RevealConfig::default(), b.build()).unwrap(),
        g,
    )
}

fn entry(group: GroupId, ratio: f32, is_intersecting: bool) -> Inputs {
    Inputs {
        intersections: vec![Intersection {
            group,
            ratio,
            is_intersecting,
        }],
    }
}

fn triggered(events: &[RevealEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, RevealEvent::GroupTriggered { .. }))
        .count()
}

#[test]
fn reveal_fires_once_despite_reentry() {
    let (mut eng, g) = fade_engine(0);
    let out = eng.update(0, Inputs::visible(g, 0.5));
    assert_eq!(triggered(&out.events), 1);
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e, RevealEvent::Unobserve { group } if *group == g)));
    let mut total_style_writes = out.changes.len();
    assert!(eng.is_released(g));

    for _ in 0..10 {
        let out = eng.update(100, Inputs::visible(g, 1.0));
        assert_eq!(triggered(&out.events), 0);
        total_style_writes += out.changes.len();
        let out = eng.update(100, entry(g, 0.0, false));
        total_style_writes += out.changes.len();
    }
    // 3 initial writes + 2 final writes, never repeated.
    assert_eq!(total_style_writes, 5);
    assert!(!eng.trigger(g));
}

#[test]
fn fade_card_at_index_two_waits_200ms() {
    let (mut eng, g) = fade_engine(2);
    assert!(eng.update(0, Inputs::visible(g, 0.4)).changes.is_empty());
    assert!(eng.update(199, Inputs::default()).changes.is_empty());

    let out = eng.update(1, Inputs::default());
    assert_eq!(
        out.changes.iter().map(|c| c.op.clone()).collect::<Vec<_>>(),
        vec![
            ChangeOp::style("opacity", "0"),
            ChangeOp::style("transform", "translateY(20px)"),
            ChangeOp::style("transition", "opacity 0.6s ease-out, transform 0.6s ease-out"),
        ]
    );

    // Final style lands on the next frame.
    let out = eng.update(16, Inputs::default());
    assert_eq!(
        out.changes.iter().map(|c| c.op.clone()).collect::<Vec<_>>(),
        vec![
            ChangeOp::style("opacity", "1"),
            ChangeOp::style("transform", "translateY(0)"),
        ]
    );
    assert_eq!(eng.active_runs(), 0);
}

#[test]
fn below_threshold_does_not_trigger() {
    let (mut eng, g) = fade_engine(0);
    eng.update(0, Inputs::visible(g, 0.05));
    assert!(!eng.is_released(g));
    eng.update(0, entry(g, 0.5, false));
    assert!(!eng.is_released(g));
    eng.update(0, Inputs::visible(g, f32::NAN));
    assert!(!eng.is_released(g));
    eng.update(0, Inputs::visible(g, 0.1));
    assert!(eng.is_released(g));
}

#[test]
fn metrics_need_a_fifth_visible() {
    let mut b = RegistryBuilder::new();
    let g = b.group(GroupSpec::new(GroupKind::Metrics));
    b.member(
        g,
        "m",
        RevealKind::Counter {
            target: "5".into(),
            prefix: String::new(),
            suffix: String::new(),
        },
    )
    .unwrap();
    let mut eng = RevealEngine::new(RevealConfig::default(), b.build()).unwrap();
    eng.update(0, Inputs::visible(g, 0.19));
    assert!(!eng.is_released(g));
    eng.update(0, Inputs::visible(g, 0.2));
    assert!(eng.is_released(g));
}

#[test]
fn lazy_image_loads_on_any_intersection() {
    let mut b = RegistryBuilder::new();
    let g = b.group(GroupSpec::new(GroupKind::LazyImage));
    b.member(
        g,
        "img",
        RevealKind::LazyImage {
            src: "a.webp".into(),
        },
    )
    .unwrap();
    let mut eng = RevealEngine::new(RevealConfig::default(), b.build()).unwrap();

    assert!(eng.update(0, entry(g, 0.0, false)).changes.is_empty());
    let out = eng.update(0, entry(g, 0.0, true));
    assert_eq!(
        out.changes.iter().map(|c| c.op.clone()).collect::<Vec<_>>(),
        vec![
            ChangeOp::SetAttribute {
                name: "src".into(),
                value: "a.webp".into()
            },
            ChangeOp::AddClass {
                class: "loaded".into()
            },
        ]
    );
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e, RevealEvent::RevealFinished { key, .. } if key == "img")));
}

#[test]
fn chart_parts_settle_on_their_own_holds() {
    let mut b = RegistryBuilder::new();
    let g = b.group(GroupSpec::new(GroupKind::Chart));
    b.member(
        g,
        "line",
        RevealKind::ChartNode {
            part: folio_reveal_core::ChartPart::StrategyLine,
        },
    )
    .unwrap();
    for i in 0..2 {
        b.member(
            g,
            format!("node{i}"),
            RevealKind::ChartNode {
                part: folio_reveal_core::ChartPart::AlgoNode,
            },
        )
        .unwrap();
    }
    let mut eng = RevealEngine::new(RevealConfig::default(), b.build()).unwrap();

    assert!(eng.update(0, Inputs::visible(g, 0.25)).changes.is_empty());
    // Chart start: 300ms after visibility, every part hidden.
    let out = eng.update(300, Inputs::default());
    assert_eq!(out.changes.len(), 6);
    assert!(out
        .changes
        .iter()
        .all(|c| c.op != ChangeOp::style("opacity", "1")));

    // Strategy line settles 300ms later.
    let out = eng.update(300, Inputs::default());
    let keys: Vec<&str> = out.changes.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["line", "line", "line"]);
    assert!(out
        .changes
        .contains(&folio_reveal_core::Change {
            key: "line".into(),
            op: ChangeOp::style("transform", "translateX(0)"),
        }));

    // node0 at start + 500, node1 at start + 700.
    let out = eng.update(200, Inputs::default());
    assert!(out.changes.iter().all(|c| c.key == "node0"));
    assert_eq!(out.changes.len(), 3);
    let out = eng.update(200, Inputs::default());
    assert!(out.changes.iter().all(|c| c.key == "node1"));
    assert_eq!(eng.active_runs(), 0);
}

#[test]
fn unknown_groups_are_ignored() {
    let (mut eng, g) = fade_engine(0);
    let out = eng.update(0, Inputs::visible(GroupId(42), 1.0));
    assert!(out.is_empty());
    assert!(!eng.is_released(g));
    assert!(!eng.trigger(GroupId(42)));
}

#[test]
fn manual_trigger_reports_on_next_update() {
    let (mut eng, g) = fade_engine(0);
    assert!(eng.trigger(g));
    let out = eng.update(0, Inputs::default());
    assert_eq!(triggered(&out.events), 1);
    assert_eq!(out.changes.len(), 3);
}

#[test]
fn ambient_loops_run_beside_reveals() {
    let (mut eng, _) = fade_engine(0);
    let id = eng.start_loop("cursor", LoopKind::CursorBlink);
    eng.start_loop("badge", LoopKind::HueCycle);
    let out = eng.update(0, Inputs::default());
    assert!(out
        .events
        .contains(&RevealEvent::LoopStarted { id }));

    let mut cursor = Vec::new();
    let mut badge = Vec::new();
    for _ in 0..10 {
        let out = eng.update(53, Inputs::default());
        cursor.extend(out.changes.iter().filter(|c| c.key == "cursor").cloned());
        badge.extend(out.changes.iter().filter(|c| c.key == "badge").cloned());
    }
    assert_eq!(cursor.len(), 1);
    assert_eq!(cursor[0].op, ChangeOp::style("opacity", "0"));
    assert_eq!(badge.len(), 10);
    assert_eq!(
        badge.last().map(|c| c.op.clone()),
        Some(ChangeOp::style("border-color", "hsla(185, 70%, 50%, 0.3)"))
    );
}

#[test]
fn hidden_tab_gap_does_not_replay_loop_ticks() {
    let (mut eng, _) = fade_engine(0);
    eng.start_loop("cursor", LoopKind::CursorBlink);
    eng.start_loop("badge", LoopKind::HueCycle);
    eng.update(0, Inputs::default());

    let out = eng.update(3_600_000, Inputs::default());
    assert_eq!(out.changes.len(), 2);
    assert_eq!(out.changes.iter().filter(|c| c.key == "cursor").count(), 1);
    assert_eq!(out.changes.iter().filter(|c| c.key == "badge").count(), 1);

    let out = eng.update(50, Inputs::default());
    assert_eq!(out.changes.iter().filter(|c| c.key == "badge").count(), 1);
}
