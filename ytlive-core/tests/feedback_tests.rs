mod common;

use common::{scheduled, started};
use ytlive_core::config::FeedbackColors;
use ytlive_core::{evaluate, BroadcastLifecycle, FeedbackKind, StateMemory, Stream, StreamHealth};

fn memory() -> StateMemory {
    let mut live = started("main", BroadcastLifecycle::Live, 9, 0);
    live.bound_stream_id = Some("s1".into());
    let mut dangling = scheduled("ready", 10, 0);
    dangling.bound_stream_id = Some("gone".into());
    StateMemory::new(
        vec![live, dangling],
        vec![Stream {
            id: "s1".into(),
            health: StreamHealth::Bad,
        }],
    )
}

#[test]
fn status_feedback_uses_lifecycle_color() {
    let colors = FeedbackColors::default();
    let style = evaluate(FeedbackKind::BroadcastStatus, Some("ready"), &memory(), &colors).unwrap();
    assert_eq!(style.bgcolor, colors.ready);
    assert_eq!(style.text, "READY");

    let current = evaluate(FeedbackKind::BroadcastStatus, Some("current"), &memory(), &colors).unwrap();
    assert_eq!(current.bgcolor, colors.live);
}

#[test]
fn health_feedback_follows_bound_stream() {
    let colors = FeedbackColors::default();
    let style = evaluate(FeedbackKind::StreamHealth, Some("main"), &memory(), &colors).unwrap();
    assert_eq!(style.bgcolor, colors.health_bad);

    assert_eq!(evaluate(FeedbackKind::StreamHealth, Some("ready"), &memory(), &colors), None);
}

#[test]
fn unknown_or_missing_broadcast_has_no_feedback() {
    let colors = FeedbackColors::default();
    assert_eq!(evaluate(FeedbackKind::BroadcastStatus, Some("nope"), &memory(), &colors), None);
    assert_eq!(evaluate(FeedbackKind::BroadcastStatus, None, &memory(), &colors), None);
    assert_eq!(
        evaluate(FeedbackKind::BroadcastStatus, Some("current"), &StateMemory::default(), &colors),
        None
    );
}
