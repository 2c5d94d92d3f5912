use super::*;

#[test]
fn defaults_match_production_constants() {
    let t = TimingPolicy::default();
    assert_eq!(
        (t.photo_ms, t.cover_ms, t.closing_ms, t.transition_ms),
        (4_500, 3_500, 8_000, 700)
    );
    let c = CaptureConfig::default();
    assert_eq!(c.guard_ms, 50);
    assert_eq!(c.fps, Fps { num: 30, den: 1 });
    assert_eq!(c.container.mime(), "video/webm");
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = EngineConfig::from_json_str(
        r#"{ "timing": { "photo_ms": 450, "transition_ms": 200 }, "capture": { "container": "mp4" } }"#,
    )
    .unwrap();
    assert_eq!(cfg.timing.photo_ms, 450);
    assert_eq!(cfg.timing.transition_ms, 200);
    assert_eq!(cfg.timing.closing_ms, 8_000);
    assert_eq!(cfg.capture.container, Container::Mp4);
    assert_eq!(cfg.color, ColorAdjust::default());
}

#[test]
fn transition_longer_than_a_segment_is_rejected() {
    let err = EngineConfig::from_json_str(r#"{ "timing": { "cover_ms": 500 } }"#).unwrap_err();
    assert!(err.to_string().contains("transition_ms"));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = EngineConfig::from_json_str("{ nope").unwrap_err();
    assert!(matches!(err, VitrineError::Serde(_)));
}
