use super::*;
use crate::config::policy::TimingPolicy;
use crate::timeline::model::{AssetSource, Timeline};

fn scenario_a() -> Timeline {
    Timeline::reels(
        Some(AssetSource::Unbound),
        vec![AssetSource::Unbound, AssetSource::Unbound],
        Some(AssetSource::Unbound),
        TimingPolicy::default(),
    )
    .unwrap()
}

#[test]
fn segment_lookup_walks_prefix_sums() {
    let t = scenario_a();
    assert_eq!(sample_at(&t, 0.0).index, 0);
    assert_eq!(sample_at(&t, 3_499.0).index, 0);
    assert_eq!(sample_at(&t, 3_500.0).index, 1);
    let s = sample_at(&t, 5_750.0);
    assert_eq!(s.index, 1);
    assert!((s.progress - 0.5).abs() < 1e-9);
    assert_eq!(sample_at(&t, 20_499.0).index, 3);
}

#[test]
fn midpoint_of_every_transition_is_half_and_half() {
    let t = scenario_a();
    let half = t.timing().transition_ms as f64 / 2.0;
    for i in 0..t.len() - 1 {
        let end = t.segment_start_ms(i + 1) as f64;
        let s = sample_at(&t, end - half);
        assert_eq!(s.index, i);
        assert!((s.opacity - 0.5).abs() < 1e-6, "segment {i}: {}", s.opacity);
        let inc = s.incoming.unwrap();
        assert_eq!(inc.index, i + 1);
        assert!((inc.opacity - 0.5).abs() < 1e-6);
    }
}

#[test]
fn last_segment_never_fades_forward() {
    let t = scenario_a();
    let s = sample_at(&t, 20_499.0);
    assert_eq!(s.opacity, 1.0);
    assert!(s.incoming.is_none());
}

#[test]
fn incoming_opacity_is_monotonic_inside_the_window() {
    let t = scenario_a();
    let end = t.segment_start_ms(1) as f64;
    let mut prev = -1.0f32;
    let mut ms = end - 700.0;
    while ms < end {
        let inc = sample_at(&t, ms).incoming.map(|i| i.opacity).unwrap_or(0.0);
        assert!(inc >= prev);
        prev = inc;
        ms += 7.0;
    }
}

#[test]
fn elapsed_wraps_modulo_total() {
    let t = scenario_a();
    let s = sample_since_origin(&t, Duration::from_millis(20_500 + 3_600));
    assert_eq!(s.index, 1);
    assert!((s.offset_ms - 100.0).abs() < 1e-6);
    assert_eq!(loop_elapsed_ms(Duration::from_secs(5), 0), 0.0);
}
