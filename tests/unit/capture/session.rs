use super::*;
use crate::assets::media::AudioPcm;
use crate::capture::clock::ManualClock;
use crate::config::policy::{ColorAdjust, EngineConfig, TimingPolicy};
use crate::creative::metadata::CreativeMetadata;
use crate::encode::sink::{EncodedOutput, FrameLog};
use crate::foundation::core::Canvas;
use crate::foundation::math::fnv1a64;
use crate::render::backend::FrameRGBA;
use crate::timeline::model::{AssetSource, Timeline};

fn short_timing() -> TimingPolicy {
    TimingPolicy {
        photo_ms: 200,
        cover_ms: 200,
        closing_ms: 200,
        transition_ms: 50,
    }
}

fn compositor(timing: TimingPolicy) -> AnimatedCompositor {
    let t = Timeline::reels(
        Some(AssetSource::Unbound),
        vec![AssetSource::Unbound],
        Some(AssetSource::Unbound),
        timing,
    )
    .unwrap();
    let cfg = EngineConfig {
        color: ColorAdjust::IDENTITY,
        ..EngineConfig::default()
    };
    AnimatedCompositor::new(t, CreativeMetadata::default(), &cfg, None)
        .unwrap()
        .with_canvas(Canvas::new(16, 28).unwrap())
}

fn capture_cfg() -> CaptureConfig {
    CaptureConfig {
        fps: Fps::new(20, 1).unwrap(),
        ..CaptureConfig::default()
    }
}

fn tone() -> AudioRef {
    AudioRef::Pcm(Arc::new(AudioPcm {
        sample_rate: MIX_SAMPLE_RATE,
        channels: 2,
        interleaved_f32: vec![0.25; 2 * 1000],
    }))
}

#[test]
fn full_loop_frame_count_is_total_minus_guard() {
    let t = Timeline::reels(
        Some(AssetSource::Unbound),
        vec![AssetSource::Unbound, AssetSource::Unbound],
        Some(AssetSource::Unbound),
        TimingPolicy::default(),
    )
    .unwrap();
    assert_eq!(t.total_duration_ms(), 20_500);
    let mut c =
        AnimatedCompositor::new(t, CreativeMetadata::default(), &EngineConfig::default(), None)
            .unwrap();
    let s = CaptureSession::new(&mut c, &CaptureConfig::default());
    // round(20.45 s * 30)
    assert_eq!(s.frame_count(), 614);
}

#[test]
fn capture_requires_playing_compositor() {
    let mut c = compositor(short_timing());
    let mut log = FrameLog::new();
    let r = CaptureSession::new(&mut c, &capture_cfg()).capture(&AudioRef::None, &mut log);
    assert!(matches!(r, Err(VitrineError::Validation(_))));
}

#[test]
fn offline_capture_mixes_audio_frame_aligned() {
    let mut c = compositor(short_timing());
    c.load(Duration::ZERO).unwrap();
    let mut log = FrameLog::new();
    let clip = CaptureSession::new(&mut c, &capture_cfg())
        .capture(&tone(), &mut log)
        .unwrap();

    // (600 - 50) ms at 20 fps.
    assert_eq!(clip.frames, 11);
    assert_eq!(log.frames().len(), 11);
    assert!((clip.duration.as_secs_f64() - 0.55).abs() < 1e-6);
    assert_eq!(clip.audio, AudioTrackStatus::Mixed);
    assert!(!clip.truncated);
    assert_eq!(log.audio_samples(), 11 * 2_400 * 2);
    assert_eq!(clip.mime, "application/json");
    assert_eq!(log.config().unwrap().audio.unwrap().sample_rate, MIX_SAMPLE_RATE);
}

#[test]
fn unavailable_audio_falls_back_to_silence() {
    let mut c = compositor(short_timing());
    c.load(Duration::ZERO).unwrap();
    let mut log = FrameLog::new();
    let missing = AudioRef::Path("/nonexistent/vitrine/track.mp3".into());
    let clip = CaptureSession::new(&mut c, &capture_cfg())
        .capture(&missing, &mut log)
        .unwrap();
    assert!(matches!(clip.audio, AudioTrackStatus::Silent { .. }));
    assert_eq!(clip.frames, 11);
    assert_eq!(log.audio_samples(), 0);
    assert!(log.config().unwrap().audio.is_none());
}

#[test]
fn capture_starts_at_the_first_segment() {
    let mut c = compositor(short_timing());
    c.load(Duration::ZERO).unwrap();
    let clock = Arc::new(ManualClock::starting_at(Duration::from_millis(1_234)));
    let mut log = FrameLog::new();
    CaptureSession::new(&mut c, &capture_cfg())
        .with_clock(clock)
        .capture(&AudioRef::None, &mut log)
        .unwrap();

    let s = c.sample_at(Duration::from_millis(1_234)).unwrap();
    assert_eq!(s.index, 0);
    let first = c.render_at(Duration::from_millis(1_234)).unwrap();
    assert_eq!(log.frames()[0].fingerprint, fnv1a64(&first.data));
}

#[test]
fn offline_capture_is_deterministic() {
    let mut c = compositor(short_timing());
    c.load(Duration::ZERO).unwrap();
    let mut a = FrameLog::new();
    let mut b = FrameLog::new();
    CaptureSession::new(&mut c, &capture_cfg())
        .capture(&AudioRef::None, &mut a)
        .unwrap();
    CaptureSession::new(&mut c, &capture_cfg())
        .capture(&AudioRef::None, &mut b)
        .unwrap();
    assert_eq!(a.frames(), b.frames());
}

struct CancelAfter {
    inner: FrameLog,
    after: usize,
    token: CancelToken,
}

impl FrameSink for CancelAfter {
    fn begin(&mut self, cfg: SinkConfig) -> VitrineResult<()> {
        self.inner.begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> VitrineResult<()> {
        self.inner.push_frame(idx, frame)?;
        if self.inner.frames().len() >= self.after {
            self.token.cancel();
        }
        Ok(())
    }

    fn end(&mut self) -> VitrineResult<EncodedOutput> {
        self.inner.end()
    }
}

#[test]
fn early_teardown_returns_truncated_clip() {
    let mut c = compositor(short_timing());
    c.load(Duration::ZERO).unwrap();
    let token = CancelToken::new();
    let mut sink = CancelAfter {
        inner: FrameLog::new(),
        after: 3,
        token: token.clone(),
    };
    let clip = CaptureSession::new(&mut c, &capture_cfg())
        .with_cancel(token)
        .capture(&AudioRef::None, &mut sink)
        .unwrap();
    assert!(clip.truncated);
    assert_eq!(clip.frames, 3);
    assert!(sink.inner.ended());
}

#[test]
fn real_time_pacing_produces_the_same_frame_count() {
    let mut c = compositor(short_timing());
    c.load(Duration::ZERO).unwrap();
    let mut log = FrameLog::new();
    let clip = CaptureSession::new(&mut c, &capture_cfg())
        .with_pacing(Pacing::RealTime)
        .capture(&AudioRef::None, &mut log)
        .unwrap();
    assert_eq!(clip.frames, 11);
    assert!(!clip.truncated);
}

struct FailAt {
    inner: FrameLog,
    fail_at: u64,
    aborted: bool,
}

impl FrameSink for FailAt {
    fn begin(&mut self, cfg: SinkConfig) -> VitrineResult<()> {
        self.inner.begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> VitrineResult<()> {
        if idx.0 == self.fail_at {
            return Err(VitrineError::evaluation("disk full"));
        }
        self.inner.push_frame(idx, frame)
    }

    fn end(&mut self) -> VitrineResult<EncodedOutput> {
        self.inner.end()
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[test]
fn sink_failure_mid_capture_aborts_the_sink() {
    let mut c = compositor(short_timing());
    c.load(Duration::ZERO).unwrap();
    let mut sink = FailAt {
        inner: FrameLog::new(),
        fail_at: 4,
        aborted: false,
    };
    let err = CaptureSession::new(&mut c, &capture_cfg())
        .capture(&tone(), &mut sink)
        .err()
        .unwrap();
    assert!(err.to_string().contains("disk full"));
    assert!(sink.aborted);
    assert!(!sink.inner.ended());
    assert_eq!(sink.inner.frames().len(), 4);
    // The compositor is left playing and can be captured again.
    let mut log = FrameLog::new();
    let clip = CaptureSession::new(&mut c, &capture_cfg())
        .capture(&AudioRef::None, &mut log)
        .unwrap();
    assert_eq!(clip.frames, 11);
}
