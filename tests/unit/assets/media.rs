use super::*;

#[test]
fn mono_is_duplicated_and_resampled() {
    let pcm = AudioPcm {
        sample_rate: 24_000,
        channels: 1,
        interleaved_f32: vec![0.0, 1.0, 1.0, 1.0],
    };
    let out = pcm.to_stereo_at(48_000).unwrap();
    assert_eq!(out.channels, 2);
    assert_eq!(out.frames(), 8);
    assert_eq!(out.interleaved_f32[0], out.interleaved_f32[1]);
    // Halfway between the first two source samples.
    assert!((out.interleaved_f32[2] - 0.5).abs() < 1e-6);
}

#[test]
fn no_audio_is_not_an_error() {
    assert!(resolve_audio(&AudioRef::None).unwrap().is_none());
}

#[test]
fn empty_pcm_is_unavailable() {
    let err = resolve_audio(&AudioRef::Pcm(Arc::new(AudioPcm {
        sample_rate: 48_000,
        channels: 2,
        interleaved_f32: Vec::new(),
    })))
    .unwrap_err();
    assert!(matches!(err, VitrineError::AudioSourceUnavailable(_)));
}

#[cfg(not(feature = "media-ffmpeg"))]
#[test]
fn file_audio_needs_the_ffmpeg_feature() {
    let err = resolve_audio(&AudioRef::Path("trilha.mp3".into())).unwrap_err();
    assert!(matches!(err, VitrineError::AudioSourceUnavailable(_)));
}
