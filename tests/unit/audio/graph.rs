use super::*;

fn ramp(frames: usize) -> Arc<AudioPcm> {
    let mut s = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        let v = i as f32 / 10.0;
        s.push(v);
        s.push(-v);
    }
    Arc::new(AudioPcm {
        sample_rate: MIX_SAMPLE_RATE,
        channels: 2,
        interleaved_f32: s,
    })
}

#[test]
fn source_loops_from_the_start() {
    let (mut g, stream, _) = AudioGraph::new(ramp(4), 1.0).unwrap();
    g.render(6);
    let got = stream.drain();
    let left: Vec<f32> = got.chunks_exact(2).map(|c| c[0]).collect();
    assert_eq!(left, vec![0.0, 0.1, 0.2, 0.3, 0.0, 0.1]);
    assert_eq!(g.rendered_frames(), 6);
}

#[test]
fn gain_applies_before_the_splitter() {
    let (mut g, stream, levels) = AudioGraph::new(ramp(4), 0.5).unwrap();
    g.render(4);
    let got = stream.drain();
    assert_eq!(got[6], 0.15);
    assert_eq!(levels.frames(), 4);
    assert_eq!(levels.peak(), 0.15);
}

#[test]
fn every_output_sees_every_block() {
    let (mut g, stream, levels) = AudioGraph::new(ramp(10), 1.0).unwrap();
    g.render(3);
    g.render(5);
    assert_eq!(stream.drain().len(), 16);
    assert_eq!(levels.frames(), 8);
    assert!(stream.drain().is_empty());
}

#[test]
fn release_keeps_delivered_blocks() {
    let (mut g, stream, _) = AudioGraph::new(ramp(10), 1.0).unwrap();
    g.render(2);
    g.release();
    assert_eq!(stream.drain().len(), 4);
}

#[test]
fn mono_or_wrong_rate_is_rejected() {
    let mono = Arc::new(AudioPcm {
        sample_rate: MIX_SAMPLE_RATE,
        channels: 1,
        interleaved_f32: vec![0.0; 8],
    });
    assert!(matches!(
        AudioGraph::new(mono, 1.0),
        Err(VitrineError::AudioSourceUnavailable(_))
    ));
}
