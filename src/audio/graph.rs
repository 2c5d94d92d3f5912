//! Capture audio graph: looped source, gain, splitter fanning out to the capture stream and a
//! live monitor.
//!
//! Everything runs at [`MIX_SAMPLE_RATE`] in interleaved stereo. The graph is pulled, not pushed:
//! the capture session asks for exactly the samples that cover each video frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};

use crate::assets::media::{AudioPcm, MIX_SAMPLE_RATE};
use crate::audio::mix::apply_gain;
use crate::foundation::error::{VitrineError, VitrineResult};

const CHANNELS: usize = 2;

/// A node that consumes rendered blocks of interleaved stereo samples.
pub trait AudioSink: Send {
    /// Receive one block. Blocks arrive in playback order.
    fn write(&mut self, block: &[f32]);
}

/// Source node that plays its samples in a loop, starting from the first sample.
pub struct LoopedSource {
    samples: Arc<AudioPcm>,
    cursor: usize,
}

impl LoopedSource {
    /// Wrap stereo PCM at [`MIX_SAMPLE_RATE`].
    pub fn new(samples: Arc<AudioPcm>) -> VitrineResult<Self> {
        if samples.channels as usize != CHANNELS || samples.sample_rate != MIX_SAMPLE_RATE {
            return Err(VitrineError::audio_unavailable(format!(
                "looped source expects stereo at {MIX_SAMPLE_RATE} Hz, got {} ch at {} Hz",
                samples.channels, samples.sample_rate
            )));
        }
        if samples.frames() == 0 {
            return Err(VitrineError::audio_unavailable("audio source has no samples"));
        }
        Ok(Self { samples, cursor: 0 })
    }

    /// Append the next `frames` sample frames to `out`, wrapping at the end.
    fn pull(&mut self, frames: usize, out: &mut Vec<f32>) {
        let total = self.samples.frames();
        let src = &self.samples.interleaved_f32;
        let mut left = frames;
        while left > 0 {
            let n = left.min(total - self.cursor);
            out.extend_from_slice(&src[self.cursor * CHANNELS..(self.cursor + n) * CHANNELS]);
            self.cursor = (self.cursor + n) % total;
            left -= n;
        }
    }
}

/// Fan-out node. Owns its outputs; every output receives every block.
#[derive(Default)]
pub struct Splitter {
    outputs: Vec<Box<dyn AudioSink>>,
}

impl Splitter {
    /// Empty splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an output.
    pub fn connect(&mut self, sink: Box<dyn AudioSink>) {
        self.outputs.push(sink);
    }

    /// Number of attached outputs.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Whether nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    fn write(&mut self, block: &[f32]) {
        for out in &mut self.outputs {
            out.write(block);
        }
    }
}

/// Graph endpoint that forwards blocks to a [`CaptureStream`].
pub struct StreamDestination {
    tx: Sender<Vec<f32>>,
}

impl AudioSink for StreamDestination {
    fn write(&mut self, block: &[f32]) {
        // A dropped receiver means capture is over; late blocks are discarded.
        let _ = self.tx.send(block.to_vec());
    }
}

/// Receiving end of a [`StreamDestination`].
pub struct CaptureStream {
    rx: Receiver<Vec<f32>>,
}

impl CaptureStream {
    /// Take all blocks delivered so far, concatenated.
    pub fn drain(&self) -> Vec<f32> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(block) => out.extend_from_slice(&block),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return out,
            }
        }
    }
}

/// Shared counters updated by a [`Monitor`].
#[derive(Debug, Default)]
pub struct MonitorLevels {
    frames: AtomicU64,
    peak_bits: AtomicU32,
}

impl MonitorLevels {
    /// Sample frames seen so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Largest absolute sample seen so far.
    pub fn peak(&self) -> f32 {
        f32::from_bits(self.peak_bits.load(Ordering::Relaxed))
    }
}

/// Live monitor output. Headless hosts have no playback device, so it meters the signal.
pub struct Monitor {
    levels: Arc<MonitorLevels>,
}

impl Monitor {
    /// Monitor reporting into a fresh set of levels.
    pub fn metered() -> (Self, Arc<MonitorLevels>) {
        let levels = Arc::new(MonitorLevels::default());
        (
            Self {
                levels: Arc::clone(&levels),
            },
            levels,
        )
    }
}

impl AudioSink for Monitor {
    fn write(&mut self, block: &[f32]) {
        let peak = block.iter().fold(self.levels.peak(), |m, s| m.max(s.abs()));
        self.levels.peak_bits.store(peak.to_bits(), Ordering::Relaxed);
        self.levels
            .frames
            .fetch_add((block.len() / CHANNELS) as u64, Ordering::Relaxed);
    }
}

/// `source -> gain -> splitter -> {capture stream, monitor}`.
pub struct AudioGraph {
    source: LoopedSource,
    gain: f32,
    splitter: Splitter,
    scratch: Vec<f32>,
    rendered_frames: u64,
}

impl AudioGraph {
    /// Build the capture graph over `samples`.
    ///
    /// Returns the graph, the capture stream fed by its destination, and the monitor levels.
    pub fn new(
        samples: Arc<AudioPcm>,
        gain: f32,
    ) -> VitrineResult<(Self, CaptureStream, Arc<MonitorLevels>)> {
        let source = LoopedSource::new(samples)?;
        let (tx, rx) = channel();
        let (monitor, levels) = Monitor::metered();

        let mut splitter = Splitter::new();
        splitter.connect(Box::new(StreamDestination { tx }));
        splitter.connect(Box::new(monitor));

        Ok((
            Self {
                source,
                gain,
                splitter,
                scratch: Vec::new(),
                rendered_frames: 0,
            },
            CaptureStream { rx },
            levels,
        ))
    }

    /// Render `frames` sample frames through every node.
    pub fn render(&mut self, frames: usize) {
        if frames == 0 {
            return;
        }
        self.scratch.clear();
        self.source.pull(frames, &mut self.scratch);
        apply_gain(&mut self.scratch, self.gain);
        self.splitter.write(&self.scratch);
        self.rendered_frames += frames as u64;
    }

    /// Sample frames rendered since construction.
    pub fn rendered_frames(&self) -> u64 {
        self.rendered_frames
    }

    /// Disconnect all outputs. The capture stream still yields blocks already delivered.
    pub fn release(self) {
        tracing::debug!(frames = self.rendered_frames, "audio graph released");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/graph.rs"]
mod tests;
