use std::path::Path;
use std::sync::Arc;

use crate::creative::metadata::AudioRef;
use crate::foundation::error::{VitrineError, VitrineResult};

/// Sample rate of the capture audio graph.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Interleaved `f32` PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    /// Convert to interleaved stereo at `sample_rate` with linear interpolation.
    pub fn to_stereo_at(&self, sample_rate: u32) -> VitrineResult<AudioPcm> {
        if self.sample_rate == 0 || self.channels == 0 || sample_rate == 0 {
            return Err(VitrineError::audio_unavailable(
                "audio pcm has zero sample rate or channel count",
            ));
        }
        let src_frames = self.frames();
        let ch = usize::from(self.channels);
        if self.sample_rate == sample_rate && self.channels == 2 {
            return Ok(self.clone());
        }

        let out_frames = ((src_frames as u128 * u128::from(sample_rate))
            / u128::from(self.sample_rate)) as usize;
        let mut out = Vec::with_capacity(out_frames * 2);
        let ratio = f64::from(self.sample_rate) / f64::from(sample_rate);
        for i in 0..out_frames {
            let pos = i as f64 * ratio;
            let f0 = (pos.floor() as usize).min(src_frames.saturating_sub(1));
            let f1 = (f0 + 1).min(src_frames.saturating_sub(1));
            let frac = (pos - f0 as f64) as f32;
            let read = |frame: usize, c: usize| self.interleaved_f32[frame * ch + c.min(ch - 1)];
            for c in 0..2 {
                let v0 = read(f0, c);
                let v1 = read(f1, c);
                out.push(v0 + (v1 - v0) * frac);
            }
        }

        Ok(AudioPcm {
            sample_rate,
            channels: 2,
            interleaved_f32: out,
        })
    }
}

/// Resolve a soundtrack reference to stereo PCM at [`MIX_SAMPLE_RATE`].
///
/// `Ok(None)` means no soundtrack was requested. Any failure to produce samples is reported as
/// [`VitrineError::AudioSourceUnavailable`] so callers can fall back to silence.
pub fn resolve_audio(audio: &AudioRef) -> VitrineResult<Option<Arc<AudioPcm>>> {
    let pcm = match audio {
        AudioRef::None => return Ok(None),
        AudioRef::Pcm(pcm) => pcm.to_stereo_at(MIX_SAMPLE_RATE)?,
        AudioRef::Path(path) => decode_audio_f32_stereo(path, MIX_SAMPLE_RATE)?,
    };
    if pcm.frames() == 0 {
        return Err(VitrineError::audio_unavailable("audio source has no samples"));
    }
    Ok(Some(Arc::new(pcm)))
}

/// Decode an audio file to interleaved stereo `f32` via the system `ffmpeg`.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> VitrineResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            VitrineError::audio_unavailable(format!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        return Err(VitrineError::audio_unavailable(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(VitrineError::audio_unavailable(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(out.stdout.len() / 4);
    for chunk in out.stdout.chunks_exact(4) {
        pcm.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: pcm,
    })
}

/// Decode an audio file to interleaved stereo `f32` via the system `ffmpeg`.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_audio_f32_stereo(path: &Path, _sample_rate: u32) -> VitrineResult<AudioPcm> {
    Err(VitrineError::audio_unavailable(format!(
        "decoding '{}' requires the 'media-ffmpeg' feature",
        path.display()
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
