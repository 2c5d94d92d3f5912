use std::path::Path;

use crate::foundation::core::Fps;
use crate::foundation::error::{VitrineError, VitrineResult};

/// Sample index at the start of video frame `frame_delta`, rounded to nearest.
pub(crate) fn frame_to_sample(frame_delta: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frame_delta) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num);
    ((num + (den / 2)) / den) as u64
}

/// Scale `block` by `gain`, clamping to `[-1, 1]`.
pub(crate) fn apply_gain(block: &mut [f32], gain: f32) {
    for s in block {
        *s = (*s * gain).clamp(-1.0, 1.0);
    }
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub(crate) fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> VitrineResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            VitrineError::evaluation(format!(
                "failed to create audio spool directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        VitrineError::evaluation(format!(
            "failed to write audio spool file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
