use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::audio::mix::write_f32le_file;
use crate::config::policy::Container;
use crate::encode::sink::{AudioStreamConfig, EncodedOutput, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{VitrineError, VitrineResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Directory for intermediate video and PCM spool files.
    pub work_dir: PathBuf,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir(),
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Sink that spawns the system `ffmpeg`, streams raw frames to its stdin and returns the encoded
/// clip bytes.
///
/// Video is encoded while frames arrive. Audio is spooled and muxed with the video in `end`.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    audio: Vec<f32>,
    video_tmp: TempFileGuard,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            audio: Vec::new(),
            video_tmp: TempFileGuard(None),
            cfg: None,
            last_idx: None,
        }
    }

    fn spool_path(&self, tag: &str, ext: &str) -> PathBuf {
        self.opts.work_dir.join(format!(
            "vitrine_capture_{tag}_{}_{}.{ext}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ))
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.abort();
    }
}

impl Default for FfmpegSink {
    fn default() -> Self {
        Self::new(FfmpegSinkOpts::default())
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> VitrineResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(VitrineError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(VitrineError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(VitrineError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if let Some(audio) = cfg.audio
            && (audio.sample_rate == 0 || audio.channels == 0)
        {
            return Err(VitrineError::validation(
                "audio sample_rate and channels must be non-zero when audio is enabled",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(VitrineError::capture_unsupported(
                "ffmpeg is required for clip encoding, but was not found on PATH",
            ));
        }

        let video_path = self.spool_path("video", cfg.container.extension());
        ensure_parent_dir(&video_path)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Input: raw RGBA8 frames, flattened to opaque in push_frame since ffmpeg has no notion
        // of premultiplied alpha.
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0", "-an"]);
        push_video_codec(&mut cmd, cfg.container, cfg.video_bitrate);
        cmd.arg(&video_path);

        let mut child = cmd.spawn().map_err(|e| {
            VitrineError::capture_unsupported(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| VitrineError::evaluation("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| VitrineError::evaluation("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.audio.clear();
        self.video_tmp = TempFileGuard(Some(video_path));
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> VitrineResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| VitrineError::evaluation("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(VitrineError::evaluation(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(VitrineError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(VitrineError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(VitrineError::evaluation("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            VitrineError::evaluation(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn push_audio(&mut self, samples: &[f32]) -> VitrineResult<()> {
        if self.cfg.as_ref().and_then(|c| c.audio).is_none() {
            return Err(VitrineError::evaluation(
                "ffmpeg sink received audio but was started without an audio stream",
            ));
        }
        self.audio.extend_from_slice(samples);
        Ok(())
    }

    fn end(&mut self) -> VitrineResult<EncodedOutput> {
        drop(self.stdin.take());
        let child = self
            .child
            .take()
            .ok_or_else(|| VitrineError::evaluation("ffmpeg sink not started"))?;
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| VitrineError::evaluation("ffmpeg sink not started"))?;
        wait_ffmpeg(child, self.stderr_drain.take())?;

        let video_path = self
            .video_tmp
            .0
            .clone()
            .ok_or_else(|| VitrineError::evaluation("ffmpeg sink lost its video spool path"))?;

        let bytes = match cfg.audio {
            Some(audio) if !self.audio.is_empty() => {
                let pcm_path = self.spool_path("audio", "f32le");
                let _pcm_guard = TempFileGuard(Some(pcm_path.clone()));
                let muxed_path = self.spool_path("muxed", cfg.container.extension());
                let _muxed_guard = TempFileGuard(Some(muxed_path.clone()));
                write_f32le_file(&self.audio, &pcm_path)?;
                mux_audio(&video_path, &pcm_path, &muxed_path, audio, cfg.container)?;
                read_artifact(&muxed_path)?
            }
            _ => read_artifact(&video_path)?,
        };

        self.audio.clear();
        self.video_tmp = TempFileGuard(None);
        Ok(EncodedOutput {
            bytes,
            mime: cfg.container.mime().to_owned(),
        })
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            // Killing an encoder that already exited fails harmlessly.
            let _ = child.kill();
            if let Err(e) = child.wait() {
                tracing::warn!(error = %e, "failed to reap aborted ffmpeg");
            }
            tracing::debug!("ffmpeg sink aborted");
        }
        if let Some(drain) = self.stderr_drain.take() {
            let _ = drain.join();
        }
        self.cfg = None;
        self.last_idx = None;
        self.audio.clear();
        self.video_tmp = TempFileGuard(None);
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate. Rational fps as `num/den`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn push_video_codec(cmd: &mut Command, container: Container, bitrate: u64) {
    let rate = bitrate.to_string();
    match container {
        Container::Webm => cmd.args([
            "-c:v", "libvpx", "-b:v", &rate, "-pix_fmt", "yuv420p", "-f", "webm",
        ]),
        Container::Mp4 => cmd.args([
            "-c:v",
            "libx264",
            "-b:v",
            &rate,
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
            "-f",
            "mp4",
        ]),
    };
}

fn mux_audio(
    video: &Path,
    pcm: &Path,
    out: &Path,
    audio: AudioStreamConfig,
    container: Container,
) -> VitrineResult<()> {
    let audio_codec = match container {
        Container::Webm => "libopus",
        Container::Mp4 => "aac",
    };
    let mut cmd = Command::new("ffmpeg");
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .args(["-y", "-loglevel", "error", "-i"])
        .arg(video)
        .args([
            "-f",
            "f32le",
            "-ar",
            &audio.sample_rate.to_string(),
            "-ac",
            &audio.channels.to_string(),
            "-i",
        ])
        .arg(pcm)
        .args(["-c:v", "copy", "-c:a", audio_codec, "-f", container.extension()]);
    if container == Container::Mp4 {
        cmd.args(["-movflags", "+faststart"]);
    }
    cmd.arg(out);

    let output = cmd.output().map_err(|e| {
        VitrineError::capture_unsupported(format!("failed to spawn ffmpeg for muxing: {e}"))
    })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VitrineError::evaluation(format!(
            "ffmpeg mux exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

fn wait_ffmpeg(
    mut child: Child,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
) -> VitrineResult<()> {
    let status = child.wait().map_err(|e| {
        VitrineError::evaluation(format!("failed to wait for ffmpeg to finish: {e}"))
    })?;
    let stderr_bytes = match stderr_drain {
        Some(handle) => handle
            .join()
            .map_err(|_| VitrineError::evaluation("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| VitrineError::evaluation(format!("ffmpeg stderr read failed: {e}")))?,
        None => Vec::new(),
    };

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr_bytes);
        return Err(VitrineError::evaluation(format!(
            "ffmpeg exited with status {}: {}",
            status,
            stderr.trim()
        )));
    }
    Ok(())
}

fn read_artifact(path: &Path) -> VitrineResult<Vec<u8>> {
    use anyhow::Context as _;
    Ok(std::fs::read(path).with_context(|| format!("read encoded clip '{}'", path.display()))?)
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> VitrineResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(VitrineError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> VitrineResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Removes the file it names on drop.
struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
