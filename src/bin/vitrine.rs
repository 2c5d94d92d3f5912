use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "vitrine", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine configuration JSON (timing, color, fit, capture, fonts).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the feed carousel as PNG stills.
    Stills(StillsArgs),
    /// Capture one loop of the reels sequence into a clip (requires `ffmpeg` on PATH).
    Reels(ReelsArgs),
    /// Validate both timelines and print their durations.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct StillsArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Also bundle the stills into `carrossel_completo.zip`.
    #[arg(long)]
    zip: bool,
}

#[derive(Parser, Debug)]
struct ReelsArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Output clip path.
    #[arg(long)]
    out: PathBuf,

    /// Frame pacing.
    #[arg(long, value_enum, default_value_t = PacingChoice::Offline)]
    pacing: PacingChoice,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PacingChoice {
    Offline,
    RealTime,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.config.as_deref() {
        Some(path) => vitrine::EngineConfig::from_path(path)?,
        None => vitrine::EngineConfig::default(),
    };
    match cli.cmd {
        Command::Stills(args) => cmd_stills(args, &config),
        Command::Reels(args) => cmd_reels(args, &config),
        Command::Check(args) => cmd_check(args, &config),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_fonts(config: &vitrine::EngineConfig) -> anyhow::Result<Option<vitrine::FontBook>> {
    Ok(vitrine::FontBook::from_paths(&config.fonts)?)
}

fn cmd_stills(args: StillsArgs, config: &vitrine::EngineConfig) -> anyhow::Result<()> {
    let project = vitrine::CreativeProject::from_path(&args.project)?;
    let timeline = project.feed_timeline(config.timing)?;
    let metadata = project.resolved_metadata()?;
    let fonts = load_fonts(config)?;

    let assets = vitrine::load_assets(&timeline)?;
    let batch = vitrine::export_feed_stills(
        &timeline,
        &assets,
        &metadata,
        vitrine::Canvas::FEED,
        fonts.as_ref(),
    )?;

    for path in batch.write_dir(&args.out)? {
        eprintln!("wrote {}", path.display());
    }
    if args.zip {
        let zip_path = args.out.join(vitrine::export::batch::DEFAULT_ZIP_NAME);
        std::fs::write(&zip_path, batch.to_zip()?)
            .with_context(|| format!("write zip '{}'", zip_path.display()))?;
        eprintln!("wrote {}", zip_path.display());
    }
    Ok(())
}

fn cmd_reels(args: ReelsArgs, config: &vitrine::EngineConfig) -> anyhow::Result<()> {
    let project = vitrine::CreativeProject::from_path(&args.project)?;
    let timeline = project.reels_timeline(config.timing)?;
    let metadata = project.resolved_metadata()?;
    let audio = metadata.audio.clone();
    let fonts = load_fonts(config)?;

    let clock = std::sync::Arc::new(vitrine::SystemClock::new());
    let mut compositor =
        vitrine::AnimatedCompositor::new(timeline, metadata, config, fonts.as_ref())?;
    compositor.load(vitrine::Clock::now(clock.as_ref()))?;

    let pacing = match args.pacing {
        PacingChoice::Offline => vitrine::Pacing::Offline,
        PacingChoice::RealTime => vitrine::Pacing::RealTime,
    };
    let mut sink = vitrine::FfmpegSink::default();
    let clip = vitrine::CaptureSession::new(&mut compositor, &config.capture)
        .with_pacing(pacing)
        .with_clock(clock)
        .capture(&audio, &mut sink)?;
    compositor.teardown();

    write_output(&args.out, &clip.bytes)?;
    if let vitrine::AudioTrackStatus::Silent { reason } = &clip.audio {
        eprintln!("note: clip is silent ({reason})");
    }
    eprintln!(
        "wrote {} ({} frames, {:.2}s, {})",
        args.out.display(),
        clip.frames,
        clip.duration.as_secs_f64(),
        clip.mime
    );
    Ok(())
}

fn cmd_check(args: CheckArgs, config: &vitrine::EngineConfig) -> anyhow::Result<()> {
    let project = vitrine::CreativeProject::from_path(&args.project)?;
    let feed = project.feed_timeline(config.timing)?;
    let reels = project.reels_timeline(config.timing)?;

    println!("feed: {} entries", feed.len());
    println!(
        "reels: {} entries, loop {}",
        reels.len(),
        fmt_ms(reels.total_duration())
    );
    let span = reels
        .total_duration()
        .saturating_sub(Duration::from_millis(config.capture.guard_ms));
    println!(
        "capture: {} frames at {} fps",
        config.capture.fps.duration_to_frames_round(span),
        config.capture.fps.as_f64()
    );
    Ok(())
}

fn fmt_ms(d: Duration) -> String {
    format!("{} ms", d.as_millis())
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    vitrine::encode::ffmpeg::ensure_parent_dir(path)?;
    std::fs::write(path, bytes).with_context(|| format!("write clip '{}'", path.display()))
}
