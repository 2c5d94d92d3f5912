//! Vitrine composes real-estate listing creatives.
//!
//! Two outputs are built from one set of listing photos and metadata:
//!
//! - Feed stills: each photo cover-fitted with a listing overlay, exported as PNGs or a zip
//!   ([`export_feed_stills`])
//! - Reels: a looping, cross-faded sequence ([`AnimatedCompositor`]) recorded into one clip with
//!   the soundtrack mixed in ([`CaptureSession`])
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod assets;
pub mod audio;
pub mod capture;
pub mod compose;
pub mod config;
pub mod creative;
pub mod encode;
pub mod export;
pub mod foundation;
pub mod render;
pub mod text;
pub mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rect, Rgba8};
pub use crate::foundation::error::{VitrineError, VitrineResult};

pub use crate::assets::decode::{DecodedAsset, decode_image};
pub use crate::assets::loader::{AssetSet, load_assets};
pub use crate::assets::media::{AudioPcm, resolve_audio};
pub use crate::capture::clock::{Clock, ManualClock, RepaintLoop, SystemClock};
pub use crate::capture::player::Player;
pub use crate::capture::session::{
    AudioTrackStatus, CancelToken, CaptureSession, ClipArtifact, Pacing,
};
pub use crate::compose::animated::{AnimatedCompositor, CompositorState};
pub use crate::compose::overlay::{OverlayPlan, OverlayProfile, build_overlay};
pub use crate::compose::still::{ComposedStill, StaticComposer};
pub use crate::config::policy::{
    CaptureConfig, ColorAdjust, Container, EngineConfig, FitPolicy, FontPaths, TimingPolicy,
};
pub use crate::creative::collab::{
    CaptionGenerator, Captions, MetadataExtractor, PublishOutcome, Publisher,
};
pub use crate::creative::metadata::{
    AudioRef, CreativeMetadata, FitMode, NegotiationType, PartialMetadata, PropertyType,
};
pub use crate::creative::project::CreativeProject;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{EncodedOutput, FrameLog, FrameSink, SinkConfig};
pub use crate::export::batch::{ExportedStill, StillBatch, export_feed_stills};
pub use crate::render::backend::{FrameRGBA, encode_png};
pub use crate::text::engine::{FixedAdvance, FontBook, FontFace, TextLayoutEngine, TextMeasure};
pub use crate::timeline::model::{
    AssetSource, EntryId, EntryKind, MoveDirection, Timeline, TimelineEntry, TimelineFormat,
};
pub use crate::timeline::schedule::{SegmentSample, sample_at};
