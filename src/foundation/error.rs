/// Convenience result type used across vitrine.
pub type VitrineResult<T> = Result<T, VitrineError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum VitrineError {
    /// Invalid caller-provided data (configuration, metadata, canvas sizes).
    #[error("validation error: {0}")]
    Validation(String),

    /// A timeline that breaks a placement rule (cover not first, closing not last, ...).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Reorder index outside `[0, len)`.
    #[error("index out of range: from={from} to={to} len={len}")]
    OutOfRange {
        /// Requested source index.
        from: usize,
        /// Requested destination index.
        to: usize,
        /// Timeline length at the time of the request.
        len: usize,
    },

    /// A timeline entry whose source could not be resolved or decoded.
    #[error("asset decode error for entry '{entry}': {reason}")]
    AssetDecode {
        /// Id of the failing entry.
        entry: String,
        /// Underlying failure.
        reason: String,
    },

    /// Frame capture or encoding is not available on this host.
    #[error("capture unsupported: {0}")]
    CaptureUnsupported(String),

    /// The audio source could not be resolved or started.
    #[error("audio source unavailable: {0}")]
    AudioSourceUnavailable(String),

    /// Errors while evaluating or rendering a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VitrineError {
    /// Build a [`VitrineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VitrineError::InvariantViolation`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Build a [`VitrineError::AssetDecode`] value.
    pub fn asset_decode(entry: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::AssetDecode {
            entry: entry.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`VitrineError::CaptureUnsupported`] value.
    pub fn capture_unsupported(msg: impl Into<String>) -> Self {
        Self::CaptureUnsupported(msg.into())
    }

    /// Build a [`VitrineError::AudioSourceUnavailable`] value.
    pub fn audio_unavailable(msg: impl Into<String>) -> Self {
        Self::AudioSourceUnavailable(msg.into())
    }

    /// Build a [`VitrineError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`VitrineError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
