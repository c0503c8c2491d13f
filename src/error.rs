//! Error types for the `framesight` crate.
//!
//! Each pipeline stage has its own error type: [`ConfigurationError`] for
//! credential resolution, [`MediaError`] for frame extraction, and
//! [`InferenceError`] for the remote model call. [`FramesightError`] unifies
//! them for the top-level run, which is the only place errors are reported.

use std::{io::Error as IoError, path::PathBuf};

use image::ImageError;
use thiserror::Error;

/// Failure while resolving the API credential.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// The interactive prompt could not read from the terminal.
    #[error("Failed to read API key from terminal: {0}")]
    Prompt(#[from] IoError),

    /// Neither the environment nor the operator supplied a key.
    #[error("No API key provided (set {variable} or enter one when prompted)")]
    Empty {
        /// Environment variable that was consulted.
        variable: String,
    },
}

/// Failure while extracting or encoding the representative frame.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MediaError {
    /// The media container could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    Open {
        /// Path passed to [`crate::FrameSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The container opened but holds no video stream.
    #[error("No video stream found in {path}")]
    NoVideoStream {
        /// Path of the opened container.
        path: PathBuf,
    },

    /// No frame could be decoded from the video stream.
    #[error("Failed to read video frame from {path}: {reason}")]
    Read {
        /// Path of the opened container.
        path: PathBuf,
        /// Underlying reason decoding failed.
        reason: String,
    },

    /// The decoded frame could not be re-encoded as JPEG.
    #[error("Failed to encode frame as JPEG: {0}")]
    Encode(#[from] ImageError),
}

/// Failure of the remote structured-inference call.
///
/// Transport errors, authentication rejections, malformed bodies and schema
/// violations all collapse into this one kind; only the message differs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error invoking model: {message}")]
pub struct InferenceError {
    message: String,
}

impl InferenceError {
    /// Create an error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The underlying cause's message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for InferenceError {
    fn from(error: serde_json::Error) -> Self {
        InferenceError::new(format!("Failed to parse response: {error}"))
    }
}

impl From<SchemaViolation> for InferenceError {
    fn from(violation: SchemaViolation) -> Self {
        InferenceError::new(format!("Response failed validation: {violation}"))
    }
}

/// A structured response field that falls outside its declared length bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} must be {expected} characters long (got {actual})")]
pub struct SchemaViolation {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// Human-readable bound, e.g. `at most 50` or `between 50 and 150`.
    pub expected: String,
    /// Observed length in characters.
    pub actual: usize,
}

/// Unrecognised FFmpeg log-level name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown FFmpeg log level `{0}` (expected quiet, fatal, error, warning, info or debug)")]
pub struct UnknownLogLevel(pub String);

/// Any failure of a full analysis run.
#[derive(Debug, Error)]
pub enum FramesightError {
    /// Credential resolution failed.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Frame extraction failed.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// The model call failed.
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl FramesightError {
    /// Console prefix naming the stage that failed.
    pub fn stage_label(&self) -> &'static str {
        match self {
            FramesightError::Configuration(_) => "Configuration Error",
            FramesightError::Media(_) => "Video Processing Error",
            FramesightError::Inference(_) => "Model Invocation Error",
        }
    }
}
