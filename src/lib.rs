//! # framesight
//!
//! Describe a video with a multimodal language model: extract a
//! representative frame, send it with an instruction to a remote model that is
//! constrained to a JSON Schema, and print the validated title, scene
//! description and narrative.
//!
//! Frames are decoded with FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate and re-encoded
//! as JPEG with [`image`]. The model is reached over an OpenAI-compatible
//! chat-completions API (Gemini by default).
//!
//! ## Quick Start
//!
//! ```no_run
//! use framesight::{AnalysisOptions, InferenceClient, VideoAnalyzer};
//!
//! let credential = framesight::resolve_credential()?;
//! let client = InferenceClient::new(credential, AnalysisOptions::new())?;
//! let result = VideoAnalyzer::new(client).analyze("videos/sample.mp4")?;
//!
//! println!("{}", result.title);
//! println!("{}", result.scene_description);
//! println!("{}", result.narrative_explanation);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Pipeline
//!
//! - **Credential**: [`resolve_credential`] reads `GOOGLE_API_KEY` (after
//!   loading `.env`) or prompts for it without echo.
//! - **Frame**: [`extract_frame`] decodes the first frame and returns it as a
//!   base64 JPEG.
//! - **Inference**: [`InferenceClient::invoke`] sends the frame as a `data:`
//!   URI with a JSON Schema constraint and validates the decoded
//!   [`AnalysisResult`].
//! - **Report**: [`run`] prints the result or one stage-prefixed diagnostic.
//!
//! ## Limitations
//!
//! Only the first decodable frame is analyzed. There is no shot detection or
//! keyframe sampling.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod analysis;
pub mod config;
mod conversion;
pub mod credential;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod inference;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod schema;

pub use analysis::{
    AnalysisResult, SCENE_DESCRIPTION_MAX_CHARS, SCENE_DESCRIPTION_MIN_CHARS, TITLE_MAX_CHARS,
};
pub use config::{AnalysisOptions, FrameOutputOptions};
pub use credential::{
    API_KEY_VARIABLE, Credential, SecretPrompt, TerminalPrompt, resolve_credential,
    resolve_credential_with,
};
pub use error::{
    ConfigurationError, FramesightError, InferenceError, MediaError, SchemaViolation,
    UnknownLogLevel,
};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use frame::{EncodedFrame, FrameSource, encode_jpeg, extract_encoded_frame, extract_frame};
pub use inference::{ChatCompletionRequest, HttpTransport, InferenceClient, Transport, invoke};
pub use pipeline::{VideoAnalyzer, render_outcome, run};
pub use prompt::{ANALYSIS_PROMPT, SYSTEM_PROMPT};
pub use report::OutputFormat;
pub use schema::StructuredOutput;
