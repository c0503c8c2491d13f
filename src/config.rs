//! Analysis configuration.
//!
//! [`AnalysisOptions`] is a builder that carries the model selection, sampling
//! temperature, endpoint and prompt text into the inference client.
//! [`FrameOutputOptions`] controls the resolution of the extracted frame.
//!
//! # Example
//!
//! ```
//! use framesight::{AnalysisOptions, FrameOutputOptions};
//!
//! let options = AnalysisOptions::new()
//!     .with_model("gemini-2.5-pro")
//!     .with_temperature(0.0);
//! let frame = FrameOutputOptions::new().with_max_dimension(1024);
//! # let _ = (options, frame);
//! ```

use crate::prompt::{ANALYSIS_PROMPT, SYSTEM_PROMPT};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// OpenAI-compatible Gemini endpoint used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Settings for the remote structured-inference call.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    /// Model identifier sent with the request.
    pub model: String,
    /// Sampling temperature, clamped to `[0.0, 2.0]`.
    pub temperature: f32,
    /// Base URL of the chat-completions API (without the trailing path).
    pub base_url: String,
    /// Persona sent as the system message.
    pub system_prompt: String,
    /// Instruction sent alongside the frame in the user message.
    pub prompt: String,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisOptions {
    /// Create options with the default model, temperature, endpoint and prompts.
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            prompt: ANALYSIS_PROMPT.to_string(),
        }
    }

    /// Select the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    ///
    /// Clamped to `[0.0, 2.0]`; NaN falls back to the default.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = if temperature.is_nan() {
            DEFAULT_TEMPERATURE
        } else {
            temperature.clamp(0.0, 2.0)
        };
        self
    }

    /// Point the client at a different API base URL.
    ///
    /// A trailing `/` is stripped.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the system persona.
    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Replace the analysis instruction.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Full URL of the chat-completions endpoint.
    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Output settings for the extracted frame.
///
/// By default the frame keeps the source resolution. Setting
/// [`max_dimension`](FrameOutputOptions::max_dimension) shrinks large frames
/// so the longest edge fits, preserving the aspect ratio. Frames already
/// within the bound are never upscaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOutputOptions {
    /// Upper bound for the longest edge in pixels. `None` keeps the source size.
    pub max_dimension: Option<u32>,
}

impl FrameOutputOptions {
    /// Options that keep the source resolution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the longest edge of the output frame. Zero is treated as one.
    #[must_use]
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = Some(max_dimension.max(1));
        self
    }

    /// Resolve the output dimensions for a frame of the given source size.
    ///
    /// Returns `(width, height)`.
    pub(crate) fn resolve_dimensions(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        let Some(limit) = self.max_dimension else {
            return (source_width, source_height);
        };

        let longest = source_width.max(source_height);
        if longest <= limit || longest == 0 {
            return (source_width, source_height);
        }

        let ratio = limit as f64 / longest as f64;
        let width = (source_width as f64 * ratio).round() as u32;
        let height = (source_height as f64 * ratio).round() as u32;
        (width.max(1), height.max(1))
    }
}
