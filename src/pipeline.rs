//! End-to-end analysis: frame extraction, model call, console report.
//!
//! [`VideoAnalyzer`] composes the frame extractor with an
//! [`InferenceClient`]. [`run`] drives one analysis and renders either the
//! result or a single diagnostic line; it is the only place stage errors are
//! caught.

use std::{
    io::{Result as IoResult, Write},
    path::Path,
};

use crate::{
    analysis::AnalysisResult,
    config::FrameOutputOptions,
    error::FramesightError,
    frame::{EncodedFrame, extract_encoded_frame},
    inference::{HttpTransport, InferenceClient, Transport},
    report::{OutputFormat, write_analysis, write_failure},
};

/// Extracts a frame from a video and asks the model to describe it.
///
/// # Example
///
/// ```no_run
/// use framesight::{AnalysisOptions, Credential, InferenceClient, VideoAnalyzer};
///
/// let client = InferenceClient::new(Credential::new("key"), AnalysisOptions::new())?;
/// let analyzer = VideoAnalyzer::new(client);
/// let result = analyzer.analyze("videos/sample.mp4")?;
/// println!("{}", result.title);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct VideoAnalyzer<T = HttpTransport> {
    client: InferenceClient<T>,
    frame_options: FrameOutputOptions,
}

impl<T: Transport> VideoAnalyzer<T> {
    /// Analyzer using the source frame resolution.
    pub fn new(client: InferenceClient<T>) -> Self {
        Self {
            client,
            frame_options: FrameOutputOptions::default(),
        }
    }

    /// Set the frame output options.
    #[must_use]
    pub fn with_frame_options(mut self, frame_options: FrameOutputOptions) -> Self {
        self.frame_options = frame_options;
        self
    }

    /// Extract and encode the representative frame of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FramesightError::Media`] if extraction fails.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<EncodedFrame, FramesightError> {
        Ok(extract_encoded_frame(path, &self.frame_options)?)
    }

    /// Send an already-encoded frame to the model.
    ///
    /// # Errors
    ///
    /// Returns [`FramesightError::Inference`] if the call fails.
    pub fn describe(&self, frame: &EncodedFrame) -> Result<AnalysisResult, FramesightError> {
        let prompt = &self.client.options().prompt;
        Ok(self.client.invoke(prompt, &frame.to_base64())?)
    }

    /// Extract the frame of `path` and describe it.
    ///
    /// # Errors
    ///
    /// Fails with the error of whichever stage failed first; the model is
    /// not called when extraction fails.
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> Result<AnalysisResult, FramesightError> {
        let frame = self.extract(path)?;
        self.describe(&frame)
    }
}

/// Analyze `path` and print the outcome to `out`.
///
/// On success the result is written in `format` and returned. On failure
/// exactly one diagnostic line, prefixed by the failing stage, is written and
/// `None` is returned.
///
/// # Errors
///
/// Only I/O errors writing to `out` are returned.
pub fn run<T, P, W>(
    analyzer: &VideoAnalyzer<T>,
    path: P,
    format: OutputFormat,
    out: &mut W,
) -> IoResult<Option<AnalysisResult>>
where
    T: Transport,
    P: AsRef<Path>,
    W: Write,
{
    render_outcome(analyzer.analyze(path), format, out)
}

/// Print the outcome of an analysis to `out`.
///
/// This is the output half of [`run`], for callers that drive the stages
/// themselves (for example [`VideoAnalyzer::describe`] on a frame they
/// already hold).
///
/// # Errors
///
/// Only I/O errors writing to `out` are returned.
pub fn render_outcome<W: Write>(
    outcome: Result<AnalysisResult, FramesightError>,
    format: OutputFormat,
    out: &mut W,
) -> IoResult<Option<AnalysisResult>> {
    match outcome {
        Ok(result) => {
            write_analysis(out, &result, format)?;
            Ok(Some(result))
        }
        Err(error) => {
            log::debug!("Analysis failed: {error:?}");
            write_failure(out, &error)?;
            Ok(None)
        }
    }
}
