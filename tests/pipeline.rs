//! End-to-end runs of the analyzer with a stubbed model transport.

mod common;

use std::cell::Cell;

use framesight::{
    AnalysisOptions, AnalysisResult, ChatCompletionRequest, Credential, EncodedFrame,
    FrameOutputOptions, FramesightError, InferenceClient, InferenceError, OutputFormat,
    VideoAnalyzer,
};
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::json;

const SCENE: &str = "A flat blue field fills the frame from edge to edge with no motion at all.";

fn analysis_body() -> String {
    common::completion_body(
        &json!({
            "title": "Blue Field",
            "sceneDescription": SCENE,
            "narrativeExplanation": "A test pattern. Nothing happens.",
        })
        .to_string(),
    )
}

/// A small JPEG frame that does not need FFmpeg to produce.
fn still_frame() -> EncodedFrame {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([30, 120, 200])));
    framesight::encode_jpeg(&image).expect("Failed to encode JPEG")
}

fn render_to_string(
    outcome: Result<AnalysisResult, FramesightError>,
    format: OutputFormat,
) -> (Option<AnalysisResult>, String) {
    let mut out = Vec::new();
    let result = framesight::render_outcome(outcome, format, &mut out).expect("write to Vec");
    (result, String::from_utf8(out).unwrap())
}

fn run_to_string<T: framesight::Transport>(
    analyzer: &VideoAnalyzer<T>,
    path: &std::path::Path,
    format: OutputFormat,
) -> (Option<AnalysisResult>, String) {
    let mut out = Vec::new();
    let result = framesight::run(analyzer, path, format, &mut out).expect("write to Vec");
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn success_prints_three_sections() {
    let Some((_directory, path)) = common::solid_color_fixture() else {
        return;
    };

    let analyzer = VideoAnalyzer::new(common::client_returning(analysis_body()));
    let (result, output) = run_to_string(&analyzer, &path, OutputFormat::Text);

    let result = result.expect("analysis should succeed");
    assert_eq!(result.title, "Blue Field");
    assert_eq!(
        output,
        format!(
            "Video Analysis Result:\n\nVideo Title: Blue Field\n\nScene Description: {SCENE}\n\nNarrative Explanation: A test pattern. Nothing happens.\n"
        )
    );
}

#[test]
fn json_output_round_trips() {
    let Some((_directory, path)) = common::solid_color_fixture() else {
        return;
    };

    let analyzer = VideoAnalyzer::new(common::client_returning(analysis_body()));
    let (result, output) = run_to_string(&analyzer, &path, OutputFormat::Json);

    let parsed: AnalysisResult = serde_json::from_str(&output).expect("output should be JSON");
    assert_eq!(Some(parsed), result);
}

#[test]
fn model_failure_prints_one_line() {
    let Some((_directory, path)) = common::solid_color_fixture() else {
        return;
    };

    let analyzer = VideoAnalyzer::new(common::client_failing("operation timed out"));
    let (result, output) = run_to_string(&analyzer, &path, OutputFormat::Text);

    assert!(result.is_none());
    assert_eq!(output.lines().count(), 1, "{output:?}");
    assert!(output.starts_with("Model Invocation Error:"), "{output:?}");
    assert!(output.contains("operation timed out"));
    assert!(!output.contains("Video Title"));
}

#[test]
fn invalid_model_output_prints_one_line() {
    let Some((_directory, path)) = common::solid_color_fixture() else {
        return;
    };

    let body = common::completion_body(
        &json!({
            "title": "x".repeat(80),
            "sceneDescription": SCENE,
            "narrativeExplanation": "N",
        })
        .to_string(),
    );
    let analyzer = VideoAnalyzer::new(common::client_returning(body));
    let (result, output) = run_to_string(&analyzer, &path, OutputFormat::Text);

    assert!(result.is_none());
    assert_eq!(output.lines().count(), 1);
    assert!(output.starts_with("Model Invocation Error:"));
}

#[test]
fn missing_video_skips_the_model() {
    let called = Cell::new(false);
    let client = InferenceClient::with_transport(
        Credential::new("test-key"),
        AnalysisOptions::new(),
        |_: &Credential, _: &ChatCompletionRequest| {
            called.set(true);
            Err::<String, _>(InferenceError::new("unreachable"))
        },
    );
    let analyzer = VideoAnalyzer::new(client);

    let directory = tempfile::tempdir().unwrap();
    let (result, output) = run_to_string(
        &analyzer,
        &directory.path().join("missing.mp4"),
        OutputFormat::Text,
    );

    assert!(result.is_none());
    assert_eq!(output.lines().count(), 1, "{output:?}");
    assert!(output.starts_with("Video Processing Error:"), "{output:?}");
    assert!(!called.get(), "model must not be called after a media failure");
}

#[test]
fn analyze_reports_the_failing_stage() {
    let analyzer = VideoAnalyzer::new(common::client_returning(analysis_body()));
    let error = analyzer.analyze("does/not/exist.mp4").unwrap_err();
    assert!(matches!(error, FramesightError::Media(_)), "{error:?}");
    assert_eq!(error.stage_label(), "Video Processing Error");
}

#[test]
fn frame_options_apply_before_the_model_call() {
    let Some((_directory, path)) = common::solid_color_fixture() else {
        return;
    };

    let analyzer = VideoAnalyzer::new(common::client_returning(analysis_body()))
        .with_frame_options(FrameOutputOptions::new().with_max_dimension(64));
    let frame = analyzer.extract(&path).unwrap();
    assert_eq!((frame.width, frame.height), (64, 48));

    let result = analyzer.describe(&frame).unwrap();
    assert_eq!(result.scene_description, SCENE);
}

#[test]
fn timeout_on_an_encoded_frame_prints_one_line() {
    let analyzer = VideoAnalyzer::new(common::client_failing("operation timed out"));
    let (result, output) =
        render_to_string(analyzer.describe(&still_frame()), OutputFormat::Text);

    assert!(result.is_none());
    assert_eq!(
        output,
        "Model Invocation Error: Error invoking model: operation timed out\n"
    );
}

#[test]
fn encoded_frame_success_prints_three_sections() {
    let analyzer = VideoAnalyzer::new(common::client_returning(analysis_body()));
    let (result, output) =
        render_to_string(analyzer.describe(&still_frame()), OutputFormat::Text);

    assert_eq!(result.map(|result| result.title), Some("Blue Field".to_string()));
    for label in ["Video Title:", "Scene Description:", "Narrative Explanation:"] {
        assert_eq!(output.matches(label).count(), 1, "{label} in {output:?}");
    }
}
