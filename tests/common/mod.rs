//! Shared test helpers.
//!
//! Synthesizes small videos with FFmpeg's built-in MPEG-4 encoder so tests do
//! not depend on checked-in fixtures.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Packet, Rational,
    codec::{Id, context::Context as CodecContext},
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use framesight::{
    AnalysisOptions, ChatCompletionRequest, Credential, InferenceClient, InferenceError,
};
use tempfile::TempDir;

pub const FPS: i32 = 10;

/// Write `seconds` of a single solid colour to an AVI file.
pub fn write_solid_color_video(
    path: &Path,
    width: u32,
    height: u32,
    seconds: u32,
    rgb: [u8; 3],
) -> Result<(), ffmpeg_next::Error> {
    ffmpeg_next::init()?;

    let mut output = ffmpeg_next::format::output(&path)?;
    let codec = ffmpeg_next::encoder::find(Id::MPEG4).ok_or(ffmpeg_next::Error::EncoderNotFound)?;

    let mut stream = output.add_stream(codec)?;
    let stream_index = stream.index();

    let mut encoder = CodecContext::from_parameters(stream.parameters())?
        .encoder()
        .video()?;
    encoder.set_width(width);
    encoder.set_height(height);
    encoder.set_format(Pixel::YUV420P);
    encoder.set_time_base(Rational::new(1, FPS));
    encoder.set_frame_rate(Some(Rational::new(FPS, 1)));

    let mut encoder = encoder.open_as(codec)?;
    stream.set_parameters(&encoder);

    output.write_header()?;
    let stream_time_base = output
        .stream(stream_index)
        .ok_or(ffmpeg_next::Error::StreamNotFound)?
        .time_base();

    let mut source = VideoFrame::new(Pixel::RGB24, width, height);
    let stride = source.stride(0);
    let data = source.data_mut(0);
    for row in 0..height as usize {
        for column in 0..width as usize {
            let offset = row * stride + column * 3;
            data[offset..offset + 3].copy_from_slice(&rgb);
        }
    }

    let mut scaler = ScalingContext::get(
        Pixel::RGB24,
        width,
        height,
        Pixel::YUV420P,
        width,
        height,
        ScalingFlags::BILINEAR,
    )?;

    let mut packet = Packet::empty();
    for index in 0..(seconds as i64 * FPS as i64) {
        let mut frame = VideoFrame::empty();
        scaler.run(&source, &mut frame)?;
        frame.set_pts(Some(index));
        encoder.send_frame(&frame)?;

        while encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(stream_index);
            packet.rescale_ts(Rational::new(1, FPS), stream_time_base);
            packet.write_interleaved(&mut output)?;
        }
    }

    encoder.send_eof()?;
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(stream_index);
        packet.rescale_ts(Rational::new(1, FPS), stream_time_base);
        packet.write_interleaved(&mut output)?;
    }

    output.write_trailer()?;
    Ok(())
}

/// A temporary 320x240, 2-second solid-colour video.
///
/// Returns `None` (and the test should return early) when the MPEG-4 encoder
/// is unavailable in the linked FFmpeg build.
pub fn solid_color_fixture() -> Option<(TempDir, PathBuf)> {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join("solid.avi");
    match write_solid_color_video(&path, 320, 240, 2, [30, 120, 200]) {
        Ok(()) => Some((directory, path)),
        Err(error) => {
            eprintln!("Skipping: cannot synthesize test video ({error})");
            None
        }
    }
}

/// Wrap `content` in a chat-completions response body.
pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop",
        }],
    })
    .to_string()
}

/// A client whose transport always returns `body`.
pub fn client_returning(
    body: String,
) -> InferenceClient<impl Fn(&Credential, &ChatCompletionRequest) -> Result<String, InferenceError>> {
    InferenceClient::with_transport(
        Credential::new("test-key"),
        AnalysisOptions::new(),
        move |_: &Credential, _: &ChatCompletionRequest| Ok::<_, InferenceError>(body.clone()),
    )
}

/// A client whose transport always fails with `message`.
pub fn client_failing(
    message: &'static str,
) -> InferenceClient<impl Fn(&Credential, &ChatCompletionRequest) -> Result<String, InferenceError>> {
    InferenceClient::with_transport(
        Credential::new("test-key"),
        AnalysisOptions::new(),
        move |_: &Credential, _: &ChatCompletionRequest| {
            Err::<String, _>(InferenceError::new(message))
        },
    )
}
