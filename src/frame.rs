//! Representative-frame extraction.
//!
//! [`FrameSource`] opens a media file and decodes the first frame of its best
//! video stream. [`extract_frame`] wraps the whole path from file to base64
//! JPEG payload.
//!
//! Only the first decodable frame is used. There is no shot detection or
//! keyframe sampling, so videos that open on a black or title frame will be
//! described from that frame.
//!
//! All FFmpeg state (demuxer, decoder, scaler) is owned by values on the
//! stack or inside [`FrameSource`] and released when they drop, on success
//! and failure alike.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    io::Cursor,
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    codec::{Parameters, context::Context as CodecContext},
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, ImageFormat, RgbImage};

use crate::{
    config::FrameOutputOptions,
    conversion::{data_uri, rgb_frame_to_buffer, to_base64},
    error::MediaError,
};

/// MIME type of the encoded frame.
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// An opened media file positioned before its first video frame.
///
/// # Example
///
/// ```no_run
/// use framesight::{FrameOutputOptions, FrameSource, MediaError};
///
/// let mut source = FrameSource::open("videos/sample.mp4")?;
/// let frame = source.first_frame(&FrameOutputOptions::new())?;
/// println!("{}x{}", frame.width(), frame.height());
/// # Ok::<(), MediaError>(())
/// ```
pub struct FrameSource {
    input_context: Input,
    decoder: VideoDecoder,
    video_stream_index: usize,
    path: PathBuf,
}

impl Debug for FrameSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FrameSource")
            .field("video_stream_index", &self.video_stream_index)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FrameSource {
    /// Open a media file, locate its best video stream and open a decoder
    /// for it.
    ///
    /// # Errors
    ///
    /// - [`MediaError::Open`] if FFmpeg cannot open or probe the file, or has
    ///   no usable decoder for the video codec.
    /// - [`MediaError::NoVideoStream`] if the container has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MediaError> {
        let path = path.as_ref().to_path_buf();

        log::debug!("Opening media file: {}", path.display());

        ffmpeg_next::init().map_err(|error| MediaError::Open {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| MediaError::Open {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let (video_stream_index, parameters) = input_context
            .streams()
            .best(Type::Video)
            .map(|stream| (stream.index(), stream.parameters()))
            .ok_or_else(|| MediaError::NoVideoStream { path: path.clone() })?;
        let decoder = open_decoder(parameters, &path)?;

        log::info!(
            "Opened media file: {} (format={}, video_stream={})",
            path.display(),
            input_context.format().name(),
            video_stream_index,
        );

        Ok(Self {
            input_context,
            decoder,
            video_stream_index,
            path,
        })
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the first frame of the video stream as an RGB8 image.
    ///
    /// Packets are fed in stream order until the decoder produces a frame.
    /// Packets the decoder rejects are skipped. If the stream ends, the
    /// decoder is flushed once before giving up. Reading continues from the
    /// current position, so call this once on a freshly opened source.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Read`] if no frame can be decoded or pixel
    /// conversion fails.
    pub fn first_frame(&mut self, options: &FrameOutputOptions) -> Result<DynamicImage, MediaError> {
        let path = self.path.clone();
        let read_error = move |reason: String| MediaError::Read {
            path: path.clone(),
            reason,
        };

        let mut decoded_frame = VideoFrame::empty();
        let mut packets_sent = 0_u64;

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != self.video_stream_index {
                continue;
            }

            if let Err(error) = self.decoder.send_packet(&packet) {
                log::debug!("Skipping packet the decoder rejected: {error}");
                continue;
            }
            packets_sent += 1;

            if self.decoder.receive_frame(&mut decoded_frame).is_ok() {
                log::debug!("Decoded first frame after {packets_sent} packet(s)");
                return convert_frame(&decoded_frame, options).map_err(&read_error);
            }
        }

        // Codecs with reordering delay hold frames until end of stream.
        if self.decoder.send_eof().is_ok() && self.decoder.receive_frame(&mut decoded_frame).is_ok()
        {
            log::debug!("Decoded first frame while flushing after {packets_sent} packet(s)");
            return convert_frame(&decoded_frame, options).map_err(&read_error);
        }

        Err(read_error(format!(
            "no decodable frame in video stream ({packets_sent} packet(s) read)"
        )))
    }
}

/// Open a video decoder for the stream described by `parameters`.
///
/// A codec FFmpeg can demux but not decode makes the file unopenable.
fn open_decoder(parameters: Parameters, path: &Path) -> Result<VideoDecoder, MediaError> {
    let open_error = |reason: String| MediaError::Open {
        path: path.to_path_buf(),
        reason,
    };

    let decoder_context = CodecContext::from_parameters(parameters)
        .map_err(|error| open_error(format!("Failed to read codec parameters: {error}")))?;
    decoder_context
        .decoder()
        .video()
        .map_err(|error| open_error(format!("Unsupported video codec: {error}")))
}

/// Scale a decoded frame to RGB24 at the requested size.
fn convert_frame(
    decoded_frame: &VideoFrame,
    options: &FrameOutputOptions,
) -> Result<DynamicImage, String> {
    let source_width = decoded_frame.width();
    let source_height = decoded_frame.height();
    let (width, height) = options.resolve_dimensions(source_width, source_height);

    log::debug!(
        "Converting frame: {}x{} {:?} -> {}x{} RGB24",
        source_width,
        source_height,
        decoded_frame.format(),
        width,
        height,
    );

    let mut scaler = ScalingContext::get(
        decoded_frame.format(),
        source_width,
        source_height,
        Pixel::RGB24,
        width,
        height,
        ScalingFlags::BILINEAR,
    )
    .map_err(|error| format!("Failed to create scaler: {error}"))?;

    let mut rgb_frame = VideoFrame::empty();
    scaler
        .run(decoded_frame, &mut rgb_frame)
        .map_err(|error| format!("Pixel conversion failed: {error}"))?;

    let buffer = rgb_frame_to_buffer(&rgb_frame, width, height);
    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| "Converted frame buffer has unexpected size".to_string())?;

    Ok(DynamicImage::ImageRgb8(image))
}

/// A frame re-encoded as JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    /// JPEG file bytes.
    pub jpeg: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl EncodedFrame {
    /// Base64 of the JPEG bytes (standard alphabet, padded, no line breaks).
    pub fn to_base64(&self) -> String {
        to_base64(&self.jpeg)
    }

    /// `data:image/jpeg;base64,...` form of the frame.
    pub fn data_uri(&self) -> String {
        data_uri(JPEG_MIME_TYPE, &self.to_base64())
    }
}

/// Encode an image as JPEG at the encoder's default quality.
///
/// # Errors
///
/// Returns [`MediaError::Encode`] if the JPEG encoder fails.
pub fn encode_jpeg(image: &DynamicImage) -> Result<EncodedFrame, MediaError> {
    // The JPEG encoder has no alpha support.
    let rgb = match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => image.clone(),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let mut jpeg = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)?;

    log::debug!(
        "Encoded {}x{} frame as JPEG ({} bytes)",
        rgb.width(),
        rgb.height(),
        jpeg.len()
    );

    Ok(EncodedFrame {
        jpeg,
        width: rgb.width(),
        height: rgb.height(),
    })
}

/// Open `path`, decode its first frame and encode it as JPEG.
///
/// # Errors
///
/// Any [`MediaError`] from opening, decoding or encoding.
pub fn extract_encoded_frame<P: AsRef<Path>>(
    path: P,
    options: &FrameOutputOptions,
) -> Result<EncodedFrame, MediaError> {
    let mut source = FrameSource::open(path)?;
    let image = source.first_frame(options)?;
    drop(source);
    encode_jpeg(&image)
}

/// Extract the first frame of `path` as a base64 JPEG payload.
///
/// The result can be embedded as `data:image/jpeg;base64,<payload>`.
///
/// # Errors
///
/// - [`MediaError::Open`] / [`MediaError::NoVideoStream`] if the file cannot
///   be opened as a video.
/// - [`MediaError::Read`] if no frame can be decoded.
/// - [`MediaError::Encode`] if JPEG encoding fails.
///
/// # Example
///
/// ```no_run
/// let payload = framesight::extract_frame("videos/sample.mp4")?;
/// assert!(!payload.is_empty());
/// # Ok::<(), framesight::MediaError>(())
/// ```
pub fn extract_frame<P: AsRef<Path>>(path: P) -> Result<String, MediaError> {
    extract_encoded_frame(path, &FrameOutputOptions::default()).map(|frame| frame.to_base64())
}
