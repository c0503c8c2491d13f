//! Internal conversion helpers.
//!
//! Pixel-buffer packing for decoded FFmpeg frames and the base64 / data-URI
//! encodings used to ship a JPEG inside a JSON request.

use base64::{Engine, engine::general_purpose::STANDARD};
use ffmpeg_next::frame::Video as VideoFrame;

/// Copy the first plane of an RGB24 frame into a tightly-packed buffer.
///
/// FFmpeg pads each row to its line size; the `image` crate expects rows of
/// exactly `width * 3` bytes.
pub(crate) fn rgb_frame_to_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_length = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == row_length {
        return data[..row_length * (height as usize)].to_vec();
    }

    let mut buffer = Vec::with_capacity(row_length * (height as usize));
    for row in 0..(height as usize) {
        let row_start = row * stride;
        buffer.extend_from_slice(&data[row_start..row_start + row_length]);
    }
    buffer
}

/// Standard-alphabet, padded, unwrapped base64.
pub(crate) fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// `data:<mime_type>;base64,<payload>`.
pub(crate) fn data_uri(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{mime_type};base64,{base64_payload}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_has_no_line_breaks() {
        let encoded = to_base64(&[0xAB; 300]);
        assert!(!encoded.contains('\n'));
        assert_eq!(encoded.len(), 400);
    }

    #[test]
    fn data_uri_format() {
        assert_eq!(data_uri("image/jpeg", "QUJD"), "data:image/jpeg;base64,QUJD");
    }
}
