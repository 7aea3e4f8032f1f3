use super::*;
use crate::error::CaptureError;
use crate::frame::{FrameData, FrameFormat};
use image::Rgba;
use std::time::{Duration, Instant, SystemTime};

const INK: Rgba<u8> = Rgba([59, 130, 246, 255]);

#[test]
fn test_new_buffer_is_blank() {
    let buffer = CaptureBuffer::new(60, 20);

    assert_eq!((buffer.width(), buffer.height()), (60, 20));
    assert!(buffer.is_blank());
}

#[test]
fn test_draw_segment_leaves_ink_and_clear_removes_it() {
    let mut buffer = CaptureBuffer::new(60, 20);
    buffer.draw_segment((5.0, 10.0), (50.0, 10.0), INK, 3.0);

    assert!(!buffer.is_blank());
    assert_eq!(*buffer.pixels().get_pixel(25, 10), INK);
    assert_eq!(buffer.pixels().get_pixel(25, 0).0[3], 0);

    buffer.clear();
    assert!(buffer.is_blank());
}

#[test]
fn test_segments_outside_surface_are_clipped() {
    let mut buffer = CaptureBuffer::new(10, 10);
    buffer.draw_segment((-50.0, -50.0), (-20.0, -20.0), INK, 3.0);

    assert!(buffer.is_blank());
}

#[test]
fn test_far_segment_is_clipped_to_surface() {
    let mut buffer = CaptureBuffer::new(600, 200);
    let started = Instant::now();

    buffer.draw_segment((10.0, 10.0), (2.0e7, 10.0), INK, 3.0);

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(*buffer.pixels().get_pixel(10, 10), INK);
    assert_eq!(*buffer.pixels().get_pixel(599, 10), INK);
    assert_eq!(buffer.pixels().get_pixel(300, 100).0[3], 0);
}

#[test]
fn test_non_finite_segment_is_ignored() {
    let mut buffer = CaptureBuffer::new(600, 200);
    let started = Instant::now();

    buffer.draw_segment((10.0, 10.0), (f32::INFINITY, 10.0), INK, 3.0);
    buffer.draw_segment((f32::NAN, 10.0), (20.0, 10.0), INK, 3.0);
    buffer.draw_segment((10.0, 10.0), (10.0, f32::NEG_INFINITY), INK, 3.0);

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(buffer.is_blank());
}

#[test]
fn test_png_encoding_preserves_pixels() {
    let mut buffer = CaptureBuffer::new(32, 16);
    buffer.draw_segment((2.0, 8.0), (30.0, 8.0), INK, 3.0);

    let artifact = buffer.encode(ImageFormat::Png, 90).unwrap();
    assert_eq!(artifact.format(), ImageFormat::Png);
    assert_eq!((artifact.width(), artifact.height()), (32, 16));
    assert!(!artifact.is_empty());

    let decoded = artifact.decode().unwrap();
    assert_eq!(&decoded, buffer.pixels());
}

#[test]
fn test_blank_buffer_still_encodes() {
    let artifact = CaptureBuffer::new(8, 8).encode(ImageFormat::Png, 90).unwrap();
    assert!(!artifact.is_empty());
    assert!(artifact.decode().unwrap().pixels().all(|p| p.0[3] == 0));
}

#[test]
fn test_jpeg_encoding_produces_jpeg_data_uri() {
    let buffer = CaptureBuffer::new(16, 16);
    let artifact = buffer.encode(ImageFormat::Jpeg, 80).unwrap();

    let uri = artifact.to_data_uri();
    assert!(uri.starts_with("data:image/jpeg;base64,"));
}

#[test]
fn test_data_uri_parsing() {
    let artifact = CaptureBuffer::new(12, 7).encode(ImageFormat::Png, 90).unwrap();
    let uri = artifact.to_data_uri();
    assert!(uri.starts_with("data:image/png;base64,"));

    let parsed = EncodedImage::from_data_uri(&uri).unwrap();
    assert_eq!(parsed, artifact);
    assert_eq!((parsed.width(), parsed.height()), (12, 7));
}

#[test]
fn test_data_uri_rejects_malformed_input() {
    let cases = [
        "image/png;base64,AAAA",
        "data:image/png;base64",
        "data:image/png,AAAA",
        "data:image/gif;base64,AAAA",
        "data:image/png;base64,!!!",
        "data:image/png;base64,AAAA",
    ];

    for case in cases {
        assert!(
            matches!(
                EncodedImage::from_data_uri(case),
                Err(CaptureError::InvalidDataUri { .. })
            ),
            "expected rejection for {}",
            case
        );
    }
}

#[test]
fn test_artifact_serializes_as_data_uri() {
    let artifact = CaptureBuffer::new(4, 4).encode(ImageFormat::Png, 90).unwrap();
    let json = serde_json::to_string(&artifact).unwrap();

    assert!(json.starts_with("\"data:image/png;base64,"));
    let back: EncodedImage = serde_json::from_str(&json).unwrap();
    assert_eq!(back, artifact);
}

#[test]
fn test_from_frame_uses_natural_resolution() {
    let frame = FrameData::new(
        3,
        SystemTime::now(),
        vec![200u8; 8 * 6 * 3],
        8,
        6,
        FrameFormat::Rgb24,
    );

    let buffer = CaptureBuffer::from_frame(&frame).unwrap();
    assert_eq!((buffer.width(), buffer.height()), (8, 6));
    assert_eq!(*buffer.pixels().get_pixel(0, 0), Rgba([200, 200, 200, 255]));
}

#[test]
fn test_from_frame_rejects_empty_frame() {
    let frame = FrameData::new(0, SystemTime::now(), Vec::new(), 0, 0, FrameFormat::Rgba32);

    assert!(matches!(
        CaptureBuffer::from_frame(&frame),
        Err(CaptureError::InvalidFrame { .. })
    ));
}

#[test]
fn test_parse_hex_color() {
    assert_eq!(parse_hex_color("#3b82f6"), Some(INK));
    assert_eq!(parse_hex_color("#FFFFFF"), Some(Rgba([255, 255, 255, 255])));
    assert_eq!(parse_hex_color("3b82f6"), None);
    assert_eq!(parse_hex_color("#3b82f"), None);
    assert_eq!(parse_hex_color("#zzzzzz"), None);
}
