//! JPEG encoding. Alpha is discarded, not composited.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate_rgba, EncodeError, Quality};
use crate::decode::BYTES_PER_PIXEL;
use crate::media::MediaType;

/// Encode RGBA pixel data to baseline JPEG bytes.
///
/// Quality maps onto the encoder's native `1..=100` scale.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: Quality,
) -> Result<Vec<u8>, EncodeError> {
    validate_rgba(pixels, width, height)?;

    let rgb = rgba_to_rgb(pixels);
    let native = (quality.normalized() * 100.0).round().clamp(1.0, 100.0) as u8;

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, native)
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: MediaType::Jpeg,
            reason: e.to_string(),
        })?;

    Ok(buffer)
}

fn rgba_to_rgb(pixels: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(pixels.len() / BYTES_PER_PIXEL * 3);
    for px in pixels.chunks_exact(BYTES_PER_PIXEL) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) fn detailed_rgba(width: u32, height: u32) -> Vec<u8> {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[
                    ((x * 255) / width) as u8,
                    ((y * 255) / height) as u8,
                    ((x * 37 + y * 11) % 256) as u8,
                    255,
                ]);
            }
        }
        pixels
    }

    #[test]
    fn test_encode_jpeg_is_framed() {
        let bytes = encode_jpeg(&detailed_rgba(64, 64), 64, 64, Quality::DEFAULT).unwrap();

        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_rgba_to_rgb() {
        assert_eq!(rgba_to_rgb(&[1, 2, 3, 4, 5, 6, 7, 8]), vec![1, 2, 3, 5, 6, 7]);
        assert!(rgba_to_rgb(&[]).is_empty());
    }

    #[test]
    fn test_transparent_pixels_keep_their_color() {
        // Fully transparent red stays red; nothing is blended against a background.
        let pixels = [255u8, 0, 0, 0].repeat(16 * 16);
        let bytes = encode_jpeg(&pixels, 16, 16, Quality::new(100)).unwrap();

        let decoded = crate::decode::decode_image(&bytes).unwrap();
        let px = &decoded.pixels[0..4];
        assert!(px[0] > 200 && px[1] < 50 && px[2] < 50, "{px:?}");
        assert_eq!(px[3], 255);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
