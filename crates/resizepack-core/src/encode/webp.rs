//! WebP encoding.
//!
//! With the `lossy-webp` feature, output goes through libwebp at the requested
//! quality. Without it the `image` crate's lossless encoder is used and
//! quality is ignored.

use super::{validate_rgba, EncodeError, Quality};
use crate::media::MediaType;

/// Encode RGBA pixel data to WebP bytes.
#[cfg(feature = "lossy-webp")]
pub fn encode_webp(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: Quality,
) -> Result<Vec<u8>, EncodeError> {
    validate_rgba(pixels, width, height)?;

    // libwebp takes quality as 0.0..=100.0
    let native = quality.normalized() * 100.0;

    let memory = webp::Encoder::from_rgba(pixels, width, height)
        .encode_simple(false, native)
        .map_err(|e| EncodeError::EncodingFailed {
            format: MediaType::Webp,
            reason: format!("{e:?}"),
        })?;

    Ok(memory.to_vec())
}

/// Encode RGBA pixel data to lossless WebP bytes.
#[cfg(not(feature = "lossy-webp"))]
pub fn encode_webp(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: Quality,
) -> Result<Vec<u8>, EncodeError> {
    use image::codecs::webp::WebPEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    validate_rgba(pixels, width, height)?;

    tracing::debug!(quality = quality.get(), "lossy WebP unavailable, encoding lossless");

    let mut buffer = Vec::new();
    WebPEncoder::new_lossless(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: MediaType::Webp,
            reason: e.to_string(),
        })?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_webp_riff_header() {
        let pixels = [90u8, 160, 220, 255].repeat(16 * 16);
        let bytes = encode_webp(&pixels, 16, 16, Quality::new(75)).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }
}
