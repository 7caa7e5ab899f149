//! Format-sniffing decode of in-memory image bytes.

use std::io::Cursor;

use image::ImageReader;

use super::{DecodeError, DecodedImage};

/// Decode PNG, JPEG or WebP bytes into an RGBA buffer.
///
/// The format is detected from the bytes themselves; the media type the
/// caller declared is not consulted. Images without alpha get an opaque
/// alpha channel.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for an empty slice,
/// `DecodeError::UnrecognizedFormat` when no supported signature matches and
/// `DecodeError::Corrupted` when the codec rejects the data.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Corrupted(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::UnrecognizedFormat);
    }

    let img = reader.decode().map_err(|e| match e {
        image::ImageError::Unsupported(_) => DecodeError::UnrecognizedFormat,
        other => DecodeError::Corrupted(other.to_string()),
    })?;

    Ok(DecodedImage::from_rgba_image(img.into_rgba8()))
}
