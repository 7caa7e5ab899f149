//! Image encoding for the batch pipeline.
//!
//! This module provides functionality for:
//! - Resolving a requested [`OutputFormat`] to a concrete [`MediaType`]
//! - Encoding RGBA buffers to JPEG, PNG and WebP
//!
//! # Quality
//!
//! [`Quality`] is an integer in `1..=100`. Each codec receives
//! [`Quality::normalized`] (`quality / 100`) scaled to its own native range.
//! PNG ignores it.
//!
//! # Examples
//!
//! ```ignore
//! use resizepack_core::encode::{encode_for_target, EncodingTarget, OutputFormat, Quality};
//!
//! let target = EncodingTarget::new(OutputFormat::Webp, Quality::new(80));
//! let encoded = encode_for_target(&image, &target, "image/png")?;
//! assert_eq!(encoded.media_type.extension(), "webp");
//! ```

mod jpeg;
mod png;
mod webp;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::decode::{DecodedImage, BYTES_PER_PIXEL};
use crate::media::MediaType;

pub use jpeg::encode_jpeg;
pub use png::encode_png;
pub use webp::encode_webp;

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec failed to produce output
    #[error("{format} encoding failed: {reason}")]
    EncodingFailed { format: MediaType, reason: String },
}

/// Requested output format for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Keep each input's own format when it is PNG, JPEG or WebP; JPEG otherwise.
    #[default]
    Original,
    Jpeg,
    Png,
    Webp,
}

/// Lossy compression quality, 1 (smallest) to 100 (best).
///
/// Out-of-range values are clamped, including when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const DEFAULT: Quality = Quality(92);

    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Quality on a `0.0..=1.0` scale.
    pub fn normalized(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for Quality {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<i64> for Quality {
    fn from(value: i64) -> Self {
        Self(value.clamp(1, 100) as u8)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Output format and quality shared by every item of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodingTarget {
    pub mode: OutputFormat,
    #[serde(default)]
    pub quality: Quality,
}

impl EncodingTarget {
    pub fn new(mode: OutputFormat, quality: Quality) -> Self {
        Self { mode, quality }
    }

    /// The media type an input with `declared_mime` is encoded to.
    pub fn resolve(&self, declared_mime: &str) -> MediaType {
        match self.mode {
            OutputFormat::Original => {
                MediaType::from_mime(declared_mime).unwrap_or(MediaType::Jpeg)
            }
            OutputFormat::Jpeg => MediaType::Jpeg,
            OutputFormat::Png => MediaType::Png,
            OutputFormat::Webp => MediaType::Webp,
        }
    }
}

/// Encoded bytes plus the format they are actually in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub media_type: MediaType,
    pub width: u32,
    pub height: u32,
}

/// Encode an RGBA image to a concrete media type.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` or `EncodeError::InvalidPixelData`
/// for a malformed buffer and `EncodeError::EncodingFailed` when the codec
/// cannot produce output.
pub fn encode(
    image: &DecodedImage,
    media_type: MediaType,
    quality: Quality,
) -> Result<EncodedImage, EncodeError> {
    let bytes = match media_type {
        MediaType::Jpeg => encode_jpeg(&image.pixels, image.width, image.height, quality)?,
        MediaType::Png => encode_png(&image.pixels, image.width, image.height)?,
        MediaType::Webp => encode_webp(&image.pixels, image.width, image.height, quality)?,
    };

    debug!(
        media_type = %media_type,
        width = image.width,
        height = image.height,
        bytes = bytes.len(),
        "encoded"
    );

    Ok(EncodedImage {
        bytes,
        media_type,
        width: image.width,
        height: image.height,
    })
}

/// Resolve `target` against the input's declared type, then encode.
pub fn encode_for_target(
    image: &DecodedImage,
    target: &EncodingTarget,
    declared_mime: &str,
) -> Result<EncodedImage, EncodeError> {
    encode(image, target.resolve(declared_mime), target.quality)
}

/// Every codec entry point checks its buffer here before touching the encoder.
fn validate_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .ok_or(EncodeError::InvalidDimensions { width, height })?;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }

    Ok(())
}
