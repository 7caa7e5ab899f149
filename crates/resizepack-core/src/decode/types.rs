//! Decoded pixel buffers and decode errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Why a byte stream could not be turned into pixels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No bytes were supplied.
    #[error("Image data is empty")]
    Empty,

    /// The bytes are not a format the decoder recognizes.
    #[error("Unrecognized image format")]
    UnrecognizedFormat,

    /// The format was recognized but the data is corrupted or incomplete.
    #[error("Corrupted or incomplete image data: {0}")]
    Corrupted(String),
}

/// Resampling filter, shared by both resize backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    Nearest,
    #[default]
    Bilinear,
    Lanczos3,
}

impl FilterType {
    /// `imageops` equivalent; bilinear is called `Triangle` there.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        use image::imageops::FilterType as Ops;
        match self {
            FilterType::Nearest => Ops::Nearest,
            FilterType::Bilinear => Ops::Triangle,
            FilterType::Lanczos3 => Ops::Lanczos3,
        }
    }

    pub fn to_resize_alg(self) -> fast_image_resize::ResizeAlg {
        use fast_image_resize::{FilterType as Fir, ResizeAlg};
        match self {
            FilterType::Nearest => ResizeAlg::Nearest,
            FilterType::Bilinear => ResizeAlg::Convolution(Fir::Bilinear),
            FilterType::Lanczos3 => ResizeAlg::Convolution(Fir::Lanczos3),
        }
    }
}

/// An owned RGBA8 buffer, row-major, `width * height * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * BYTES_PER_PIXEL,
            "RGBA buffer does not match {width}x{height}"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Take over the buffer of an `image` crate RGBA image without copying.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Buffer length the dimensions call for.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }
}
