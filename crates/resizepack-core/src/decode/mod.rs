//! Image decoding for the batch pipeline.
//!
//! This module provides functionality for:
//! - Sniffing and decoding PNG, JPEG and WebP bytes into RGBA pixel buffers
//! - The owned [`DecodedImage`] buffer that flows through resize and encode
//!
//! # Memory
//!
//! A `DecodedImage` owns its pixels. It is created by [`decode_image`], moved
//! through the resampler and dropped when the item finishes, on success or on
//! failure, so at most one source buffer per in-flight item is alive.

mod reader;
mod types;

pub use reader::decode_image;
pub use types::{DecodeError, DecodedImage, FilterType, BYTES_PER_PIXEL};
