//! Pixel resampling with a high-quality primary path and a simple fallback.
//!
//! The primary backend is a SIMD convolution resize from `fast_image_resize`
//! (Lanczos3 by default). If it reports an error the resampler retries with
//! the `image` crate's resize (bilinear by default) and tags the result as
//! [`ResamplePath::Fallback`]. Only a failure of both paths is an error.

use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{PixelType, ResizeOptions, Resizer as FirResizer};
use thiserror::Error;
use tracing::{debug, warn};

use crate::decode::{DecodedImage, FilterType};

/// Errors from a resample backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResampleError {
    /// Target width or height is zero.
    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// A backend rejected the buffer or failed while resizing.
    #[error("{backend} resample failed: {reason}")]
    Backend {
        backend: &'static str,
        reason: String,
    },
}

/// One way of turning a source buffer into a buffer of another size.
///
/// Backends borrow the source so a failed attempt leaves it intact for the
/// next one.
pub trait ResampleBackend: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    fn resample(
        &self,
        source: &DecodedImage,
        width: u32,
        height: u32,
    ) -> Result<DecodedImage, ResampleError>;
}

/// Convolution resize through `fast_image_resize`, alpha-aware.
#[derive(Debug, Clone, Copy)]
pub struct ConvolutionBackend {
    pub filter: FilterType,
}

impl ResampleBackend for ConvolutionBackend {
    fn name(&self) -> &'static str {
        "convolution"
    }

    fn resample(
        &self,
        source: &DecodedImage,
        width: u32,
        height: u32,
    ) -> Result<DecodedImage, ResampleError> {
        let backend_err = |reason: String| ResampleError::Backend {
            backend: self.name(),
            reason,
        };

        let src = ImageRef::new(
            source.width,
            source.height,
            &source.pixels,
            PixelType::U8x4,
        )
        .map_err(|e| backend_err(format!("source buffer: {e:?}")))?;

        let mut dst = Image::new(width, height, PixelType::U8x4);

        // Alpha is premultiplied and restored by the resizer itself.
        let options = ResizeOptions::new().resize_alg(self.filter.to_resize_alg());
        FirResizer::new()
            .resize(&src, &mut dst, &options)
            .map_err(|e| backend_err(format!("{e:?}")))?;

        Ok(DecodedImage::new(width, height, dst.into_vec()))
    }
}

/// Resize through `image::imageops`.
#[derive(Debug, Clone, Copy)]
pub struct ImageOpsBackend {
    pub filter: FilterType,
}

impl ResampleBackend for ImageOpsBackend {
    fn name(&self) -> &'static str {
        "imageops"
    }

    fn resample(
        &self,
        source: &DecodedImage,
        width: u32,
        height: u32,
    ) -> Result<DecodedImage, ResampleError> {
        let view = image::ImageBuffer::<image::Rgba<u8>, &[u8]>::from_raw(
            source.width,
            source.height,
            source.pixels.as_slice(),
        )
        .ok_or_else(|| ResampleError::Backend {
            backend: self.name(),
            reason: format!(
                "pixel buffer of {} bytes does not match {}x{} RGBA",
                source.pixels.len(),
                source.width,
                source.height
            ),
        })?;

        let resized = image::imageops::resize(&view, width, height, self.filter.to_image_filter());
        Ok(DecodedImage::from_rgba_image(resized))
    }
}

/// Which path produced a resampled buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResamplePath {
    /// Target equals source; the buffer was returned untouched.
    Passthrough,
    /// The primary backend succeeded.
    Primary,
    /// The primary backend failed and the fallback produced the buffer.
    Fallback { reason: String },
}

/// A resampled buffer tagged with the path that produced it.
#[derive(Debug)]
pub struct Resampled {
    pub image: DecodedImage,
    pub path: ResamplePath,
}

impl Resampled {
    /// True when the fallback path was used.
    pub fn is_degraded(&self) -> bool {
        matches!(self.path, ResamplePath::Fallback { .. })
    }
}

/// Primary/fallback resample strategy.
///
/// Backends are supplied at construction and live as long as the resampler,
/// which the batch owns for its duration.
pub struct Resampler {
    primary: Box<dyn ResampleBackend>,
    fallback: Box<dyn ResampleBackend>,
}

impl Resampler {
    pub fn new(primary: Box<dyn ResampleBackend>, fallback: Box<dyn ResampleBackend>) -> Self {
        Self { primary, fallback }
    }

    /// Convolution primary and `imageops` fallback with the given filters.
    pub fn from_filters(primary: FilterType, fallback: FilterType) -> Self {
        Self::new(
            Box::new(ConvolutionBackend { filter: primary }),
            Box::new(ImageOpsBackend { filter: fallback }),
        )
    }

    /// Resize `image` to `width` x `height`.
    ///
    /// Consumes the source; it is dropped as soon as a result exists.
    ///
    /// # Errors
    ///
    /// Returns `ResampleError::InvalidDimensions` for a zero target, or the
    /// fallback's error when both backends fail.
    pub fn resample(
        &self,
        image: DecodedImage,
        width: u32,
        height: u32,
    ) -> Result<Resampled, ResampleError> {
        if image.width == width && image.height == height {
            return Ok(Resampled {
                image,
                path: ResamplePath::Passthrough,
            });
        }

        if width == 0 || height == 0 {
            return Err(ResampleError::InvalidDimensions { width, height });
        }

        match self.primary.resample(&image, width, height) {
            Ok(resized) => {
                debug!(
                    backend = self.primary.name(),
                    from = ?image.dimensions(),
                    to = ?(width, height),
                    "resampled"
                );
                Ok(Resampled {
                    image: resized,
                    path: ResamplePath::Primary,
                })
            }
            Err(primary_err) => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %primary_err,
                    "primary resample failed, using fallback"
                );
                let resized = self.fallback.resample(&image, width, height)?;
                Ok(Resampled {
                    image: resized,
                    path: ResamplePath::Fallback {
                        reason: primary_err.to_string(),
                    },
                })
            }
        }
    }
}

impl Default for Resampler {
    fn default() -> Self {
        Self::from_filters(FilterType::Lanczos3, FilterType::Bilinear)
    }
}

impl std::fmt::Debug for Resampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resampler")
            .field("primary", &self.primary.name())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}
