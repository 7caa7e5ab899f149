//! Dimension planning and pixel resampling.
//!
//! Planning is a pure function of the source size and a longest-side cap.
//! Resampling takes ownership of a decoded buffer and returns either the same
//! buffer (when no resize is needed) or a new one, tagged with the path that
//! produced it so a degraded fallback is visible to the caller.

mod plan;
mod resample;

pub use plan::{plan_dimensions, UpscalePolicy};
pub use resample::{
    ConvolutionBackend, ImageOpsBackend, ResampleBackend, ResampleError, ResamplePath, Resampled,
    Resampler,
};
