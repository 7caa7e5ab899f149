//! Batch configuration.

use serde::{Deserialize, Serialize};

use crate::archive::DEFAULT_COMPRESSION_LEVEL;
use crate::decode::FilterType;
use crate::pipeline::{BatchError, BatchExecutor};
use crate::resize::{Resampler, UpscalePolicy};

/// Tuning knobs for a batch.
///
/// Every field has a default, so `{}` deserializes to
/// [`BatchOptions::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchOptions {
    /// Whether images smaller than an output cap are enlarged.
    pub upscale: UpscalePolicy,
    /// Filter for the convolution resampler.
    pub primary_filter: FilterType,
    /// Filter for the fallback resampler.
    pub fallback_filter: FilterType,
    /// Deflate level, clamped to `1..=9`.
    pub compression_level: i64,
    /// `1` runs sequentially, `0` uses one worker per core, `n` caps the pool at `n`.
    pub workers: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            upscale: UpscalePolicy::Never,
            primary_filter: FilterType::Lanczos3,
            fallback_filter: FilterType::Bilinear,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            workers: 1,
        }
    }
}

impl BatchOptions {
    pub fn resampler(&self) -> Resampler {
        Resampler::from_filters(self.primary_filter, self.fallback_filter)
    }

    /// Executor for the configured worker count.
    pub fn executor(&self) -> Result<BatchExecutor, BatchError> {
        BatchExecutor::from_workers(self.workers).map_err(BatchError::WorkerPool)
    }
}
