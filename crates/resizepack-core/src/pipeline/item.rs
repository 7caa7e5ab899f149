//! Processing of one (input, output spec) pair.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::archive::sanitize_path_component;
use crate::decode::{decode_image, DecodeError};
use crate::encode::{encode_for_target, EncodeError, EncodingTarget};
use crate::media::MediaType;
use crate::preset::OutputSpec;
use crate::resize::{plan_dimensions, ResampleError, ResamplePath, Resampler, UpscalePolicy};
use crate::InputImage;

/// Where an item is in its lifecycle.
///
/// `Pending → Decoding → Resizing → Encoding → Packaged`; a failure is
/// reported with the stage it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemStage {
    Pending,
    Decoding,
    Resizing,
    Encoding,
    Packaged,
}

/// A per-item failure. Never fatal to the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Resize failed: {0}")]
    Resize(#[from] ResampleError),

    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),
}

impl ItemError {
    /// Stage the item was in when it failed.
    pub fn stage(&self) -> ItemStage {
        match self {
            ItemError::Decode(_) => ItemStage::Decoding,
            ItemError::Resize(_) => ItemStage::Resizing,
            ItemError::Encode(_) => ItemStage::Encoding,
        }
    }
}

/// One cross-product entry of a batch.
#[derive(Debug, Clone, Copy)]
pub struct WorkItem<'a> {
    /// Zero-based position in enumeration order.
    pub index: usize,
    pub input: &'a InputImage,
    pub output: &'a OutputSpec,
}

/// A packaged variant, ready for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedItem {
    pub file_name: String,
    pub media_type: MediaType,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
    pub resample: ResamplePath,
}

/// Decode, plan, resample and encode one input for one output spec.
#[derive(Debug)]
pub struct ItemProcessor {
    resampler: Resampler,
    target: EncodingTarget,
    upscale: UpscalePolicy,
}

impl ItemProcessor {
    pub fn new(resampler: Resampler, target: EncodingTarget, upscale: UpscalePolicy) -> Self {
        Self {
            resampler,
            target,
            upscale,
        }
    }

    pub fn target(&self) -> &EncodingTarget {
        &self.target
    }

    /// Run one item to `Packaged` or return the classified failure.
    ///
    /// Every intermediate buffer is owned by this call and released before
    /// it returns, whichever way it exits.
    pub fn process(
        &self,
        input: &InputImage,
        output: &OutputSpec,
    ) -> Result<ProcessedItem, ItemError> {
        let trace = |stage: ItemStage| {
            debug!(input = %input.name, bucket = %output.bucket_name, ?stage, "item stage");
        };

        trace(ItemStage::Decoding);
        let decoded = decode_image(&input.bytes)?;

        trace(ItemStage::Resizing);
        let (width, height) = plan_dimensions(
            decoded.width,
            decoded.height,
            output.longest_side,
            self.upscale,
        );
        let resampled = self.resampler.resample(decoded, width, height)?;

        trace(ItemStage::Encoding);
        let encoded = encode_for_target(&resampled.image, &self.target, &input.media_type)?;
        drop(resampled.image);

        let file_name = output_file_name(&input.name, encoded.media_type);
        trace(ItemStage::Packaged);

        Ok(ProcessedItem {
            file_name,
            media_type: encoded.media_type,
            width: encoded.width,
            height: encoded.height,
            bytes: encoded.bytes,
            resample: resampled.path,
        })
    }
}

/// Archive file name for an input encoded as `media_type`.
///
/// The last extension of `input_name` is replaced with the one for the
/// concrete media type and path separators are neutralised.
pub fn output_file_name(input_name: &str, media_type: MediaType) -> String {
    let trimmed = input_name.trim();
    // Only a dot inside the last path segment starts an extension.
    let file_start = trimmed.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let base = match trimmed[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &trimmed[..file_start + dot],
        _ => trimmed,
    };
    let base = if base.is_empty() { "image" } else { base };

    sanitize_path_component(&format!("{base}.{}", media_type.extension()))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
