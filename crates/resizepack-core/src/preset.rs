//! Output specifications and the presets that group them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a preset or output list cannot drive a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresetError {
    /// The preset has no display name.
    #[error("Preset name must not be empty")]
    EmptyName,

    /// The preset has no outputs.
    #[error("Preset must contain at least one output")]
    NoOutputs,

    /// An output has a blank bucket name.
    #[error("Output {index} has an empty bucket name")]
    EmptyBucketName { index: usize },

    /// An output has a zero longest-side cap.
    #[error("Output {index} ({bucket}) must have a longest side greater than zero")]
    ZeroLongestSide { index: usize, bucket: String },
}

/// One variant to produce for every input image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    /// Caller-assigned identifier, opaque to the pipeline.
    pub id: String,
    /// Archive directory that receives this variant.
    pub bucket_name: String,
    /// Cap on the larger of width and height, in pixels.
    pub longest_side: u32,
}

impl OutputSpec {
    pub fn new(id: impl Into<String>, bucket_name: impl Into<String>, longest_side: u32) -> Self {
        Self {
            id: id.into(),
            bucket_name: bucket_name.into(),
            longest_side,
        }
    }
}

/// A named, ordered list of outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    pub outputs: Vec<OutputSpec>,
}

impl Preset {
    /// The built-in preset: a 4500px hi-res set and a 2300px web set.
    pub fn hi_res_and_web() -> Self {
        Self {
            id: "default-1".to_string(),
            name: "Hi-Res + Web (4500px / 2300px)".to_string(),
            is_default: true,
            outputs: vec![
                OutputSpec::new("default-out-1", "Hi-res", 4500),
                OutputSpec::new("default-out-2", "Web", 2300),
            ],
        }
    }

    /// Check the name and every output.
    pub fn validate(&self) -> Result<(), PresetError> {
        if self.name.trim().is_empty() {
            return Err(PresetError::EmptyName);
        }
        if self.outputs.is_empty() {
            return Err(PresetError::NoOutputs);
        }
        validate_outputs(&self.outputs)
    }
}

/// Check that each output has a bucket and a positive cap.
///
/// An empty slice is accepted here; batches report that case separately.
pub fn validate_outputs(outputs: &[OutputSpec]) -> Result<(), PresetError> {
    for (index, output) in outputs.iter().enumerate() {
        if output.bucket_name.trim().is_empty() {
            return Err(PresetError::EmptyBucketName { index });
        }
        if output.longest_side == 0 {
            return Err(PresetError::ZeroLongestSide {
                index,
                bucket: output.bucket_name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preset_is_valid() {
        let preset = Preset::hi_res_and_web();
        assert!(preset.validate().is_ok());
        assert!(preset.is_default);
        assert_eq!(preset.outputs.len(), 2);
        assert_eq!(preset.outputs[0].bucket_name, "Hi-res");
        assert_eq!(preset.outputs[0].longest_side, 4500);
        assert_eq!(preset.outputs[1].bucket_name, "Web");
        assert_eq!(preset.outputs[1].longest_side, 2300);
    }

    #[test]
    fn test_validate_empty_name() {
        let mut preset = Preset::hi_res_and_web();
        preset.name = "   ".to_string();
        assert_eq!(preset.validate(), Err(PresetError::EmptyName));
    }

    #[test]
    fn test_validate_no_outputs() {
        let mut preset = Preset::hi_res_and_web();
        preset.outputs.clear();
        assert_eq!(preset.validate(), Err(PresetError::NoOutputs));
    }

    #[test]
    fn test_validate_blank_bucket() {
        let outputs = vec![OutputSpec::new("a", "Web", 100), OutputSpec::new("b", "", 100)];
        assert_eq!(
            validate_outputs(&outputs),
            Err(PresetError::EmptyBucketName { index: 1 })
        );
    }

    #[test]
    fn test_validate_zero_longest_side() {
        let outputs = vec![OutputSpec::new("a", "Thumbs", 0)];
        assert!(matches!(
            validate_outputs(&outputs),
            Err(PresetError::ZeroLongestSide { index: 0, .. })
        ));
    }

    #[test]
    fn test_preset_deserializes_camel_case() {
        let json = r#"{
            "id": "p1",
            "name": "Social",
            "outputs": [{ "id": "o1", "bucketName": "Square", "longestSide": 1080 }]
        }"#;
        let preset: Preset = serde_json::from_str(json).unwrap();
        assert!(!preset.is_default);
        assert_eq!(preset.outputs[0], OutputSpec::new("o1", "Square", 1080));
    }
}
