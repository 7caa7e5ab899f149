//! WASM-compatible wrapper types for batch inputs and results.

use resizepack_core::media::is_image_media_type;
use resizepack_core::pipeline::DegradedRecord;
use resizepack_core::{archive_file_name, BatchOutput, FailureRecord, InputImage};
use wasm_bindgen::prelude::*;

/// The images selected for one batch.
///
/// Bytes are copied into WASM memory when added and released when the batch
/// is dropped or `clear()` is called.
#[wasm_bindgen]
#[derive(Debug, Default)]
pub struct JsBatch {
    inputs: Vec<InputImage>,
}

#[wasm_bindgen]
impl JsBatch {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsBatch {
        JsBatch::default()
    }

    /// Add one uploaded file.
    ///
    /// Returns `false` and ignores the file when `media_type` is not an
    /// `image/*` type.
    pub fn add_input(&mut self, name: String, media_type: String, bytes: Vec<u8>) -> bool {
        if !is_image_media_type(&media_type) {
            tracing::debug!(name = %name, media_type = %media_type, "skipping non-image upload");
            return false;
        }
        self.inputs.push(InputImage::new(name, media_type, bytes));
        true
    }

    /// Number of images in the batch
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inputs.len()
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
    }
}

impl JsBatch {
    pub(crate) fn inputs(&self) -> &[InputImage] {
        &self.inputs
    }
}

/// A finished batch.
#[wasm_bindgen]
#[derive(Debug)]
pub struct JsBatchResult {
    archive: Vec<u8>,
    entries: usize,
    cancelled: bool,
    failures: Vec<FailureRecord>,
    degraded: Vec<DegradedRecord>,
}

#[wasm_bindgen]
impl JsBatchResult {
    /// Files written to the archive
    #[wasm_bindgen(getter)]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Whether the batch was stopped from the progress callback
    #[wasm_bindgen(getter)]
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    #[wasm_bindgen(getter)]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Zip bytes as a `Uint8Array`. Copies out of WASM memory.
    pub fn archive(&self) -> Vec<u8> {
        self.archive.clone()
    }

    /// Failed items as `{ inputName, bucketName, stage, reason }[]`.
    pub fn failures(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.failures).map_err(JsValue::from)
    }

    /// Items resized by the fallback path as `{ inputName, bucketName, reason }[]`.
    pub fn degraded(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.degraded).map_err(JsValue::from)
    }

    /// Suggested download name for an archive produced on `date` (`YYYY-MM-DD`).
    pub fn file_name(&self, date: &str) -> String {
        archive_file_name(date)
    }
}

impl From<BatchOutput> for JsBatchResult {
    fn from(output: BatchOutput) -> Self {
        Self {
            archive: output.archive,
            entries: output.entries,
            cancelled: output.cancelled,
            failures: output.failures,
            degraded: output.degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_input_filters_non_images() {
        let mut batch = JsBatch::new();
        assert!(batch.add_input("a.png".into(), "image/png".into(), vec![1]));
        assert!(batch.add_input("b.heic".into(), "image/heic".into(), vec![2]));
        assert!(!batch.add_input("notes.txt".into(), "text/plain".into(), vec![3]));

        assert_eq!(batch.length(), 2);
        assert_eq!(batch.inputs()[1].name, "b.heic");

        batch.clear();
        assert_eq!(batch.length(), 0);
    }

    #[test]
    fn test_result_from_output() {
        let result = JsBatchResult::from(BatchOutput {
            archive: vec![0x50, 0x4B],
            entries: 3,
            failures: Vec::new(),
            degraded: Vec::new(),
            cancelled: true,
        });

        assert_eq!(result.entries(), 3);
        assert!(result.cancelled());
        assert_eq!(result.failure_count(), 0);
        assert_eq!(result.archive(), vec![0x50, 0x4B]);
        assert_eq!(
            result.file_name("2024-01-31"),
            "processed_images_2024-01-31.zip"
        );
    }
}
