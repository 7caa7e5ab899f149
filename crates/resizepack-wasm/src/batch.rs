//! Batch processing bindings.
//!
//! # Example
//!
//! ```typescript
//! import { JsBatch, process_batch, default_preset } from '@resizepack/wasm';
//!
//! const batch = new JsBatch();
//! for (const file of files) {
//!   batch.add_input(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
//! }
//!
//! const result = process_batch(
//!   batch,
//!   default_preset().outputs,
//!   { mode: 'original', quality: 92 },
//!   undefined,
//!   (event) => setProgress(event.current / event.total),
//! );
//! download(new Blob([result.archive()]), result.file_name('2024-05-01'));
//! ```
//!
//! Returning `false` from the progress callback stops the batch before the
//! next item; the archive then holds the items finished so far.

use resizepack_core::pipeline::{CancellationToken, ProgressEvent, ProgressSink};
use resizepack_core::{
    BatchError, BatchOptions, BatchOrchestrator, EncodingTarget, InputImage, OutputSpec, Preset,
};
use serde::de::DeserializeOwned;
use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::types::{JsBatch, JsBatchResult};

/// Run every image in `batch` through every output spec.
///
/// # Arguments
///
/// * `outputs` - `OutputSpec[]` (`{ id, bucketName, longestSide }`)
/// * `target` - `{ mode: 'original' | 'jpeg' | 'png' | 'webp', quality?: number }`
/// * `options` - optional `BatchOptions`; omitted fields take their defaults
/// * `on_progress` - optional `(event: { current, total, status, fileName }) => boolean | void`
///
/// # Errors
///
/// Returns an error string if the arguments do not deserialize, the batch
/// is empty, an output spec is invalid or no item could be packaged.
#[wasm_bindgen]
pub fn process_batch(
    batch: &JsBatch,
    outputs: JsValue,
    target: JsValue,
    options: JsValue,
    on_progress: Option<js_sys::Function>,
) -> Result<JsBatchResult, JsValue> {
    let outputs: Vec<OutputSpec> = from_js(outputs, "outputs")?;
    let target: EncodingTarget = from_js_or_default(target, "target")?;
    let options: BatchOptions = from_js_or_default(options, "options")?;

    let cancel = CancellationToken::new();
    let mut sink = CallbackSink {
        callback: on_progress.as_ref(),
        cancel: cancel.clone(),
    };

    run_batch(batch.inputs(), &outputs, target, &options, cancel, &mut sink)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The built-in "Hi-Res + Web" preset.
#[wasm_bindgen]
pub fn default_preset() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&Preset::hi_res_and_web()).map_err(JsValue::from)
}

/// Check a preset before saving it.
///
/// # Errors
///
/// Returns the first problem found as a string.
#[wasm_bindgen]
pub fn validate_preset(preset: JsValue) -> Result<(), JsValue> {
    let preset: Preset = from_js(preset, "preset")?;
    preset
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

pub(crate) fn run_batch(
    inputs: &[InputImage],
    outputs: &[OutputSpec],
    target: EncodingTarget,
    options: &BatchOptions,
    cancel: CancellationToken,
    sink: &mut dyn ProgressSink,
) -> Result<JsBatchResult, BatchError> {
    let orchestrator = BatchOrchestrator::from_options(target, options)?.with_cancellation(cancel);
    orchestrator.run(inputs, outputs, sink).map(JsBatchResult::from)
}

/// Forwards progress to a JS function and cancels when it returns `false`.
struct CallbackSink<'a> {
    callback: Option<&'a js_sys::Function>,
    cancel: CancellationToken,
}

impl ProgressSink for CallbackSink<'_> {
    fn on_progress(&mut self, event: ProgressEvent) {
        let Some(callback) = self.callback else {
            return;
        };

        let value = match serde_wasm_bindgen::to_value(&event) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "progress event not serializable");
                return;
            }
        };

        match callback.call1(&JsValue::NULL, &value) {
            Ok(returned) if returned.as_bool() == Some(false) => self.cancel.cancel(),
            Ok(_) => {}
            Err(e) => warn!(error = ?e, "progress callback threw"),
        }
    }
}

fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid {what}: {e}")))
}

fn from_js_or_default<T: DeserializeOwned + Default>(
    value: JsValue,
    what: &str,
) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    from_js(value, what)
}
