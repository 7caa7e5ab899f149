//! Resizepack WASM - WebAssembly bindings for Resizepack
//!
//! This crate exposes the resizepack-core batch pipeline to a browser UI.
//!
//! # Module Structure
//!
//! - `types` - Batch input collection and result wrappers
//! - `batch` - Batch processing, presets and progress callbacks
//! - `logging` - `tracing` subscriber that writes to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsBatch, process_batch, default_preset } from '@resizepack/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const batch = new JsBatch();
//! batch.add_input(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
//! const result = process_batch(batch, default_preset().outputs, { mode: 'webp' });
//! ```
//!
//! The browser build runs sequentially and encodes WebP losslessly.

use wasm_bindgen::prelude::*;

mod batch;
mod logging;
mod types;

pub use batch::{default_preset, process_batch, validate_preset};
pub use types::{JsBatch, JsBatchResult};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init();
}

/// Replace the active log filter, e.g. `"resizepack_core=debug"`.
///
/// # Errors
///
/// Returns an error string if the filter does not parse. The previous
/// filter stays in effect.
#[wasm_bindgen]
pub fn init_logging(filter: &str) -> Result<(), JsValue> {
    logging::set_filter(filter).map_err(|e| JsValue::from_str(&e))
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
