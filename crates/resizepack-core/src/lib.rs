//! Resizepack Core - batch resize and packaging library
//!
//! This crate turns a set of uploaded images and a list of output specs
//! ("4500px into Hi-res", "2300px into Web") into a single zip archive with
//! one directory per output bucket. Each (image, output) pair is decoded,
//! scaled to fit a longest-side cap, re-encoded and packaged independently,
//! so one bad upload never sinks the batch.

pub mod archive;
pub mod config;
pub mod decode;
pub mod encode;
pub mod media;
pub mod pipeline;
pub mod preset;
pub mod resize;

pub use archive::{archive_file_name, ArchiveBuilder, ArchiveError};
pub use config::BatchOptions;
pub use encode::{EncodingTarget, OutputFormat, Quality};
pub use media::MediaType;
pub use pipeline::{
    BatchError, BatchOrchestrator, BatchOutput, CancellationToken, FailureRecord, ProgressEvent,
    ProgressSink,
};
pub use preset::{OutputSpec, Preset, PresetError};

/// An uploaded image as the caller received it.
///
/// `media_type` is whatever the uploader declared (for example
/// `image/jpeg`); decoding sniffs the bytes and does not trust it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputImage {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl InputImage {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

/// Run one batch sequentially with default options.
pub fn process_images(
    inputs: &[InputImage],
    outputs: &[OutputSpec],
    target: EncodingTarget,
    sink: &mut dyn ProgressSink,
) -> Result<BatchOutput, BatchError> {
    process_images_with_options(inputs, outputs, target, &BatchOptions::default(), sink)
}

/// Run one batch with explicit options.
pub fn process_images_with_options(
    inputs: &[InputImage],
    outputs: &[OutputSpec],
    target: EncodingTarget,
    options: &BatchOptions,
    sink: &mut dyn ProgressSink,
) -> Result<BatchOutput, BatchError> {
    BatchOrchestrator::from_options(target, options)?.run(inputs, outputs, sink)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{jpeg_bytes, png_bytes};

    #[test]
    fn test_process_images_default_preset() {
        let inputs = vec![
            InputImage::new("wide.png", "image/png", png_bytes(5000, 100, [1, 2, 3, 255])),
            InputImage::new("tall.jpg", "image/jpeg", jpeg_bytes(60, 80)),
        ];
        let preset = Preset::hi_res_and_web();

        let mut percentages = Vec::new();
        let output = process_images(
            &inputs,
            &preset.outputs,
            EncodingTarget::new(OutputFormat::Jpeg, Quality::new(70)),
            &mut |e: ProgressEvent| percentages.push(e.percentage()),
        )
        .unwrap();

        assert_eq!(output.entries, 4);
        assert!(output.is_complete());
        assert!(output.degraded.is_empty());
        assert_eq!(percentages.first(), Some(&25));
        assert_eq!(percentages.last(), Some(&100));
        assert!(percentages.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_process_images_with_options_propagates_worker_count() {
        let options = BatchOptions {
            workers: 2,
            ..BatchOptions::default()
        };
        let inputs = vec![InputImage::new(
            "a.png",
            "image/png",
            png_bytes(10, 10, [0, 0, 0, 255]),
        )];
        let outputs = vec![OutputSpec::new("web", "Web", 5)];

        let output = process_images_with_options(
            &inputs,
            &outputs,
            EncodingTarget::default(),
            &options,
            &mut crate::pipeline::NoProgress,
        )
        .unwrap();
        assert_eq!(output.entries, 1);
    }

    #[test]
    fn test_input_image_new() {
        let input = InputImage::new("a.png", "image/png", vec![1, 2]);
        assert_eq!(input.name, "a.png");
        assert_eq!(input.media_type, "image/png");
        assert_eq!(input.bytes, vec![1, 2]);
    }
}
