//! Batch orchestration: cross-product enumeration, progress and packaging.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::cancel::CancellationToken;
use super::executor::{BatchExecutor, Executor};
use super::item::{ItemProcessor, ItemStage, WorkItem};
use super::progress::{ProgressEvent, ProgressSink};
use crate::archive::{ArchiveBuilder, ArchiveError, DEFAULT_COMPRESSION_LEVEL};
use crate::config::BatchOptions;
use crate::encode::EncodingTarget;
use crate::preset::{validate_outputs, OutputSpec, PresetError};
use crate::resize::ResamplePath;
use crate::InputImage;

/// Errors that abort a whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// No inputs or no outputs; nothing was attempted.
    #[error("Nothing to process: {inputs} input(s), {outputs} output(s)")]
    EmptyBatch { inputs: usize, outputs: usize },

    /// An output spec cannot drive a batch.
    #[error("Invalid outputs: {0}")]
    InvalidOutputs(#[from] PresetError),

    /// The worker pool could not be started.
    #[error("Worker pool failed to start: {0}")]
    WorkerPool(String),

    /// The archive could not be produced, including when every item failed.
    #[error("Archive build failed: {0}")]
    ArchiveBuild(#[from] ArchiveError),
}

/// One item that did not make it into the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    pub input_name: String,
    pub bucket_name: String,
    pub stage: ItemStage,
    pub reason: String,
}

/// One item that was packaged through the fallback resampler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradedRecord {
    pub input_name: String,
    pub bucket_name: String,
    pub reason: String,
}

/// Result of a batch that produced an archive.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// Zip bytes.
    pub archive: Vec<u8>,
    /// Files written to the archive.
    pub entries: usize,
    pub failures: Vec<FailureRecord>,
    pub degraded: Vec<DegradedRecord>,
    /// The batch stopped early; `archive` holds what was done by then.
    pub cancelled: bool,
}

impl BatchOutput {
    /// Every item was packaged and the batch ran to the end.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// Drives every (input, output) pair through an [`ItemProcessor`] and packs
/// the results into one archive.
///
/// Items are enumerated input-major: all outputs of the first input, then all
/// outputs of the second, and so on. Progress is reported in that order
/// whatever the executor.
#[derive(Debug)]
pub struct BatchOrchestrator<E: Executor = BatchExecutor> {
    processor: ItemProcessor,
    executor: E,
    compression_level: i64,
    cancel: CancellationToken,
}

impl BatchOrchestrator<BatchExecutor> {
    /// Build an orchestrator from serialized options.
    pub fn from_options(target: EncodingTarget, options: &BatchOptions) -> Result<Self, BatchError> {
        let processor = ItemProcessor::new(options.resampler(), target, options.upscale);
        let executor = options.executor()?;

        Ok(Self::new(processor, executor).with_compression_level(options.compression_level))
    }
}

impl<E: Executor> BatchOrchestrator<E> {
    pub fn new(processor: ItemProcessor, executor: E) -> Self {
        Self {
            processor,
            executor,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_compression_level(mut self, level: i64) -> Self {
        self.compression_level = level;
        self
    }

    /// Share an existing token instead of the orchestrator's own.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Handle that stops this orchestrator's batches between items.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Process `inputs × outputs` and return the archive.
    ///
    /// For item `k` of `total` the sink sees a `Processing` event at `k`,
    /// then `Finished` or `Error on` at `k`, and after the last item one
    /// compressing event at `total`. Per-item failures are recorded and the
    /// batch moves on.
    ///
    /// With a single worker the `Processing` event arrives before the item
    /// runs. With a pool, both events of each item arrive in order after its
    /// window has finished.
    ///
    /// # Errors
    ///
    /// `EmptyBatch` and `InvalidOutputs` are returned before any event.
    /// `ArchiveBuild` is returned when no item succeeded or the zip writer
    /// failed.
    pub fn run(
        &self,
        inputs: &[InputImage],
        outputs: &[OutputSpec],
        sink: &mut dyn ProgressSink,
    ) -> Result<BatchOutput, BatchError> {
        if inputs.is_empty() || outputs.is_empty() {
            return Err(BatchError::EmptyBatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }
        validate_outputs(outputs)?;

        let work: Vec<WorkItem<'_>> = inputs
            .iter()
            .flat_map(|input| outputs.iter().map(move |output| (input, output)))
            .enumerate()
            .map(|(index, (input, output))| WorkItem {
                index,
                input,
                output,
            })
            .collect();
        let total = work.len();
        let window = self.executor.max_in_flight().max(1);

        info!(
            inputs = inputs.len(),
            outputs = outputs.len(),
            total,
            window,
            "batch started"
        );

        let mut archive = ArchiveBuilder::with_compression_level(self.compression_level);
        let mut failures = Vec::new();
        let mut degraded = Vec::new();
        let mut cancelled = false;

        let processor = &self.processor;
        for chunk in work.chunks(window) {
            if self.cancel.is_cancelled() {
                cancelled = true;
                warn!(
                    done = chunk[0].index,
                    total,
                    "batch cancelled, packaging completed items"
                );
                break;
            }

            // A single in-flight item is announced before it runs; a wider
            // window is announced in order once it has finished.
            if window == 1 {
                announce(sink, chunk, total);
            }
            let results = self
                .executor
                .execute(chunk, |item| processor.process(item.input, item.output));

            for (item, result) in chunk.iter().zip(results) {
                let current = item.index + 1;
                let bucket = item.output.bucket_name.as_str();
                let file_name = item.input.name.as_str();

                if window > 1 {
                    sink.on_progress(ProgressEvent::started(current, total, bucket, file_name));
                }

                match result {
                    Ok(processed) => {
                        if let ResamplePath::Fallback { reason } = &processed.resample {
                            degraded.push(DegradedRecord {
                                input_name: file_name.to_string(),
                                bucket_name: bucket.to_string(),
                                reason: reason.clone(),
                            });
                        }
                        archive.add_entry(bucket, &processed.file_name, processed.bytes);
                        sink.on_progress(ProgressEvent::finished(current, total, bucket, file_name));
                    }
                    Err(err) => {
                        warn!(
                            input = file_name,
                            bucket,
                            stage = ?err.stage(),
                            error = %err,
                            "item failed"
                        );
                        failures.push(FailureRecord {
                            input_name: file_name.to_string(),
                            bucket_name: bucket.to_string(),
                            stage: err.stage(),
                            reason: err.to_string(),
                        });
                        sink.on_progress(ProgressEvent::failed(current, total, bucket, file_name));
                    }
                }
            }
        }

        sink.on_progress(ProgressEvent::compressing(total));

        let entries = archive.entry_count();
        let archive = archive.finalize()?;

        info!(
            entries,
            failures = failures.len(),
            degraded = degraded.len(),
            cancelled,
            bytes = archive.len(),
            "batch finished"
        );

        Ok(BatchOutput {
            archive,
            entries,
            failures,
            degraded,
            cancelled,
        })
    }
}

fn announce(sink: &mut dyn ProgressSink, chunk: &[WorkItem<'_>], total: usize) {
    for item in chunk {
        sink.on_progress(ProgressEvent::started(
            item.index + 1,
            total,
            &item.output.bucket_name,
            &item.input.name,
        ));
    }
}
