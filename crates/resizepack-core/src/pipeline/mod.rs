//! Batch pipeline: per-item processing and the orchestrator that drives it.
//!
//! # Flow
//!
//! ```text
//! BatchOrchestrator ── for each (input, output) ──> ItemProcessor
//!        │                                           decode → plan → resample → encode
//!        │<──────────── ProcessedItem | ItemError ───────┘
//!        ├──> ProgressSink (before and after each item, once at the end)
//!        └──> ArchiveBuilder ──> archive bytes
//! ```
//!
//! Per-item failures never leave the orchestrator; they become progress
//! events and [`FailureRecord`]s. Only an empty batch, invalid outputs or a
//! failed archive abort the run.

mod batch;
mod cancel;
mod executor;
mod item;
mod progress;

pub use batch::{BatchError, BatchOrchestrator, BatchOutput, DegradedRecord, FailureRecord};
pub use cancel::CancellationToken;
#[cfg(feature = "parallel")]
pub use executor::PoolExecutor;
pub use executor::{BatchExecutor, Executor, SequentialExecutor};
pub use item::{output_file_name, ItemError, ItemProcessor, ItemStage, ProcessedItem, WorkItem};
pub use progress::{ChannelSink, NoProgress, ProgressEvent, ProgressSink, COMPRESSING_STATUS};
