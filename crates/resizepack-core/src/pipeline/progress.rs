//! Progress events and the sinks that receive them.

use serde::{Deserialize, Serialize};

/// Status shown while the archive is being written.
pub const COMPRESSING_STATUS: &str = "Compressing files into a ZIP archive...";

/// One progress update.
///
/// `total` is fixed for a batch. `current` is 1-based and never decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub current: usize,
    pub total: usize,
    pub status: String,
    pub file_name: String,
}

impl ProgressEvent {
    /// Emitted before an item is processed.
    pub fn started(current: usize, total: usize, bucket: &str, file_name: &str) -> Self {
        Self {
            current,
            total,
            status: format!("Processing {bucket}"),
            file_name: file_name.to_string(),
        }
    }

    /// Emitted after an item was packaged.
    pub fn finished(current: usize, total: usize, bucket: &str, file_name: &str) -> Self {
        Self {
            current,
            total,
            status: format!("Finished {bucket}"),
            file_name: file_name.to_string(),
        }
    }

    /// Emitted after an item failed.
    pub fn failed(current: usize, total: usize, bucket: &str, file_name: &str) -> Self {
        Self {
            current,
            total,
            status: format!("Error on {bucket}"),
            file_name: file_name.to_string(),
        }
    }

    /// Emitted once, after the last item.
    pub fn compressing(total: usize) -> Self {
        Self {
            current: total,
            total,
            status: COMPRESSING_STATUS.to_string(),
            file_name: String::new(),
        }
    }

    /// Completion as a whole percentage, 0 when `total` is 0.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.current as f64 / self.total as f64) * 100.0).round() as u32
    }

    pub fn is_error(&self) -> bool {
        self.status.starts_with("Error on ")
    }
}

/// Receiver of progress events.
///
/// Called synchronously on the orchestrating thread, in `current` order.
/// Implementations should return quickly; the batch does not wait on them
/// beyond the call itself.
pub trait ProgressSink {
    fn on_progress(&mut self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressEvent),
{
    fn on_progress(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Forwards events to another thread.
///
/// Never blocks: if a bounded channel is full or the receiver is gone, the
/// event is dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink(pub crossbeam_channel::Sender<ProgressEvent>);

impl ProgressSink for ChannelSink {
    fn on_progress(&mut self, event: ProgressEvent) {
        let _ = self.0.try_send(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _event: ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses() {
        assert_eq!(ProgressEvent::started(1, 4, "Web", "a.png").status, "Processing Web");
        assert_eq!(ProgressEvent::finished(1, 4, "Web", "a.png").status, "Finished Web");

        let failed = ProgressEvent::failed(2, 4, "Hi-res", "b.png");
        assert_eq!(failed.status, "Error on Hi-res");
        assert!(failed.is_error());

        let done = ProgressEvent::compressing(4);
        assert_eq!(done.current, 4);
        assert!(done.file_name.is_empty());
    }

    #[test]
    fn test_percentage() {
        assert_eq!(ProgressEvent::started(1, 3, "Web", "a").percentage(), 33);
        assert_eq!(ProgressEvent::started(2, 3, "Web", "a").percentage(), 67);
        assert_eq!(ProgressEvent::compressing(3).percentage(), 100);
        assert_eq!(ProgressEvent::compressing(0).percentage(), 0);
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |event: ProgressEvent| seen.push(event.current);
            sink.on_progress(ProgressEvent::compressing(7));
        }
        assert_eq!(seen, vec![7]);
    }

    #[test]
    fn test_channel_sink_never_blocks() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut tx = ChannelSink(tx);
        tx.on_progress(ProgressEvent::compressing(1));
        tx.on_progress(ProgressEvent::compressing(2));

        assert_eq!(rx.try_recv().unwrap().current, 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let json = serde_json::to_string(&ProgressEvent::started(1, 2, "Web", "a.png")).unwrap();
        assert_eq!(
            json,
            r#"{"current":1,"total":2,"status":"Processing Web","fileName":"a.png"}"#
        );
    }
}
