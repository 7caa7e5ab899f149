//! `tracing` output routed to the browser console.

use std::io;
use std::sync::OnceLock;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};
use wasm_bindgen::JsValue;

const DEFAULT_FILTER: &str = "resizepack_core=info,resizepack_wasm=info";

static FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Install the global subscriber with the default filter. Later calls are no-ops.
pub(crate) fn init() {
    if FILTER.get().is_some() {
        return;
    }

    let (filter, handle) = reload::Layer::new(EnvFilter::new(DEFAULT_FILTER));
    // No clock in the browser sandbox, and the console does not render ANSI.
    let console = fmt::layer()
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .with_writer(MakeConsoleWriter);

    if tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .try_init()
        .is_ok()
    {
        let _ = FILTER.set(handle);
    }
}

/// Swap the active filter for `directives`, e.g. `"resizepack_core=debug"`.
///
/// # Errors
///
/// Fails when the directives do not parse or the subscriber installed by
/// [`init`] is not in place.
pub(crate) fn set_filter(directives: &str) -> Result<(), String> {
    let filter = EnvFilter::try_new(directives)
        .map_err(|e| format!("Invalid log filter {directives:?}: {e}"))?;
    let handle = FILTER
        .get()
        .ok_or_else(|| "Logging is not initialized".to_string())?;
    handle.reload(filter).map_err(|e| e.to_string())
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Buffers one formatted event and prints it when dropped.
#[derive(Debug)]
pub(crate) struct ConsoleWriter {
    level: Level,
    buffer: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buffer: Vec::new(),
        }
    }

    /// The buffered line without its trailing newline, if any.
    fn take_line(&mut self) -> Option<String> {
        let line = String::from_utf8_lossy(&self.buffer).trim_end().to_string();
        self.buffer.clear();
        (!line.is_empty()).then_some(line)
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let Some(line) = self.take_line() else {
            return;
        };
        let message = JsValue::from_str(&line);
        match self.level {
            Level::ERROR => web_sys::console::error_1(&message),
            Level::WARN => web_sys::console::warn_1(&message),
            Level::INFO => web_sys::console::info_1(&message),
            _ => web_sys::console::debug_1(&message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_take_line_trims_and_clears() {
        let mut writer = ConsoleWriter::new(Level::WARN);
        writer.write_all(b" WARN item failed input=a.png\n").unwrap();

        assert_eq!(
            writer.take_line().as_deref(),
            Some(" WARN item failed input=a.png")
        );
        assert_eq!(writer.take_line(), None);
    }

    #[test]
    fn test_make_writer_keeps_level() {
        let writer = MakeConsoleWriter.make_writer();
        assert_eq!(writer.level, Level::INFO);
        // Empty buffer: dropping does not touch the console.
        drop(writer);
    }

    #[test]
    fn test_set_filter_rejects_bad_directive() {
        let err = set_filter("resizepack_core=loudest").unwrap_err();
        assert!(err.starts_with("Invalid log filter"), "{err}");
    }
}
