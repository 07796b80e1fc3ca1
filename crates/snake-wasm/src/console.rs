//! Browser console logging
//!
//! A `tracing-subscriber` fmt layer whose writer forwards each formatted
//! event to `console.error/warn/info/debug` by level.

use std::io;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use web_sys::console;

/// Install the console subscriber. Later calls are no-ops.
pub fn init_logging(level: Level) {
    let installed = tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter)
        .with_max_level(level)
        // no wall clock on wasm32-unknown-unknown
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .try_init();

    if installed.is_ok() {
        tracing::debug!("console logging enabled");
    }
}

struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Buffers one formatted event and emits it on drop
struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }

        match self.level {
            Level::ERROR => console::error_1(&line.into()),
            Level::WARN => console::warn_1(&line.into()),
            Level::INFO => console::info_1(&line.into()),
            _ => console::debug_1(&line.into()),
        }
    }
}
