use parking_lot::Mutex;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, trace};

/// The application's log sink.
///
/// With `environment.debug` set, lines go straight to `tracing` at info level.
/// Otherwise they are kept in memory and can be read back with
/// [`LogSink::entries`].
#[derive(Debug, Default)]
pub struct LogSink {
    debug: AtomicBool,
    entries: Mutex<Vec<String>>,
}

impl LogSink {
    pub fn new(debug: bool) -> Self {
        Self {
            debug: AtomicBool::new(debug),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn log(&self, message: impl Display) {
        if self.debug.load(Ordering::Relaxed) {
            info!(target: "applitude", "{message}");
        } else {
            let line = message.to_string();
            trace!(line = %line, "Buffered log line");
            self.entries.lock().push(line);
        }
    }

    pub fn set_debug(&self, debug: bool) {
        self.debug.store(debug, Ordering::Relaxed);
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Lines buffered while debug output was off.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}
