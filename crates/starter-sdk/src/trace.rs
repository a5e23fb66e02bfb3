/// Diagnostic trace abstraction used by every layer of the starter.
///
/// Lower layers only see this trait; the concrete named sources live in
/// `starter-common`.
pub trait TraceWriter: Send + Sync {
    /// Log an informational message.
    fn info(&self, message: &str);

    /// Log a verbose / debug message.
    fn verbose(&self, message: &str);

    /// Log a warning message.
    fn warning(&self, message: &str) {
        self.info(&format!("[warning] {message}"));
    }

    /// Log an error message.
    fn error(&self, message: &str) {
        self.info(&format!("[error] {message}"));
    }
}

/// A no-op trace writer that discards all messages. Useful for tests.
#[derive(Debug, Clone)]
pub struct NullTraceWriter;

impl TraceWriter for NullTraceWriter {
    fn info(&self, _message: &str) {}
    fn verbose(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

// ---------------------------------------------------------------------------
// User-facing log sink
// ---------------------------------------------------------------------------

/// The line-oriented progress sink handed in by a front end.
///
/// Unlike `TraceWriter` this carries no levels: every call is one
/// human-readable line. Implementations may be called from any thread.
pub trait LogSink: Send + Sync {
    fn log(&self, line: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, line: &str) {
        self(line)
    }
}

/// A sink that records every line, in order.
#[derive(Debug, Default)]
pub struct CollectingLogSink {
    lines: parking_lot::Mutex<Vec<String>>,
}

impl CollectingLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines logged so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Index of the first line containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.lines.lock().iter().position(|l| l.contains(needle))
    }
}

impl LogSink for CollectingLogSink {
    fn log(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
