// Named trace sources. Every component gets its own `Tracing` so log lines
// carry the component name and a UTC timestamp.

use chrono::Utc;
use starter_sdk::TraceWriter;

/// Trace event severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TraceEventType {
    Verbose,
    Information,
    Warning,
    Error,
}

impl std::fmt::Display for TraceEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceEventType::Verbose => write!(f, "VERB"),
            TraceEventType::Information => write!(f, "INFO"),
            TraceEventType::Warning => write!(f, "WARN"),
            TraceEventType::Error => write!(f, "ERR "),
        }
    }
}

/// Configuration for trace output.
#[derive(Debug, Clone)]
pub struct TraceSetting {
    /// Minimum severity level to emit.
    pub level: TraceEventType,
    /// Whether to also print to stdout.
    pub print_to_stdout: bool,
}

impl Default for TraceSetting {
    fn default() -> Self {
        Self {
            level: TraceEventType::Verbose,
            print_to_stdout: false,
        }
    }
}

/// A named trace source.
#[derive(Debug, Clone)]
pub struct Tracing {
    name: String,
    setting: TraceSetting,
}

impl Tracing {
    /// Create a new `Tracing` instance.
    pub fn new(name: impl Into<String>, setting: TraceSetting) -> Self {
        Self {
            name: name.into(),
            setting,
        }
    }

    /// Format a line the way this source emits it.
    pub fn format_line(&self, event_type: TraceEventType, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        format!("[{}][{}] {}: {}", timestamp, &self.name, event_type, message)
    }

    fn trace(&self, event_type: TraceEventType, message: &str) {
        if event_type < self.setting.level {
            return;
        }

        let formatted = self.format_line(event_type, message);

        match event_type {
            TraceEventType::Error => {
                tracing::error!("{}", formatted);
            }
            TraceEventType::Warning => {
                tracing::warn!("{}", formatted);
            }
            TraceEventType::Information => {
                tracing::info!("{}", formatted);
            }
            TraceEventType::Verbose => {
                tracing::debug!("{}", formatted);
            }
        }

        if self.setting.print_to_stdout {
            println!("{}", formatted);
        }
    }

    /// Get the name of this trace source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Log an entering-function trace message.
    pub fn entering(&self, name: &str) {
        self.verbose(&format!("Entering {}", name));
    }

    /// Log a leaving-function trace message.
    pub fn leaving(&self, name: &str) {
        self.verbose(&format!("Leaving {}", name));
    }
}

impl TraceWriter for Tracing {
    fn info(&self, message: &str) {
        self.trace(TraceEventType::Information, message);
    }

    fn verbose(&self, message: &str) {
        self.trace(TraceEventType::Verbose, message);
    }

    fn warning(&self, message: &str) {
        self.trace(TraceEventType::Warning, message);
    }

    fn error(&self, message: &str) {
        self.trace(TraceEventType::Error, message);
    }
}

/// Hands out named trace sources sharing one setting.
#[derive(Debug, Clone, Default)]
pub struct TraceManager {
    default_setting: TraceSetting,
}

impl TraceManager {
    /// Create a new `TraceManager` with a specific setting.
    pub fn with_setting(setting: TraceSetting) -> Self {
        Self {
            default_setting: setting,
        }
    }

    /// Get (create) a named trace source.
    pub fn get(&self, name: &str) -> Tracing {
        Tracing::new(name, self.default_setting.clone())
    }
}
