//! Debug sinks.

use std::fmt;

use parking_lot::Mutex;

/// A loggable value handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceValue {
    Str(String),
    Bool(bool),
    Count(usize),
    Missing,
    List(Vec<TraceValue>),
}

impl fmt::Display for TraceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceValue::Str(s) => f.write_str(s),
            TraceValue::Bool(b) => write!(f, "{b}"),
            TraceValue::Count(n) => write!(f, "{n}"),
            TraceValue::Missing => f.write_str("null"),
            TraceValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for TraceValue {
    fn from(s: &str) -> Self {
        TraceValue::Str(s.to_string())
    }
}

impl From<String> for TraceValue {
    fn from(s: String) -> Self {
        TraceValue::Str(s)
    }
}

impl From<bool> for TraceValue {
    fn from(b: bool) -> Self {
        TraceValue::Bool(b)
    }
}

impl From<usize> for TraceValue {
    fn from(n: usize) -> Self {
        TraceValue::Count(n)
    }
}

impl<T: Into<TraceValue>> From<Option<T>> for TraceValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(TraceValue::Missing)
    }
}

impl<T: Into<TraceValue>> From<Vec<T>> for TraceValue {
    fn from(items: Vec<T>) -> Self {
        TraceValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// Render a record the way a console would print variadic arguments.
pub fn format_record(args: &[TraceValue]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Destination for diagnostic records.
pub trait DebugSink: Send + Sync {
    fn log(&self, args: &[TraceValue]);

    /// Disabled sinks let the tracer skip all work.
    fn enabled(&self) -> bool {
        true
    }
}

/// Sink used when diagnostics are off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DebugSink for NoopSink {
    fn log(&self, _args: &[TraceValue]) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Forwards records to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn log(&self, args: &[TraceValue]) {
        tracing::debug!(target: "logpage::trace", "[DEBUG] {}", format_record(args));
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|l| l.contains(needle))
    }
}

impl DebugSink for MemorySink {
    fn log(&self, args: &[TraceValue]) {
        self.lines.lock().push(format_record(args));
    }
}
