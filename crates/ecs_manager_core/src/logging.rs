use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct UnknownLevel(pub String);

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            _ => Err(UnknownLevel(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub component: &'static str,
    pub level: Level,
    pub message: String,
    pub data: Value,
    pub timestamp: String,
}

pub trait LogSink: Send + Sync {
    fn write(&self, record: &LogRecord);
}

/// One JSON object per line on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrJsonSink;

impl LogSink for StderrJsonSink {
    fn write(&self, record: &LogRecord) {
        eprintln!(
            "{}",
            json!({
                "component": record.component,
                "level": record.level,
                "message": record.message,
                "data": record.data,
                "timestamp": record.timestamp,
            })
        );
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn count_at(&self, level: Level) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|record| record.level == level)
            .count()
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

/// Logging context handed to every handler.
#[derive(Clone)]
pub struct Logger {
    component: &'static str,
    min_level: Level,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new(component: &'static str, min_level: Level, sink: Arc<dyn LogSink>) -> Self {
        Self {
            component,
            min_level,
            sink,
        }
    }

    pub fn stderr(component: &'static str, min_level: Level) -> Self {
        Self::new(component, min_level, Arc::new(StderrJsonSink))
    }

    pub fn log(&self, level: Level, message: &str, data: impl Serialize) {
        if level < self.min_level {
            return;
        }
        let data = serde_json::to_value(data)
            .unwrap_or_else(|error| Value::from(format!("<unserializable log data: {error}>")));
        self.sink.write(&LogRecord {
            component: self.component,
            level,
            message: message.to_string(),
            data,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }

    pub fn debug(&self, message: &str, data: impl Serialize) {
        self.log(Level::Debug, message, data);
    }

    pub fn info(&self, message: &str, data: impl Serialize) {
        self.log(Level::Info, message, data);
    }

    pub fn warning(&self, message: &str, data: impl Serialize) {
        self.log(Level::Warning, message, data);
    }

    pub fn error(&self, message: &str, data: impl Serialize) {
        self.log(Level::Error, message, data);
    }

    pub fn critical(&self, message: &str, data: impl Serialize) {
        self.log(Level::Critical, message, data);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("component", &self.component)
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}
