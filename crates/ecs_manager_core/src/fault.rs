use serde::Serialize;
use serde_json::Value;

/// Broad origin of a fault, used when deciding how loudly to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCategory {
    InputValidation,
    RemoteCall,
    Semantic,
    Dispatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FaultKind {
    MissingFields,
    TypeMismatch,
    Precondition,
    NotFound,
    InvalidPattern,
    Remote,
    Failures,
    HttpStatus,
    MalformedResponse,
    Timeout,
    CommandNotRecognized,
}

impl FaultKind {
    pub fn category(self) -> FaultCategory {
        match self {
            Self::MissingFields
            | Self::TypeMismatch
            | Self::Precondition
            | Self::NotFound
            | Self::InvalidPattern => FaultCategory::InputValidation,
            Self::Remote => FaultCategory::RemoteCall,
            Self::Failures | Self::HttpStatus | Self::MalformedResponse | Self::Timeout => {
                FaultCategory::Semantic
            }
            Self::CommandNotRecognized => FaultCategory::Dispatch,
        }
    }
}

/// A failure raised anywhere in a handler pipeline.
///
/// `message` is usually text, but semantic faults carry structured detail
/// (the remote failures list, the offending response) verbatim.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{title}: {message}")]
pub struct Fault {
    kind: FaultKind,
    title: String,
    message: Value,
    trace: Vec<String>,
}

impl Fault {
    pub fn new(kind: FaultKind, title: impl Into<String>, message: impl Into<Value>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            trace: Vec::new(),
        }
    }

    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.trace = trace;
        self
    }

    /// Builds a remote-call fault from any error, recording its source chain
    /// as the trace.
    pub fn from_error(title: impl Into<String>, error: &(dyn std::error::Error + 'static)) -> Self {
        Self::new(FaultKind::Remote, title, error.to_string()).with_trace(source_chain(error))
    }

    /// Required keys absent from `found`.
    pub fn missing_fields(required: &[&str], found: &[String]) -> Self {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|key| !found.iter().any(|candidate| candidate == key))
            .collect();
        Self::missing_values(&missing, required, found)
    }

    /// Required keys whose values are absent or unusable.
    pub fn missing_values(missing: &[&str], required: &[&str], found: &[String]) -> Self {
        Self::new(
            FaultKind::MissingFields,
            "Required field(s) not found",
            format!("{missing:?} field(s) not optional. Found: {found:?}. Required: {required:?}"),
        )
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(FaultKind::TypeMismatch, "TypeMismatch", message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(
            FaultKind::MalformedResponse,
            "Malformed response",
            message.into(),
        )
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &Value {
        &self.message
    }

    pub fn trace(&self) -> &[String] {
        &self.trace
    }
}

/// Display text of every error below `error` in its source chain.
pub fn source_chain(error: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut trace = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        trace.push(cause.to_string());
        source = cause.source();
    }
    trace
}
