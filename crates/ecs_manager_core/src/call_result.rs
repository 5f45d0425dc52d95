use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::fault::{Fault, FaultKind};

/// A mapping-shaped response payload.
pub type Payload = Map<String, Value>;

pub const RESPONSE_METADATA_KEY: &str = "ResponseMetadata";
pub const HTTP_STATUS_CODE_KEY: &str = "HTTPStatusCode";
const HTTP_OK: &str = "200";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("At least one argument is required")]
pub struct CallResultInputError;

/// Structured description of whatever went wrong with a call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDescription {
    pub title: String,
    pub message: Value,
    pub traceback: Option<Vec<String>>,
}

impl ErrorDescription {
    pub fn into_payload(self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("title".to_string(), Value::from(self.title));
        payload.insert("message".to_string(), self.message);
        payload.insert(
            "traceback".to_string(),
            self.traceback.map(Value::from).unwrap_or(Value::Null),
        );
        payload
    }
}

/// Outcome of one remote call or one handler run.
///
/// Holds a response payload, a fault, or both; never neither. Immutable once
/// built.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    response: Option<Payload>,
    fault: Option<Fault>,
}

impl CallResult {
    pub fn new(
        response: Option<Payload>,
        fault: Option<Fault>,
    ) -> Result<Self, CallResultInputError> {
        if response.is_none() && fault.is_none() {
            return Err(CallResultInputError);
        }
        Ok(Self { response, fault })
    }

    pub fn from_response(response: Payload) -> Self {
        Self {
            response: Some(response),
            fault: None,
        }
    }

    pub fn from_fault(fault: Fault) -> Self {
        Self {
            response: None,
            fault: Some(fault),
        }
    }

    /// A successful handler outcome carrying an explicit `200` status.
    pub fn ok(fields: Value) -> Self {
        let mut payload = Payload::new();
        payload.insert(
            RESPONSE_METADATA_KEY.to_string(),
            json!({ HTTP_STATUS_CODE_KEY: 200 }),
        );
        if let Value::Object(map) = fields {
            payload.extend(map);
        }
        Self::from_response(payload)
    }

    pub fn body(&self) -> Payload {
        self.response.clone().unwrap_or_default()
    }

    pub fn response(&self) -> Option<&Payload> {
        self.response.as_ref()
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// HTTP status code from the response metadata, rendered as a string.
    pub fn status(&self) -> Option<String> {
        if self.fault.is_some() {
            return None;
        }
        let code = self
            .response
            .as_ref()?
            .get(RESPONSE_METADATA_KEY)?
            .get(HTTP_STATUS_CODE_KEY)?;
        match code {
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Failure entries embedded in the response, if any.
    pub fn failures(&self) -> Option<&Vec<Value>> {
        match self.response.as_ref()?.get("failures")? {
            Value::Array(items) if !items.is_empty() => Some(items),
            _ => None,
        }
    }

    /// Fault first, then embedded failures, then a non-OK status.
    pub fn error(&self) -> Option<ErrorDescription> {
        if let Some(fault) = &self.fault {
            return Some(ErrorDescription {
                title: fault.title().to_string(),
                message: fault.message().clone(),
                traceback: Some(fault.trace().to_vec()),
            });
        }
        if let Some(failures) = self.failures() {
            return Some(ErrorDescription {
                title: "Response included failures".to_string(),
                message: Value::Array(failures.clone()),
                traceback: None,
            });
        }
        match self.status() {
            Some(status) if status != HTTP_OK => Some(ErrorDescription {
                title: format!("HTTP status not OK: {status}"),
                message: json!({ "response": self.response }),
                traceback: None,
            }),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    /// The fault kind behind [`CallResult::error`], when there is one.
    pub fn error_kind(&self) -> Option<FaultKind> {
        if let Some(fault) = &self.fault {
            return Some(fault.kind());
        }
        if self.failures().is_some() {
            return Some(FaultKind::Failures);
        }
        self.error().map(|_| FaultKind::HttpStatus)
    }

    /// Splits a healthy result into its body, handing back anything
    /// unhealthy unchanged so callers can short-circuit with `?`.
    pub fn checked(self) -> Result<Payload, CallResult> {
        if self.is_error() {
            return Err(self);
        }
        Ok(self.response.unwrap_or_default())
    }
}

impl From<Fault> for CallResult {
    fn from(fault: Fault) -> Self {
        Self::from_fault(fault)
    }
}

/// Runs one remote operation and normalizes its outcome.
///
/// A single attempt: an error becomes the result's fault, and an absent
/// payload becomes an empty mapping.
pub fn invoke<F, T, E>(call: F) -> CallResult
where
    F: FnOnce() -> Result<T, E>,
    T: Into<Option<Payload>>,
    E: Into<Fault>,
{
    match call() {
        Ok(payload) => CallResult::from_response(payload.into().unwrap_or_default()),
        Err(error) => CallResult::from_fault(error.into()),
    }
}
