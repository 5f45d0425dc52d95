#![allow(dead_code)]

pub mod fake_aws;
pub mod harness;

use ecs_manager_core::Payload;
use serde_json::Value;

/// Unwraps a JSON object literal into a payload.
pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
