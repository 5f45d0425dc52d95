//! SDK-backed implementations of the core's remote-operation ports.

pub mod ecs;
pub mod ecs_json;
pub mod sdk_fault;
pub mod ssm;

use std::future::Future;

use ecs_manager_core::call_result::{HTTP_STATUS_CODE_KEY, RESPONSE_METADATA_KEY};
use ecs_manager_core::Payload;
use serde_json::{json, Value};

pub use ecs::SdkEcsClient;
pub use ssm::SdkSsmClient;

/// Drives an SDK future to completion from synchronous handler code.
///
/// Must run inside a multi-threaded tokio runtime.
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Response payload seeded with the metadata block the core reads status
/// from. The SDK only yields an output for a successful HTTP exchange.
pub(crate) fn response_payload(request_id: Option<&str>) -> Payload {
    let mut payload = Payload::new();
    payload.insert(
        RESPONSE_METADATA_KEY.to_string(),
        json!({
            HTTP_STATUS_CODE_KEY: 200,
            "RequestId": request_id.map(Value::from).unwrap_or(Value::Null),
        }),
    );
    payload
}
