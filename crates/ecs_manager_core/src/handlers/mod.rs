//! Command handlers. Each one runs a fixed sequence of remote calls and
//! resolves to a single [`CallResult`].

use serde_json::Value;

use crate::api::{EcsApi, SsmApi};
use crate::call_result::{invoke, CallResult, Payload};
use crate::fault::{Fault, FaultCategory};
use crate::logging::Logger;
use crate::settings::ManagerSettings;

pub mod deploy;
pub mod healthcheck;
pub mod runtask;
pub mod secrets;

/// Everything a handler needs for one invocation.
pub struct HandlerContext<'a> {
    pub ecs: &'a dyn EcsApi,
    pub ssm: &'a dyn SsmApi,
    pub logger: &'a Logger,
    pub settings: &'a ManagerSettings,
}

pub type CommandHandler = fn(&HandlerContext<'_>, &Value) -> CallResult;

/// Intermediate step outcome; the error side is the result to return as-is.
pub(crate) type Step<T> = Result<T, CallResult>;

/// Logs a fault at the level its category warrants and wraps it.
pub(crate) fn reject(logger: &Logger, fault: Fault) -> CallResult {
    let data = serde_json::json!({
        "title": fault.title(),
        "message": fault.message(),
    });
    match fault.kind().category() {
        FaultCategory::InputValidation | FaultCategory::Dispatch => {
            logger.critical(fault.title(), data)
        }
        FaultCategory::RemoteCall | FaultCategory::Semantic => logger.error(fault.title(), data),
    }
    CallResult::from_fault(fault)
}

/// Logs an unhealthy call result before it is handed back up the chain.
pub(crate) fn surface(logger: &Logger, operation: &str, result: CallResult) -> CallResult {
    if let Some(error) = result.error() {
        logger.error(
            &format!("{operation} failed"),
            serde_json::json!({"title": error.title, "message": error.message}),
        );
    }
    result
}

/// Runs one remote operation, turning any unhealthy outcome into a logged
/// early return.
pub(crate) fn call<F>(logger: &Logger, operation: &str, operation_call: F) -> Step<Payload>
where
    F: FnOnce() -> Result<Payload, Fault>,
{
    invoke(operation_call)
        .checked()
        .map_err(|result| surface(logger, operation, result))
}

pub(crate) fn resolve(step: Step<CallResult>) -> CallResult {
    match step {
        Ok(result) | Err(result) => result,
    }
}
