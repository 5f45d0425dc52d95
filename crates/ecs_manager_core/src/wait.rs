use std::thread;

use serde_json::{json, Value};

use crate::api::{DescribeTasksParams, EcsApi};
use crate::call_result::{invoke, CallResult};
use crate::fault::{Fault, FaultKind};
use crate::settings::WaitPolicy;

const STOPPED: &str = "STOPPED";

/// Polls a task until it reports `STOPPED`.
///
/// Sleeps `policy.delay` between polls and gives up with a timeout fault
/// after `policy.max_attempts` polls. A poll that fails ends the wait with
/// that poll's result.
pub fn wait_for_task_stopped(
    ecs: &dyn EcsApi,
    cluster: &str,
    task_arn: &str,
    policy: WaitPolicy,
) -> CallResult {
    let params = DescribeTasksParams {
        cluster: cluster.to_string(),
        tasks: vec![task_arn.to_string()],
    };

    let mut last_status = Value::Null;
    for attempt in 1..=policy.max_attempts {
        let result = invoke(|| ecs.describe_tasks(&params));
        if result.is_error() {
            return result;
        }

        let body = result.body();
        let tasks = body
            .get("tasks")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if !tasks.is_empty()
            && tasks
                .iter()
                .all(|task| task.get("lastStatus").and_then(Value::as_str) == Some(STOPPED))
        {
            return result;
        }
        last_status = tasks
            .first()
            .and_then(|task| task.get("lastStatus"))
            .cloned()
            .unwrap_or(Value::Null);

        if attempt < policy.max_attempts {
            thread::sleep(policy.delay);
        }
    }

    CallResult::from_fault(Fault::new(
        FaultKind::Timeout,
        "Waiter TasksStopped failed",
        json!({
            "reason": "Max attempts exceeded",
            "taskArn": task_arn,
            "attempts": policy.max_attempts,
            "lastStatus": last_status,
        }),
    ))
}
