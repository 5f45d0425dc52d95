use std::collections::HashSet;

use chrono::DateTime;
use serde_json::{json, Map, Value};

use crate::api::{DescribeTasksParams, DesiredStatus, ListTasksParams};
use crate::body::{found_keys, non_empty_str};
use crate::call_result::{CallResult, Payload};
use crate::fault::Fault;
use crate::handlers::{call, reject, resolve, HandlerContext, Step};

pub const NO_TASKS_MESSAGE: &str = "No task ARNs were found with the given criteria.";
/// Remote limit on task ARNs per describe call.
pub const DESCRIBE_TASKS_BATCH: usize = 100;

const TASK_FIELDS: [&str; 11] = [
    "taskArn",
    "taskDefinitionArn",
    "connectivity",
    "healthStatus",
    "desiredStatus",
    "lastStatus",
    "startedAt",
    "stopCode",
    "stoppedReason",
    "executionStoppedAt",
    "failures",
];
const TIMESTAMP_FIELDS: [&str; 2] = ["startedAt", "executionStoppedAt"];
const CONTAINER_FIELDS: [&str; 6] = [
    "containerArn",
    "image",
    "lastStatus",
    "exitCode",
    "reason",
    "healthStatus",
];

/// Reports running and stopped tasks of a cluster, optionally narrowed to a
/// task family or service.
///
/// Body keys: `cluster` (required), `family`, `serviceName`. Listing is not
/// paginated, so each status contributes at most one page of task ARNs.
pub fn healthcheck(ctx: &HandlerContext<'_>, body: &Value) -> CallResult {
    resolve(report(ctx, body))
}

fn report(ctx: &HandlerContext<'_>, body: &Value) -> Step<CallResult> {
    let logger = ctx.logger;
    let cluster = match body.get("cluster") {
        None | Some(Value::Null) => {
            return Err(reject(
                logger,
                Fault::missing_values(&["cluster"], &["cluster"], &found_keys(body)),
            ));
        }
        Some(value) => value.as_str().ok_or_else(|| {
            reject(
                logger,
                Fault::type_mismatch("'cluster' value must be of type string"),
            )
        })?,
    };

    let list_params = |desired_status| ListTasksParams {
        cluster: cluster.to_string(),
        family: non_empty_str(body, "family").map(str::to_string),
        service_name: non_empty_str(body, "serviceName").map(str::to_string),
        desired_status,
    };

    // Listing only returns one desired status at a time.
    let running_params = list_params(DesiredStatus::Running);
    let running = call(logger, "list_tasks", || ctx.ecs.list_tasks(&running_params))?;
    let stopped_params = list_params(DesiredStatus::Stopped);
    let stopped = call(logger, "list_tasks", || ctx.ecs.list_tasks(&stopped_params))?;

    // A task that stops between the two listings shows up in both.
    let task_arns = merge_task_arns(&running, &stopped);
    if task_arns.is_empty() {
        logger.info(NO_TASKS_MESSAGE, body);
        return Ok(CallResult::from_response(payload(json!({
            "msg": NO_TASKS_MESSAGE,
            "data": null,
        }))));
    }

    let mut task_statuses = Vec::with_capacity(task_arns.len());
    for batch in task_arns.chunks(DESCRIBE_TASKS_BATCH) {
        let params = DescribeTasksParams {
            cluster: cluster.to_string(),
            tasks: batch.to_vec(),
        };
        let described = call(logger, "describe_tasks", || ctx.ecs.describe_tasks(&params))?;
        let tasks = described
            .get("tasks")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        task_statuses.extend(tasks.iter().map(task_status));
    }

    logger.debug(
        "Collected task statuses",
        json!({"cluster": cluster, "count": task_statuses.len()}),
    );
    Ok(CallResult::from_response(payload(json!({
        "tasks": task_statuses,
    }))))
}

/// Union of both listings in first-seen order, without duplicates.
fn merge_task_arns(running: &Payload, stopped: &Payload) -> Vec<String> {
    let mut seen = HashSet::new();
    [running, stopped]
        .into_iter()
        .filter_map(|listing| listing.get("taskArns").and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_str)
        .filter(|arn| seen.insert(arn.to_string()))
        .map(str::to_string)
        .collect()
}

fn task_status(task: &Value) -> Value {
    let mut status = select(task, &TASK_FIELDS);
    for key in TIMESTAMP_FIELDS {
        if let Some(value) = status.get_mut(key) {
            *value = coerce_timestamp(value);
        }
    }

    let containers: Vec<Value> = task
        .get("containers")
        .and_then(Value::as_array)
        .map(|containers| {
            containers
                .iter()
                .map(|container| Value::Object(select(container, &CONTAINER_FIELDS)))
                .collect()
        })
        .unwrap_or_default();
    status.insert("containers".to_string(), Value::Array(containers));
    Value::Object(status)
}

/// Picks the named fields, filling absent ones with null.
fn select(source: &Value, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .map(|key| {
            (
                key.to_string(),
                source.get(*key).cloned().unwrap_or(Value::Null),
            )
        })
        .collect()
}

/// Renders epoch-seconds timestamps as RFC 3339 text.
fn coerce_timestamp(value: &Value) -> Value {
    let Some(seconds) = value.as_f64() else {
        return value.clone();
    };
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
        .map(|timestamp| Value::from(timestamp.to_rfc3339()))
        .unwrap_or_else(|| value.clone())
}

fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}
