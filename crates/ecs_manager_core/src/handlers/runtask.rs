use serde_json::{json, Map, Value};

use crate::api::{
    DescribeServicesParams, DescribeTaskDefinitionParams, DescribeTasksParams, LaunchType,
    RegisterTaskDefinitionParams, RunTaskParams,
};
use crate::body::{
    field, found_keys, has_field, is_truthy, non_empty_str, require_first, require_object,
    require_str,
};
use crate::call_result::{CallResult, Payload};
use crate::fault::{Fault, FaultKind};
use crate::handlers::{call, reject, resolve, surface, HandlerContext, Step};
use crate::settings::LOG_STREAM_PREFIX;
use crate::wait::wait_for_task_stopped;

const REQUIRED_FIELDS: [&str; 2] = ["cluster_id", "service_id"];
const TASK_STATUS_FIELDS: [&str; 4] = ["stopCode", "stoppedReason", "startedBy", "taskArn"];

/// Runs a one-off Fargate task from a service's task definition and waits for
/// it to finish.
///
/// Body keys: `cluster_id` and `service_id` (required), `entrypoint`
/// (optional command override), `container_id` (required with
/// `entrypoint`). When an override is given, a task definition revision
/// holding only the overridden container is registered first.
pub fn runtask(ctx: &HandlerContext<'_>, body: &Value) -> CallResult {
    resolve(run(ctx, body))
}

fn run(ctx: &HandlerContext<'_>, body: &Value) -> Step<CallResult> {
    let logger = ctx.logger;
    let bad = |fault: Fault| reject(logger, fault);

    let entrypoint = match field(body, "entrypoint") {
        Some(value) if is_truthy(value) => match value.as_str() {
            Some(text) => text,
            None => {
                return Err(bad(Fault::type_mismatch(
                    "'entrypoint' key must be of type string",
                )))
            }
        },
        _ => "",
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|key| non_empty_str(body, key).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(bad(Fault::missing_values(
            &missing,
            &REQUIRED_FIELDS,
            &found_keys(body),
        )));
    }
    let cluster_id = non_empty_str(body, "cluster_id").unwrap_or_default();
    let service_id = non_empty_str(body, "service_id").unwrap_or_default();

    if has_field(body, "entrypoint") && !has_field(body, "container_id") {
        return Err(bad(Fault::new(
            FaultKind::Precondition,
            "container_id required to process entrypoint",
            format!(
                "when giving an entrypoint, container_id is required. found keys: {:?}",
                found_keys(body)
            ),
        )));
    }

    let services_params = DescribeServicesParams {
        cluster: cluster_id.to_string(),
        services: vec![service_id.to_string()],
    };
    let services = call(logger, "describe_services", || {
        ctx.ecs.describe_services(&services_params)
    })?;
    let service = require_first(&services, "services").map_err(&bad)?;
    let network_configuration = service.get("networkConfiguration").cloned();
    let service_taskdef_arn = require_str(service, &["taskDefinition"]).map_err(&bad)?;

    let target_taskdef_arn = if entrypoint.is_empty() {
        service_taskdef_arn.to_string()
    } else {
        let container_id = non_empty_str(body, "container_id").unwrap_or_default();
        register_override(ctx, service_taskdef_arn, container_id, entrypoint)?
    };

    let run_params = RunTaskParams {
        cluster: cluster_id.to_string(),
        task_definition: target_taskdef_arn.clone(),
        launch_type: LaunchType::Fargate,
        network_configuration,
        started_by: ctx.settings.started_by.clone(),
    };
    let launched = call(logger, "run_task", || ctx.ecs.run_task(&run_params))?;
    let task_arn = require_first(&launched, "tasks")
        .and_then(|task| require_str(task, &["taskArn"]))
        .map_err(&bad)?
        .to_string();
    logger.info("Running task", &task_arn);

    let waited = wait_for_task_stopped(ctx.ecs, cluster_id, &task_arn, ctx.settings.wait);
    if waited.is_error() {
        return Err(surface(logger, "wait for task stop", waited));
    }
    logger.info("Finished waiting for task execution", &task_arn);

    let describe_params = DescribeTasksParams {
        cluster: cluster_id.to_string(),
        tasks: vec![task_arn.clone()],
    };
    let described = call(logger, "describe_tasks", || {
        ctx.ecs.describe_tasks(&describe_params)
    })?;
    let task = require_first(&described, "tasks").map_err(&bad)?;

    Ok(CallResult::ok(json!({
        "taskArn": task_arn,
        "taskDefinitionArn": target_taskdef_arn,
        "taskStatus": task_status(task),
    })))
}

/// Registers a revision of the service's task definition that runs
/// `entrypoint` in the named container, and returns its ARN.
fn register_override(
    ctx: &HandlerContext<'_>,
    service_taskdef_arn: &str,
    container_id: &str,
    entrypoint: &str,
) -> Step<String> {
    let logger = ctx.logger;
    let bad = |fault: Fault| reject(logger, fault);

    let describe_params = DescribeTaskDefinitionParams {
        task_definition: service_taskdef_arn.to_string(),
    };
    let described = call(logger, "describe_task_definition", || {
        ctx.ecs.describe_task_definition(&describe_params)
    })?;
    let service_taskdef = require_object(&described, &["taskDefinition"]).map_err(&bad)?;
    let family = match &ctx.settings.runtask_family {
        Some(family) => family.clone(),
        None => require_str(service_taskdef, &["family"])
            .map_err(&bad)?
            .to_string(),
    };

    let container = override_container(service_taskdef, container_id, entrypoint).map_err(&bad)?;
    let register_params = RegisterTaskDefinitionParams::from_task_definition(
        service_taskdef,
        family,
        vec![Value::Object(container)],
    );
    let registered = call(logger, "register_task_definition", || {
        ctx.ecs.register_task_definition(&register_params)
    })?;
    let taskdef_arn = require_str(&registered, &["taskDefinition", "taskDefinitionArn"])
        .map_err(&bad)?
        .to_string();
    logger.info("Created task definition", &taskdef_arn);
    Ok(taskdef_arn)
}

/// Copies the named container definition with `entrypoint` as its command.
///
/// The copy exposes no ports and logs under the `lambda` stream prefix.
pub fn override_container(
    task_definition: &Payload,
    container_name: &str,
    entrypoint: &str,
) -> Result<Payload, Fault> {
    let mut container = task_definition
        .get("containerDefinitions")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .find(|container| container.get("name").and_then(Value::as_str) == Some(container_name))
        .cloned()
        .ok_or_else(|| {
            Fault::new(
                FaultKind::NotFound,
                "ContainerNotFound",
                format!("Definition for container {container_name} not found."),
            )
        })?;

    let command: Vec<Value> = entrypoint.split_whitespace().map(Value::from).collect();
    container.insert("command".to_string(), Value::Array(command));
    container.insert("portMappings".to_string(), Value::Array(Vec::new()));

    if let Some(Value::Object(log_configuration)) = container.get_mut("logConfiguration") {
        let options = log_configuration
            .entry("options")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(options) = options {
            options.insert(
                "awslogs-stream-prefix".to_string(),
                Value::from(LOG_STREAM_PREFIX),
            );
        }
    }
    Ok(container)
}

fn task_status(task: &Payload) -> Value {
    let mut status: Map<String, Value> = TASK_STATUS_FIELDS
        .iter()
        .filter_map(|key| task.get(*key).map(|value| (key.to_string(), value.clone())))
        .collect();
    let exit_code = task
        .get("containers")
        .and_then(Value::as_array)
        .and_then(|containers| containers.first())
        .and_then(|container| container.get("exitCode"))
        .cloned()
        .unwrap_or(Value::Null);
    status.insert("exitCode".to_string(), exit_code);
    Value::Object(status)
}
