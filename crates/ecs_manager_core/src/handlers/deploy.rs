use serde_json::{json, Value};

use crate::api::{
    DescribeServicesParams, DescribeTaskDefinitionParams, RegisterTaskDefinitionParams,
    UpdateServiceParams,
};
use crate::body::{
    field, found_keys, is_truthy, non_empty_str, require_object, require_str, string_list,
};
use crate::call_result::{CallResult, Payload};
use crate::fault::Fault;
use crate::handlers::secrets::map_secrets;
use crate::handlers::{call, reject, resolve, HandlerContext, Step};

/// Rolls services onto a fresh deployment, optionally with a new image and
/// secrets injected into every container definition.
///
/// Body keys: `cluster_id`, `service_ids` (names or ARNs), `image`,
/// `secrets` (parameter-name patterns), `force_new_deployment` (default
/// true). A new task definition revision is registered only when the edits
/// change the current one.
pub fn deploy(ctx: &HandlerContext<'_>, body: &Value) -> CallResult {
    resolve(roll_out(ctx, body))
}

fn roll_out(ctx: &HandlerContext<'_>, body: &Value) -> Step<CallResult> {
    let logger = ctx.logger;
    let bad = |fault: Fault| reject(logger, fault);

    let present = |key| field(body, key).is_some_and(|value| !value.is_null());
    if !present("cluster_id") || !present("service_ids") {
        return Err(bad(Fault::missing_fields(
            &["cluster_id", "service_ids"],
            &found_keys(body),
        )));
    }
    let cluster_id = field(body, "cluster_id")
        .and_then(Value::as_str)
        .ok_or_else(|| bad(Fault::type_mismatch("'cluster_id' value must be of type string")))?;
    let service_ids = string_list(body, "service_ids")
        .map_err(&bad)?
        .unwrap_or_default();
    let image = non_empty_str(body, "image");
    let force_new_deployment = field(body, "force_new_deployment")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let secret_patterns = match field(body, "secrets") {
        Some(value) if is_truthy(value) => string_list(body, "secrets").map_err(&bad)?,
        _ => None,
    };
    let secrets = match secret_patterns {
        Some(patterns) => Some(map_secrets(ctx, &patterns)?),
        None => None,
    };

    let describe_params = DescribeServicesParams {
        cluster: cluster_id.to_string(),
        services: service_ids.clone(),
    };
    let described = call(logger, "describe_services", || {
        ctx.ecs.describe_services(&describe_params)
    })?;
    let targets: Vec<&Payload> = described
        .get("services")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .filter(|service| {
            ["serviceName", "serviceArn"].iter().any(|key| {
                service
                    .get(*key)
                    .and_then(Value::as_str)
                    .is_some_and(|id| service_ids.iter().any(|wanted| wanted == id))
            })
        })
        .collect();

    let mut updated_services = Vec::with_capacity(targets.len());
    let mut new_taskdef_arn: Option<String> = None;
    for service in targets {
        let service_name = require_str(service, &["serviceName"]).map_err(&bad)?;
        let taskdef_params = DescribeTaskDefinitionParams {
            task_definition: require_str(service, &["taskDefinition"])
                .map_err(&bad)?
                .to_string(),
        };
        let current = call(logger, "describe_task_definition", || {
            ctx.ecs.describe_task_definition(&taskdef_params)
        })?;
        let original = require_object(&current, &["taskDefinition"]).map_err(&bad)?;

        let mut edited = original.clone();
        apply_edits(&mut edited, image, secrets.as_deref());

        let taskdef_arn = if edited != *original {
            logger.info(
                "Re-deploying service with updated container definitions",
                json!({
                    "service": service_name,
                    "containerDefinitions": edited.get("containerDefinitions"),
                }),
            );
            let register_params = RegisterTaskDefinitionParams::from_task_definition(
                &edited,
                require_str(&edited, &["family"]).map_err(&bad)?.to_string(),
                container_definitions(&edited),
            );
            let registered = call(logger, "register_task_definition", || {
                ctx.ecs.register_task_definition(&register_params)
            })?;
            let arn = require_str(&registered, &["taskDefinition", "taskDefinitionArn"])
                .map_err(&bad)?
                .to_string();
            logger.info("Registered task definition", &arn);
            arn
        } else {
            require_str(original, &["taskDefinitionArn"])
                .map_err(&bad)?
                .to_string()
        };

        let update_params = UpdateServiceParams {
            cluster: cluster_id.to_string(),
            service: service_name.to_string(),
            task_definition: Some(taskdef_arn.clone()),
            force_new_deployment,
        };
        let updated = call(logger, "update_service", || {
            ctx.ecs.update_service(&update_params)
        })?;
        let service_arn = require_str(&updated, &["service", "serviceArn"]).map_err(&bad)?;
        logger.info("Updated service", service_arn);

        updated_services.push(service_arn.to_string());
        new_taskdef_arn = Some(taskdef_arn);
    }

    Ok(CallResult::ok(json!({
        "UpdatedServiceArns": updated_services,
        "NewTaskdefArn": new_taskdef_arn,
    })))
}

/// Swaps the image and secrets of every container definition in place.
fn apply_edits(task_definition: &mut Payload, image: Option<&str>, secrets: Option<&[Value]>) {
    let Some(Value::Array(containers)) = task_definition.get_mut("containerDefinitions") else {
        return;
    };
    for container in containers.iter_mut().filter_map(Value::as_object_mut) {
        if let Some(secrets) = secrets {
            container.insert("secrets".to_string(), Value::Array(secrets.to_vec()));
        }
        if let Some(image) = image {
            container.insert("image".to_string(), Value::from(image));
        }
    }
}

fn container_definitions(task_definition: &Payload) -> Vec<Value> {
    task_definition
        .get("containerDefinitions")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}
