mod support;

use ecs_manager_core::handlers::deploy::deploy;
use ecs_manager_core::logging::Level;
use ecs_manager_core::{Fault, FaultKind};
use serde_json::{json, Value};
use support::harness::Harness;

const WEB_TASKDEF: &str = "arn:aws:ecs:eu-west-1:1:task-definition/web:7";
const WEB_NEXT_TASKDEF: &str = "arn:aws:ecs:eu-west-1:1:task-definition/web:8";
const WEB_SERVICE: &str = "arn:aws:ecs:eu-west-1:1:service/prod/web";

fn ok(fields: Value) -> Value {
    let mut response = json!({"ResponseMetadata": {"HTTPStatusCode": 200}});
    if let (Value::Object(target), Value::Object(extra)) = (&mut response, fields) {
        target.extend(extra);
    }
    response
}

fn script_web_service(harness: &Harness, image: &str) {
    harness
        .aws
        .script(
            "describe_services",
            ok(json!({"services": [{
                "serviceName": "web",
                "serviceArn": WEB_SERVICE,
                "taskDefinition": WEB_TASKDEF,
            }]})),
        )
        .script(
            "describe_task_definition",
            ok(json!({"taskDefinition": {
                "taskDefinitionArn": WEB_TASKDEF,
                "family": "web",
                "executionRoleArn": "arn:aws:iam::1:role/exec",
                "networkMode": "awsvpc",
                "requiresCompatibilities": ["FARGATE"],
                "containerDefinitions": [{"name": "app", "image": image}],
            }})),
        );
}

fn script_update(harness: &Harness) {
    harness.aws.script(
        "update_service",
        ok(json!({"service": {"serviceArn": WEB_SERVICE}})),
    );
}

#[test]
fn new_image_registers_revision_and_updates_service() {
    let harness = Harness::new();
    script_web_service(&harness, "repo/app:1");
    harness.aws.script(
        "register_task_definition",
        ok(json!({"taskDefinition": {"taskDefinitionArn": WEB_NEXT_TASKDEF}})),
    );
    script_update(&harness);

    let result = deploy(
        &harness.context(),
        &json!({"cluster_id": "prod", "service_ids": ["web"], "image": "repo/app:2"}),
    );

    assert!(!result.is_error(), "{:?}", result.error());
    assert_eq!(
        harness.aws.calls_to("register_task_definition"),
        vec![json!({
            "family": "web",
            "containerDefinitions": [{"name": "app", "image": "repo/app:2"}],
            "executionRoleArn": "arn:aws:iam::1:role/exec",
            "networkMode": "awsvpc",
            "requiresCompatibilities": ["FARGATE"],
        })]
    );
    assert_eq!(
        harness.aws.calls_to("update_service"),
        vec![json!({
            "cluster": "prod",
            "service": "web",
            "taskDefinition": WEB_NEXT_TASKDEF,
            "forceNewDeployment": true,
        })]
    );
    assert_eq!(result.body()["UpdatedServiceArns"], json!([WEB_SERVICE]));
    assert_eq!(result.body()["NewTaskdefArn"], json!(WEB_NEXT_TASKDEF));
    assert_eq!(result.status().as_deref(), Some("200"));
}

#[test]
fn unchanged_definition_is_reused() {
    let harness = Harness::new();
    script_web_service(&harness, "repo/app:1");
    script_update(&harness);

    let result = deploy(
        &harness.context(),
        &json!({"cluster_id": "prod", "service_ids": ["web"], "image": "repo/app:1"}),
    );

    assert!(!result.is_error(), "{:?}", result.error());
    assert!(harness.aws.calls_to("register_task_definition").is_empty());
    assert_eq!(
        harness.aws.calls_to("update_service")[0]["taskDefinition"],
        json!(WEB_TASKDEF)
    );
    assert_eq!(result.body()["NewTaskdefArn"], json!(WEB_TASKDEF));
}

#[test]
fn force_flag_is_forwarded() {
    let harness = Harness::new();
    script_web_service(&harness, "repo/app:1");
    script_update(&harness);

    deploy(
        &harness.context(),
        &json!({"cluster_id": "prod", "service_ids": ["web"], "force_new_deployment": false}),
    );

    assert_eq!(
        harness.aws.calls_to("update_service")[0]["forceNewDeployment"],
        json!(false)
    );
}

#[test]
fn secrets_come_from_tagged_parameters() {
    let harness = Harness::new();
    harness
        .aws
        .script(
            "describe_parameters",
            ok(json!({
                "Parameters": [{"Name": "prod_db_password"}, {"Name": "prod_unrelated"}],
                "NextToken": "page-2",
            })),
        )
        .script(
            "describe_parameters",
            ok(json!({"Parameters": [{"Name": "prod_api_key"}, {"Name": "prod_untagged_key"}]})),
        )
        .script(
            "list_tags_for_resource",
            ok(json!({"TagList": [{"Key": "ENV_VAR_NAME", "Value": "DB_PASSWORD"}]})),
        )
        .script(
            "list_tags_for_resource",
            ok(json!({"TagList": [
                {"Key": "team", "Value": "core"},
                {"Key": "ENV_VAR_NAME", "Value": "API_KEY"},
            ]})),
        )
        .script(
            "list_tags_for_resource",
            ok(json!({"TagList": [{"Key": "team", "Value": "core"}]})),
        );
    script_web_service(&harness, "repo/app:1");
    harness.aws.script(
        "register_task_definition",
        ok(json!({"taskDefinition": {"taskDefinitionArn": WEB_NEXT_TASKDEF}})),
    );
    script_update(&harness);

    let result = deploy(
        &harness.context(),
        &json!({
            "cluster_id": "prod",
            "service_ids": [WEB_SERVICE],
            "secrets": ["prod_db_.*", "prod_.*_key"],
        }),
    );

    assert!(!result.is_error(), "{:?}", result.error());
    assert_eq!(
        harness.aws.calls_to("describe_parameters"),
        vec![json!({}), json!({"NextToken": "page-2"})]
    );
    let tagged: Vec<Value> = harness
        .aws
        .calls_to("list_tags_for_resource")
        .into_iter()
        .map(|params| params["ResourceId"].clone())
        .collect();
    assert_eq!(
        tagged,
        vec![
            json!("prod_db_password"),
            json!("prod_api_key"),
            json!("prod_untagged_key")
        ]
    );
    assert_eq!(
        harness.aws.calls_to("register_task_definition")[0]["containerDefinitions"],
        json!([{
            "name": "app",
            "image": "repo/app:1",
            "secrets": [
                {"name": "DB_PASSWORD", "valueFrom": "prod_db_password"},
                {"name": "API_KEY", "valueFrom": "prod_api_key"},
            ],
        }])
    );
}

#[test]
fn services_not_requested_are_left_alone() {
    let harness = Harness::new();
    harness.aws.script(
        "describe_services",
        ok(json!({"services": [{
            "serviceName": "worker",
            "serviceArn": "arn:aws:ecs:eu-west-1:1:service/prod/worker",
            "taskDefinition": WEB_TASKDEF,
        }]})),
    );

    let result = deploy(
        &harness.context(),
        &json!({"cluster_id": "prod", "service_ids": ["web"]}),
    );

    assert!(!result.is_error());
    assert_eq!(harness.aws.operations(), vec!["describe_services"]);
    assert_eq!(result.body()["UpdatedServiceArns"], json!([]));
    assert_eq!(result.body()["NewTaskdefArn"], Value::Null);
}

#[test]
fn missing_fields_are_rejected() {
    let harness = Harness::new();

    let result = deploy(&harness.context(), &json!({"image": "repo/app:2"}));

    assert_eq!(result.error_kind(), Some(FaultKind::MissingFields));
    assert!(result.body().is_empty());
    assert!(harness.aws.calls().is_empty());
    assert_eq!(harness.sink.count_at(Level::Critical), 1);
}

#[test]
fn service_ids_must_be_a_list() {
    let harness = Harness::new();

    let result = deploy(
        &harness.context(),
        &json!({"cluster_id": "prod", "service_ids": "web"}),
    );

    assert_eq!(result.error_kind(), Some(FaultKind::TypeMismatch));
    assert!(harness.aws.calls().is_empty());
}

#[test]
fn update_failure_stops_the_rollout() {
    let harness = Harness::new();
    script_web_service(&harness, "repo/app:1");
    harness.aws.script_fault(
        "update_service",
        Fault::new(FaultKind::Remote, "AccessDeniedException", "not authorized"),
    );

    let result = deploy(
        &harness.context(),
        &json!({"cluster_id": "prod", "service_ids": ["web"]}),
    );

    let error = result.error().expect("failed");
    assert_eq!(error.title, "AccessDeniedException");
    assert_eq!(error.message, json!("not authorized"));
    assert_eq!(harness.sink.count_at(Level::Error), 1);
}
