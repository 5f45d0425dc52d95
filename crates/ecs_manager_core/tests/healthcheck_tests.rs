mod support;

use ecs_manager_core::handlers::healthcheck::{
    healthcheck, DESCRIBE_TASKS_BATCH, NO_TASKS_MESSAGE,
};
use ecs_manager_core::logging::Level;
use ecs_manager_core::{Fault, FaultKind};
use serde_json::{json, Value};
use support::harness::Harness;

fn ok(fields: Value) -> Value {
    let mut response = json!({"ResponseMetadata": {"HTTPStatusCode": 200}});
    if let (Value::Object(target), Value::Object(extra)) = (&mut response, fields) {
        target.extend(extra);
    }
    response
}

#[test]
fn overlapping_listings_are_described_once() {
    let harness = Harness::new();
    harness
        .aws
        .script("list_tasks", ok(json!({"taskArns": ["arn:a", "arn:b"]})))
        .script("list_tasks", ok(json!({"taskArns": ["arn:b", "arn:c"]})))
        .script(
            "describe_tasks",
            ok(json!({"tasks": [
                {"taskArn": "arn:a", "lastStatus": "RUNNING", "startedAt": 1_700_000_000.0},
                {"taskArn": "arn:b", "lastStatus": "STOPPED"},
                {"taskArn": "arn:c", "lastStatus": "STOPPED"},
            ]})),
        );

    let result = healthcheck(
        &harness.context(),
        &json!({"cluster": "prod", "serviceName": "web"}),
    );

    assert!(!result.is_error());
    let listings = harness.aws.calls_to("list_tasks");
    assert_eq!(
        listings,
        vec![
            json!({"cluster": "prod", "serviceName": "web", "desiredStatus": "RUNNING"}),
            json!({"cluster": "prod", "serviceName": "web", "desiredStatus": "STOPPED"}),
        ]
    );
    assert_eq!(
        harness.aws.calls_to("describe_tasks"),
        vec![json!({"cluster": "prod", "tasks": ["arn:a", "arn:b", "arn:c"]})]
    );

    let body = result.body();
    let tasks = body["tasks"].as_array().expect("tasks list");
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0]["startedAt"], json!("2023-11-14T22:13:20+00:00"));
    assert_eq!(tasks[1]["startedAt"], Value::Null);
    assert_eq!(tasks[2]["containers"], json!([]));
}

#[test]
fn no_tasks_skips_describe() {
    let harness = Harness::new();
    harness
        .aws
        .script("list_tasks", ok(json!({"taskArns": []})))
        .script("list_tasks", ok(json!({"taskArns": []})));

    let result = healthcheck(&harness.context(), &json!({"cluster": "prod"}));

    assert!(!result.is_error());
    assert_eq!(result.body()["msg"], json!(NO_TASKS_MESSAGE));
    assert_eq!(result.body()["data"], Value::Null);
    assert_eq!(harness.aws.operations(), vec!["list_tasks", "list_tasks"]);
}

#[test]
fn large_listings_are_described_in_batches() {
    let harness = Harness::new();
    let running: Vec<String> = (0..DESCRIBE_TASKS_BATCH + 20)
        .map(|index| format!("arn:task/{index}"))
        .collect();
    harness
        .aws
        .script("list_tasks", ok(json!({"taskArns": running})))
        .script("list_tasks", ok(json!({"taskArns": []})));

    let result = healthcheck(&harness.context(), &json!({"cluster": "prod"}));

    assert!(!result.is_error());
    let batches: Vec<usize> = harness
        .aws
        .calls_to("describe_tasks")
        .iter()
        .map(|params| params["tasks"].as_array().map_or(0, Vec::len))
        .collect();
    assert_eq!(batches, vec![DESCRIBE_TASKS_BATCH, 20]);
}

#[test]
fn missing_cluster_is_rejected_without_remote_calls() {
    let harness = Harness::new();

    let result = healthcheck(&harness.context(), &json!({"family": "web"}));

    assert_eq!(result.error_kind(), Some(FaultKind::MissingFields));
    let error = result.error().expect("error surfaced");
    assert_eq!(
        error.message,
        json!("[\"cluster\"] field(s) not optional. Found: [\"family\"]. Required: [\"cluster\"]")
    );
    assert!(result.body().is_empty());
    assert!(harness.aws.calls().is_empty());
    assert_eq!(harness.sink.count_at(Level::Critical), 1);
}

#[test]
fn non_string_cluster_is_a_type_mismatch() {
    let harness = Harness::new();

    let result = healthcheck(&harness.context(), &json!({"cluster": 5}));

    assert_eq!(result.error_kind(), Some(FaultKind::TypeMismatch));
    let error = result.error().expect("error surfaced");
    assert_eq!(error.message, json!("'cluster' value must be of type string"));
    assert!(result.body().is_empty());
    assert!(harness.aws.calls().is_empty());
    assert_eq!(harness.sink.count_at(Level::Critical), 1);
}

#[test]
fn listing_failure_is_returned() {
    let harness = Harness::new();
    harness.aws.script_fault(
        "list_tasks",
        Fault::new(FaultKind::Remote, "ClusterNotFoundException", "Cluster not found."),
    );

    let result = healthcheck(&harness.context(), &json!({"cluster": "missing"}));

    let error = result.error().expect("error surfaced");
    assert_eq!(error.title, "ClusterNotFoundException");
    assert_eq!(harness.aws.operations(), vec!["list_tasks"]);
    assert_eq!(harness.sink.count_at(Level::Error), 1);
}

#[test]
fn describe_failures_are_surfaced() {
    let harness = Harness::new();
    harness
        .aws
        .script("list_tasks", ok(json!({"taskArns": ["arn:a"]})))
        .script("list_tasks", ok(json!({"taskArns": []})))
        .script(
            "describe_tasks",
            ok(json!({"tasks": [], "failures": [{"arn": "arn:a", "reason": "MISSING"}]})),
        );

    let result = healthcheck(&harness.context(), &json!({"cluster": "prod"}));

    assert_eq!(result.error_kind(), Some(FaultKind::Failures));
    assert_eq!(
        result.error().expect("error").message,
        json!([{"arn": "arn:a", "reason": "MISSING"}])
    );
}
