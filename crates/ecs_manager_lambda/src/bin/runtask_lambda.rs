use std::sync::Arc;

use ecs_manager_lambda::config::{ManagerConfig, RunTaskTarget};
use ecs_manager_lambda::runtime::{runtask_event, ManagerRuntime};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

struct RunTaskFunction {
    runtime: ManagerRuntime,
    target: RunTaskTarget,
}

fn handle_request(function: &RunTaskFunction, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let dispatch_event = runtask_event(&function.target, &event.payload);
    let envelope = function.runtime.dispatch(&dispatch_event);
    serde_json::to_value(envelope)
        .map_err(|error| Error::from(format!("failed to serialize response envelope: {error}")))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = ManagerConfig::from_env()?;
    let target = RunTaskTarget::from_env()?;

    let mut runtime = ManagerRuntime::load(config).await;
    runtime.settings_mut().runtask_family = Some(target.family());
    runtime.logger().info(
        "Configured run-task target",
        json!({
            "cluster": target.cluster,
            "service": target.service,
            "container": target.container,
            "family": target.family(),
        }),
    );
    let function = Arc::new(RunTaskFunction { runtime, target });

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let function = Arc::clone(&function);
        async move { handle_request(&function, event) }
    }))
    .await
}
