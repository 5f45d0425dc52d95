use std::sync::Arc;

use ecs_manager_lambda::config::ManagerConfig;
use ecs_manager_lambda::runtime::ManagerRuntime;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

fn handle_request(runtime: &ManagerRuntime, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let envelope = runtime.dispatch(&event.payload);
    serde_json::to_value(envelope)
        .map_err(|error| Error::from(format!("failed to serialize response envelope: {error}")))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = ManagerConfig::from_env()?;
    let runtime = Arc::new(ManagerRuntime::load(config).await);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let runtime = Arc::clone(&runtime);
        async move { handle_request(&runtime, event) }
    }))
    .await
}
