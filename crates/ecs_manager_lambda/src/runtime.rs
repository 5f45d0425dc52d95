//! Long-lived state shared by every invocation of a function instance.

use ecs_manager_core::dispatch::{Dispatcher, Envelope};
use ecs_manager_core::handlers::HandlerContext;
use ecs_manager_core::logging::Logger;
use ecs_manager_core::settings::ManagerSettings;
use serde_json::{json, Map, Value};

use crate::adapters::{SdkEcsClient, SdkSsmClient};
use crate::config::{ManagerConfig, RunTaskTarget};

pub const LOG_COMPONENT: &str = "ecs_manager";

/// SDK clients, logger and settings built once at cold start.
#[derive(Debug, Clone)]
pub struct ManagerRuntime {
    ecs: SdkEcsClient,
    ssm: SdkSsmClient,
    logger: Logger,
    settings: ManagerSettings,
    dispatcher: Dispatcher,
}

impl ManagerRuntime {
    /// Loads AWS credentials and region from the default provider chain.
    pub async fn load(config: ManagerConfig) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            ecs: SdkEcsClient::from_conf(&aws_config),
            ssm: SdkSsmClient::from_conf(&aws_config),
            logger: Logger::stderr(LOG_COMPONENT, config.log_level),
            settings: config.settings,
            dispatcher: Dispatcher::default(),
        }
    }

    pub fn settings_mut(&mut self) -> &mut ManagerSettings {
        &mut self.settings
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Runs one event through the dispatcher. Blocks the calling worker
    /// thread for the duration of the remote calls.
    pub fn dispatch(&self, event: &Value) -> Envelope {
        let ctx = HandlerContext {
            ecs: &self.ecs,
            ssm: &self.ssm,
            logger: &self.logger,
            settings: &self.settings,
        };
        self.dispatcher.dispatch(&ctx, event)
    }
}

/// Builds the dispatcher event for the single-purpose run-task function.
///
/// A non-empty string `command` in `payload` becomes the entrypoint
/// override; anything else runs the service's own command.
pub fn runtask_event(target: &RunTaskTarget, payload: &Value) -> Value {
    let mut body = Map::new();
    body.insert("cluster_id".to_string(), Value::from(target.cluster.as_str()));
    body.insert("service_id".to_string(), Value::from(target.service.as_str()));
    body.insert(
        "container_id".to_string(),
        Value::from(target.container.as_str()),
    );
    if let Some(command) = payload
        .get("command")
        .and_then(Value::as_str)
        .filter(|command| !command.trim().is_empty())
    {
        body.insert("entrypoint".to_string(), Value::from(command));
    }
    json!({"command": "runtask", "body": body})
}
