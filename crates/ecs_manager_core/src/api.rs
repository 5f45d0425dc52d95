//! Typed contracts for the remote operations the handlers drive.
//!
//! Each parameter struct lists exactly the fields a handler sends; it
//! serializes to the remote API's own field names so fakes and logs see the
//! request as the service would. Responses come back as JSON mappings in the
//! remote API's wire shape, with timestamps as epoch seconds.

use serde::Serialize;
use serde_json::Value;

use crate::call_result::Payload;
use crate::fault::Fault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DesiredStatus {
    Running,
    Stopped,
}

impl DesiredStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Stopped => "STOPPED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaunchType {
    Fargate,
}

impl LaunchType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fargate => "FARGATE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeServicesParams {
    pub cluster: String,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeTaskDefinitionParams {
    pub task_definition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTaskDefinitionParams {
    pub family: String,
    pub container_definitions: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    pub requires_compatibilities: Vec<String>,
}

impl RegisterTaskDefinitionParams {
    /// Carries the registrable attributes of a described task definition
    /// over to a new revision with the given container definitions.
    pub fn from_task_definition(
        task_definition: &Payload,
        family: String,
        container_definitions: Vec<Value>,
    ) -> Self {
        let text = |key: &str| {
            task_definition
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let requires_compatibilities = task_definition
            .get("requiresCompatibilities")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            family,
            container_definitions,
            execution_role_arn: text("executionRoleArn"),
            task_role_arn: text("taskRoleArn"),
            network_mode: text("networkMode"),
            cpu: text("cpu"),
            memory: text("memory"),
            requires_compatibilities,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksParams {
    pub cluster: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    pub desired_status: DesiredStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeTasksParams {
    pub cluster: String,
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTaskParams {
    pub cluster: String,
    pub task_definition: String,
    pub launch_type: LaunchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_configuration: Option<Value>,
    pub started_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceParams {
    pub cluster: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_definition: Option<String>,
    pub force_new_deployment: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeParametersParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaggedResourceType {
    Parameter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListTagsForResourceParams {
    pub resource_type: TaggedResourceType,
    pub resource_id: String,
}

/// Container-orchestration operations.
pub trait EcsApi {
    fn describe_services(&self, params: &DescribeServicesParams) -> Result<Payload, Fault>;

    fn describe_task_definition(
        &self,
        params: &DescribeTaskDefinitionParams,
    ) -> Result<Payload, Fault>;

    fn register_task_definition(
        &self,
        params: &RegisterTaskDefinitionParams,
    ) -> Result<Payload, Fault>;

    fn list_tasks(&self, params: &ListTasksParams) -> Result<Payload, Fault>;

    fn describe_tasks(&self, params: &DescribeTasksParams) -> Result<Payload, Fault>;

    fn run_task(&self, params: &RunTaskParams) -> Result<Payload, Fault>;

    fn update_service(&self, params: &UpdateServiceParams) -> Result<Payload, Fault>;
}

/// Parameter-store operations used to discover injectable secrets.
pub trait SsmApi {
    /// Fetches one page of parameter metadata; `NextToken` in the payload
    /// points at the following page.
    fn describe_parameters(&self, params: &DescribeParametersParams) -> Result<Payload, Fault>;

    fn list_tags_for_resource(&self, params: &ListTagsForResourceParams)
        -> Result<Payload, Fault>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn register_params_skip_absent_attributes() {
        let task_definition = match json!({
            "family": "web",
            "executionRoleArn": "arn:exec",
            "networkMode": "awsvpc",
            "cpu": "256",
            "memory": "512",
            "requiresCompatibilities": ["FARGATE"],
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let params = RegisterTaskDefinitionParams::from_task_definition(
            &task_definition,
            "web".to_string(),
            vec![json!({"name": "app"})],
        );

        assert_eq!(params.task_role_arn, None);
        assert_eq!(
            serde_json::to_value(&params).expect("params serialize"),
            json!({
                "family": "web",
                "containerDefinitions": [{"name": "app"}],
                "executionRoleArn": "arn:exec",
                "networkMode": "awsvpc",
                "cpu": "256",
                "memory": "512",
                "requiresCompatibilities": ["FARGATE"],
            })
        );
    }

    #[test]
    fn list_tasks_params_use_remote_field_names() {
        let params = ListTasksParams {
            cluster: "main".to_string(),
            family: None,
            service_name: Some("web".to_string()),
            desired_status: DesiredStatus::Stopped,
        };

        assert_eq!(
            serde_json::to_value(&params).expect("params serialize"),
            json!({"cluster": "main", "serviceName": "web", "desiredStatus": "STOPPED"})
        );
    }
}
