use aws_sdk_ecs::operation::RequestId;
use aws_sdk_ecs::types::{Compatibility, DesiredStatus, LaunchType, NetworkMode};
use ecs_manager_core::api::{
    self, DescribeServicesParams, DescribeTaskDefinitionParams, DescribeTasksParams, EcsApi,
    ListTasksParams, RegisterTaskDefinitionParams, RunTaskParams, UpdateServiceParams,
};
use ecs_manager_core::{Fault, Payload};
use serde_json::Value;

use super::ecs_json::{
    container_definition_from_json, failures_to_json, network_configuration_from_json,
    service_to_json, task_definition_to_json, task_to_json,
};
use super::sdk_fault::sdk_fault;
use super::{block_on, response_payload};

/// ECS operations over the AWS SDK, one request per call.
#[derive(Debug, Clone)]
pub struct SdkEcsClient {
    client: aws_sdk_ecs::Client,
}

impl SdkEcsClient {
    pub fn new(client: aws_sdk_ecs::Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_ecs::Client::new(config))
    }
}

impl EcsApi for SdkEcsClient {
    fn describe_services(&self, params: &DescribeServicesParams) -> Result<Payload, Fault> {
        let output = block_on(
            self.client
                .describe_services()
                .cluster(&params.cluster)
                .set_services(Some(params.services.clone()))
                .send(),
        )
        .map_err(sdk_fault)?;

        let mut payload = response_payload(output.request_id());
        payload.insert(
            "services".to_string(),
            Value::Array(output.services().iter().map(service_to_json).collect()),
        );
        payload.insert("failures".to_string(), failures_to_json(output.failures()));
        Ok(payload)
    }

    fn describe_task_definition(
        &self,
        params: &DescribeTaskDefinitionParams,
    ) -> Result<Payload, Fault> {
        let output = block_on(
            self.client
                .describe_task_definition()
                .task_definition(&params.task_definition)
                .send(),
        )
        .map_err(sdk_fault)?;

        let mut payload = response_payload(output.request_id());
        if let Some(task_definition) = output.task_definition() {
            payload.insert(
                "taskDefinition".to_string(),
                task_definition_to_json(task_definition),
            );
        }
        Ok(payload)
    }

    fn register_task_definition(
        &self,
        params: &RegisterTaskDefinitionParams,
    ) -> Result<Payload, Fault> {
        let container_definitions = params
            .container_definitions
            .iter()
            .map(container_definition_from_json)
            .collect::<Result<Vec<_>, _>>()?;
        let compatibilities = params
            .requires_compatibilities
            .iter()
            .map(|compatibility| Compatibility::from(compatibility.as_str()))
            .collect();

        let output = block_on(
            self.client
                .register_task_definition()
                .family(&params.family)
                .set_container_definitions(Some(container_definitions))
                .set_execution_role_arn(params.execution_role_arn.clone())
                .set_task_role_arn(params.task_role_arn.clone())
                .set_network_mode(
                    params
                        .network_mode
                        .as_deref()
                        .map(NetworkMode::from),
                )
                .set_cpu(params.cpu.clone())
                .set_memory(params.memory.clone())
                .set_requires_compatibilities(Some(compatibilities))
                .send(),
        )
        .map_err(sdk_fault)?;

        let mut payload = response_payload(output.request_id());
        if let Some(task_definition) = output.task_definition() {
            payload.insert(
                "taskDefinition".to_string(),
                task_definition_to_json(task_definition),
            );
        }
        Ok(payload)
    }

    fn list_tasks(&self, params: &ListTasksParams) -> Result<Payload, Fault> {
        let output = block_on(
            self.client
                .list_tasks()
                .cluster(&params.cluster)
                .set_family(params.family.clone())
                .set_service_name(params.service_name.clone())
                .desired_status(desired_status(params.desired_status))
                .send(),
        )
        .map_err(sdk_fault)?;

        let mut payload = response_payload(output.request_id());
        payload.insert(
            "taskArns".to_string(),
            Value::from(output.task_arns().to_vec()),
        );
        if let Some(token) = output.next_token() {
            payload.insert("nextToken".to_string(), Value::from(token));
        }
        Ok(payload)
    }

    fn describe_tasks(&self, params: &DescribeTasksParams) -> Result<Payload, Fault> {
        let output = block_on(
            self.client
                .describe_tasks()
                .cluster(&params.cluster)
                .set_tasks(Some(params.tasks.clone()))
                .send(),
        )
        .map_err(sdk_fault)?;

        let mut payload = response_payload(output.request_id());
        payload.insert(
            "tasks".to_string(),
            Value::Array(output.tasks().iter().map(task_to_json).collect()),
        );
        payload.insert("failures".to_string(), failures_to_json(output.failures()));
        Ok(payload)
    }

    fn run_task(&self, params: &RunTaskParams) -> Result<Payload, Fault> {
        let network_configuration = params
            .network_configuration
            .as_ref()
            .map(network_configuration_from_json)
            .transpose()?;

        let output = block_on(
            self.client
                .run_task()
                .cluster(&params.cluster)
                .task_definition(&params.task_definition)
                .launch_type(launch_type(params.launch_type))
                .set_network_configuration(network_configuration)
                .started_by(&params.started_by)
                .send(),
        )
        .map_err(sdk_fault)?;

        let mut payload = response_payload(output.request_id());
        payload.insert(
            "tasks".to_string(),
            Value::Array(output.tasks().iter().map(task_to_json).collect()),
        );
        payload.insert("failures".to_string(), failures_to_json(output.failures()));
        Ok(payload)
    }

    fn update_service(&self, params: &UpdateServiceParams) -> Result<Payload, Fault> {
        let output = block_on(
            self.client
                .update_service()
                .cluster(&params.cluster)
                .service(&params.service)
                .set_task_definition(params.task_definition.clone())
                .force_new_deployment(params.force_new_deployment)
                .send(),
        )
        .map_err(sdk_fault)?;

        let mut payload = response_payload(output.request_id());
        if let Some(service) = output.service() {
            payload.insert("service".to_string(), service_to_json(service));
        }
        Ok(payload)
    }
}

fn desired_status(status: api::DesiredStatus) -> DesiredStatus {
    DesiredStatus::from(status.as_str())
}

fn launch_type(launch_type: api::LaunchType) -> LaunchType {
    LaunchType::from(launch_type.as_str())
}
