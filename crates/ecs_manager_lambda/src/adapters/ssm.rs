use aws_sdk_ssm::operation::RequestId;
use aws_sdk_ssm::types::ResourceTypeForTagging;
use ecs_manager_core::api::{
    DescribeParametersParams, ListTagsForResourceParams, SsmApi, TaggedResourceType,
};
use ecs_manager_core::{Fault, Payload};
use serde_json::{json, Value};

use super::sdk_fault::sdk_fault;
use super::{block_on, response_payload};

/// Parameter Store operations over the AWS SDK.
#[derive(Debug, Clone)]
pub struct SdkSsmClient {
    client: aws_sdk_ssm::Client,
}

impl SdkSsmClient {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_ssm::Client::new(config))
    }
}

impl SsmApi for SdkSsmClient {
    fn describe_parameters(&self, params: &DescribeParametersParams) -> Result<Payload, Fault> {
        let output = block_on(
            self.client
                .describe_parameters()
                .set_next_token(params.next_token.clone())
                .send(),
        )
        .map_err(sdk_fault)?;

        let parameters: Vec<Value> = output
            .parameters()
            .iter()
            .map(|parameter| {
                json!({
                    "Name": parameter.name(),
                    "Type": parameter.r#type().map(|kind| kind.as_str()),
                })
            })
            .collect();
        let mut payload = response_payload(output.request_id());
        payload.insert("Parameters".to_string(), Value::Array(parameters));
        if let Some(token) = output.next_token() {
            payload.insert("NextToken".to_string(), Value::from(token));
        }
        Ok(payload)
    }

    fn list_tags_for_resource(
        &self,
        params: &ListTagsForResourceParams,
    ) -> Result<Payload, Fault> {
        let output = block_on(
            self.client
                .list_tags_for_resource()
                .resource_type(resource_type(params.resource_type))
                .resource_id(&params.resource_id)
                .send(),
        )
        .map_err(sdk_fault)?;

        let tags: Vec<Value> = output
            .tag_list()
            .iter()
            .map(|tag| json!({"Key": tag.key(), "Value": tag.value()}))
            .collect();
        let mut payload = response_payload(output.request_id());
        payload.insert("TagList".to_string(), Value::Array(tags));
        Ok(payload)
    }
}

fn resource_type(resource_type: TaggedResourceType) -> ResourceTypeForTagging {
    match resource_type {
        TaggedResourceType::Parameter => ResourceTypeForTagging::Parameter,
    }
}
