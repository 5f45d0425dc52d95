use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use ecs_manager_core::api::*;
use ecs_manager_core::{Fault, Payload};
use serde::Serialize;
use serde_json::{json, Value};

/// One recorded remote call: operation name and the serialized parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub params: Value,
}

/// Scripted stand-in for both remote services.
///
/// Each operation answers from its own queue in order; an operation with an
/// empty queue answers with a bare successful response.
#[derive(Debug, Default)]
pub struct FakeAws {
    scripted: Mutex<HashMap<&'static str, VecDeque<Result<Payload, Fault>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeAws {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, operation: &'static str, response: Value) -> &Self {
        self.push(operation, Ok(super::payload(response)))
    }

    pub fn script_fault(&self, operation: &'static str, fault: Fault) -> &Self {
        self.push(operation, Err(fault))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn calls_to(&self, operation: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|call| call.operation == operation)
            .map(|call| call.params)
            .collect()
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|call| call.operation).collect()
    }

    fn push(&self, operation: &'static str, response: Result<Payload, Fault>) -> &Self {
        self.scripted
            .lock()
            .expect("script lock")
            .entry(operation)
            .or_default()
            .push_back(response);
        self
    }

    fn answer(&self, operation: &'static str, params: &impl Serialize) -> Result<Payload, Fault> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            operation,
            params: serde_json::to_value(params).expect("params serialize"),
        });
        self.scripted
            .lock()
            .expect("script lock")
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Ok(super::payload(
                    json!({"ResponseMetadata": {"HTTPStatusCode": 200}}),
                ))
            })
    }
}

impl EcsApi for FakeAws {
    fn describe_services(&self, params: &DescribeServicesParams) -> Result<Payload, Fault> {
        self.answer("describe_services", params)
    }

    fn describe_task_definition(
        &self,
        params: &DescribeTaskDefinitionParams,
    ) -> Result<Payload, Fault> {
        self.answer("describe_task_definition", params)
    }

    fn register_task_definition(
        &self,
        params: &RegisterTaskDefinitionParams,
    ) -> Result<Payload, Fault> {
        self.answer("register_task_definition", params)
    }

    fn list_tasks(&self, params: &ListTasksParams) -> Result<Payload, Fault> {
        self.answer("list_tasks", params)
    }

    fn describe_tasks(&self, params: &DescribeTasksParams) -> Result<Payload, Fault> {
        self.answer("describe_tasks", params)
    }

    fn run_task(&self, params: &RunTaskParams) -> Result<Payload, Fault> {
        self.answer("run_task", params)
    }

    fn update_service(&self, params: &UpdateServiceParams) -> Result<Payload, Fault> {
        self.answer("update_service", params)
    }
}

impl SsmApi for FakeAws {
    fn describe_parameters(&self, params: &DescribeParametersParams) -> Result<Payload, Fault> {
        self.answer("describe_parameters", params)
    }

    fn list_tags_for_resource(
        &self,
        params: &ListTagsForResourceParams,
    ) -> Result<Payload, Fault> {
        self.answer("list_tags_for_resource", params)
    }
}
