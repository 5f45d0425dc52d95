//! Orchestration primitives for the ECS manager function.
//!
//! This crate owns the command handlers, the uniform call-result wrapper and
//! the typed remote-operation contracts. AWS SDK and Lambda runtime concerns
//! live in `ecs_manager_lambda`, which plugs SDK clients into the
//! [`api::EcsApi`] and [`api::SsmApi`] ports.

pub mod api;
pub mod body;
pub mod call_result;
pub mod dispatch;
pub mod fault;
pub mod handlers;
pub mod logging;
pub mod settings;
pub mod wait;

pub use call_result::{invoke, CallResult, Payload};
pub use fault::{Fault, FaultCategory, FaultKind};
