//! AWS runtime integration for the ECS manager.
//!
//! `ecs_manager_core` owns commands, results and logging and never touches
//! the SDK. This crate plugs real ECS and SSM clients into its ports and
//! reads process configuration from the environment; the binaries under
//! `src/bin` wire both into `lambda_runtime`.

#![recursion_limit = "256"]

pub mod adapters;
pub mod config;
pub mod runtime;
