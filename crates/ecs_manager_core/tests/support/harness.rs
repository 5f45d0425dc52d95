use std::sync::Arc;
use std::time::Duration;

use ecs_manager_core::handlers::HandlerContext;
use ecs_manager_core::logging::{Level, Logger, MemorySink};
use ecs_manager_core::settings::{ManagerSettings, WaitPolicy};

use super::fake_aws::FakeAws;

/// Fake services, an in-memory log and settings that never sleep.
pub struct Harness {
    pub aws: FakeAws,
    pub sink: Arc<MemorySink>,
    pub logger: Logger,
    pub settings: ManagerSettings,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        let sink = Arc::new(MemorySink::default());
        let logger = Logger::new("manager", Level::Debug, sink.clone());
        let settings = ManagerSettings {
            wait: WaitPolicy {
                delay: Duration::ZERO,
                max_attempts: 3,
            },
            ..ManagerSettings::default()
        };
        Self {
            aws: FakeAws::new(),
            sink,
            logger,
            settings,
        }
    }

    pub fn context(&self) -> HandlerContext<'_> {
        HandlerContext {
            ecs: &self.aws,
            ssm: &self.aws,
            logger: &self.logger,
            settings: &self.settings,
        }
    }
}
