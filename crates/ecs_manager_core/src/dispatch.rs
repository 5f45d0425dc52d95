use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};

use crate::body::found_keys;
use crate::call_result::Payload;
use crate::fault::{Fault, FaultKind};
use crate::handlers::deploy::deploy;
use crate::handlers::healthcheck::healthcheck;
use crate::handlers::runtask::runtask;
use crate::handlers::{CommandHandler, HandlerContext};

pub const RESPONSE_RECEIVED: &str = "response received";

/// Command name to handler, fixed for the life of the process.
pub const COMMANDS: [(&str, CommandHandler); 3] = [
    ("runtask", runtask as CommandHandler),
    ("deploy", deploy as CommandHandler),
    ("healthcheck", healthcheck as CommandHandler),
];

/// What the function hands back to its invoker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub msg: String,
    pub data: Value,
}

#[derive(Clone)]
pub struct Dispatcher {
    commands: Vec<(&'static str, CommandHandler)>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(COMMANDS.to_vec())
    }
}

impl Dispatcher {
    pub fn new(commands: Vec<(&'static str, CommandHandler)>) -> Self {
        Self { commands }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|(name, _)| *name).collect()
    }

    fn handler(&self, command: &str) -> Option<CommandHandler> {
        self.commands
            .iter()
            .find(|(name, _)| *name == command)
            .map(|(_, handler)| *handler)
    }

    /// Validates an event, runs the named handler on its body and wraps the
    /// outcome. Never fails: every problem ends up inside the envelope.
    pub fn dispatch(&self, ctx: &HandlerContext<'_>, event: &Value) -> Envelope {
        let started_at = Instant::now();
        let logger = ctx.logger;
        logger.info("event received", event);

        let (Some(command), Some(body)) = (event.get("command"), event.get("body")) else {
            return self.refuse(
                ctx,
                Fault::missing_fields(&["command", "body"], &found_keys(event)),
            );
        };

        let Some(handler) = command.as_str().and_then(|name| self.handler(name)) else {
            let shown = command
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| command.to_string());
            return self.refuse(
                ctx,
                Fault::new(
                    FaultKind::CommandNotRecognized,
                    format!("Command not recognized: '{shown}'."),
                    format!("Must be one of: {:?}", self.command_names()),
                ),
            );
        };

        let result = handler(ctx, body);

        let mut response = Payload::new();
        response.insert(
            "request_payload".to_string(),
            json!({"command": command, "body": body}),
        );
        match result.error() {
            Some(error) => response.extend(error.into_payload()),
            None => response.extend(result.body()),
        }

        let duration = format_duration(started_at);
        let data = json!({"response": response, "duration": duration});
        logger.info(RESPONSE_RECEIVED, &data);
        Envelope {
            msg: RESPONSE_RECEIVED.to_string(),
            data,
        }
    }

    fn refuse(&self, ctx: &HandlerContext<'_>, fault: Fault) -> Envelope {
        ctx.logger.critical(
            fault.title(),
            json!({"data": fault.message(), "level": "critical"}),
        );
        Envelope {
            msg: fault.title().to_string(),
            data: fault.message().clone(),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.command_names())
            .finish()
    }
}

fn format_duration(started_at: Instant) -> String {
    let elapsed_ms = started_at.elapsed().as_secs_f64() * 1_000.0;
    format!("{elapsed_ms:.2} ms")
}
