use clap::Parser;
use ecs_manager_lambda::config::ManagerConfig;
use ecs_manager_lambda::runtime::ManagerRuntime;
use serde_json::Value;

/// Runs one manager event against the AWS account in the current
/// credential chain and prints the response envelope.
#[derive(Parser)]
#[command(name = "local_invoke")]
struct Cli {
    /// Event JSON, e.g. '{"command": "healthcheck", "body": {"cluster": "prod"}}'
    event: String,
    /// Value recorded as `startedBy` on launched tasks
    #[arg(long, env = "USER")]
    started_by: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let event: Value = serde_json::from_str(&cli.event)
        .map_err(|error| format!("event is not valid JSON: {error}"))?;

    let mut runtime = ManagerRuntime::load(ManagerConfig::from_env()?).await;
    if let Some(started_by) = cli.started_by {
        runtime.settings_mut().started_by = started_by;
    }

    let envelope = runtime.dispatch(&event);
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
