// ChromeForge Engine
// Main entry point for the chromeforge binary

use clap::Parser;

use chromeforge::cli::Cli;
use chromeforge::config::Config;
use chromeforge::llm::{ModelGateway, OpenAiTransport};
use chromeforge::materializer::Materializer;
use chromeforge::orchestrator::Orchestrator;
use chromeforge::server::{self, AppState};
use chromeforge::telemetry::init_telemetry;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config first: the subscriber is installed once, with the configured
    // level. A config load failure surfaces through anyhow on stderr.
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    init_telemetry(&config.server.log_level);

    tracing::info!("ChromeForge v{}", env!("CARGO_PKG_VERSION"));

    // Missing credential is a hard failure before any network call
    let transport = OpenAiTransport::from_env(config.llm.clone())?;
    let gateway = ModelGateway::new(transport, &config.llm);

    let materializer = Materializer::new(config.output.dir.clone());
    let orchestrator = Orchestrator::new(Arc::new(gateway), materializer);

    let state = AppState::new(
        orchestrator,
        config.output.dir.clone(),
        config.llm.stable_model.clone(),
    );

    let bind = cli.bind.unwrap_or(config.server.bind);
    server::serve(&bind, state).await
}
