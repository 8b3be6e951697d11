//! `repo-assistant` entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration** from the TOML file, environment and flags
//!    ([`config`]).
//! 2. **Wire observability**: `tracing-subscriber` to stderr, plus an OTLP
//!    exporter when `OTEL_EXPORTER_OTLP_ENDPOINT` is set ([`observability`]).
//! 3. **Construct infrastructure**: one `GithubClient` serving both tools and
//!    one `OpenAiModel`, injected into an `Orchestrator`.
//! 4. **Run the console** until the user leaves ([`repl`]).

mod config;
mod observability;
mod repl;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use github::GithubClient;
use llm::OpenAiModel;
use orchestrator::{Orchestrator, ToolDispatcher};
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::config::{Args, FileConfig, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let telemetry = observability::init(args.json_logs)?;

    let result = run(args).await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "Assistant exited with an error");
    }

    telemetry.shutdown();
    result
}

async fn run(args: Args) -> Result<()> {
    let file = FileConfig::load(args.config.as_deref())?;
    let settings = Settings::resolve(&args, file)?;

    if settings.github.token.is_none() {
        warn!("GITHUB_TOKEN is not set; GitHub tool calls will fail");
    }

    let github = Arc::new(GithubClient::new(settings.github)?);
    let model = Arc::new(OpenAiModel::new(settings.llm)?);
    info!(model = model.model(), max_rounds = settings.orchestrator.max_rounds, "Starting session");

    let tools = ToolDispatcher::new(github.clone(), github);
    let mut orchestrator = Orchestrator::new(model, tools, settings.orchestrator);
    info!(session_id = %orchestrator.conversation().session_id(), "Session ready");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    tokio::select! {
        result = repl::run(&mut orchestrator, stdin, &mut stdout) => result?,
        _ = tokio::signal::ctrl_c() => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(b"\n").await?;
            stdout.write_all(repl::GOODBYE.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    let conversation = orchestrator.conversation();
    info!(
        session_id = %conversation.session_id(),
        started_at = %conversation.started_at(),
        turns = conversation.len(),
        "Session ended"
    );
    Ok(())
}
