// MindScope CLI Entry Point
// Reads statements from stdin, prints scored outcomes and timeframe reports as JSON

use anyhow::Context;
use mindscope_core::chart::{RenderOutcome, NO_DATA_MESSAGE};
use mindscope_core::config::{AppConfig, LogFormat};
use mindscope_core::pipeline::ConcernPipeline;
use mindscope_core::timeline::Timeframe;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_REPORT_TIMEFRAME: Timeframe = Timeframe::Daily;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries command output; logs go to stderr
    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new(
                env!("CARGO_PKG_NAME").to_string(),
                std::io::stderr,
            ))
            .init(),
    }
}

// --- Commands ---

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Exit,
    Report(Timeframe),
    LastConcern,
    Process(&'a str),
}

/// Commands must be the whole line; anything else is a statement to score.
fn parse_command(line: &str) -> Command<'_> {
    let lower = line.trim().to_lowercase();
    match lower.as_str() {
        "exit" | "quit" => return Command::Exit,
        "last" => return Command::LastConcern,
        "report" => return Command::Report(DEFAULT_REPORT_TIMEFRAME),
        _ => {}
    }

    let mut words = lower.split_whitespace();
    if let (Some("report"), Some(name), None) = (words.next(), words.next(), words.next()) {
        if let Some(timeframe) = Timeframe::parse(name) {
            return Command::Report(timeframe);
        }
    }
    Command::Process(line)
}

async fn handle_line(pipeline: &ConcernPipeline, user_id: &str, line: &str) -> anyhow::Result<bool> {
    match parse_command(line) {
        Command::Exit => return Ok(false),
        Command::Report(timeframe) => match pipeline.report(timeframe.as_str())? {
            RenderOutcome::NoData => println!("{}", NO_DATA_MESSAGE),
            RenderOutcome::Rendered(artifact) => {
                let body = json!({
                    "title": artifact.title,
                    "timeframe": artifact.timeframe,
                    "x_label": artifact.x_label,
                    "y_label": artifact.y_label,
                    "series": artifact.series,
                    "image_base64": artifact.to_base64(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
        },
        Command::LastConcern => {
            let concern = pipeline.last_dominant_concern(user_id);
            println!("{}", json!({ "last_dominant_concern": concern }));
        }
        Command::Process(text) => {
            let outcome = pipeline.process(user_id, text).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    let pipeline = ConcernPipeline::from_config(&config)
        .await
        .context("Failed to initialize pipeline")?;
    info!(
        user_id = %config.user_id,
        persistence = config.database_url.is_some(),
        "MindScope ready. Type a statement, 'report [hourly|daily|weekly|monthly]', 'last' or 'exit'."
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match handle_line(&pipeline, &config.user_id, line).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => error!("Failed to handle input: {:#}", e),
        }
    }

    info!(entries = pipeline.timeline().len(), "Session closed");
    Ok(())
}
