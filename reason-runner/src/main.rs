//! Reasoned research runner
//!
//! Runs one research pipeline for a topic, logs progress events as they
//! arrive and prints the final result as JSON.
//!
//! Usage: `reason-runner <topic> [basic|advanced]`

use std::sync::Arc;

use anyhow::{bail, Context};
use reason_core::{Depth, ProgressEvent, Transition};
use reason_services::{BroadcastSink, ResearchService};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reason_services=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(topic) = args.next() else {
        bail!("usage: reason-runner <topic> [basic|advanced]");
    };
    let depth = match args.next() {
        Some(raw) => raw
            .parse::<Depth>()
            .map_err(anyhow::Error::msg)
            .context("invalid depth")?,
        None => Depth::default(),
    };

    let service = ResearchService::from_env()
        .context("Research service not available. Check TAVILY_API_KEY, EXA_API_KEY and OPENAI_API_KEY")?;

    info!("Starting {} research on \"{}\"", depth, topic);

    let sink = BroadcastSink::new(256);
    let mut events = sink.subscribe();
    let logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Progress log fell behind, skipped {} events", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Ctrl-C cancels the run instead of killing the process
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling research");
            on_signal.cancel();
        }
    });

    let outcome = service
        .run_research_with_cancel(&topic, depth, Arc::new(sink), cancel)
        .await;

    // The sink was moved into the run; dropping it closes the channel
    if let Err(e) = logger.await {
        error!("Progress logger task failed: {}", e);
    }

    let result = outcome.context("research run failed")?;
    if result.is_partial() {
        warn!("{} steps failed, result is partial", result.failed_steps.len());
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn log_event(event: &ProgressEvent) {
    let counts = match (event.completed_steps, event.total_steps) {
        (Some(done), Some(total)) => format!(" [{}/{}]", done, total),
        _ => String::new(),
    };
    match &event.transition {
        Transition::Running => debug!("#{} {} {}", event.sequence, event.id, event.title),
        Transition::Completed { .. } => info!(
            "#{} {} {}: {}{}",
            event.sequence, event.id, event.title, event.message, counts
        ),
        Transition::Error { reason } => warn!(
            "#{} {} {} failed: {}{}",
            event.sequence, event.id, event.title, reason, counts
        ),
    }
}
