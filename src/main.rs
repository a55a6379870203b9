// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::time::Instant;

use anyhow::{anyhow, Context};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use dagflow::config::{load_and_validate_descriptor, EngineOptions};
use dagflow::engine::Engine;
use dagflow::scheduler::Event;
use dagflow::tasks::builtin_registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        return Err(anyhow!("Usage: {} <workflow.yaml|workflow.json>", args[0]));
    }

    let descriptor = load_and_validate_descriptor(&args[1])
        .with_context(|| format!("failed to load '{}'", args[1]))?;

    let engine = Engine::new(EngineOptions::default(), builtin_registry())
        .await
        .context("failed to construct engine")?;

    let started = Instant::now();
    let mut events = engine
        .submit(descriptor, CancellationToken::new())
        .context("failed to submit workflow")?;

    let mut failed = false;
    while let Some(event) = events.recv().await {
        match event {
            Ok(Event::Intermediate { task_id, output }) => {
                println!("task '{}' completed: {} bytes", task_id, output.len());
            }
            Ok(Event::Final { results }) => {
                println!("workflow completed: {} task(s) in {:?}", results.len(), started.elapsed());
            }
            Err(err) => {
                eprintln!("workflow failed: {}", err);
                failed = true;
            }
        }
    }

    engine.shutdown().await;
    if failed {
        return Err(anyhow!("workflow run reported one or more task failures"));
    }
    Ok(())
}
