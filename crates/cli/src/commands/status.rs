// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status command handler

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{format_time_ago, OutputFormat};

pub async fn handle(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;
    let running = client.running().await?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "health": health,
                    "running": running.models,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("Status: {}", health.status);
            println!("Models: {} loaded / {} total", health.models_loaded, health.models_total);
            println!("Daemon time: {} ({})", health.timestamp, format_time_ago(health.timestamp));
            if running.models.is_empty() {
                println!("No models running");
            }
            for m in &running.models {
                println!("  {} [{}] port={} inflight={}", m.id, m.state, m.port, m.inflight);
            }
        }
    }

    Ok(())
}
