// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mgctl list` — list every model the daemon's config exposes.

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::OutputFormat;

pub async fn handle(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let models = client.list_models().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&models)?),
        OutputFormat::Text => {
            if models.data.is_empty() {
                println!("No models configured");
            }
            for entry in &models.data {
                if entry.aliases.is_empty() {
                    println!("{}", entry.id);
                } else {
                    println!("{} (aliases: {})", entry.id, entry.aliases.join(", "));
                }
            }
        }
    }

    Ok(())
}
