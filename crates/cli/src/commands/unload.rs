// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mgctl unload` — stop every running model process.

use anyhow::Result;

use crate::client::DaemonClient;

pub async fn handle(client: &DaemonClient) -> Result<()> {
    client.unload_all().await?;
    println!("Unloaded all models");
    Ok(())
}
