// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mgctl — admin CLI for the `mgd` inference gateway daemon.
//!
//! Talks to the daemon exclusively over its HTTP surface rather than
//! linking the daemon process in-process, so it can address a daemon
//! on another host just as well as one on localhost.

mod client;
mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};
use client::DaemonClient;
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "mgctl", version, about = "Admin CLI for the mg inference gateway")]
struct Cli {
    /// Daemon base URL. Defaults to $MG_HOST, then http://127.0.0.1:8080.
    #[arg(long, global = true)]
    host: Option<String>,

    /// API key for an auth-gated daemon. Defaults to $MG_API_KEY.
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show daemon health and currently running models
    Status,
    /// List every configured model
    List,
    /// Stop every running model process
    Unload,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            if let Some(exit_err) = e.downcast_ref::<ExitError>() {
                eprintln!("{exit_err}");
                return exit_code(exit_err.code);
            }
            eprintln!("mgctl: error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn exit_code(code: i32) -> std::process::ExitCode {
    std::process::ExitCode::from(code.clamp(0, 255) as u8)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let host = cli.host.or_else(|| std::env::var("MG_HOST").ok()).unwrap_or_else(|| "http://127.0.0.1:8080".to_string());
    let api_key = cli.api_key.or_else(|| std::env::var("MG_API_KEY").ok());
    let client = DaemonClient::new(host, api_key);

    match cli.command {
        Command::Status => commands::status::handle(&client, cli.format).await,
        Command::List => commands::list::handle(&client, cli.format).await,
        Command::Unload => commands::unload::handle(&client).await,
    }
}
