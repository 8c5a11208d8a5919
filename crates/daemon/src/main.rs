// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mgd — the inference gateway daemon.
//!
//! Listens on a TCP address and presents a single HTTP surface
//! compatible with a popular AI-chat API, multiplexing traffic to
//! on-demand model-server subprocesses.

use mg_adapters::{FileConfigLoader, NullDetector, NullDownloader, NullStaticUI};
use mg_core::{GatewayConfig, SystemClock};
use mg_daemon::env;
use mg_daemon::http;
use mg_daemon::manager::{Manager, ManagerDeps};
use mg_storage::{Sidecar, Settings, TrackedFolders};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mgd: fatal: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("mgd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                println!("mgd {}", env!("CARGO_PKG_VERSION"));
                println!("Local inference gateway daemon.");
                println!();
                println!("USAGE:");
                println!("    mgd");
                println!();
                println!("Configuration is read from $MG_CONFIG, defaulting to");
                println!("<state dir>/gateway.yaml. Listen address: $MG_LISTEN");
                println!("(default 127.0.0.1:8080).");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("usage: mgd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config_path = env::config_path().ok_or("could not determine config path; set MG_CONFIG")?;
    let state_dir = env::state_dir().ok_or("could not determine state dir; set MG_STATE_DIR")?;
    std::fs::create_dir_all(&state_dir)?;

    let config = GatewayConfig::load(&config_path)?;
    let _log_guard = setup_logging(&config.log_level)?;

    info!(config_path = %config_path.display(), "starting mg gateway daemon");

    let config_loader: Arc<dyn mg_adapters::ConfigLoader> = Arc::new(FileConfigLoader::new(config_path));
    let settings_sidecar = Sidecar::<Settings>::new(state_dir.join("settings.json"));
    let folders_sidecar = Sidecar::<TrackedFolders>::new(state_dir.join("model_folders.json"));
    let settings = settings_sidecar.load()?;
    let tracked_folders = folders_sidecar.load()?;

    let deps = ManagerDeps {
        config_loader,
        detector: Arc::new(NullDetector),
        downloader: Arc::new(NullDownloader),
        settings,
        settings_sidecar,
        tracked_folders,
        folders_sidecar,
    };

    let manager = Manager::new(config, SystemClock, deps);
    manager.spawn_preload();

    let router = http::router(manager.clone(), Arc::new(NullStaticUI));
    let listen_addr = env::listen_addr();
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    info!(addr = %listen_addr, "listening");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let shutdown = manager.shutdown_token();

    let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM"),
            _ = sigint.recv() => info!("received SIGINT"),
            _ = shutdown.cancelled() => {},
        }
    });

    if let Err(e) = serve.await {
        error!(error = %e, "server error");
    }

    manager.shutdown().await;
    info!("daemon stopped");
    Ok(())
}

fn setup_logging(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
    Ok(())
}
