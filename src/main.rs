mod app;
mod config;
mod data;
mod monitor;
mod sink;
mod ui;

use anyhow::{Context, Result};
use crossterm::tty::IsTty;
use ratatui::backend::CrosstermBackend;
use std::future::Future;
use tokio::signal::unix::{signal, SignalKind};

use crate::config::{Config, Mode};
use crate::monitor::{NvmlTelemetry, Telemetry};
use crate::ui::{Dashboard, TableRenderer};

/// Take over SIGINT now and resolve once one arrives. A signal caught
/// before the returned future is first polled is not lost.
fn interrupt_listener() -> Result<impl Future<Output = ()>> {
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to listen for SIGINT")?;
    Ok(async move {
        if sigint.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(e) => {
            let code = config::exit_code(&e);
            e.print()?;
            std::process::exit(code);
        }
    };

    let interrupt = interrupt_listener()?;

    let mut telemetry = NvmlTelemetry::open(config.device)?;
    match telemetry.device_name() {
        Some(name) => log::info!("Monitoring GPU {}: {}", config.device, name),
        None => log::info!("Monitoring GPU {}", config.device),
    }

    if config.mode == Mode::Interactive && config.output.is_some() {
        log::warn!("Output file is ignored in interactive mode");
    }

    // Sampling failures end the run but still exit 0.
    let exit = match config.mode {
        Mode::Tabular => {
            let mut renderer = TableRenderer::new(std::io::stdout());
            app::run(&config, &mut telemetry, &mut renderer, interrupt).await?
        }
        Mode::Interactive => {
            if !std::io::stdout().is_tty() {
                log::warn!("Standard output is not a terminal");
            }
            let mut renderer = Dashboard::new(CrosstermBackend::new(std::io::stdout()))?;
            app::run(&config, &mut telemetry, &mut renderer, interrupt).await?
        }
    };
    log::debug!("Polling stopped: {:?}", exit);

    Ok(())
}
