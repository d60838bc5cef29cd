// Main binary that starts the DHCP and ISO servers
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use netboot_dhcp::DhcpServer;
use netboot_hardware::{FileDirectory, HardwareDirectory, NoopDirectory};
use netboot_iso::IsoState;
use std::io::stderr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

mod config;

use config::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let default_directives = format!(
        "netboot={level},netboot_hardware={level},netboot_dhcp={level},netboot_iso={level},tower=warn,hyper=warn,rustls=warn,h2=warn,reqwest=warn,mio=warn,want=warn"
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
    registry().with(filter).with(fmt::layer().with_writer(stderr)).init();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C received, shutting down"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
        }
        let _ = shutdown_tx.send(true);
    });

    let directory = open_directory(&cli, shutdown_rx.clone()).await?;
    let mut services = JoinSet::new();

    if cli.dhcp_disabled {
        info!("DHCP server disabled");
    } else {
        let server = DhcpServer::new(cli.dhcp_config(), Arc::clone(&directory));
        let shutdown = shutdown_rx.clone();
        services.spawn(async move {
            server
                .run(shutdown)
                .await
                .wrap_err("DHCP server failed")
        });
    }

    if cli.iso_disabled {
        info!("ISO server disabled");
    } else if cli.iso_magic.is_empty() {
        warn!("No ISO placeholder configured (--iso-magic), ISO server not started");
    } else {
        let state = IsoState::new(cli.iso_config(), Arc::clone(&directory))
            .wrap_err("failed to build ISO server state")?;
        let addr = cli.iso_bind;
        let shutdown = shutdown_rx.clone();
        services.spawn(async move {
            netboot_iso::serve(addr, netboot_iso::router(state), shutdown)
                .await
                .wrap_err("ISO server failed")
        });
    }

    if services.is_empty() {
        warn!("Nothing to run, exiting");
        return Ok(());
    }

    let mut result = Ok(());
    while let Some(joined) = services.join_next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => continue,
            Err(e) => Err(e).wrap_err("server task panicked"),
        };
        if let Err(e) = outcome {
            error!("{:#}", e);
            if result.is_ok() {
                result = Err(e);
            }
            // One service down takes the other with it
            services.abort_all();
        }
    }

    info!("Shutdown complete");
    result
}

/// File-backed directory with a reload watcher, or a directory that knows
/// no machines when no file is configured
async fn open_directory(
    cli: &Cli,
    shutdown: watch::Receiver<bool>,
) -> Result<Arc<dyn HardwareDirectory>> {
    let Some(path) = &cli.hardware_file else {
        warn!("No hardware file configured, every lookup will fail");
        return Ok(Arc::new(NoopDirectory));
    };

    let directory = Arc::new(
        FileDirectory::open(path)
            .await
            .wrap_err_with(|| format!("failed to load hardware file {}", path.display()))?,
    );
    info!(path = %path.display(), count = directory.len(), "Loaded hardware file");
    directory.spawn_watcher(cli.hardware_watch_interval(), shutdown);
    Ok(directory as Arc<dyn HardwareDirectory>)
}
