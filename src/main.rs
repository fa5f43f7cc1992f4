//! Pingwatch Binary Entry Point
//!
//! Parses the command line, then either prints the expanded host list or
//! runs the live dashboard until interrupted.

use std::sync::Arc;

use clap::Parser;
use pingwatch::{
    Cli, Dashboard, HistoryStore, IcmpPinger, ProbeEngine, Renderer, RoundScheduler,
    SystemResolver,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with dashboard frames
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if config.print_hosts {
        for host in &config.hosts {
            println!("{host}");
        }
        return Ok(());
    }

    let pinger = IcmpPinger::new()?;
    let engine = ProbeEngine::new(
        Arc::new(SystemResolver::new()),
        Arc::new(pinger),
        HistoryStore::new(),
    );
    let scheduler = RoundScheduler::new(engine, Renderer::new(config.palette), &config);
    let mut dashboard = Dashboard::stdout();

    tokio::select! {
        result = scheduler.run(&mut dashboard) => {
            result?;
        }
        _ = shutdown_signal() => {
            // In-flight probes are not drained
            println!("\nExiting...");
            std::process::exit(0);
        }
    }

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
