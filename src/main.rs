//! failover-watcher binary.
//!
//! Loads configuration, waits for the access log, then runs the monitor loop
//! until SIGINT/SIGTERM.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use failover_watcher::alerting::{AlertDispatcher, WebhookNotifier};
use failover_watcher::cli::Cli;
use failover_watcher::lifecycle::{signals, wait_for_log_file_or_shutdown, Shutdown, StartupWait};
use failover_watcher::observability::{logging, metrics};
use failover_watcher::tail::LogTailer;
use failover_watcher::{Monitor, WatchEngine, WatcherConfig, WatcherError};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging("info");
            let err = WatcherError::from(e);
            tracing::error!(error = %err, "Invalid configuration");
            return err.exit_code();
        }
    };

    logging::init_logging(&config.observability.log_level);

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Watcher exiting");
            e.exit_code()
        }
    }
}

async fn run(config: WatcherConfig) -> Result<(), WatcherError> {
    tracing::info!("failover-watcher v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        log_path = %config.log_path.display(),
        webhook = if config.alerts.webhook_url.is_some() { "configured" } else { "NOT SET" },
        error_rate_threshold = config.detection.error_rate_threshold,
        window_size = config.detection.window_size,
        cooldown_secs = config.alerts.cooldown_secs,
        active_pool = %config.detection.active_pool,
        maintenance_mode = config.alerts.maintenance_mode,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let _signals = signals::install(shutdown.clone());

    let startup = wait_for_log_file_or_shutdown(
        &config.log_path,
        Duration::from_secs(config.startup.wait_timeout_secs),
        Duration::from_millis(config.startup.wait_poll_ms),
        shutdown.subscribe(),
    )
    .await?;
    if startup == StartupWait::Cancelled {
        return Ok(());
    }

    let notifier = WebhookNotifier::new(config.alerts.webhook_url.clone(), config.alerts.notify_timeout())?;
    let (dispatcher, worker) = AlertDispatcher::spawn(
        notifier,
        config.alerts.queue_capacity,
        config.alerts.notify_timeout(),
        shutdown.subscribe(),
    );

    let monitor = Monitor::new(
        WatchEngine::new(&config),
        LogTailer::new(&config.log_path, &config.tail),
        dispatcher,
        config.alerts.maintenance_mode,
    );

    let status = tokio::spawn(monitor.run(shutdown.subscribe()))
        .await
        .map_err(|e| WatcherError::Runtime(e.to_string()))?;

    tracing::info!(
        processed = status.processed,
        parse_failures = status.parse_failures,
        pool = %status.pool,
        "Monitor stopped"
    );

    match worker.await {
        Ok(stats) => tracing::info!(delivered = stats.delivered, failed = stats.failed, "Alert worker stopped"),
        Err(e) => tracing::warn!(error = %e, "Alert worker ended abnormally"),
    }

    Ok(())
}
