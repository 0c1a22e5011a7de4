//! FMS Dashboard - Main entry point

use clap::Parser;
use fms_dashboard::{runtime, Cli, DashboardConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't tear up the dashboard on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fms_dashboard=info,fms_networking=info,fms_engine=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::from_cli(&cli)?;

    tracing::info!("Starting FMS dashboard against {}", config.endpoint);

    let shutdown = CancellationToken::new();
    let on_ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received");
            on_ctrl_c.cancel();
        }
    });

    runtime::run(config, shutdown).await
}
