mod cli;
mod shutdown;

use clap::Parser;

use uci_provider_engine::{ProviderConfig, run_provider};

use crate::cli::Cli;
use crate::shutdown::spawn_ctrl_c_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let Some(token) = cli.token else {
        let lichess = cli.lichess.as_str().trim_end_matches('/');
        println!(
            "Need LICHESS_API_TOKEN environment variable from {lichess}/account/oauth/token/create?scopes[]=engine:read&scopes[]=engine:write"
        );
        std::process::exit(128);
    };

    tracing::info!("uci-provider {}", env!("CARGO_PKG_VERSION"));

    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    spawn_ctrl_c_handler(stop_tx);

    run_provider(
        ProviderConfig {
            lichess_url: cli.lichess,
            broker_url: cli.broker,
            token,
            engine_command: cli.engine,
            engine_name: cli.name,
            max_threads: cli.max_threads,
            max_hash: cli.max_hash,
            poll_backoff: ProviderConfig::DEFAULT_POLL_BACKOFF,
        },
        stop_rx,
    )
    .await
}
