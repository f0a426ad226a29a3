//! Public API types for the `uci-provider` engine.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Configuration for a provider instance.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Directory base URL used for engine registration (e.g. `https://lichess.org`).
    pub lichess_url: Url,

    /// Broker base URL polled for analysis work (e.g. `https://engine.lichess.ovh`).
    pub broker_url: Url,

    /// OAuth token with `engine:read` and `engine:write` scopes.
    pub token: String,

    /// Command used to launch the UCI engine, split on whitespace.
    pub engine_command: String,

    /// Name under which the engine is registered with the directory.
    pub engine_name: String,

    /// Maximum number of search threads advertised at registration.
    pub max_threads: u32,

    /// Maximum hash table size (MiB) advertised at registration.
    pub max_hash: u32,

    /// How long to sleep before re-polling after a failed work poll.
    ///
    /// Empty long-poll responses re-poll immediately; only error responses
    /// and transport failures are paced by this backoff.
    pub poll_backoff: Duration,
}

impl ProviderConfig {
    /// Default backoff after a failed work poll.
    pub const DEFAULT_POLL_BACKOFF: Duration = Duration::from_secs(5);
}

/// Analysis request carried by an assigned job.
///
/// The position and moves are passed through to the engine verbatim; no
/// chess-semantic validation happens on this side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    /// Number of principal variations the engine should report.
    pub multi_pv: u32,
    /// Position before `moves` are applied, as a FEN string (or `startpos`).
    pub initial_fen: String,
    /// Moves played from the initial position, in UCI notation.
    pub moves: Vec<String>,
}

/// Run the provider until `shutdown` flips to `true` or a fatal error occurs.
///
/// Launches and handshakes the engine, registers it with the directory,
/// then serves work: poll the broker, drive the engine through one search
/// per job, and stream the output back. A shutdown observed mid-job takes
/// effect once the job finishes. Returns `Err` on engine or registration
/// failure; broker hiccups are absorbed and retried.
pub async fn run_provider(
    config: ProviderConfig,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    crate::serve::run(config, shutdown).await
}
