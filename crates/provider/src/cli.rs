use clap::Parser;
use reqwest::Url;

const DEFAULT_LICHESS_URL: &str = "https://lichess.org";
const DEFAULT_BROKER_URL: &str = "https://engine.lichess.ovh";

fn default_lichess_url() -> Url {
    Url::parse(DEFAULT_LICHESS_URL).expect("DEFAULT_LICHESS_URL must be a valid URL")
}

fn default_broker_url() -> Url {
    Url::parse(DEFAULT_BROKER_URL).expect("DEFAULT_BROKER_URL must be a valid URL")
}

#[derive(Debug, Clone, Parser)]
#[command(name = "uci-provider", version, about = "External UCI engine provider for lichess.org")]
pub struct Cli {
    /// Engine name to register.
    #[arg(long, env = "UCI_PROVIDER_NAME", default_value = "uci-provider")]
    pub name: String,

    /// Command to launch the UCI engine (split on whitespace, e.g. `stockfish`).
    #[arg(long)]
    pub engine: String,

    /// Directory base URL used for engine registration.
    #[arg(long, env = "UCI_PROVIDER_LICHESS_URL", default_value_t = default_lichess_url())]
    pub lichess: Url,

    /// Broker base URL polled for analysis work.
    #[arg(long, env = "UCI_PROVIDER_BROKER_URL", default_value_t = default_broker_url())]
    pub broker: Url,

    /// API token with `engine:read` and `engine:write` scopes.
    #[arg(long, env = "LICHESS_API_TOKEN")]
    pub token: Option<String>,

    /// Maximum number of search threads advertised at registration.
    #[arg(long, env = "UCI_PROVIDER_MAX_THREADS", default_value_t = 1)]
    pub max_threads: u32,

    /// Maximum hash table size (MiB) advertised at registration.
    #[arg(long, env = "UCI_PROVIDER_MAX_HASH", default_value_t = 16)]
    pub max_hash: u32,
}
