use serde::{Deserialize, Serialize};
use tracing::info;

use uci_provider_core::secret::ProviderSecret;

use crate::api::ProviderConfig;
use crate::uci::SEARCH_DEPTH;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Registration<'a> {
    name: &'a str,
    max_threads: u32,
    max_hash: u32,
    shallow_depth: u32,
    deep_depth: u32,
    provider_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct RegisteredEngine {
    id: String,
    name: String,
}

/// Register the engine with the directory, updating the existing record
/// when one already carries the configured name.
pub(crate) async fn register_engine(
    http: &reqwest::Client,
    config: &ProviderConfig,
    secret: &ProviderSecret,
) -> anyhow::Result<()> {
    let list_url = config.lichess_url.join("api/external-engine")?;
    let res = http.get(list_url.clone()).send().await?;

    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        anyhow::bail!("http {status}: {body}");
    }
    let existing: Vec<RegisteredEngine> = res.json().await?;

    let registration = Registration {
        name: &config.engine_name,
        max_threads: config.max_threads,
        max_hash: config.max_hash,
        shallow_depth: SEARCH_DEPTH,
        deep_depth: SEARCH_DEPTH,
        provider_secret: secret.as_str(),
    };

    let res = if let Some(engine) = existing.iter().find(|e| e.name == config.engine_name) {
        info!("updating engine {}", engine.id);
        let url = config
            .lichess_url
            .join(&format!("api/external-engine/{}", engine.id))?;
        http.put(url).json(&registration).send().await?
    } else {
        info!("registering new engine");
        http.post(list_url).json(&registration).send().await?
    };

    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        anyhow::bail!("http {status}: {body}");
    }
    Ok(())
}
