use reqwest::Url;
use serde::{Deserialize, Serialize};

use uci_provider_core::secret::ProviderSecret;

use crate::api::Work;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkRequest<'a> {
    provider_secret: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AcquiredJob {
    pub(crate) id: String,
    pub(crate) work: Work,
}

/// Long-poll the broker for one job. `Ok(None)` means the poll came back
/// without an assignment (any non-200 success status).
pub(crate) async fn acquire_work(
    http: &reqwest::Client,
    broker: &Url,
    secret: &ProviderSecret,
) -> anyhow::Result<Option<AcquiredJob>> {
    let url = broker.join("api/external-engine/work")?;
    let res = http
        .post(url)
        .json(&WorkRequest {
            provider_secret: secret.as_str(),
        })
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        anyhow::bail!("http {status}: {body}");
    }
    if status != reqwest::StatusCode::OK {
        return Ok(None);
    }
    Ok(Some(res.json().await?))
}

/// Stream the engine output for `job_id` back to the broker.
pub(crate) async fn deliver_work(
    http: &reqwest::Client,
    broker: &Url,
    job_id: &str,
    body: reqwest::Body,
) -> anyhow::Result<()> {
    let url = broker.join(&format!("api/external-engine/work/{job_id}"))?;
    let res = http.post(url).body(body).send().await?;

    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        anyhow::bail!("http {status}: {body}");
    }
    Ok(())
}
