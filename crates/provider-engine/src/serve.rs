use std::io;

use anyhow::Context;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use uci_provider_core::secret::ProviderSecret;

use crate::api::ProviderConfig;
use crate::broker::{AcquiredJob, acquire_work, deliver_work};
use crate::registry::register_engine;
use crate::uci::{UciEngine, UciError};

pub(crate) async fn run(
    config: ProviderConfig,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let mut engine = UciEngine::launch(&config.engine_command)?;
    engine.handshake().await.context("uci handshake failed")?;

    let http = build_http_client(&config.token)?;
    let secret = ProviderSecret::generate();
    register_engine(&http, &config, &secret)
        .await
        .context("engine registration failed")?;

    loop {
        debug!("serving ...");
        let polled = tokio::select! {
            res = acquire_work(&http, &config.broker_url, &secret) => res,
            _ = wait_for_stop(&mut shutdown) => break,
        };

        match polled {
            Ok(Some(job)) => run_job(&http, &config, &mut engine, job).await?,
            // An empty long poll paces itself; re-poll right away.
            Ok(None) => {}
            Err(err) => {
                warn!("work poll failed: {err:#}");
                tokio::select! {
                    _ = tokio::time::sleep(config.poll_backoff) => {}
                    _ = wait_for_stop(&mut shutdown) => break,
                }
            }
        }
    }

    info!("stop requested, shutting down");
    Ok(())
}

/// Completes once a stop has been requested. A dropped sender counts as
/// a stop request.
async fn wait_for_stop(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

async fn run_job(
    http: &reqwest::Client,
    config: &ProviderConfig,
    engine: &mut UciEngine,
    job: AcquiredJob,
) -> anyhow::Result<()> {
    info!("handling job {}", job.id);

    let mut analysis = engine.analyse(&job.work).await?;
    let (tx, rx) = mpsc::channel::<Result<Bytes, io::Error>>(1);
    let body = reqwest::Body::wrap_stream(ReceiverStream::new(rx));

    // Feed chunks as the engine produces them. If the broker hangs up
    // mid-delivery the search still runs to its bestmove line, keeping
    // the exchange clean for the next job.
    let feed = async move {
        let mut delivering = true;
        while let Some(chunk) = analysis.next_chunk().await? {
            if delivering && tx.send(Ok(chunk)).await.is_err() {
                delivering = false;
            }
        }
        Ok::<(), UciError>(())
    };

    let (feed_res, delivery_res) = tokio::join!(
        feed,
        deliver_work(http, &config.broker_url, &job.id, body)
    );

    feed_res?;
    if let Err(err) = delivery_res {
        info!("job {} delivery failed: {err:#}", job.id);
    }
    Ok(())
}

fn build_http_client(token: &str) -> anyhow::Result<reqwest::Client> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
        .context("API token is not a valid header value")?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);

    // No client-wide timeout: the work poll is a long poll and searches
    // have no time bound.
    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}
