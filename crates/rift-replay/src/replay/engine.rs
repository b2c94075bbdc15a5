//! Concurrent dispatch of replay requests.

use super::client::ReplayClient;
use super::limiter::HostLimiter;
use super::types::{ReplayResponse, ReplayResult};
use crate::error::ExchangeError;
use crate::request::ReplayRequest;
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Body bytes read before a response is dropped. Small bodies are drained so
/// the connection returns to the pool; larger ones close it instead of
/// holding the origin permit while they stream.
const DRAIN_LIMIT: usize = 64 * 1024;

/// Dispatch every request at once and wait for all of them.
///
/// Returns one result per request, in input order. A failed or timed out
/// exchange only affects its own slot.
pub async fn replay_all(client: &ReplayClient, requests: Vec<ReplayRequest>) -> Vec<ReplayResult> {
    if requests.is_empty() {
        return Vec::new();
    }

    let timeout_ms = client.config().timeout_ms;
    let limiter = HostLimiter::for_requests(
        &requests,
        client.config().connection_pool.max_conns_per_host,
    );
    debug!(
        requests = requests.len(),
        origins = limiter.origins(),
        "dispatching replay batch"
    );

    let handles: Vec<_> = requests
        .iter()
        .map(|request| {
            let http = client.http().clone();
            let semaphore = limiter.semaphore_for(&request.url);
            tokio::spawn(exchange(http, semaphore, request.to_http(), timeout_ms))
        })
        .collect();

    let outcomes = join_all(handles).await;

    requests
        .into_iter()
        .zip(outcomes)
        .map(|(request, joined)| {
            let outcome = joined.unwrap_or_else(|e| Err(ExchangeError::Task(e.to_string())));
            match &outcome {
                Ok(response) => debug!(
                    index = request.index,
                    status = response.status.as_u16(),
                    elapsed_ms = response.elapsed.as_millis() as u64,
                    "{} {}",
                    request.method,
                    request.url
                ),
                Err(error) => warn!(
                    index = request.index,
                    "{} {} failed: {}",
                    request.method,
                    request.url,
                    error
                ),
            }
            ReplayResult { request, outcome }
        })
        .collect()
}

/// One request/response exchange, holding an origin permit throughout.
async fn exchange(
    http: Client,
    semaphore: Arc<Semaphore>,
    request: reqwest::Request,
    timeout_ms: u64,
) -> Result<ReplayResponse, ExchangeError> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| ExchangeError::Task(e.to_string()))?;

    let started = Instant::now();
    let mut response = http
        .execute(request)
        .await
        .map_err(|e| ExchangeError::from_reqwest(&e, timeout_ms))?;

    let status = response.status();
    let version = response.version();
    let headers = response.headers().clone();

    let elapsed = started.elapsed();

    let mut drained = 0;
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                drained += chunk.len();
                if drained >= DRAIN_LIMIT {
                    debug!(
                        status = status.as_u16(),
                        drained, "response body over drain limit, dropping connection"
                    );
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(status = status.as_u16(), "response body discarded early: {}", e);
                break;
            }
        }
    }
    drop(response);

    Ok(ReplayResponse {
        status,
        version,
        headers,
        elapsed,
    })
}
