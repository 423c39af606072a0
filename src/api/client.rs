use crate::error::AppError;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::warn;

use super::cluster::Cluster;
use super::endpoints;

/// Absolute per-call timeout. Enforced per external call, not per
/// request.
const CALL_TIMEOUT: Duration = Duration::from_secs(10);
/// Sleep applied when a 429 carries no Retry-After header.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);
/// 429 retries before the response is handed back unmodified.
const MAX_RATE_LIMIT_RETRIES: u32 = 5;
/// Local steady request rate, under Riot's 20 req/s application limit.
const REQUESTS_PER_SECOND: u32 = 20;

/// HTTP transport for the match-history API.
///
/// Owns the authentication header, the per-call timeout, a local
/// steady-rate limiter, and the 429 backoff loop. No caching happens
/// at this layer; callers apply [`crate::cache::TtlCache`] explicitly.
pub struct RiotClient {
    http: reqwest::Client,
    api_key: String,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    riot_base: Option<String>,
    ddragon_base: String,
}

impl RiotClient {
    pub fn new(api_key: String) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;
        let limiter = RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(REQUESTS_PER_SECOND).unwrap(),
        ));
        Ok(RiotClient {
            http,
            api_key,
            limiter,
            riot_base: None,
            ddragon_base: endpoints::DEFAULT_DDRAGON_BASE.to_string(),
        })
    }

    /// Routes every call, cluster hosts and Data Dragon alike, to
    /// `base`. Test hook.
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        self.riot_base = Some(base.clone());
        self.ddragon_base = base;
        self
    }

    pub fn host(&self, cluster: Cluster) -> String {
        match &self.riot_base {
            Some(base) => format!("{base}/{cluster}"),
            None => format!("https://{cluster}.api.riotgames.com"),
        }
    }

    pub fn ddragon_base(&self) -> &str {
        &self.ddragon_base
    }

    /// Issues an authenticated GET. On 429 the server-advertised delay
    /// is honored and the call retried, at most
    /// [`MAX_RATE_LIMIT_RETRIES`] times; the final 429 is returned
    /// unmodified for the caller to interpret. Every other status
    /// passes through untouched.
    pub async fn call(&self, url: &str) -> Result<Response, AppError> {
        let mut attempt: u32 = 0;
        loop {
            self.limiter.until_ready().await;
            let response = self
                .http
                .get(url)
                .header("X-Riot-Token", &self.api_key)
                .header("Cache-Control", "no-store")
                .send()
                .await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_RATE_LIMIT_RETRIES
            {
                let delay = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_RETRY_AFTER);
                warn!(attempt, delay_secs = delay.as_secs(), "rate limited, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }
            return Ok(response);
        }
    }

    /// GET without the Riot credential, for the public asset-version
    /// endpoint.
    pub async fn get_public_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .header("Cache-Control", "no-store")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::HttpError(format!(
                "GET {url} returned {}",
                response.status()
            )));
        }
        Ok(response.json::<T>().await?)
    }
}
