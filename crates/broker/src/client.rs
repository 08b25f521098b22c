use anyhow::Result;
use governor::{clock::DefaultClock, state::InMemoryState, Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;

/// HTTP client for the broker REST API with a token-bucket rate limiter in
/// front of every call. The limiter is owned by this object and injected
/// wherever the client goes; there is no process-wide state.
pub struct RestClient {
    http_client: Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter<governor::state::direct::NotKeyed, InMemoryState, DefaultClock>>,
}

impl RestClient {
    #[must_use]
    pub fn new(base_url: String, requests_per_second: u32) -> Self {
        let per_second = NonZeroU32::new(requests_per_second.max(1))
            .unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

        Self {
            http_client: Client::new(),
            base_url,
            rate_limiter,
        }
    }

    /// # Errors
    /// Returns an error on transport failure or non-JSON response.
    pub async fn get(&self, endpoint: &str) -> Result<serde_json::Value> {
        self.rate_limiter.until_ready().await;
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.http_client.get(&url).send().await?;
        let json = response.json().await?;
        Ok(json)
    }

    /// # Errors
    /// Returns an error on transport failure or non-JSON response.
    pub async fn post(&self, endpoint: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        self.rate_limiter.until_ready().await;
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.http_client.post(&url).json(&body).send().await?;
        let json = response.json().await?;
        Ok(json)
    }
}
