use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::DeliveryConfig;
use crate::error::FetchError;
use crate::query::EntryQuery;
use crate::source::ContentSource;

/// HTTP client for the delivery API's entries endpoint.
///
/// One request per fetch, authenticated with the configured bearer token.
/// Failures are returned as-is; there is no retry.
#[derive(Debug, Clone)]
pub struct CdaClient {
    http: reqwest::Client,
    entries_url: String,
    access_token: String,
}

impl CdaClient {
    pub fn new(config: &DeliveryConfig) -> Result<Self, FetchError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            entries_url: config.entries_url(),
            access_token: config.access_token.clone(),
        })
    }

    pub fn entries_url(&self) -> &str {
        &self.entries_url
    }
}

#[async_trait]
impl ContentSource for CdaClient {
    async fn fetch_raw(&self, query: &EntryQuery) -> Result<Value, FetchError> {
        let start = Instant::now();
        let response = self
            .http
            .get(&self.entries_url)
            .bearer_auth(&self.access_token)
            .query(&query.to_params())
            .send()
            .await
            .map_err(|e| {
                warn!(content_type = %query.content_type, error = %e, "delivery.fetch_failed");
                FetchError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                content_type = %query.content_type,
                status = status.as_u16(),
                "delivery.fetch_rejected"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        info!(
            content_type = %query.content_type,
            include = query.include_depth(),
            status = status.as_u16(),
            elapsed_micros = start.elapsed().as_micros() as u64,
            "delivery.fetch"
        );
        Ok(body)
    }
}
