//! REST client for the external market-data service

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::messages::{FeedEnvelope, OiTopResponse, SnapshotResponse};
use crate::common::errors::{ClientError, Result};
use crate::common::traits::{MarketDataProvider, OpenInterestRankingSource};
use crate::common::types::{InstrumentSnapshot, OiRanking};
use crate::config::types::FeedConfig;

/// REST client for the market-data service
#[derive(Debug, Clone)]
pub struct FeedRestClient {
    /// HTTP client
    client: Client,
    /// Service root, always ending in `/`
    base_url: Url,
}

impl FeedRestClient {
    /// Create a new client with the default timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a new client with custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Internal(e.to_string()))?;

        let mut root = base_url.trim_end_matches('/').to_string();
        root.push('/');

        Ok(Self {
            client,
            base_url: Url::parse(&root)?,
        })
    }

    /// Build a client from the feed section of the config.
    ///
    /// `None` when no base URL is configured.
    pub fn from_config(config: &FeedConfig) -> Result<Option<Self>> {
        match &config.base_url {
            Some(url) => Self::with_timeout(url, Duration::from_secs(config.request_timeout_seconds))
                .map(Some),
            None => Ok(None),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the current snapshot for a symbol
    #[instrument(skip(self))]
    pub async fn get_snapshot(&self, symbol: &str) -> Result<InstrumentSnapshot> {
        let url = self.base_url.join(&format!("market/{}", symbol))?;
        let response: SnapshotResponse = self.get_json(url, Some(symbol)).await?;
        Self::unwrap_envelope(response)
    }

    /// Get the open-interest growth leaderboard
    #[instrument(skip(self))]
    pub async fn get_oi_top(&self) -> Result<Vec<OiRanking>> {
        let url = self.base_url.join("oi/top")?;
        let response: OiTopResponse = self.get_json(url, None).await?;
        let data = Self::unwrap_envelope(response)?;
        Ok(data.positions.into_iter().map(OiRanking::from).collect())
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    async fn get_json<T: DeserializeOwned>(&self, url: Url, symbol: Option<&str>) -> Result<T> {
        debug!("Fetching from: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(e.to_string())
            } else {
                ClientError::HttpRequest(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                if let Some(symbol) = symbol {
                    return Err(ClientError::SymbolNotFound(symbol.to_string()));
                }
            }
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    fn unwrap_envelope<T>(envelope: FeedEnvelope<T>) -> Result<T> {
        if !envelope.success {
            return Err(ClientError::InvalidResponse(
                envelope
                    .error
                    .unwrap_or_else(|| "request unsuccessful".to_string()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse("response has no data".to_string()))
    }
}

#[async_trait]
impl MarketDataProvider for FeedRestClient {
    async fn fetch_snapshot(&self, symbol: &str) -> Result<InstrumentSnapshot> {
        self.get_snapshot(symbol).await
    }
}

#[async_trait]
impl OpenInterestRankingSource for FeedRestClient {
    async fn fetch_rankings(&self) -> Result<Vec<OiRanking>> {
        self.get_oi_top().await
    }
}
