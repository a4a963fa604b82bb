//! Remote scoring service client.
//!
//! Posts the content as the form field `s` and expects a JSON object of
//! model → label → score back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::ScoringProvider;
use crate::error::ProviderError;
use crate::scores::ScoreBundle;

/// Scores content through an HTTP scoring service.
pub struct RemoteProvider {
    endpoint: String,
    retain_scored_text: bool,
    client: Client,
}

impl RemoteProvider {
    pub fn new(
        endpoint: &str,
        timeout: Duration,
        retain_scored_text: bool,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            retain_scored_text,
            client,
        })
    }
}

#[async_trait]
impl ScoringProvider for RemoteProvider {
    fn provider_id(&self) -> &str {
        "remote"
    }

    async fn score(&self, content: &str) -> Result<ScoreBundle, ProviderError> {
        debug!("Scoring {} chars via {}", content.len(), self.endpoint);

        let resp = self
            .client
            .post(&self.endpoint)
            .form(&[("s", content)])
            .send()
            .await?;

        // Anything below 400 (including an unfollowed 3xx) carries a body worth decoding.
        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            let body = resp.text().await.unwrap_or_default();
            warn!("Remote scoring error: HTTP {}: {}", status, body);
            return Ok(ScoreBundle::new());
        }

        let body = resp.text().await?;
        let scores: Map<String, Value> =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(ScoreBundle::from_response(scores, self.retain_scored_text))
    }
}
