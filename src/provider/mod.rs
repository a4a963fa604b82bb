//! Scoring providers.
//!
//! A `ScoringProvider` turns one piece of content into a `ScoreBundle`.
//! The provider is chosen once from configuration: a configured endpoint
//! selects `RemoteProvider`, otherwise `LocalProvider` runs every model
//! through a local inference command.

mod local;
mod remote;

use async_trait::async_trait;

use crate::config::DetoxifyConfig;
use crate::error::ProviderError;
use crate::scores::ScoreBundle;

pub use local::{CommandRunner, LocalProvider, ModelRunner};
pub use remote::RemoteProvider;

/// Backend that computes scores for a content string.
#[async_trait]
pub trait ScoringProvider: Send + Sync {
    /// Short identifier for logs (e.g. "remote", "local").
    fn provider_id(&self) -> &str;

    /// Score already-normalized, non-empty content.
    ///
    /// A degraded service response yields `Ok` with an empty bundle; only
    /// faults the caller must handle are returned as `Err`.
    async fn score(&self, content: &str) -> Result<ScoreBundle, ProviderError>;
}

/// Pick the provider implied by `config`.
pub fn select_provider(config: &DetoxifyConfig) -> Result<Box<dyn ScoringProvider>, ProviderError> {
    match config.endpoint.as_deref() {
        Some(endpoint) => Ok(Box::new(RemoteProvider::new(
            endpoint,
            config.timeout(),
            config.retain_scored_text,
        )?)),
        None => Ok(Box::new(LocalProvider::new(
            CommandRunner::new(&config.local_command).with_args(config.local_args.clone()),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_provider() {
        let local = select_provider(&DetoxifyConfig::default()).unwrap();
        assert_eq!(local.provider_id(), "local");

        let remote =
            select_provider(&DetoxifyConfig::default().with_endpoint("http://127.0.0.1:9"))
                .unwrap();
        assert_eq!(remote.provider_id(), "remote");
    }
}
