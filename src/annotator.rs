//! Annotator: scores content and stores the bundle under a namespaced key.

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::DetoxifyConfig;
use crate::error::ProviderError;
use crate::provider::{select_provider, ScoringProvider};

/// Scores content items and returns annotation mappings ready to merge into a record.
///
/// Skipped fields and blank content produce an empty mapping, so no
/// annotation key is ever written for them.
pub struct Annotator {
    config: DetoxifyConfig,
    provider: Box<dyn ScoringProvider>,
}

impl Annotator {
    /// Create an annotator with the provider implied by `config`.
    pub fn new(config: DetoxifyConfig) -> Result<Self, ProviderError> {
        let provider = select_provider(&config)?;
        Ok(Self { config, provider })
    }

    /// Create an annotator with an explicit provider.
    pub fn with_provider(config: DetoxifyConfig, provider: Box<dyn ScoringProvider>) -> Self {
        Self { config, provider }
    }

    pub fn provider_id(&self) -> &str {
        self.provider.provider_id()
    }

    /// Score `content` and return `{annotation_key: bundle}`.
    ///
    /// Returns an empty mapping when `field_name` is in the skip set or the
    /// trimmed content is empty. A degraded provider response still emits the
    /// key with an empty bundle.
    pub async fn annotate(
        &self,
        content: Option<&str>,
        field_name: Option<&str>,
    ) -> Result<Map<String, Value>, ProviderError> {
        let mut annotations = Map::new();

        if field_name.is_some_and(|f| self.config.is_skipped(f)) {
            return Ok(annotations);
        }

        let content = content.unwrap_or_default().trim();
        if content.is_empty() {
            return Ok(annotations);
        }

        let bundle = self.provider.score(content).await?;
        let key = self.config.annotation_key(field_name);
        debug!(
            "Annotated {} with {} models via {}",
            key,
            bundle.models.len(),
            self.provider.provider_id()
        );

        annotations.insert(key, bundle.to_value());
        Ok(annotations)
    }

    /// Score every top-level string property and return the merged annotations.
    ///
    /// Non-string values, skipped fields, and existing annotation keys are
    /// left alone.
    pub async fn annotate_properties(
        &self,
        properties: &Map<String, Value>,
    ) -> Result<Map<String, Value>, ProviderError> {
        let mut merged = Map::new();
        for (field, value) in properties {
            if self.is_annotation_key(field) {
                continue;
            }
            if let Value::String(content) = value {
                merged.extend(self.annotate(Some(content), Some(field)).await?);
            }
        }
        Ok(merged)
    }

    /// Annotate the string stored under `field` and merge the result back into
    /// `record`. Returns whether an annotation key was written.
    pub async fn annotate_into(
        &self,
        record: &mut Map<String, Value>,
        field: &str,
    ) -> Result<bool, ProviderError> {
        let content = record.get(field).and_then(Value::as_str).map(str::to_string);
        let annotations = self.annotate(content.as_deref(), Some(field)).await?;
        let written = !annotations.is_empty();
        record.extend(annotations);
        Ok(written)
    }

    fn is_annotation_key(&self, key: &str) -> bool {
        key == self.config.namespace
            || key
                .strip_prefix(&self.config.namespace)
                .is_some_and(|rest| rest.starts_with('_'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::ScoreBundle;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ScoringProvider for CountingProvider {
        fn provider_id(&self) -> &str {
            "counting"
        }

        async fn score(&self, content: &str) -> Result<ScoreBundle, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut bundle = ScoreBundle::new();
            bundle.insert_model(
                "unbiased",
                [("toxicity".to_string(), content.len() as f64 / 100.0)]
                    .into_iter()
                    .collect(),
            );
            Ok(bundle)
        }
    }

    fn annotator() -> (Annotator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let annotator = Annotator::with_provider(
            DetoxifyConfig::default(),
            Box::new(CountingProvider {
                calls: calls.clone(),
            }),
        );
        (annotator, calls)
    }

    #[tokio::test]
    async fn test_blank_content_not_scored() {
        let (annotator, calls) = annotator();
        for content in [None, Some(""), Some("   "), Some("\n\t ")] {
            let out = annotator.annotate(content, Some("text")).await.unwrap();
            assert!(out.is_empty());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_skip_field() {
        let (annotator, calls) = annotator();
        let out = annotator
            .annotate(Some("http://example.com/nasty"), Some("url"))
            .await
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_key_construction() {
        let (annotator, _) = annotator();

        let out = annotator.annotate(Some("  hello  "), None).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out["pdk_detoxify"], json!({"unbiased": {"toxicity": 0.05}}));

        let out = annotator.annotate(Some("hello"), Some("caption")).await.unwrap();
        assert!(out.contains_key("pdk_detoxify_caption"));
    }

    #[tokio::test]
    async fn test_annotate_properties() {
        let (annotator, calls) = annotator();
        let properties = json!({
            "text": "some words",
            "url": "http://example.com",
            "count": 3,
            "title": "  ",
            "pdk_detoxify_text": {"unbiased": {"toxicity": 0.0}},
        });

        let out = annotator
            .annotate_properties(properties.as_object().unwrap())
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["pdk_detoxify_text"]);
    }

    #[tokio::test]
    async fn test_annotate_into() {
        let (annotator, _) = annotator();
        let mut record = json!({"caption": "a caption"}).as_object().cloned().unwrap();

        assert!(annotator.annotate_into(&mut record, "caption").await.unwrap());
        assert!(record.contains_key("pdk_detoxify_caption"));
        assert!(!annotator.annotate_into(&mut record, "missing").await.unwrap());
    }
}
