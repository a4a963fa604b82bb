//! Annotation configuration.
//!
//! One `DetoxifyConfig` is built up front and handed to both the
//! `Annotator` and the `AnnotationExtractor`. Values come from defaults,
//! a TOML file, or environment variables:
//!
//! - DETOXIFY_ENDPOINT: remote scoring service (unset means local inference)
//! - DETOXIFY_RETAIN_SCORED_TEXT: keep the `to_score` echo (true/false)
//! - DETOXIFY_FIELD_PRIORITIES: comma-separated field priority override
//! - DETOXIFY_NAMESPACE: annotation key namespace
//! - DETOXIFY_LOCAL_COMMAND: local inference command

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::{DEFAULT_FIELD_PRIORITIES, DEFAULT_NAMESPACE, DEFAULT_SKIP_FIELDS};

/// Configuration shared by annotation and extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetoxifyConfig {
    /// Remote scoring endpoint. `None` selects local multi-model inference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Keep the raw-text echo returned by the remote service in stored bundles.
    #[serde(default)]
    pub retain_scored_text: bool,
    /// Field names consulted in order when extracting without a target field.
    #[serde(default = "default_field_priorities")]
    pub field_priorities: Vec<String>,
    /// Field names that are never scored.
    #[serde(default = "default_skip_fields")]
    pub skip_fields: Vec<String>,
    /// Prefix of every annotation key.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Remote request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Command invoked once per model by the local inference path.
    #[serde(default = "default_local_command")]
    pub local_command: String,
    /// Arguments passed to `local_command` ahead of `--model <name>`.
    #[serde(default)]
    pub local_args: Vec<String>,
    /// Maximum record nesting the extractor will descend into.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_field_priorities() -> Vec<String> {
    DEFAULT_FIELD_PRIORITIES.iter().map(|s| s.to_string()).collect()
}

fn default_skip_fields() -> Vec<String> {
    DEFAULT_SKIP_FIELDS.iter().map(|s| s.to_string()).collect()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_local_command() -> String {
    "detoxify-predict".to_string()
}

fn default_max_depth() -> usize {
    256
}

impl Default for DetoxifyConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            retain_scored_text: false,
            field_priorities: default_field_priorities(),
            skip_fields: default_skip_fields(),
            namespace: default_namespace(),
            timeout_secs: default_timeout_secs(),
            local_command: default_local_command(),
            local_args: Vec::new(),
            max_depth: default_max_depth(),
        }
    }
}

impl DetoxifyConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Defaults overridden by any DETOXIFY_* environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup. Split out from `from_env` so
    /// callers (and tests) can supply their own source.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("DETOXIFY_ENDPOINT") {
            let endpoint = endpoint.trim();
            self.endpoint = (!endpoint.is_empty()).then(|| endpoint.to_string());
        }

        if let Some(val) = lookup("DETOXIFY_RETAIN_SCORED_TEXT") {
            self.retain_scored_text = parse_bool(&val).ok_or(ConfigError::InvalidValue {
                key: "DETOXIFY_RETAIN_SCORED_TEXT",
                value: val.clone(),
            })?;
        }

        if let Some(val) = lookup("DETOXIFY_FIELD_PRIORITIES") {
            let fields: Vec<String> = val
                .split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
            if fields.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "DETOXIFY_FIELD_PRIORITIES",
                    value: val,
                });
            }
            self.field_priorities = fields;
        }

        if let Some(val) = lookup("DETOXIFY_NAMESPACE") {
            self.namespace = val;
        }

        if let Some(val) = lookup("DETOXIFY_LOCAL_COMMAND") {
            self.local_command = val;
        }

        Ok(self)
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    pub fn with_field_priorities<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_priorities = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_retain_scored_text(mut self, retain: bool) -> Self {
        self.retain_scored_text = retain;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether a field is in the skip set.
    pub fn is_skipped(&self, field_name: &str) -> bool {
        self.skip_fields.iter().any(|f| f == field_name)
    }

    /// Annotation key for an optional field: `<namespace>` or `<namespace>_<field>`.
    pub fn annotation_key(&self, field_name: Option<&str>) -> String {
        match field_name {
            Some(field) => format!("{}_{}", self.namespace, field),
            None => self.namespace.clone(),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = DetoxifyConfig::default();
        assert!(config.endpoint.is_none());
        assert!(!config.retain_scored_text);
        assert_eq!(config.field_priorities[0], "text");
        assert_eq!(config.field_priorities.len(), 11);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.is_skipped("url"));
        assert!(!config.is_skipped("text"));
    }

    #[test]
    fn test_annotation_key() {
        let config = DetoxifyConfig::default();
        assert_eq!(config.annotation_key(None), "pdk_detoxify");
        assert_eq!(config.annotation_key(Some("caption")), "pdk_detoxify_caption");

        let config = config.with_namespace("annot_pdk");
        assert_eq!(config.annotation_key(Some("text")), "annot_pdk_text");
    }

    #[test]
    fn test_toml_partial() {
        let config = DetoxifyConfig::from_toml_str(
            r#"
            endpoint = "http://scorer:8000/"
            field_priorities = ["caption", "text"]
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://scorer:8000/"));
        assert_eq!(config.field_priorities, vec!["caption", "text"]);
        assert_eq!(config.namespace, "pdk_detoxify");
        assert_eq!(config.max_depth, 256);
        assert!(config.local_args.is_empty());
    }

    #[test]
    fn test_toml_invalid() {
        assert!(matches!(
            DetoxifyConfig::from_toml_str("timeout_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DETOXIFY_ENDPOINT", "http://localhost:9000"),
            ("DETOXIFY_RETAIN_SCORED_TEXT", "yes"),
            ("DETOXIFY_FIELD_PRIORITIES", "post, comment,,title"),
        ]
        .into_iter()
        .collect();

        let config = DetoxifyConfig::default()
            .with_env_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(config.retain_scored_text);
        assert_eq!(config.field_priorities, vec!["post", "comment", "title"]);
    }

    #[test]
    fn test_env_blank_endpoint_means_local() {
        let config = DetoxifyConfig::default()
            .with_endpoint("http://x")
            .with_env_overrides(|k| (k == "DETOXIFY_ENDPOINT").then(|| "  ".to_string()))
            .unwrap();
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_env_bad_bool() {
        let result = DetoxifyConfig::default().with_env_overrides(|k| {
            (k == "DETOXIFY_RETAIN_SCORED_TEXT").then(|| "maybe".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                key: "DETOXIFY_RETAIN_SCORED_TEXT",
                ..
            })
        ));
    }
}
