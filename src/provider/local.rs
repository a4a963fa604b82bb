//! Local multi-model inference.
//!
//! Each model in `DETOXIFY_MODELS` is evaluated separately. The default
//! runner shells out to an inference command:
//!
//! ```bash
//! echo "some text" | detoxify-predict --model unbiased
//! {"toxicity": 0.0012, "insult": 0.0004, ...}
//! ```

use std::collections::BTreeMap;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::ScoringProvider;
use crate::error::ProviderError;
use crate::schema::DETOXIFY_MODELS;
use crate::scores::{coerce_score, ScoreBundle};

/// Runs a single model over a piece of content.
#[async_trait]
pub trait ModelRunner: Send + Sync {
    /// Raw label → score output for `model`. Values are coerced by the caller.
    async fn predict(&self, model: &str, content: &str)
        -> Result<Map<String, Value>, ProviderError>;
}

/// `ModelRunner` backed by an external command.
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
}

impl CommandRunner {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    /// Arguments placed before `--model <name>` (e.g. a script path for an interpreter).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
impl ModelRunner for CommandRunner {
    async fn predict(
        &self,
        model: &str,
        content: &str,
    ) -> Result<Map<String, Value>, ProviderError> {
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .args(["--model", model])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::BackendNotAvailable(format!(
                    "{} not found (set DETOXIFY_ENDPOINT or install a local inference command)",
                    self.program
                )));
            }
            Err(e) => return Err(ProviderError::Io(e)),
        };

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(content.as_bytes()).await {
                Ok(()) => {}
                // The command exited without reading its input; its exit status says why.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!("{} closed stdin before reading all content", self.program);
                }
                Err(e) => return Err(ProviderError::Io(e)),
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(ProviderError::Inference {
                model: model.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| ProviderError::Inference {
            model: model.to_string(),
            reason: format!("unparseable output: {}", e),
        })
    }
}

/// Scores content by running every model locally.
pub struct LocalProvider<R = CommandRunner> {
    runner: R,
}

impl<R: ModelRunner> LocalProvider<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl<R: ModelRunner> ScoringProvider for LocalProvider<R> {
    fn provider_id(&self) -> &str {
        "local"
    }

    async fn score(&self, content: &str) -> Result<ScoreBundle, ProviderError> {
        let mut bundle = ScoreBundle::new();

        for model in DETOXIFY_MODELS {
            let raw = self.runner.predict(model, content).await?;
            let mut scores = BTreeMap::new();
            for (label, value) in raw {
                let score = coerce_score(&value).ok_or_else(|| ProviderError::Inference {
                    model: model.to_string(),
                    reason: format!("non-numeric score for {}: {}", label, value),
                })?;
                scores.insert(label, score);
            }
            debug!("Model {} produced {} labels", model, scores.len());
            bundle.insert_model(model, scores);
        }

        info!("Scored locally with {} models", bundle.models.len());
        Ok(bundle)
    }
}
