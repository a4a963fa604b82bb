//! Score bundles and their flattened form.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::trace;

use crate::schema::{flat_label, model_key, SCORED_TEXT_KEY};

/// Flattened `<model>_<label>` → score map returned by extraction.
pub type LabelMap = BTreeMap<String, f64>;

/// Scores for one content item: model → label → score.
///
/// `scored_text` holds the raw-text echo from a remote service when the
/// configuration retains it. It is stored alongside the models under
/// `to_score` and is ignored by flattening.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBundle {
    pub models: BTreeMap<String, BTreeMap<String, f64>>,
    pub scored_text: Option<String>,
}

impl ScoreBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one model's scores under its normalized key.
    pub fn insert_model(&mut self, model: &str, scores: BTreeMap<String, f64>) {
        self.models.insert(model_key(model), scores);
    }

    /// Build a bundle from a decoded scoring response.
    ///
    /// Model names are normalized, non-numeric label values are dropped, and
    /// the `to_score` echo is kept only when `retain_scored_text` is set.
    pub fn from_response(response: Map<String, Value>, retain_scored_text: bool) -> Self {
        let mut bundle = Self::new();
        for (model, labels) in response {
            if model == SCORED_TEXT_KEY {
                if retain_scored_text {
                    bundle.scored_text = labels.as_str().map(str::to_string);
                }
                continue;
            }
            match labels {
                Value::Object(labels) => {
                    let scores = labels
                        .into_iter()
                        .filter_map(|(label, value)| match coerce_score(&value) {
                            Some(score) => Some((label, score)),
                            None => {
                                trace!("Dropping non-numeric score {}.{}: {}", model, label, value);
                                None
                            }
                        })
                        .collect();
                    bundle.insert_model(&model, scores);
                }
                other => trace!("Ignoring non-mapping model entry {}: {}", model, other),
            }
        }
        bundle
    }

    /// Storage form written under an annotation key.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (model, labels) in &self.models {
            let labels: Map<String, Value> = labels
                .iter()
                .map(|(label, score)| (label.clone(), Value::from(*score)))
                .collect();
            map.insert(model.clone(), Value::Object(labels));
        }
        if let Some(text) = &self.scored_text {
            map.insert(SCORED_TEXT_KEY.to_string(), Value::String(text.clone()));
        }
        Value::Object(map)
    }
}

/// Flatten a stored bundle as found inside a record.
///
/// Every model mapping contributes its labels. Entries that are not mappings
/// (such as a retained `to_score` string) and non-numeric values are skipped.
pub fn flatten_stored(bundle: &Value) -> LabelMap {
    let mut flat = LabelMap::new();
    let Some(models) = bundle.as_object() else {
        return flat;
    };
    for (model, labels) in models {
        let Some(labels) = labels.as_object() else {
            continue;
        };
        for (label, value) in labels {
            match coerce_score(value) {
                Some(score) => {
                    flat.insert(flat_label(model, label), score);
                }
                None => trace!("Skipping non-numeric score {}.{}", model, label),
            }
        }
    }
    flat
}

/// Coerce a score value to `f64`. Accepts numbers, numeric strings and booleans.
/// Non-finite values are rejected: they cannot be stored as JSON numbers.
pub fn coerce_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    score.filter(|s| s.is_finite())
}
