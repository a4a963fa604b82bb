//! Annotation extraction.
//!
//! Finds a stored score bundle anywhere inside a nested record and flattens
//! it. Without a target field, candidate fields are tried in priority order;
//! a field earlier in the list always wins over a later one, however deep the
//! earlier one is buried. For a single field a top-level key beats any nested
//! key, and nested keys are found depth-first in mapping-definition order,
//! then sequence order.

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::DetoxifyConfig;
use crate::error::ExtractError;
use crate::record::PropertyValue;
use crate::scores::{flatten_stored, LabelMap};

/// Locates and flattens annotations written by the `Annotator`.
#[derive(Debug, Clone)]
pub struct AnnotationExtractor {
    namespace: String,
    field_priorities: Vec<String>,
    max_depth: usize,
}

impl AnnotationExtractor {
    pub fn new(config: &DetoxifyConfig) -> Self {
        Self {
            namespace: config.namespace.clone(),
            field_priorities: config.field_priorities.clone(),
            max_depth: config.max_depth,
        }
    }

    /// Fetch the flattened scores for `initial_field`, or for the
    /// highest-priority field present when `initial_field` is `None`.
    ///
    /// Returns `Ok(None)` when the record is not a mapping or no annotation is
    /// reachable. A found but empty bundle returns `Ok(Some(empty))`.
    pub fn fetch_annotations(
        &self,
        record: &Value,
        initial_field: Option<&str>,
    ) -> Result<Option<LabelMap>, ExtractError> {
        let Some(properties) = PropertyValue::classify(record).as_mapping() else {
            return Ok(None);
        };

        match initial_field {
            Some(field) => self.search_field(properties, field, 0),
            None => {
                for field in &self.field_priorities {
                    if let Some(bundle) = properties.get(&self.key_for(field)) {
                        return Ok(Some(flatten_stored(bundle)));
                    }
                    if let Some(found) = self.search_field(properties, field, 0)? {
                        debug!("Found nested annotation for field {}", field);
                        return Ok(Some(found));
                    }
                }
                Ok(None)
            }
        }
    }

    fn key_for(&self, field: &str) -> String {
        format!("{}_{}", self.namespace, field)
    }

    fn search_field(
        &self,
        properties: &Map<String, Value>,
        field: &str,
        depth: usize,
    ) -> Result<Option<LabelMap>, ExtractError> {
        if depth > self.max_depth {
            return Err(ExtractError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }

        if let Some(bundle) = properties.get(&self.key_for(field)) {
            return Ok(Some(flatten_stored(bundle)));
        }

        for value in properties.values() {
            if let Some(found) = self.search_value(value, field, depth + 1)? {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    fn search_value(
        &self,
        value: &Value,
        field: &str,
        depth: usize,
    ) -> Result<Option<LabelMap>, ExtractError> {
        match PropertyValue::classify(value) {
            PropertyValue::Mapping(map) => self.search_field(map, field, depth),
            PropertyValue::Sequence(items) => {
                for item in items {
                    // Only mapping elements can hold annotations. Elements sit at the
                    // same level as their sequence.
                    if let PropertyValue::Mapping(map) = PropertyValue::classify(item) {
                        if let Some(found) = self.search_field(map, field, depth)? {
                            return Ok(Some(found));
                        }
                    }
                }
                Ok(None)
            }
            PropertyValue::Scalar(_) => Ok(None),
        }
    }
}
