//! Tagged view over record values.
//!
//! Records are `serde_json::Value` trees. Extraction dispatches on
//! `PropertyValue` so traversal only ever branches on these three shapes.

use serde_json::{Map, Value};

/// A record node classified by container shape.
#[derive(Debug, Clone, Copy)]
pub enum PropertyValue<'a> {
    Mapping(&'a Map<String, Value>),
    Sequence(&'a [Value]),
    Scalar(&'a Value),
}

impl<'a> PropertyValue<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => PropertyValue::Mapping(map),
            Value::Array(items) => PropertyValue::Sequence(items),
            scalar => PropertyValue::Scalar(scalar),
        }
    }

    pub fn as_mapping(&self) -> Option<&'a Map<String, Value>> {
        match *self {
            PropertyValue::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

impl<'a> From<&'a Value> for PropertyValue<'a> {
    fn from(value: &'a Value) -> Self {
        Self::classify(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify() {
        assert!(matches!(
            PropertyValue::classify(&json!({"a": 1})),
            PropertyValue::Mapping(m) if m.len() == 1
        ));
        assert!(matches!(
            PropertyValue::classify(&json!([1, 2, 3])),
            PropertyValue::Sequence(items) if items.len() == 3
        ));
        for scalar in [json!("s"), json!(1.5), json!(false), Value::Null] {
            assert!(matches!(
                PropertyValue::classify(&scalar),
                PropertyValue::Scalar(_)
            ));
        }
    }

    #[test]
    fn test_mapping_preserves_definition_order() {
        let value: Value = serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let keys: Vec<&str> = PropertyValue::from(&value)
            .as_mapping()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }
}
