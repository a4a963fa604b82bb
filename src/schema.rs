//! Fixed model and label schema for detoxify scores.

/// Models evaluated by the local inference path, in evaluation order.
pub const DETOXIFY_MODELS: [&str; 3] = ["original", "unbiased", "multilingual"];

/// Every label a model may emit.
pub const DETOXIFY_LABELS: [&str; 7] = [
    "severe_toxicity",
    "sexual_explicit",
    "obscene",
    "insult",
    "threat",
    "identity_attack",
    "toxicity",
];

/// Default field priority order used when extracting without a target field.
pub const DEFAULT_FIELD_PRIORITIES: [&str; 11] = [
    "text",
    "caption",
    "fullText",
    "full_text",
    "post",
    "comment",
    "description",
    "title",
    "name",
    "place",
    "location",
];

/// Fields that are never worth scoring.
pub const DEFAULT_SKIP_FIELDS: [&str; 1] = ["url"];

/// Default annotation key namespace.
pub const DEFAULT_NAMESPACE: &str = "pdk_detoxify";

/// Key of the raw-text echo some scoring services include in their response.
pub const SCORED_TEXT_KEY: &str = "to_score";

/// Labels produced by a given model. The `original` model has no
/// `sexual_explicit` head.
pub fn model_labels(model: &str) -> impl Iterator<Item = &'static str> + '_ {
    DETOXIFY_LABELS
        .into_iter()
        .filter(move |label| !(model == "original" && *label == "sexual_explicit"))
}

/// Flattened `<model>_<label>` names for every score an annotation can carry.
///
/// Consumers use this to know the full output shape before any record has
/// been extracted.
pub fn fetch_annotation_fields() -> Vec<String> {
    ["unbiased", "multilingual", "original"]
        .into_iter()
        .flat_map(|model| model_labels(model).map(move |label| flat_label(model, label)))
        .collect()
}

/// Build the flattened key for a model/label pair.
pub fn flat_label(model: &str, label: &str) -> String {
    format!("{}_{}", model, label).to_lowercase()
}

/// Normalize a provider-supplied model name into its storage form.
///
/// Lowercases, drops anything that is not an ASCII alphanumeric, `_`, `-` or
/// whitespace, collapses runs of `-` and whitespace into one separator, trims
/// separators and underscores from both ends, then writes separators as `_`.
/// Existing underscores are kept as-is.
pub fn model_key(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c == '-' || c.is_whitespace() {
            pending_sep = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_sep {
                slug.push('-');
                pending_sep = false;
            }
            slug.push(c);
        }
    }
    slug.trim_matches(|c: char| c == '-' || c == '_').replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_fields_shape() {
        let fields = fetch_annotation_fields();
        assert_eq!(fields.len(), 20);
        assert_eq!(fields[0], "unbiased_severe_toxicity");
        assert!(fields.contains(&"multilingual_sexual_explicit".to_string()));
        assert!(!fields.contains(&"original_sexual_explicit".to_string()));
        assert_eq!(fields.last().map(String::as_str), Some("original_toxicity"));
    }

    #[test]
    fn test_model_key() {
        assert_eq!(model_key("unbiased"), "unbiased");
        assert_eq!(model_key("Multi-Lingual"), "multi_lingual");
        assert_eq!(model_key("  original  v2 "), "original_v2");
        assert_eq!(model_key("--x--"), "x");
        assert_eq!(model_key("_-x"), "x");
    }

    #[test]
    fn test_model_key_drops_punctuation_and_keeps_underscores() {
        assert_eq!(model_key("a.b"), "ab");
        assert_eq!(model_key("a__b"), "a__b");
        assert_eq!(model_key("v1.2 - beta"), "v12_beta");
    }

    #[test]
    fn test_flat_label_lowercases() {
        assert_eq!(flat_label("Unbiased", "Toxicity"), "unbiased_toxicity");
    }
}
