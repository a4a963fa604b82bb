//! Toxicity score annotation for structured records.
//!
//! The `Annotator` scores text fields and returns annotation mappings keyed
//! `<namespace>_<field>`; the `AnnotationExtractor` later finds those keys
//! anywhere inside a nested record and flattens them into
//! `<model>_<label>` → score maps.

pub mod annotator;
pub mod config;
pub mod error;
pub mod extract;
pub mod provider;
pub mod record;
pub mod schema;
pub mod scores;

pub use annotator::Annotator;
pub use config::DetoxifyConfig;
pub use error::{ConfigError, ExtractError, ProviderError};
pub use extract::AnnotationExtractor;
pub use provider::{
    select_provider, CommandRunner, LocalProvider, ModelRunner, RemoteProvider, ScoringProvider,
};
pub use record::PropertyValue;
pub use schema::fetch_annotation_fields;
pub use scores::{LabelMap, ScoreBundle};
