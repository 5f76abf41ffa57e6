//! Schema inference and widget suggestion engine for arbitrary JSON API
//! responses.
//!
//! Given a pile of sample JSON responses from an unknown endpoint, this
//! crate reasons from data shape alone and produces a structural report, a
//! field-level schema with confidence-scored types and constraints, a
//! primary-key assignment, foreign-key relationship candidates, a
//! pagination pattern, and a ranked list of widget recommendations.
//!
//! The crate is purely functional: every public call consumes its inputs,
//! performs synchronous analysis, and returns a value or a typed
//! [`error::SchemaDetectionError`]. No component holds long-lived mutable
//! state between calls.

pub mod config;
pub mod enum_analyzer;
pub mod error;
pub mod orchestrator;
pub mod pagination;
pub mod pattern_analyzer;
pub mod patterns;
pub mod primary_key;
pub mod relationship;
pub mod sample_extractor;
pub mod schema;
pub mod structure_analyzer;
pub mod type_analyzer;
pub mod validation_analyzer;
pub mod widget;

pub use config::EngineConfig;
pub use error::{ErrorCode, Result, SchemaDetectionError};
pub use orchestrator::{
    ExtendedDetectionResult, Orchestrator, SchemaComparison, SchemaDetectionOptions,
};
pub use schema::{
    CrudMetadata, FieldDescriptor, PaginationAnalysis, PaginationConfig, PaginationTag,
    Relationship, RelationshipKind, ResponseStructure, Schema, StructureTag, WidgetSuggestion,
};
pub use type_analyzer::FieldType;

use serde_json::Value;
use std::collections::HashMap;

/// Run full schema detection over `options.sample_data`. Convenience wrapper over [`Orchestrator::detect_schema`]
/// using default analyzer configuration.
pub fn detect_schema(options: &SchemaDetectionOptions) -> Result<ExtendedDetectionResult> {
    Orchestrator::default().detect_schema(options)
}

/// Merge new samples into an existing schema and re-detect.
pub fn merge_with_existing(
    existing: &Schema,
    new_samples: &[Value],
    options: SchemaDetectionOptions,
    preserve_manual_edits: bool,
) -> Result<ExtendedDetectionResult> {
    Orchestrator::default().merge_with_existing(existing, new_samples, options, preserve_manual_edits)
}

/// Detect the pagination pattern exposed by a response body.
pub fn detect_pagination(
    response: &Value,
    request_params: &[String],
    headers: &HashMap<String, String>,
) -> PaginationAnalysis {
    Orchestrator::default().detect_pagination(response, request_params, headers)
}

/// Populate a schema's relationships against a set of known schemas (spec
/// §6's `detectRelationships`).
pub fn detect_relationships(schema: Schema, all_schemas: &[Schema]) -> Schema {
    Orchestrator::default().detect_relationships(schema, all_schemas)
}

/// Rank widget suggestions for a schema.
pub fn get_widget_suggestions(schema: &Schema) -> Vec<WidgetSuggestion> {
    Orchestrator::default().get_widget_suggestions(schema)
}

/// Diff two schemas.
pub fn compare_schemas(old: &Schema, new: &Schema) -> SchemaComparison {
    Orchestrator::default().compare_schemas(old, new)
}

// The end-to-end S1-S6 scenarios from spec §8 live in `tests/integration.rs`,
// exercised against this module's public surface only.
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compare_schemas_detects_added_and_removed_fields() {
        let old_data = json!([{"id": 1, "name": "a"}]);
        let new_data = json!([{"id": 1, "email": "a@example.com"}]);
        let old_result = detect_schema(&SchemaDetectionOptions::new("ds", old_data)).unwrap();
        let new_result = detect_schema(&SchemaDetectionOptions::new("ds", new_data)).unwrap();

        let comparison = compare_schemas(&old_result.schema, &new_result.schema);
        assert_eq!(comparison.added, vec!["email".to_string()]);
        assert_eq!(comparison.removed, vec!["name".to_string()]);
        assert!(!comparison.compatible);
    }

    #[test]
    fn empty_data_produces_empty_data_error() {
        let options = SchemaDetectionOptions::new("ds", json!(null));
        let err = detect_schema(&options).unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptyData);
    }
}
