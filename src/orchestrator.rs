//! Top-level entry points that wire the analyzers together: `detect_schema`, `merge_with_existing`, `compare_schemas`, plus the
//! thin wrappers the public API exposes directly (`detect_pagination`,
//! `detect_relationships`, `get_widget_suggestions`).
//!
//! Grounded on the teacher's `Validator::new` + batch-orchestration style
//! in `validator.rs`: a single owner holds analyzer configuration and
//! drives each step in sequence, logging via `tracing` the way the
//! teacher's `console_warn!`/`console_error!` macros surface diagnostics
//! to its host.

use crate::config::EngineConfig;
use crate::error::{Result, SchemaDetectionError};
use crate::pagination::{self, PaginationAnalysis as RawPaginationAnalysis};
use crate::patterns;
use crate::primary_key::{self, PrimaryKeyCandidate};
use crate::relationship::{self, FieldView, SchemaView};
use crate::sample_extractor;
use crate::schema::{
    CrudMetadata, FieldDescriptor, PaginationAnalysis, Relationship, ResponseStructure, Schema,
    WidgetSuggestion,
};
use crate::structure_analyzer;
use crate::type_analyzer::{self, FieldStatistics, FieldType};
use crate::widget::{self, WidgetField};
use crate::{enum_analyzer, validation_analyzer};

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a `{prefix}_{timestamp}_{random9}` id, stable within a run but
/// not cryptographically random.
fn generate_id(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed);

    // A tiny splitmix-style mix; this is an id generator, not a PRNG API —
    // the spec explicitly only requires run-local stability, not
    // cryptographic strength.
    let mut x = (timestamp as u64) ^ counter.wrapping_mul(0x9E3779B97F4A7C15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^= x >> 31;

    let suffix = format!("{:09}", x % 1_000_000_000);
    format!("{prefix}_{timestamp}_{suffix}")
}

fn now_iso8601() -> String {
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    let datetime = chrono::DateTime::<chrono::Utc>::from(UNIX_EPOCH + duration);
    datetime.to_rfc3339()
}

/// Input options for `detect_schema`.
#[derive(Debug, Clone)]
pub struct SchemaDetectionOptions {
    pub data_source_id: String,
    pub endpoint_id: Option<String>,
    pub sample_data: Value,
    pub max_sample_size: usize,
    pub detect_pagination: bool,
    pub detect_relationships: bool,
    pub existing_schemas: Vec<Schema>,
    pub request_params: Vec<String>,
    pub response_headers: HashMap<String, String>,
}

impl SchemaDetectionOptions {
    pub fn new(data_source_id: impl Into<String>, sample_data: Value) -> Self {
        SchemaDetectionOptions {
            data_source_id: data_source_id.into(),
            endpoint_id: None,
            sample_data,
            max_sample_size: EngineConfig::default().max_samples,
            detect_pagination: true,
            detect_relationships: false,
            existing_schemas: vec![],
            request_params: vec![],
            response_headers: HashMap::new(),
        }
    }
}

/// Full detection result.
#[derive(Debug, Clone)]
pub struct ExtendedDetectionResult {
    pub schema: Schema,
    pub response_structure: ResponseStructure,
    pub pagination: Option<PaginationAnalysis>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub processing_time_ms: u128,
}

pub struct Orchestrator {
    config: EngineConfig,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Orchestrator { config: EngineConfig::default() }
    }
}

impl Orchestrator {
    pub fn new(config: EngineConfig) -> Self {
        Orchestrator { config }
    }

    /// Run full schema detection over `options.sample_data`.
    pub fn detect_schema(&self, options: &SchemaDetectionOptions) -> Result<ExtendedDetectionResult> {
        let started = SystemTime::now();
        let _span = tracing::debug_span!("detect_schema", data_source_id = %options.data_source_id).entered();

        if options.sample_data.is_null() {
            return Err(SchemaDetectionError::empty_data("sample data was null"));
        }

        let extracted = sample_extractor::extract(&options.sample_data, options.max_sample_size);
        if extracted.samples.is_empty() {
            return Err(SchemaDetectionError::empty_data("no samples could be extracted from input"));
        }

        let response_structure = structure_analyzer::analyze(
            &options.sample_data,
            extracted.data_path.as_deref(),
            extracted.is_wrapped,
            extracted.samples.len(),
            &self.config,
        );

        let mut warnings = Vec::new();
        let mut suggestions = Vec::new();

        if extracted.samples.len() < self.config.low_sample_warning_threshold {
            let message = format!(
                "Only {} sample(s) available. Detection confidence may be low.",
                extracted.samples.len()
            );
            warn!(samples = extracted.samples.len(), "low sample count");
            warnings.push(message);
            suggestions.push("Fetch more data samples for improved accuracy.".to_string());
        }

        let field_names = sample_extractor::extract_field_names(&extracted.samples);
        let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(field_names.len());
        let mut numeric_by_field: HashMap<String, Vec<f64>> = HashMap::new();

        for name in &field_names {
            let values = sample_extractor::extract_field_values(&extracted.samples, name);

            let mut stats = FieldStatistics::default();
            for value in &values {
                stats.record(*value);
            }

            let aggregation = type_analyzer::aggregate(&stats);
            let mut field_type = aggregation.field_type;
            let mut confidence =
                patterns::adjust_for_sample_size(aggregation.confidence, extracted.samples.len(), self.config.sample_size_damping_k);

            let constraints = validation_analyzer::infer_constraints(name, &stats, &self.config);
            suggestions.extend(constraints.suggestions.clone());

            let mut enum_values = None;
            if field_type == FieldType::String {
                let string_values: Vec<&str> = values
                    .iter()
                    .filter_map(|v| v.and_then(|value| value.as_str()))
                    .collect();
                let enum_detection = enum_analyzer::detect_enum(&string_values, &self.config);
                if enum_detection.is_enum {
                    field_type = FieldType::Enum;
                    confidence = enum_detection.confidence;
                    enum_values = Some(enum_detection.enum_values);
                }
            }

            let array_item_type = if field_type == FieldType::Array {
                let array_values: Vec<&Value> = values.iter().filter_map(|v| *v).collect();
                Some(type_analyzer::array_item_type(&array_values))
            } else {
                None
            };

            let (is_likely_id, _) = type_analyzer::is_likely_id_field(name, field_type, &stats);
            let is_foreign_key = !is_likely_id && patterns::matches_foreign_key_name(name);

            numeric_by_field.insert(name.clone(), stats.numeric_values.clone());

            fields.push(FieldDescriptor {
                name: name.clone(),
                field_type,
                confidence,
                is_required: constraints.is_required,
                is_nullable: constraints.is_nullable,
                is_unique: constraints.is_unique,
                is_primary_key: false,
                is_foreign_key,
                enum_values,
                array_item_type,
                min_length: constraints.min_length,
                max_length: constraints.max_length,
                min: constraints.min,
                max: constraints.max,
                pattern: constraints.pattern.map(str::to_string),
                sample_values: stats.sample_values.clone(),
                inferred_from_count: stats.non_null_count(),
                display_name: None,
                description: None,
                display_format: None,
            });
        }

        // Primary-Key Detector.
        let candidates: Vec<PrimaryKeyCandidate> = fields
            .iter()
            .map(|f| {
                let looks_sequential = f.field_type == FieldType::Integer
                    && numeric_by_field
                        .get(&f.name)
                        .map(|values| primary_key::looks_sequential(values))
                        .unwrap_or(false);
                PrimaryKeyCandidate {
                    name: f.name.clone(),
                    field_type: f.field_type,
                    is_unique: f.is_unique,
                    is_nullable: f.is_nullable,
                    looks_sequential,
                }
            })
            .collect();
        if let Some((winner_name, _)) = primary_key::detect_primary_key(&candidates, &self.config) {
            if let Some(field) = fields.iter_mut().find(|f| f.name == winner_name) {
                field.is_primary_key = true;
                field.is_foreign_key = false;
            }
        }

        let schema_name = options
            .endpoint_id
            .clone()
            .unwrap_or_else(|| options.data_source_id.clone())
            .replace(['-', '_'], " ")
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        let timestamp = now_iso8601();
        let mut schema = Schema {
            id: generate_id("schema"),
            name: schema_name,
            description: None,
            data_source_id: options.data_source_id.clone(),
            endpoint_id: options.endpoint_id.clone(),
            fields,
            detected_at: timestamp.clone(),
            sample_size: extracted.samples.len(),
            auto_detected: true,
            relationships: vec![],
            crud: CrudMetadata::default(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        };

        let pagination = if options.detect_pagination {
            Some(self.detect_pagination(&options.sample_data, &options.request_params, &options.response_headers))
        } else {
            None
        };

        if options.detect_relationships && !options.existing_schemas.is_empty() {
            schema = self.detect_relationships(schema, &options.existing_schemas);
        }

        let widget_suggestions = self.get_widget_suggestions(&schema);
        debug!(widgets = widget_suggestions.len(), fields = schema.fields.len(), "schema detection complete");
        suggestions.extend(widget_suggestions.into_iter().map(|w| w.reason));

        let processing_time_ms = started.elapsed().map(|d| d.as_millis()).unwrap_or(0);

        Ok(ExtendedDetectionResult {
            schema,
            response_structure: response_structure.into(),
            pagination,
            warnings,
            suggestions,
            processing_time_ms,
        })
    }

    /// Detect pagination directly from a response body.
    pub fn detect_pagination(
        &self,
        body: &Value,
        request_params: &[String],
        headers: &HashMap<String, String>,
    ) -> PaginationAnalysis {
        let raw: RawPaginationAnalysis =
            pagination::detect_pagination(body, request_params, headers, &self.config);
        raw.into()
    }

    /// Populate `schema.relationships` against `existing_schemas` (spec
    /// §4.9, §6).
    pub fn detect_relationships(&self, mut schema: Schema, existing_schemas: &[Schema]) -> Schema {
        let source_fields: Vec<FieldView> = schema
            .fields
            .iter()
            .map(|f| FieldView {
                name: f.name.clone(),
                field_type: f.field_type,
                is_primary_key: f.is_primary_key,
                is_foreign_key: f.is_foreign_key,
                is_unique: f.is_unique,
            })
            .collect();

        let other_schemas: Vec<SchemaView> = existing_schemas
            .iter()
            .map(|s| SchemaView {
                id: s.id.clone(),
                name: s.name.clone(),
                fields: s
                    .fields
                    .iter()
                    .map(|f| FieldView {
                        name: f.name.clone(),
                        field_type: f.field_type,
                        is_primary_key: f.is_primary_key,
                        is_foreign_key: f.is_foreign_key,
                        is_unique: f.is_unique,
                    })
                    .collect(),
            })
            .collect();

        let detected = relationship::detect_relationships(
            &schema.id,
            &schema.name,
            &source_fields,
            &other_schemas,
            &self.config,
        );

        for rel in &detected {
            if let Some(field) = schema.fields.iter_mut().find(|f| f.name == rel.source_field) {
                field.is_foreign_key = true;
            }
        }

        schema.relationships =
            detected.into_iter().map(|d| Relationship::from_detected(&schema.id, d)).collect();
        schema
    }

    /// Rank widget suggestions for a schema.
    pub fn get_widget_suggestions(&self, schema: &Schema) -> Vec<WidgetSuggestion> {
        let widget_fields: Vec<WidgetField> = schema
            .fields
            .iter()
            .map(|f| WidgetField {
                name: f.name.clone(),
                field_type: f.field_type,
                enum_values: f.enum_values.clone().unwrap_or_default(),
            })
            .collect();

        widget::suggest_widgets(&widget_fields, &self.config).into_iter().map(WidgetSuggestion::from).collect()
    }

    /// Reconstruct a synthetic sample set from an existing schema's
    /// retained `sampleValues`, merge in new samples, and re-run detection
    ///.
    ///
    /// Synthetic samples are built by positionally zipping up to 10
    /// `sampleValues` per field into records — this can fabricate
    /// correlations across fields that never co-occurred, per the spec's
    /// own caveat. Prefer persisting raw samples alongside the schema when
    /// that lossiness matters.
    pub fn merge_with_existing(
        &self,
        existing: &Schema,
        new_samples: &[Value],
        mut options: SchemaDetectionOptions,
        preserve_manual_edits: bool,
    ) -> Result<ExtendedDetectionResult> {
        const MAX_SYNTHETIC: usize = 10;

        let mut synthetic = Vec::new();
        for i in 0..MAX_SYNTHETIC {
            let mut record = serde_json::Map::new();
            let mut any_present = false;
            for field in &existing.fields {
                if let Some(value) = field.sample_values.get(i) {
                    record.insert(field.name.clone(), value.clone());
                    any_present = true;
                }
            }
            if !any_present {
                break;
            }
            synthetic.push(Value::Object(record));
        }

        let merged_samples = sample_extractor::merge_samples(&synthetic, new_samples, options.max_sample_size);
        options.sample_data = Value::Array(merged_samples.clone());
        options.detect_relationships = true;

        let mut result = self.detect_schema(&options)?;

        result.schema.id = existing.id.clone();
        result.schema.created_at = existing.created_at.clone();
        result.schema.crud = existing.crud.clone();

        if preserve_manual_edits {
            for field in &mut result.schema.fields {
                if let Some(previous) = existing.field(&field.name) {
                    field.display_name = previous.display_name.clone();
                    field.description = previous.description.clone();
                    field.display_format = previous.display_format.clone();
                }
            }
        }

        result
            .suggestions
            .push(format!("Schema updated with {} total samples", merged_samples.len()));

        Ok(result)
    }

    /// Diff two schemas.
    pub fn compare_schemas(&self, old: &Schema, new: &Schema) -> SchemaComparison {
        let old_names: Vec<&str> = old.fields.iter().map(|f| f.name.as_str()).collect();
        let new_names: Vec<&str> = new.fields.iter().map(|f| f.name.as_str()).collect();

        let added: Vec<String> =
            new_names.iter().filter(|n| !old_names.contains(n)).map(|s| s.to_string()).collect();
        let removed: Vec<String> =
            old_names.iter().filter(|n| !new_names.contains(n)).map(|s| s.to_string()).collect();

        let mut changed_type = Vec::new();
        let mut unchanged = 0usize;
        for old_field in &old.fields {
            if let Some(new_field) = new.field(&old_field.name) {
                if old_field.field_type != new_field.field_type {
                    changed_type.push(old_field.name.clone());
                } else {
                    unchanged += 1;
                }
            }
        }

        let denom = old.fields.len().max(new.fields.len()).max(1);
        let similarity = unchanged as f64 / denom as f64;
        let compatible = removed.is_empty() && changed_type.is_empty();

        SchemaComparison { added, removed, changed_type, similarity, compatible }
    }
}

#[derive(Debug, Clone)]
pub struct SchemaComparison {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed_type: Vec<String>,
    pub similarity: f64,
    pub compatible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn s1_flat_object_list() {
        let orchestrator = Orchestrator::default();
        let data = json!([
            {"id": 1, "name": "A", "active": true, "price": 9.99},
            {"id": 2, "name": "B", "active": false, "price": 12.5},
            {"id": 3, "name": "C", "active": true, "price": 7.0},
        ]);
        let options = SchemaDetectionOptions::new("ds1", data);
        let result = orchestrator.detect_schema(&options).unwrap();

        assert!(result.response_structure.is_array);
        assert_eq!(result.response_structure.data_path, None);

        let id_field = result.schema.field("id").unwrap();
        assert_eq!(id_field.field_type, FieldType::Integer);
        assert!(id_field.is_primary_key);

        assert_eq!(result.schema.field("name").unwrap().field_type, FieldType::String);
        assert_eq!(result.schema.field("active").unwrap().field_type, FieldType::Boolean);
        assert_eq!(result.schema.field("price").unwrap().field_type, FieldType::Number);

        assert!(!result.pagination.unwrap().detected);
    }

    #[test]
    fn s4_uuid_primary_key() {
        let orchestrator = Orchestrator::default();
        // 25 samples: at/above the sample-size damping threshold (k=20) so
        // `adjustForSampleSize` leaves the type confidence undamped.
        let base_uuids = [
            "550e8400-e29b-41d4-a716-446655440000",
            "6fa459ea-ee8a-3ca4-894e-db77e160355e",
            "16fd2706-8baf-433b-82eb-8c7fada847da",
            "886313e1-3b8a-5372-9b90-0c9aee199e5d",
            "1b9d6bcd-bbfd-4b2d-9b5d-ab8dfbbd4bed",
        ];
        let records: Vec<Value> = (0..25)
            .map(|i| json!({"id": base_uuids[i % base_uuids.len()], "name": format!("item-{i}")}))
            .collect();
        let options = SchemaDetectionOptions::new("ds4", Value::Array(records));
        let result = orchestrator.detect_schema(&options).unwrap();
        let id_field = result.schema.field("id").unwrap();
        assert_eq!(id_field.field_type, FieldType::Uuid);
        assert!(id_field.is_primary_key);
        assert!(id_field.confidence >= 0.75);
    }

    #[test]
    fn s5_foreign_key_linkage() {
        let orchestrator = Orchestrator::default();

        let authors_data = json!([
            {"id": 1, "name": "Ada"},
            {"id": 2, "name": "Grace"},
        ]);
        let authors_result = orchestrator
            .detect_schema(&SchemaDetectionOptions::new("authors-ds", authors_data))
            .unwrap();
        let mut authors_schema = authors_result.schema;
        authors_schema.name = "Authors".to_string();

        let posts_data = json!([
            {"id": 10, "title": "Post A", "author_id": 1},
            {"id": 11, "title": "Post B", "author_id": 2},
            {"id": 12, "title": "Post C", "author_id": 1},
        ]);
        let mut options = SchemaDetectionOptions::new("posts-ds", posts_data);
        options.detect_relationships = true;
        options.existing_schemas = vec![authors_schema.clone()];

        let result = orchestrator.detect_schema(&options).unwrap();
        assert_eq!(result.schema.relationships.len(), 1);
        let rel = &result.schema.relationships[0];
        assert_eq!(rel.source_field, "author_id");
        assert_eq!(rel.target_schema_id, authors_schema.id);
        assert_eq!(rel.target_field, "id");
        assert!(rel.confidence >= 0.5);
    }

    #[test]
    fn empty_sample_data_is_rejected() {
        let orchestrator = Orchestrator::default();
        let options = SchemaDetectionOptions::new("ds", json!([]));
        let err = orchestrator.detect_schema(&options).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::EmptyData);
    }

    #[test]
    fn compare_identical_schemas_has_full_similarity() {
        let orchestrator = Orchestrator::default();
        let data = json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]);
        let result = orchestrator.detect_schema(&SchemaDetectionOptions::new("ds", data)).unwrap();
        let comparison = orchestrator.compare_schemas(&result.schema, &result.schema);
        assert!(comparison.added.is_empty());
        assert!(comparison.removed.is_empty());
        assert!(comparison.changed_type.is_empty());
        assert_eq!(comparison.similarity, 1.0);
        assert!(comparison.compatible);
    }

    #[test]
    fn low_sample_count_produces_warning() {
        let orchestrator = Orchestrator::default();
        let data = json!([{"id": 1}, {"id": 2}]);
        let result = orchestrator.detect_schema(&SchemaDetectionOptions::new("ds", data)).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("samples available")));
    }
}
