//! Per-value type detection, field statistics collection, and dominant-type
//! aggregation.
//!
//! Grounded on the flowplane `InferredSchema`/`SchemaType::merge`/`FieldStats`
//! shape (`other_examples`) and on the teacher's `json_type_name`/`is_integer`
//! helpers in `utils.rs`.

use crate::pattern_analyzer;
use crate::patterns;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// The engine's semantic field types.
/// This is the canonical type tag threaded through every analyzer and into
/// `schema::FieldDescriptor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Date,
    DateTime,
    Time,
    Email,
    Url,
    Uuid,
    Enum,
    Array,
    Object,
    Json,
    Unknown,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Time => "time",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Uuid => "uuid",
            FieldType::Enum => "enum",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Json => "json",
            FieldType::Unknown => "unknown",
        }
    }
}

/// One value's detected type and confidence.
#[derive(Debug, Clone)]
pub struct ValueDetection {
    pub field_type: FieldType,
    pub confidence: f64,
}

/// Detect the type of a single JSON value. Strings delegate to the Pattern
/// Analyzer so semantic string types (email/url/uuid/date/...) surface here
/// directly rather than as a separate pass.
pub fn detect_value_type(value: &Value) -> ValueDetection {
    match value {
        Value::Null => ValueDetection { field_type: FieldType::Unknown, confidence: 0.0 },
        Value::Bool(_) => ValueDetection { field_type: FieldType::Boolean, confidence: 1.0 },
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                ValueDetection { field_type: FieldType::Integer, confidence: 1.0 }
            } else if let Some(f) = n.as_f64() {
                if f.is_finite() {
                    if f.fract() == 0.0 {
                        ValueDetection { field_type: FieldType::Integer, confidence: 1.0 }
                    } else {
                        ValueDetection { field_type: FieldType::Number, confidence: 1.0 }
                    }
                } else {
                    ValueDetection { field_type: FieldType::Number, confidence: 0.8 }
                }
            } else {
                ValueDetection { field_type: FieldType::Number, confidence: 0.8 }
            }
        }
        Value::String(s) => {
            let detection = pattern_analyzer::detect_string_type(s);
            let field_type = match detection.pattern_type {
                "uuid" => FieldType::Uuid,
                "email" => FieldType::Email,
                "url" => FieldType::Url,
                "datetime" => FieldType::DateTime,
                "date" => FieldType::Date,
                "time" => FieldType::Time,
                "json" => FieldType::Json,
                _ => FieldType::String,
            };
            ValueDetection { field_type, confidence: detection.confidence }
        }
        Value::Array(_) => ValueDetection { field_type: FieldType::Array, confidence: 1.0 },
        Value::Object(_) => ValueDetection { field_type: FieldType::Object, confidence: 1.0 },
    }
}

/// Field statistics accumulated over one field's observed values.
#[derive(Debug, Clone, Default)]
pub struct FieldStatistics {
    pub type_counts: HashMap<FieldType, usize>,
    pub null_count: usize,
    pub undefined_count: usize,
    pub total_count: usize,
    pub unique_values: HashSet<String>,
    pub unique_tracking_failed: usize,
    pub string_lengths: Vec<usize>,
    pub numeric_values: Vec<f64>,
    pub pattern_counts: HashMap<&'static str, usize>,
    pub sample_values: Vec<Value>,
}

const MAX_SAMPLE_VALUES: usize = 50;
const CANONICALIZE_SIZE_CAP: usize = 500;

impl FieldStatistics {
    pub fn non_null_count(&self) -> usize {
        self.total_count - self.null_count - self.undefined_count
    }

    /// Record one observed value. `value = None` means the key was absent
    /// from the sample ("undefined" in spec terms); `Some(&Value::Null)`
    /// means the key was present with a JSON null.
    pub fn record(&mut self, value: Option<&Value>) {
        self.total_count += 1;

        let value = match value {
            None => {
                self.undefined_count += 1;
                return;
            }
            Some(v) => v,
        };

        if value.is_null() {
            self.null_count += 1;
            return;
        }

        let detection = detect_value_type(value);
        *self.type_counts.entry(detection.field_type).or_insert(0) += 1;

        if self.sample_values.len() < MAX_SAMPLE_VALUES {
            self.sample_values.push(value.clone());
        }

        if let Value::String(s) = value {
            self.string_lengths.push(s.chars().count());
            let pattern_detection = pattern_analyzer::detect_string_type(s);
            if let Some(pattern) = pattern_detection.pattern {
                *self.pattern_counts.entry(pattern).or_insert(0) += 1;
            }
        }

        if let Value::Number(n) = value {
            if let Some(f) = n.as_f64() {
                if f.is_finite() {
                    self.numeric_values.push(f);
                }
            }
        }

        self.track_uniqueness(value);
    }

    fn track_uniqueness(&mut self, value: &Value) {
        match value {
            Value::Object(_) | Value::Array(_) => match serde_json::to_string(value) {
                Ok(serialized) if serialized.len() < CANONICALIZE_SIZE_CAP => {
                    self.unique_values.insert(serialized);
                }
                _ => self.unique_tracking_failed += 1,
            },
            _ => {
                if let Ok(serialized) = serde_json::to_string(value) {
                    self.unique_values.insert(serialized);
                }
            }
        }
    }

    pub fn dominant_type(&self) -> Option<FieldType> {
        self.type_counts.iter().max_by_key(|(_, count)| **count).map(|(t, _)| *t)
    }
}

/// Aggregated field-level result.
#[derive(Debug, Clone)]
pub struct TypeAggregation {
    pub field_type: FieldType,
    pub confidence: f64,
    pub is_nullable: bool,
    pub is_required: bool,
}

/// Aggregate a field's statistics into a single reported type + confidence
///.
pub fn aggregate(stats: &FieldStatistics) -> TypeAggregation {
    let non_null = stats.non_null_count();
    if non_null == 0 {
        return TypeAggregation {
            field_type: FieldType::Unknown,
            confidence: 0.0,
            is_nullable: stats.null_count > 0,
            is_required: false,
        };
    }

    let mut dominant = stats.dominant_type().unwrap_or(FieldType::Unknown);
    let mut dominant_count = *stats.type_counts.get(&dominant).unwrap_or(&0);

    // Integer -> number promotion: the spec states this unconditionally
    // whenever both tags are present in the histogram, regardless of ratio
    // (Open Question #1 in DESIGN.md — no ratio cutoff is introduced here).
    if dominant == FieldType::Integer {
        if let Some(number_count) = stats.type_counts.get(&FieldType::Number) {
            dominant = FieldType::Number;
            dominant_count += number_count;
        }
    }

    let confidence = patterns::type_confidence(dominant_count, non_null);

    TypeAggregation {
        field_type: dominant,
        confidence,
        is_nullable: stats.null_count > 0,
        is_required: stats.null_count == 0 && stats.undefined_count == 0,
    }
}

/// Dominant item type across all observed array values for a field (spec
/// §4.3 "Array item type").
pub fn array_item_type(arrays: &[&Value]) -> FieldType {
    let mut counts: HashMap<FieldType, usize> = HashMap::new();
    for array in arrays {
        if let Value::Array(items) = array {
            for item in items {
                let detection = detect_value_type(item);
                *counts.entry(detection.field_type).or_insert(0) += 1;
            }
        }
    }
    counts.into_iter().max_by_key(|(_, count)| *count).map(|(t, _)| t).unwrap_or(FieldType::Unknown)
}

/// ID-ness score for a field. Returns
/// `(is_id, confidence)`.
pub fn is_likely_id_field(name: &str, field_type: FieldType, stats: &FieldStatistics) -> (bool, f64) {
    let mut score = 0.0;

    if patterns::matches_primary_key_name(name) {
        score += 0.5;
    }
    if name.ends_with("Id") || name.ends_with("_id") || name.ends_with("ID") {
        score += 0.3;
    }

    let non_null = stats.non_null_count();
    if non_null > 1 && stats.unique_values.len() == non_null {
        score += 0.3;
    }

    if matches!(field_type, FieldType::Integer | FieldType::Uuid | FieldType::String) {
        score += 0.2;
    }

    let is_id = score >= 0.5;
    (is_id, score.min(0.95))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_integer_vs_number() {
        assert_eq!(detect_value_type(&json!(5)).field_type, FieldType::Integer);
        assert_eq!(detect_value_type(&json!(5.5)).field_type, FieldType::Number);
    }

    #[test]
    fn detects_semantic_string_types() {
        assert_eq!(detect_value_type(&json!("user@example.com")).field_type, FieldType::Email);
        assert_eq!(detect_value_type(&json!("plain text")).field_type, FieldType::String);
    }

    #[test]
    fn conservation_invariant_holds() {
        let mut stats = FieldStatistics::default();
        stats.record(Some(&json!(1)));
        stats.record(Some(&Value::Null));
        stats.record(None);
        stats.record(Some(&json!(2)));

        let type_sum: usize = stats.type_counts.values().sum();
        assert_eq!(type_sum + stats.null_count + stats.undefined_count, stats.total_count);
    }

    #[test]
    fn integer_promotes_to_number_when_both_present() {
        let mut stats = FieldStatistics::default();
        for _ in 0..9999 {
            stats.record(Some(&json!(1)));
        }
        stats.record(Some(&json!(1.5)));

        let aggregation = aggregate(&stats);
        assert_eq!(aggregation.field_type, FieldType::Number);
    }

    #[test]
    fn empty_non_null_set_is_unknown() {
        let mut stats = FieldStatistics::default();
        stats.record(Some(&Value::Null));
        stats.record(Some(&Value::Null));
        let aggregation = aggregate(&stats);
        assert_eq!(aggregation.field_type, FieldType::Unknown);
        assert_eq!(aggregation.confidence, 0.0);
        assert!(aggregation.is_nullable);
        assert!(!aggregation.is_required);
    }

    #[test]
    fn required_iff_never_null_or_undefined() {
        let mut stats = FieldStatistics::default();
        stats.record(Some(&json!(1)));
        stats.record(Some(&json!(2)));
        let aggregation = aggregate(&stats);
        assert!(aggregation.is_required);
        assert!(!aggregation.is_nullable);
    }

    #[test]
    fn id_field_detection_by_name_and_uniqueness() {
        let mut stats = FieldStatistics::default();
        stats.record(Some(&json!(1)));
        stats.record(Some(&json!(2)));
        stats.record(Some(&json!(3)));
        let (is_id, confidence) = is_likely_id_field("id", FieldType::Integer, &stats);
        assert!(is_id);
        assert!(confidence >= 0.5);
    }

    #[test]
    fn non_id_name_with_duplicates_is_not_id() {
        let mut stats = FieldStatistics::default();
        stats.record(Some(&json!("same")));
        stats.record(Some(&json!("same")));
        let (is_id, _) = is_likely_id_field("description", FieldType::String, &stats);
        assert!(!is_id);
    }
}
