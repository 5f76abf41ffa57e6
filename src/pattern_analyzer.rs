//! Classifies individual strings into a semantic pattern and aggregates
//! per-field pattern statistics.
//!
//! Grounded on the teacher's `utils.rs::validate_string_format` cascade and
//! on the flowplane `detect_string_format` first-match-wins ordering in
//! `other_examples`.

use crate::patterns;
use std::collections::HashMap;

/// A single string's classification.
#[derive(Debug, Clone, PartialEq)]
pub struct StringTypeDetection {
    pub pattern_type: &'static str,
    pub confidence: f64,
    pub pattern: Option<&'static str>,
    pub semantic_hint: Option<&'static str>,
}

/// Classify one string. Order of tests is significant: first match wins
///.
pub fn detect_string_type(s: &str) -> StringTypeDetection {
    if s.is_empty() {
        return StringTypeDetection {
            pattern_type: "string",
            confidence: 0.8,
            pattern: None,
            semantic_hint: None,
        };
    }
    if patterns::is_uuid(s) {
        return StringTypeDetection {
            pattern_type: "uuid",
            confidence: 0.95,
            pattern: Some("uuid"),
            semantic_hint: None,
        };
    }
    if patterns::is_object_id(s) {
        return StringTypeDetection {
            pattern_type: "uuid",
            confidence: 0.9,
            pattern: Some("object-id"),
            semantic_hint: Some("ObjectId"),
        };
    }
    if patterns::is_email(s) {
        return StringTypeDetection {
            pattern_type: "email",
            confidence: 0.95,
            pattern: Some("email"),
            semantic_hint: None,
        };
    }
    if patterns::is_url(s) {
        return StringTypeDetection {
            pattern_type: "url",
            confidence: 0.95,
            pattern: Some("url"),
            semantic_hint: None,
        };
    }
    if patterns::is_iso_datetime(s) {
        return StringTypeDetection {
            pattern_type: "datetime",
            confidence: 0.95,
            pattern: Some("iso-datetime"),
            semantic_hint: None,
        };
    }
    if patterns::is_iso_date(s) {
        return StringTypeDetection {
            pattern_type: "date",
            confidence: 0.95,
            pattern: Some("iso-date"),
            semantic_hint: None,
        };
    }
    if patterns::is_time(s) {
        return StringTypeDetection {
            pattern_type: "time",
            confidence: 0.85,
            pattern: Some("time"),
            semantic_hint: None,
        };
    }
    if patterns::is_known_date_format(s) {
        return StringTypeDetection {
            pattern_type: "date",
            confidence: 0.8,
            pattern: Some("date-format"),
            semantic_hint: None,
        };
    }
    if patterns::is_json_like(s) {
        return StringTypeDetection {
            pattern_type: "json",
            confidence: 0.9,
            pattern: Some("json"),
            semantic_hint: None,
        };
    }
    StringTypeDetection { pattern_type: "string", confidence: 1.0, pattern: None, semantic_hint: None }
}

/// Per-field pattern aggregation result.
#[derive(Debug, Clone)]
pub struct PatternAnalysis {
    pub dominant_pattern: Option<&'static str>,
    pub pattern_counts: HashMap<&'static str, usize>,
    pub confidence: f64,
}

/// Aggregate pattern classifications over a field's observed string values.
///
/// Confidence is `maxCount / totalStringCount`: the denominator is every
/// string passed in, not just the ones that matched some pattern, so a
/// field mixing patterned and free-text values is penalized accordingly.
pub fn analyze_patterns(values: &[&str]) -> PatternAnalysis {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();

    for value in values {
        let detection = detect_string_type(value);
        if let Some(pattern) = detection.pattern {
            *counts.entry(pattern).or_insert(0) += 1;
        }
    }

    let total = values.len();
    let dominant = counts.iter().max_by_key(|(_, count)| **count).map(|(pattern, _)| *pattern);
    let confidence = match dominant {
        Some(pattern) if total > 0 => *counts.get(pattern).unwrap_or(&0) as f64 / total as f64,
        _ => 0.0,
    };

    PatternAnalysis { dominant_pattern: dominant, pattern_counts: counts, confidence }
}
