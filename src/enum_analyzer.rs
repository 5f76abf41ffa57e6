//! Enum-likelihood decision and boolean-like pair detection.
//!
//! The cardinality-threshold concept (`maxEnumValues`) is grounded in
//! `other_examples`' qsv `cmd/schema.rs`, which exposes an analogous
//! `--enum-threshold` CLI flag for CSV-to-JSON-Schema enum inference.

use crate::config::EngineConfig;
use crate::patterns;
use std::collections::HashMap;

/// Outcome of enum-likelihood analysis over a field's string values.
#[derive(Debug, Clone)]
pub struct EnumDetection {
    pub is_enum: bool,
    pub confidence: f64,
    pub enum_values: Vec<String>,
}

/// Decide whether a field's observed string values look like an enum (spec
/// §4.4).
pub fn detect_enum(values: &[&str], config: &EngineConfig) -> EnumDetection {
    let sample_count = values.len();
    let not_enum = EnumDetection { is_enum: false, confidence: 0.0, enum_values: vec![] };

    if sample_count < config.min_enum_sample_size {
        return not_enum;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(*value).or_insert(0) += 1;
    }
    let unique = counts.len();

    if unique > config.max_enum_values {
        return not_enum;
    }
    if unique == sample_count && unique > 3 {
        return not_enum;
    }

    let average_length =
        values.iter().map(|v| v.chars().count()).sum::<usize>() as f64 / sample_count as f64;
    if average_length > config.max_enum_average_length as f64 {
        return not_enum;
    }

    let repeated = counts.values().filter(|&&count| count > 1).count();
    let repeat_ratio = if unique > 0 { repeated as f64 / unique as f64 } else { 0.0 };
    if unique > 5 && repeat_ratio < config.min_enum_repeat_ratio {
        return not_enum;
    }

    let confidence =
        patterns::enum_confidence(unique, sample_count, config.max_enum_values, repeat_ratio);

    if confidence <= 0.5 {
        return not_enum;
    }

    let mut enum_values: Vec<String> = counts.keys().map(|s| s.to_string()).collect();
    enum_values.sort();

    EnumDetection { is_enum: true, confidence, enum_values }
}

/// Canonical boolean-like string pairs recognized by the engine (spec
/// §4.4's "Boolean-like detection").
const BOOLEAN_LIKE_PAIRS: &[(&str, &str)] = &[
    ("true", "false"),
    ("yes", "no"),
    ("y", "n"),
    ("1", "0"),
    ("on", "off"),
    ("active", "inactive"),
    ("enabled", "disabled"),
];

/// Boolean-like pair match: returns `(true_value, false_value)` as observed
/// (original casing preserved) if `values` is exactly a recognized
/// true/false pair.
pub fn detect_boolean_like<'a>(values: &[&'a str]) -> Option<(&'a str, &'a str)> {
    let mut unique: Vec<&str> = vec![];
    for value in values {
        if !unique.iter().any(|existing: &&str| existing.eq_ignore_ascii_case(value)) {
            unique.push(value);
        }
    }
    if unique.len() != 2 {
        return None;
    }

    for (true_word, false_word) in BOOLEAN_LIKE_PAIRS {
        let a_is_true = unique[0].eq_ignore_ascii_case(true_word);
        let a_is_false = unique[0].eq_ignore_ascii_case(false_word);
        let b_is_true = unique[1].eq_ignore_ascii_case(true_word);
        let b_is_false = unique[1].eq_ignore_ascii_case(false_word);

        if a_is_true && b_is_false {
            return Some((unique[0], unique[1]));
        }
        if b_is_true && a_is_false {
            return Some((unique[1], unique[0]));
        }
    }
    None
}
