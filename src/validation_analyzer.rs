//! Infers per-field validation constraints from accumulated statistics
//!.
//!
//! Grounded on the teacher's `ValidationError::string_length`/`number_range`
//! min/max pairing shape in `error.rs`.

use crate::config::EngineConfig;
use crate::type_analyzer::FieldStatistics;

/// Constraints inferred for one field, plus advisory (non-normative) text.
#[derive(Debug, Clone, Default)]
pub struct InferredConstraints {
    pub is_required: bool,
    pub is_nullable: bool,
    pub is_unique: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<&'static str>,
    pub suggestions: Vec<String>,
}

/// Infer constraints for a field named `name` from its statistics (spec
/// §4.5).
pub fn infer_constraints(name: &str, stats: &FieldStatistics, config: &EngineConfig) -> InferredConstraints {
    let mut result = InferredConstraints::default();

    result.is_required = stats.total_count > 0 && stats.null_count + stats.undefined_count == 0;
    result.is_nullable = stats.null_count > 0;

    let non_null = stats.non_null_count();
    result.is_unique =
        non_null >= 2 && stats.unique_values.len() as f64 / non_null as f64 >= 0.99;

    if stats.string_lengths.len() >= config.min_constraint_sample_size {
        let min_len = *stats.string_lengths.iter().min().unwrap();
        let max_len = *stats.string_lengths.iter().max().unwrap();
        if min_len > 0 {
            result.min_length = Some(min_len);
        }
        result.max_length = Some(max_len);
    }

    if stats.numeric_values.len() >= config.min_constraint_sample_size {
        let min_value = stats.numeric_values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_value = stats.numeric_values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if min_value >= config.min_suppression_floor {
            result.min = Some(min_value);
        }
        if max_value < config.max_suppression_ceiling {
            result.max = Some(max_value);
        }
    }

    let total_patterned: usize = stats.pattern_counts.values().sum();
    if total_patterned > 0 {
        if let Some((pattern, count)) = stats.pattern_counts.iter().max_by_key(|(_, c)| **c) {
            if *count as f64 / total_patterned as f64 >= config.dominant_pattern_share {
                result.pattern = Some(pattern);
            }
        }
    }

    if result.is_required && stats.total_count > 0 {
        let presence_pct = (stats.total_count - stats.undefined_count - stats.null_count) as f64
            / stats.total_count as f64
            * 100.0;
        if presence_pct < 100.0 {
            result
                .suggestions
                .push(format!("Consider marking {name} as required ({presence_pct:.1}% present)"));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stats_from(values: Vec<serde_json::Value>) -> FieldStatistics {
        let mut stats = FieldStatistics::default();
        for value in values {
            stats.record(Some(&value));
        }
        stats
    }

    #[test]
    fn required_and_not_nullable_when_always_present() {
        let config = EngineConfig::default();
        let stats = stats_from(vec![json!(1), json!(2), json!(3)]);
        let constraints = infer_constraints("id", &stats, &config);
        assert!(constraints.is_required);
        assert!(!constraints.is_nullable);
    }

    #[test]
    fn unique_when_values_are_distinct() {
        let config = EngineConfig::default();
        let stats = stats_from(vec![json!(1), json!(2), json!(3), json!(4)]);
        let constraints = infer_constraints("id", &stats, &config);
        assert!(constraints.is_unique);
    }

    #[test]
    fn min_suppressed_when_negative() {
        let config = EngineConfig::default();
        let stats = stats_from(vec![json!(-5.0), json!(1.0), json!(2.0), json!(3.0), json!(4.0)]);
        let constraints = infer_constraints("delta", &stats, &config);
        assert_eq!(constraints.min, None);
    }

    #[test]
    fn max_suppressed_at_or_above_billion() {
        let config = EngineConfig::default();
        let stats = stats_from(vec![
            json!(1.0),
            json!(2.0),
            json!(3.0),
            json!(4.0),
            json!(1_000_000_000.0),
        ]);
        let constraints = infer_constraints("counter", &stats, &config);
        assert_eq!(constraints.max, None);
    }

    #[test]
    fn string_length_bounds_require_minimum_samples() {
        let config = EngineConfig::default();
        let stats = stats_from(vec![json!("ab"), json!("abc")]);
        let constraints = infer_constraints("name", &stats, &config);
        assert_eq!(constraints.min_length, None);
        assert_eq!(constraints.max_length, None);
    }
}
