//! Engine-wide configuration.
//!
//! Every threshold named across §4's analyzers lives here so the engine
//! never invents a magic number inline. Constructed once and threaded
//! read-only through the `Orchestrator` and its analyzers (write-once at
//! construction, per spec §5), generalizing the teacher crate's
//! single-purpose `ValidationOptions`.

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Hard cap on samples retained per extraction.
    pub max_samples: usize,
    /// Minimum sample count below which a "low confidence" warning fires
    ///.
    pub low_sample_warning_threshold: usize,
    /// `k` in `adjustForSampleSize`.
    pub sample_size_damping_k: usize,

    // --- Enum Analyzer ---
    pub max_enum_values: usize,
    pub min_enum_sample_size: usize,
    pub min_enum_repeat_ratio: f64,
    pub max_enum_average_length: usize,

    // --- Validation Analyzer ---
    /// Observed numeric minimum below this floor is not emitted as a
    /// constraint (Open Question #2: suppress negative "minimums").
    pub min_suppression_floor: f64,
    /// Observed numeric maximum at or above this ceiling is not emitted as
    /// a constraint (Open Question #3).
    pub max_suppression_ceiling: f64,
    /// Minimum observation count before min/max/length constraints are
    /// inferred at all.
    pub min_constraint_sample_size: usize,
    /// Share of patterned strings a pattern must reach to be reported as
    /// the field's dominant pattern.
    pub dominant_pattern_share: f64,

    // --- Primary-Key Detector ---
    pub primary_key_score_threshold: f64,

    // --- Pagination Detector ---
    pub pagination_recursion_depth: usize,

    // --- Relationship Detector ---
    pub relationship_confidence_threshold: f64,

    // --- Widget Suggester ---
    pub widget_confidence_cap: f64,

    // --- Structure Analyzer ---
    pub max_analysis_recursion_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_samples: 100,
            low_sample_warning_threshold: 5,
            sample_size_damping_k: 20,

            max_enum_values: 20,
            min_enum_sample_size: 5,
            min_enum_repeat_ratio: 0.3,
            max_enum_average_length: 50,

            min_suppression_floor: 0.0,
            max_suppression_ceiling: 1_000_000_000.0,
            min_constraint_sample_size: 5,
            dominant_pattern_share: 0.8,

            primary_key_score_threshold: 0.3,

            pagination_recursion_depth: 3,

            relationship_confidence_threshold: 0.5,

            widget_confidence_cap: 0.95,

            max_analysis_recursion_depth: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_samples, 100);
        assert_eq!(cfg.max_enum_values, 20);
        assert_eq!(cfg.sample_size_damping_k, 20);
        assert_eq!(cfg.max_suppression_ceiling, 1e9);
    }
}
