//! Primary-key scoring across a schema's fields.

use crate::config::EngineConfig;
use crate::type_analyzer::FieldType;

/// One field's candidacy inputs for PK scoring.
#[derive(Debug, Clone)]
pub struct PrimaryKeyCandidate {
    pub name: String,
    pub field_type: FieldType,
    pub is_unique: bool,
    pub is_nullable: bool,
    /// True if observed integer values look sequential: at least 70% of
    /// consecutive sorted pairs have a gap of 1-10.
    pub looks_sequential: bool,
}

fn score(candidate: &PrimaryKeyCandidate) -> f64 {
    let mut score = 0.0;

    if crate::patterns::matches_primary_key_name(&candidate.name) {
        score += 0.5;
    }
    if candidate.is_unique {
        score += 0.3;
    }
    if matches!(candidate.field_type, FieldType::Integer | FieldType::Uuid | FieldType::String) {
        score += 0.2;
    }
    if candidate.field_type == FieldType::Uuid {
        score += 0.2;
    }
    if candidate.field_type == FieldType::Integer && candidate.looks_sequential {
        score += 0.1;
    }
    if !candidate.is_nullable {
        score += 0.1;
    }

    score
}

/// Pick the winning primary-key field among candidates, if any clears the
/// configured threshold.
pub fn detect_primary_key<'a>(
    candidates: &'a [PrimaryKeyCandidate],
    config: &EngineConfig,
) -> Option<(&'a str, f64)> {
    candidates
        .iter()
        .map(|candidate| (candidate.name.as_str(), score(candidate)))
        .filter(|(_, s)| *s >= config.primary_key_score_threshold)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(name, s)| (name, s.min(0.95)))
}

/// Single-field query form.
pub fn is_primary_key(name: &str, field_type: FieldType, is_unique: bool) -> bool {
    let mut score = 0.0;
    if crate::patterns::matches_primary_key_name(name) {
        score += 0.5;
    }
    if is_unique {
        score += 0.3;
    }
    if matches!(field_type, FieldType::Integer | FieldType::Uuid | FieldType::String) {
        score += 0.2;
    }
    score >= 0.5
}

/// Gap-based sequential-ness check over an integer field's observed
/// numeric values.
pub fn looks_sequential(values: &[f64]) -> bool {
    if values.len() < 2 {
        return false;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let pairs = sorted.len() - 1;
    let in_range = sorted
        .windows(2)
        .filter(|w| {
            let gap = w[1] - w[0];
            (1.0..=10.0).contains(&gap)
        })
        .count();

    in_range as f64 / pairs as f64 >= 0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_named_unique_integer_wins() {
        let candidates = vec![
            PrimaryKeyCandidate {
                name: "id".to_string(),
                field_type: FieldType::Integer,
                is_unique: true,
                is_nullable: false,
                looks_sequential: true,
            },
            PrimaryKeyCandidate {
                name: "name".to_string(),
                field_type: FieldType::String,
                is_unique: false,
                is_nullable: false,
                looks_sequential: false,
            },
        ];
        let config = EngineConfig::default();
        let result = detect_primary_key(&candidates, &config);
        assert_eq!(result.map(|(name, _)| name), Some("id"));
    }

    #[test]
    fn below_threshold_yields_no_primary_key() {
        let candidates = vec![PrimaryKeyCandidate {
            name: "description".to_string(),
            field_type: FieldType::String,
            is_unique: false,
            is_nullable: true,
            looks_sequential: false,
        }];
        let config = EngineConfig::default();
        assert!(detect_primary_key(&candidates, &config).is_none());
    }

    #[test]
    fn uuid_pk_confidence_above_075() {
        let candidates = vec![PrimaryKeyCandidate {
            name: "id".to_string(),
            field_type: FieldType::Uuid,
            is_unique: true,
            is_nullable: false,
            looks_sequential: false,
        }];
        let config = EngineConfig::default();
        let (_, confidence) = detect_primary_key(&candidates, &config).unwrap();
        assert!(confidence >= 0.75);
    }

    #[test]
    fn sequential_integers_detected() {
        let values: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        assert!(looks_sequential(&values));
    }

    #[test]
    fn random_integers_not_sequential() {
        let values = vec![3.0, 9999.0, 12.0, 500000.0];
        assert!(!looks_sequential(&values));
    }
}
