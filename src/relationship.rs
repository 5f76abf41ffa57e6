//! Foreign-key candidate detection against a set of known schemas (spec
//! §4.9).

use crate::config::EngineConfig;
use crate::patterns;
use crate::type_analyzer::FieldType;
use tracing::{debug, trace};

/// Relationship cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipType {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::OneToOne => "one-to-one",
            RelationshipType::OneToMany => "one-to-many",
            RelationshipType::ManyToMany => "many-to-many",
        }
    }
}

/// A minimal view of a field, sufficient for relationship scoring. The
/// orchestrator builds these from `schema::FieldDescriptor`.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: String,
    pub field_type: FieldType,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_unique: bool,
}

/// A minimal view of another known schema, sufficient for relationship
/// scoring.
#[derive(Debug, Clone)]
pub struct SchemaView {
    pub id: String,
    pub name: String,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone)]
pub struct DetectedRelationship {
    pub id: String,
    pub display_name: String,
    pub source_field: String,
    pub target_schema_id: String,
    pub target_field: String,
    pub relationship_type: RelationshipType,
    pub confidence: f64,
}

const FK_STRIP_SUFFIXES: &[&str] = &["_id", "Id", "_ref"];
const FK_STRIP_PREFIXES: &[&str] = &["id_", "fk_", "ref_"];

fn is_potential_foreign_key(field: &FieldView) -> bool {
    if field.is_foreign_key {
        return true;
    }
    if field.is_primary_key {
        return false;
    }
    if patterns::matches_foreign_key_name(&field.name) {
        return true;
    }
    let lower = field.name.to_lowercase();
    matches!(field.field_type, FieldType::Uuid | FieldType::Integer) && lower.contains("id")
}

fn derive_entity_name(field_name: &str) -> String {
    let mut name = field_name.to_string();
    for suffix in FK_STRIP_SUFFIXES {
        if name.len() > suffix.len() && name.to_lowercase().ends_with(&suffix.to_lowercase()) {
            name.truncate(name.len() - suffix.len());
            break;
        }
    }
    for prefix in FK_STRIP_PREFIXES {
        if name.to_lowercase().starts_with(prefix) {
            name = name[prefix.len()..].to_string();
            break;
        }
    }
    name.to_lowercase()
}

fn normalize_schema_name(name: &str) -> String {
    let lower = name.to_lowercase().replace(['-', '_'], "");
    lower.strip_suffix('s').unwrap_or(&lower).to_string()
}

fn name_score(entity_name: &str, schema_name: &str) -> f64 {
    let normalized_entity = normalize_schema_name(entity_name);
    let normalized_schema = normalize_schema_name(schema_name);

    if normalized_entity == normalized_schema {
        1.0
    } else if normalized_schema.contains(&normalized_entity) && !normalized_entity.is_empty() {
        0.8
    } else if normalized_entity.contains(&normalized_schema) && !normalized_schema.is_empty() {
        0.7
    } else {
        0.0
    }
}

fn find_target_primary_key(schema: &SchemaView) -> Option<(&FieldView, f64)> {
    if let Some(pk) = schema.fields.iter().find(|f| f.is_primary_key) {
        return Some((pk, 1.0));
    }
    const COMMON_PK_NAMES: &[&str] = &["id", "_id", "ID", "pk", "uuid", "guid"];
    if let Some(field) = schema.fields.iter().find(|f| COMMON_PK_NAMES.contains(&f.name.as_str())) {
        return Some((field, 1.0));
    }
    if let Some(field) = schema.fields.iter().find(|f| patterns::matches_primary_key_name(&f.name)) {
        return Some((field, 1.0));
    }
    schema.fields.iter().find(|f| f.name == "id").map(|field| (field, 0.5))
}

fn type_score(source: FieldType, target: FieldType) -> f64 {
    if source == target {
        1.0
    } else if matches!(
        (source, target),
        (FieldType::Integer, FieldType::Number) | (FieldType::Number, FieldType::Integer)
    ) {
        0.9
    } else if source == FieldType::String || target == FieldType::String {
        0.7
    } else {
        0.3
    }
}

/// Detect relationships from `source` fields against `other_schemas` (spec
/// §4.9). `source_id`/`source_name` identify the source schema for
/// deterministic relationship IDs and display names.
pub fn detect_relationships(
    source_id: &str,
    source_name: &str,
    source_fields: &[FieldView],
    other_schemas: &[SchemaView],
    config: &EngineConfig,
) -> Vec<DetectedRelationship> {
    let mut relationships = Vec::new();

    for field in source_fields {
        if !is_potential_foreign_key(field) {
            continue;
        }
        let entity_name = derive_entity_name(&field.name);

        let mut best: Option<(f64, &SchemaView, &FieldView, f64)> = None;
        for schema in other_schemas {
            let n_score = name_score(&entity_name, &schema.name);
            if n_score == 0.0 {
                continue;
            }
            let Some((target_field, pk_penalty)) = find_target_primary_key(schema) else { continue };
            let t_score = type_score(field.field_type, target_field.field_type);
            let confidence =
                patterns::relationship_confidence(n_score, t_score, 0.0) * pk_penalty;

            if confidence < config.relationship_confidence_threshold {
                trace!(field = %field.name, target = %schema.name, confidence, "relationship candidate rejected below threshold");
            }

            if best.map(|(c, ..)| confidence > c).unwrap_or(true) {
                best = Some((confidence, schema, target_field, n_score));
            }
        }

        if let Some((confidence, schema, target_field, _)) = best {
            if confidence >= config.relationship_confidence_threshold {
                let relationship_type =
                    if field.is_unique { RelationshipType::OneToOne } else { RelationshipType::OneToMany };
                debug!(field = %field.name, target = %schema.name, target_field = %target_field.name, confidence, "relationship accepted");
                relationships.push(DetectedRelationship {
                    id: format!("rel_{}_{}_{}", source_id, schema.id, field.name),
                    display_name: format!(
                        "{}.{} -> {}.{}",
                        source_name, field.name, schema.name, target_field.name
                    ),
                    source_field: field.name.clone(),
                    target_schema_id: schema.id.clone(),
                    target_field: target_field.name.clone(),
                    relationship_type,
                    confidence,
                });
            }
        }
    }

    relationships
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authors_schema() -> SchemaView {
        SchemaView {
            id: "authors-schema".to_string(),
            name: "Authors".to_string(),
            fields: vec![FieldView {
                name: "id".to_string(),
                field_type: FieldType::Integer,
                is_primary_key: true,
                is_foreign_key: false,
                is_unique: true,
            }],
        }
    }

    #[test]
    fn author_id_links_to_authors_schema() {
        let source_fields = vec![FieldView {
            name: "author_id".to_string(),
            field_type: FieldType::Integer,
            is_primary_key: false,
            is_foreign_key: false,
            is_unique: false,
        }];
        let others = vec![authors_schema()];
        let relationships = detect_relationships(
            "posts-schema",
            "Posts",
            &source_fields,
            &others,
            &EngineConfig::default(),
        );
        assert_eq!(relationships.len(), 1);
        let rel = &relationships[0];
        assert_eq!(rel.source_field, "author_id");
        assert_eq!(rel.target_schema_id, "authors-schema");
        assert_eq!(rel.target_field, "id");
        assert_eq!(rel.relationship_type, RelationshipType::OneToMany);
        assert!(rel.confidence >= 0.5);
    }

    #[test]
    fn primary_key_fields_are_never_treated_as_foreign_keys() {
        let source_fields = vec![FieldView {
            name: "id".to_string(),
            field_type: FieldType::Integer,
            is_primary_key: true,
            is_foreign_key: false,
            is_unique: true,
        }];
        let others = vec![authors_schema()];
        let relationships =
            detect_relationships("x", "X", &source_fields, &others, &EngineConfig::default());
        assert!(relationships.is_empty());
    }

    #[test]
    fn unrelated_field_name_produces_no_relationship() {
        let source_fields = vec![FieldView {
            name: "color".to_string(),
            field_type: FieldType::String,
            is_primary_key: false,
            is_foreign_key: false,
            is_unique: false,
        }];
        let others = vec![authors_schema()];
        let relationships =
            detect_relationships("x", "X", &source_fields, &others, &EngineConfig::default());
        assert!(relationships.is_empty());
    }

    #[test]
    fn entity_name_strips_known_suffixes() {
        assert_eq!(derive_entity_name("author_id"), "author");
        assert_eq!(derive_entity_name("authorId"), "author");
        assert_eq!(derive_entity_name("fk_author"), "author");
    }
}
