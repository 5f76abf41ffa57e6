//! The engine's output data model: field descriptors, schemas,
//! relationships, response structure, pagination analysis, and widget
//! suggestions.
//!
//! Keeps a serde-tagged-enum shape for field types (formerly used for a
//! validation schema payload) but carries the engine's inferred-field
//! payload instead.

use crate::pagination::{PaginationAnalysis as RawPaginationAnalysis, PaginationType};
use crate::relationship::{DetectedRelationship, RelationshipType};
use crate::structure_analyzer::{ResponseStructure as RawResponseStructure, StructureBucket};
use crate::type_analyzer::FieldType;
use crate::widget::WidgetSuggestion as RawWidgetSuggestion;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One field's full descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub confidence: f64,
    pub is_required: bool,
    pub is_nullable: bool,
    pub is_unique: bool,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_item_type: Option<FieldType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub sample_values: Vec<Value>,
    pub inferred_from_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_format: Option<String>,
}

/// A detected or declared relationship between two schemas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub display_name: String,
    pub source_schema_id: String,
    pub source_field: String,
    pub target_schema_id: String,
    pub target_field: String,
    #[serde(rename = "type")]
    pub relationship_type: RelationshipKind,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl From<RelationshipType> for RelationshipKind {
    fn from(value: RelationshipType) -> Self {
        match value {
            RelationshipType::OneToOne => RelationshipKind::OneToOne,
            RelationshipType::OneToMany => RelationshipKind::OneToMany,
            RelationshipType::ManyToMany => RelationshipKind::ManyToMany,
        }
    }
}

impl Relationship {
    pub fn from_detected(source_schema_id: &str, detected: DetectedRelationship) -> Self {
        Relationship {
            id: detected.id,
            display_name: detected.display_name,
            source_schema_id: source_schema_id.to_string(),
            source_field: detected.source_field,
            target_schema_id: detected.target_schema_id,
            target_field: detected.target_field,
            relationship_type: detected.relationship_type.into(),
            confidence: detected.confidence,
        }
    }
}

/// CRUD-enablement metadata carried on a schema. The engine never mutates these; it only preserves them
/// across `mergeWithExisting`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrudMetadata {
    pub crud_enabled: bool,
    pub crud_endpoints: Vec<String>,
}

/// The engine's top-level inferred schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data_source_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_id: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    pub detected_at: String,
    pub sample_size: usize,
    pub auto_detected: bool,
    pub relationships: Vec<Relationship>,
    #[serde(flatten)]
    pub crud: CrudMetadata,
    pub created_at: String,
    pub updated_at: String,
}

impl Schema {
    pub fn primary_key_field(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.is_primary_key)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> &mut FieldDescriptor {
        self.fields
            .iter_mut()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("no field named {name} on schema {}", self.id))
    }
}

/// Response shape report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStructure {
    pub is_array: bool,
    pub is_wrapped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
    pub meta_paths: Vec<String>,
    pub item_count: usize,
    pub structure: StructureTag,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureTag {
    Flat,
    Nested,
    DeeplyNested,
}

impl From<StructureBucket> for StructureTag {
    fn from(value: StructureBucket) -> Self {
        match value {
            StructureBucket::Flat => StructureTag::Flat,
            StructureBucket::Nested => StructureTag::Nested,
            StructureBucket::DeeplyNested => StructureTag::DeeplyNested,
        }
    }
}

impl From<RawResponseStructure> for ResponseStructure {
    fn from(raw: RawResponseStructure) -> Self {
        ResponseStructure {
            is_array: raw.is_array,
            is_wrapped: raw.is_wrapped,
            data_path: raw.data_path,
            meta_paths: raw.meta_paths,
            item_count: raw.item_count,
            structure: raw.structure.into(),
            max_depth: raw.max_depth,
        }
    }
}

/// Pagination pattern report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationAnalysis {
    pub detected: bool,
    #[serde(rename = "type")]
    pub pagination_type: PaginationTag,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<PaginationConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationTag {
    None,
    Offset,
    Page,
    Cursor,
}

impl From<PaginationType> for PaginationTag {
    fn from(value: PaginationType) -> Self {
        match value {
            PaginationType::None => PaginationTag::None,
            PaginationType::Offset => PaginationTag::Offset,
            PaginationType::Page => PaginationTag::Page,
            PaginationType::Cursor => PaginationTag::Cursor,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor_path: Option<String>,
}

impl From<RawPaginationAnalysis> for PaginationAnalysis {
    fn from(raw: RawPaginationAnalysis) -> Self {
        PaginationAnalysis {
            detected: raw.detected,
            pagination_type: raw.pagination_type.into(),
            confidence: raw.confidence,
            config: raw.config.map(|c| PaginationConfig {
                data_path: c.data_path,
                total_path: c.total_path,
                has_more_path: c.has_more_path,
                next_cursor_path: c.next_cursor_path,
            }),
        }
    }
}

/// A single widget recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSuggestion {
    pub widget_id: String,
    pub widget_name: String,
    pub confidence: f64,
    pub reason: String,
    pub suggested_config: Value,
}

impl From<RawWidgetSuggestion> for WidgetSuggestion {
    fn from(raw: RawWidgetSuggestion) -> Self {
        WidgetSuggestion {
            widget_id: raw.widget_id.to_string(),
            widget_name: raw.widget_name.to_string(),
            confidence: raw.confidence,
            reason: raw.reason,
            suggested_config: raw.suggested_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_descriptor_round_trips_through_json() {
        let field = FieldDescriptor {
            name: "id".to_string(),
            field_type: FieldType::Integer,
            confidence: 0.95,
            is_required: true,
            is_nullable: false,
            is_unique: true,
            is_primary_key: true,
            is_foreign_key: false,
            enum_values: None,
            array_item_type: None,
            min_length: None,
            max_length: None,
            min: None,
            max: None,
            pattern: None,
            sample_values: vec![],
            inferred_from_count: 10,
            display_name: None,
            description: None,
            display_format: None,
        };
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "integer");
        assert!(json.get("enumValues").is_none() || json["enumValues"].is_null());
    }

    #[test]
    fn at_most_one_primary_key_is_an_invariant_callers_must_check() {
        let make_field = |name: &str, pk: bool| FieldDescriptor {
            name: name.to_string(),
            field_type: FieldType::String,
            confidence: 0.9,
            is_required: true,
            is_nullable: false,
            is_unique: pk,
            is_primary_key: pk,
            is_foreign_key: false,
            enum_values: None,
            array_item_type: None,
            min_length: None,
            max_length: None,
            min: None,
            max: None,
            pattern: None,
            sample_values: vec![],
            inferred_from_count: 1,
            display_name: None,
            description: None,
            display_format: None,
        };
        let fields = vec![make_field("id", true), make_field("name", false)];
        assert_eq!(fields.iter().filter(|f| f.is_primary_key).count(), 1);
    }
}
