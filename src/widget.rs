//! Declarative widget-suggestion rule engine.
//!
//! Each rule is a data record, not a closure: `requiredTypes`,
//! `optionalTypes`, field-count bounds, a multiplier, a named predicate tag
//! dispatched through `custom_predicate`, and named config/reason
//! generators. Adding a rule means adding a record, not editing dispatch —
//! mirrors the teacher's own preference for data-driven tables (its
//! `SchemaType` tagged enum) over ad hoc branching.

use crate::config::EngineConfig;
use crate::patterns::keys;
use crate::type_analyzer::FieldType;
use serde_json::{json, Value};

/// A field as seen by the Widget Suggester: just enough to score rules and
/// generate config.
#[derive(Debug, Clone)]
pub struct WidgetField {
    pub name: String,
    pub field_type: FieldType,
    pub enum_values: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct WidgetSuggestion {
    pub widget_id: &'static str,
    pub widget_name: &'static str,
    pub confidence: f64,
    pub reason: String,
    pub suggested_config: Value,
}

fn displayable(field_type: FieldType) -> bool {
    !matches!(field_type, FieldType::Object | FieldType::Unknown)
}

fn numeric(field_type: FieldType) -> bool {
    matches!(field_type, FieldType::Integer | FieldType::Number)
}

fn date_like(field_type: FieldType) -> bool {
    matches!(field_type, FieldType::Date | FieldType::DateTime)
}

fn find_one<'a>(fields: &'a [WidgetField], pred: impl Fn(&WidgetField) -> bool) -> Option<&'a WidgetField> {
    fields.iter().find(|f| pred(f))
}

fn find_all<'a>(
    fields: &'a [WidgetField],
    pred: impl Fn(&WidgetField) -> bool,
) -> Vec<&'a WidgetField> {
    fields.iter().filter(|f| pred(f)).collect()
}

fn by_name_substrings<'a>(fields: &'a [WidgetField], names: &[&str]) -> Option<&'a WidgetField> {
    fields.iter().find(|f| names.iter().any(|n| f.name.eq_ignore_ascii_case(n)))
}

struct Rule {
    id: &'static str,
    name: &'static str,
    required_types: &'static [FieldType],
    optional_types: &'static [FieldType],
    min_fields: usize,
    max_fields: Option<usize>,
    multiplier: f64,
    predicate: fn(&[WidgetField]) -> bool,
    configure: fn(&[WidgetField]) -> (Value, String),
}

fn data_table_predicate(fields: &[WidgetField]) -> bool {
    find_all(fields, |f| displayable(f.field_type)).len() >= 2
}

fn data_table_config(fields: &[WidgetField]) -> (Value, String) {
    let displayable_fields = find_all(fields, |f| displayable(f.field_type));
    let columns: Vec<Value> = displayable_fields
        .iter()
        .take(10)
        .map(|f| {
            json!({
                "field": f.name,
                "sortable": matches!(f.field_type, FieldType::String | FieldType::Enum | FieldType::Date | FieldType::DateTime),
                "filterable": matches!(f.field_type, FieldType::String | FieldType::Enum | FieldType::Date | FieldType::DateTime),
            })
        })
        .collect();
    let config = json!({ "columns": columns });
    (config, "Displays tabular data across the detected fields".to_string())
}

fn line_chart_predicate(fields: &[WidgetField]) -> bool {
    find_one(fields, |f| date_like(f.field_type)).is_some() && find_one(fields, |f| numeric(f.field_type)).is_some()
}

fn line_chart_config(fields: &[WidgetField]) -> (Value, String) {
    let x_field = find_one(fields, |f| date_like(f.field_type)).unwrap();
    let series: Vec<&str> = find_all(fields, |f| numeric(f.field_type))
        .into_iter()
        .take(3)
        .map(|f| f.name.as_str())
        .collect();
    let config = json!({ "xAxis": { "field": x_field.name }, "series": series });
    (config, format!("Time series over {} with numeric trends", x_field.name))
}

fn bar_chart_predicate(fields: &[WidgetField]) -> bool {
    find_one(fields, |f| matches!(f.field_type, FieldType::Enum | FieldType::String)).is_some()
        && find_one(fields, |f| numeric(f.field_type)).is_some()
}

fn bar_chart_config(fields: &[WidgetField]) -> (Value, String) {
    let category = find_one(fields, |f| f.field_type == FieldType::Enum)
        .or_else(|| find_one(fields, |f| f.field_type == FieldType::String))
        .unwrap();
    let value = find_one(fields, |f| numeric(f.field_type));
    let mut config = json!({ "xAxis": { "field": category.name } });
    if let Some(value) = value {
        config["series"] = json!([value.name]);
    }
    (config, format!("Categorical breakdown by {}", category.name))
}

fn pie_chart_predicate(fields: &[WidgetField]) -> bool {
    find_one(fields, |f| f.field_type == FieldType::Enum && !f.enum_values.is_empty() && f.enum_values.len() <= 10)
        .is_some()
}

fn pie_chart_config(fields: &[WidgetField]) -> (Value, String) {
    let label_field = find_one(fields, |f| f.field_type == FieldType::Enum && f.enum_values.len() <= 10).unwrap();
    let value_field = find_one(fields, |f| numeric(f.field_type));
    let mut config = json!({ "labelField": label_field.name });
    if let Some(value_field) = value_field {
        config["valueField"] = json!(value_field.name);
    }
    (config, format!("Distribution across {}'s {} values", label_field.name, label_field.enum_values.len()))
}

fn stats_card_predicate(fields: &[WidgetField]) -> bool {
    let count = find_all(fields, |f| numeric(f.field_type)).len();
    (1..=6).contains(&count)
}

fn stats_card_config(fields: &[WidgetField]) -> (Value, String) {
    let numeric_fields = find_all(fields, |f| numeric(f.field_type));
    let first = numeric_fields[0];
    let config = json!({ "aggregation": "sum", "field": first.name });
    (config, format!("Summary statistic over {}", first.name))
}

fn kanban_predicate(fields: &[WidgetField]) -> bool {
    find_one(fields, |f| {
        f.field_type == FieldType::Enum
            && keys::STATUS_FIELD_SUBSTRINGS.iter().any(|kw| f.name.to_lowercase().contains(kw))
    })
    .is_some()
}

fn kanban_config(fields: &[WidgetField]) -> (Value, String) {
    let group_field = find_one(fields, |f| {
        f.field_type == FieldType::Enum
            && keys::STATUS_FIELD_SUBSTRINGS.iter().any(|kw| f.name.to_lowercase().contains(kw))
    })
    .unwrap();
    let title_field = by_name_substrings(fields, keys::TITLE_FIELD_NAMES);
    let mut config = json!({
        "groupByField": group_field.name,
        "columns": group_field.enum_values,
    });
    if let Some(title_field) = title_field {
        config["titleField"] = json!(title_field.name);
    }
    (config, format!("Board grouped by {}", group_field.name))
}

fn map_view_predicate(fields: &[WidgetField]) -> bool {
    let has_lat = find_one(fields, |f| {
        numeric(f.field_type) && keys::LATITUDE_FIELD_NAMES.iter().any(|n| f.name.eq_ignore_ascii_case(n))
    })
    .is_some();
    let has_lng = find_one(fields, |f| {
        numeric(f.field_type) && keys::LONGITUDE_FIELD_NAMES.iter().any(|n| f.name.eq_ignore_ascii_case(n))
    })
    .is_some();
    has_lat && has_lng
}

fn map_view_config(fields: &[WidgetField]) -> (Value, String) {
    let lat_field = find_one(fields, |f| {
        numeric(f.field_type) && keys::LATITUDE_FIELD_NAMES.iter().any(|n| f.name.eq_ignore_ascii_case(n))
    })
    .unwrap();
    let lng_field = find_one(fields, |f| {
        numeric(f.field_type) && keys::LONGITUDE_FIELD_NAMES.iter().any(|n| f.name.eq_ignore_ascii_case(n))
    })
    .unwrap();
    let label_field = by_name_substrings(fields, keys::TITLE_FIELD_NAMES);
    let mut config = json!({ "latitudeField": lat_field.name, "longitudeField": lng_field.name });
    if let Some(label_field) = label_field {
        config["labelField"] = json!(label_field.name);
    }
    (config, "Geographic coordinates detected".to_string())
}

fn timeline_predicate(fields: &[WidgetField]) -> bool {
    find_one(fields, |f| date_like(f.field_type)).is_some()
        && find_one(fields, |f| f.field_type == FieldType::String).is_some()
}

fn timeline_config(fields: &[WidgetField]) -> (Value, String) {
    let date_field = find_one(fields, |f| date_like(f.field_type)).unwrap();
    let title_field = by_name_substrings(fields, keys::EVENT_TITLE_FIELD_NAMES);
    let description_field = by_name_substrings(fields, keys::DESCRIPTION_FIELD_NAMES);
    let mut config = json!({ "dateField": date_field.name });
    if let Some(title_field) = title_field {
        config["titleField"] = json!(title_field.name);
    }
    if let Some(description_field) = description_field {
        config["descriptionField"] = json!(description_field.name);
    }
    (config, format!("Chronological events ordered by {}", date_field.name))
}

fn detail_view_predicate(fields: &[WidgetField]) -> bool {
    find_all(fields, |f| displayable(f.field_type)).len() >= 3
}

fn detail_view_config(fields: &[WidgetField]) -> (Value, String) {
    let displayable_fields = find_all(fields, |f| displayable(f.field_type));
    let field_names: Vec<&str> = displayable_fields.iter().map(|f| f.name.as_str()).collect();
    let config = json!({ "sections": [{ "fields": field_names }] });
    (config, "Single-record detail layout covering all fields".to_string())
}

const RULES: &[Rule] = &[
    Rule {
        id: "data-table",
        name: "Data Table",
        required_types: &[],
        optional_types: &[],
        min_fields: 2,
        max_fields: None,
        multiplier: 1.0,
        predicate: data_table_predicate,
        configure: data_table_config,
    },
    Rule {
        id: "line-chart",
        name: "Line Chart",
        required_types: &[FieldType::Date, FieldType::DateTime, FieldType::Integer, FieldType::Number],
        optional_types: &[],
        min_fields: 2,
        max_fields: None,
        multiplier: 1.1,
        predicate: line_chart_predicate,
        configure: line_chart_config,
    },
    Rule {
        id: "bar-chart",
        name: "Bar Chart",
        required_types: &[FieldType::Enum, FieldType::String, FieldType::Integer, FieldType::Number],
        optional_types: &[],
        min_fields: 2,
        max_fields: None,
        multiplier: 1.0,
        predicate: bar_chart_predicate,
        configure: bar_chart_config,
    },
    Rule {
        id: "pie-chart",
        name: "Pie Chart",
        required_types: &[FieldType::Enum],
        optional_types: &[FieldType::Integer, FieldType::Number],
        min_fields: 1,
        max_fields: None,
        multiplier: 1.0,
        predicate: pie_chart_predicate,
        configure: pie_chart_config,
    },
    Rule {
        id: "stats-card",
        name: "Stats Card",
        required_types: &[FieldType::Integer, FieldType::Number],
        optional_types: &[],
        min_fields: 1,
        max_fields: Some(6),
        multiplier: 0.9,
        predicate: stats_card_predicate,
        configure: stats_card_config,
    },
    Rule {
        id: "kanban-board",
        name: "Kanban Board",
        required_types: &[FieldType::Enum],
        optional_types: &[FieldType::String],
        min_fields: 1,
        max_fields: None,
        multiplier: 1.05,
        predicate: kanban_predicate,
        configure: kanban_config,
    },
    Rule {
        id: "map-view",
        name: "Map View",
        required_types: &[FieldType::Integer, FieldType::Number],
        optional_types: &[],
        min_fields: 2,
        max_fields: None,
        multiplier: 1.1,
        predicate: map_view_predicate,
        configure: map_view_config,
    },
    Rule {
        id: "timeline",
        name: "Timeline",
        required_types: &[FieldType::Date, FieldType::DateTime, FieldType::String],
        optional_types: &[],
        min_fields: 2,
        max_fields: None,
        multiplier: 1.0,
        predicate: timeline_predicate,
        configure: timeline_config,
    },
    Rule {
        id: "detail-view",
        name: "Detail View",
        required_types: &[],
        optional_types: &[],
        min_fields: 3,
        max_fields: None,
        multiplier: 0.8,
        predicate: detail_view_predicate,
        configure: detail_view_config,
    },
];

fn score_rule(rule: &Rule, fields: &[WidgetField], confidence_cap: f64) -> Option<f64> {
    if fields.len() < rule.min_fields {
        return None;
    }
    if let Some(max_fields) = rule.max_fields {
        if fields.len() > max_fields {
            return None;
        }
    }
    if !(rule.predicate)(fields) {
        return None;
    }

    let present_types: Vec<FieldType> = fields.iter().map(|f| f.field_type).collect();

    if !rule.required_types.is_empty() {
        let matched_required =
            rule.required_types.iter().filter(|t| present_types.contains(t)).count();
        if matched_required == 0 {
            return None;
        }
        let matched_optional = if rule.optional_types.is_empty() {
            0
        } else {
            rule.optional_types.iter().filter(|t| present_types.contains(t)).count()
        };
        let required_term = 0.2 * (matched_required as f64 / rule.required_types.len() as f64);
        let optional_term = if rule.optional_types.is_empty() {
            0.0
        } else {
            0.2 * (matched_optional as f64 / rule.optional_types.len() as f64)
        };
        let size_term = 0.1 * (fields.len() as f64 / 5.0).min(1.0);
        let base = 0.5 + required_term + optional_term + size_term;
        Some((base * rule.multiplier).min(confidence_cap))
    } else {
        let size_term = 0.1 * (fields.len() as f64 / 5.0).min(1.0);
        let base = 0.5 + size_term;
        Some((base * rule.multiplier).min(confidence_cap))
    }
}

/// Run every rule against `fields` and return suggestions ordered by
/// confidence descending, declaration-order ties kept.
pub fn suggest_widgets(fields: &[WidgetField], config: &EngineConfig) -> Vec<WidgetSuggestion> {
    let mut suggestions: Vec<(usize, WidgetSuggestion)> = Vec::new();

    for (index, rule) in RULES.iter().enumerate() {
        if let Some(confidence) = score_rule(rule, fields, config.widget_confidence_cap) {
            let (config, reason) = (rule.configure)(fields);
            suggestions.push((
                index,
                WidgetSuggestion {
                    widget_id: rule.id,
                    widget_name: rule.name,
                    confidence,
                    reason,
                    suggested_config: config,
                },
            ));
        }
    }

    suggestions.sort_by(|a, b| {
        b.1.confidence
            .partial_cmp(&a.1.confidence)
            .unwrap()
            .then_with(|| a.0.cmp(&b.0))
    });

    suggestions.into_iter().map(|(_, suggestion)| suggestion).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, field_type: FieldType) -> WidgetField {
        WidgetField { name: name.to_string(), field_type, enum_values: vec![] }
    }

    #[test]
    fn s1_flat_object_list_suggests_table_and_stats_no_line_chart() {
        let fields = vec![
            field("id", FieldType::Integer),
            field("name", FieldType::String),
            field("active", FieldType::Boolean),
            field("price", FieldType::Number),
        ];
        let suggestions = suggest_widgets(&fields, &EngineConfig::default());
        let ids: Vec<&str> = suggestions.iter().map(|s| s.widget_id).collect();
        assert!(ids.contains(&"data-table"));
        assert!(ids.contains(&"stats-card"));
        assert!(!ids.contains(&"line-chart"));
    }

    #[test]
    fn s6_time_series_suggests_line_chart_with_two_series() {
        let fields =
            vec![field("date", FieldType::Date), field("revenue", FieldType::Integer), field("cost", FieldType::Integer)];
        let suggestions = suggest_widgets(&fields, &EngineConfig::default());
        let line_chart = suggestions.iter().find(|s| s.widget_id == "line-chart").unwrap();
        assert_eq!(line_chart.suggested_config["xAxis"]["field"], "date");
        let series = line_chart.suggested_config["series"].as_array().unwrap();
        assert!(series.iter().any(|v| v == "revenue"));
        assert!(series.iter().any(|v| v == "cost"));

        let table_rank = suggestions.iter().position(|s| s.widget_id == "data-table").unwrap();
        let line_rank = suggestions.iter().position(|s| s.widget_id == "line-chart").unwrap();
        assert!(line_rank < table_rank || suggestions[line_rank].confidence >= suggestions[table_rank].confidence);
    }

    #[test]
    fn suggestions_sorted_descending_by_confidence() {
        let fields = vec![
            field("id", FieldType::Integer),
            field("status", FieldType::Enum),
            field("title", FieldType::String),
            field("created_at", FieldType::DateTime),
        ];
        let suggestions = suggest_widgets(&fields, &EngineConfig::default());
        for pair in suggestions.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn no_suggestion_exceeds_095_confidence() {
        let fields = vec![
            field("id", FieldType::Integer),
            field("lat", FieldType::Number),
            field("lng", FieldType::Number),
            field("title", FieldType::String),
            field("date", FieldType::Date),
            field("status", FieldType::Enum),
        ];
        let suggestions = suggest_widgets(&fields, &EngineConfig::default());
        for suggestion in &suggestions {
            assert!(suggestion.confidence <= 0.95);
        }
    }

    #[test]
    fn kanban_triggers_on_status_named_enum_field() {
        let mut status_field = field("status", FieldType::Enum);
        status_field.enum_values = vec!["open".to_string(), "closed".to_string()];
        let fields = vec![status_field, field("title", FieldType::String)];
        let suggestions = suggest_widgets(&fields, &EngineConfig::default());
        assert!(suggestions.iter().any(|s| s.widget_id == "kanban-board"));
    }
}
