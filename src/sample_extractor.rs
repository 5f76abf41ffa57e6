//! Turns a raw JSON payload into an ordered sample set plus the structural
//! breadcrumbs (`dataPath`, `isWrapped`) the rest of the engine needs.
//!
//! Grounded on the teacher's `PathBuilder`/`UniqueChecker` (dot-path
//! traversal, canonical-serialization dedup) and on the object/array
//! recursive walk in `other_examples`' flowplane schema-inference engine.

use serde_json::Value;

/// Fixed precedence list of wrapper keys tried before falling back to a
/// scan of remaining keys.
const DATA_PATH_CANDIDATES: &[&str] = crate::patterns::keys::DATA_PATH_CANDIDATES;

/// Result of `extract`: the flattened sample array plus where it came from.
#[derive(Debug, Clone)]
pub struct ExtractedSamples {
    pub samples: Vec<Value>,
    pub data_path: Option<String>,
    pub is_wrapped: bool,
    pub original_structure: Value,
}

/// Extract up to `max_samples` sample records from `data`.
pub fn extract(data: &Value, max_samples: usize) -> ExtractedSamples {
    let original_structure = data.clone();

    match data {
        Value::Array(items) => {
            let samples = items.iter().take(max_samples).cloned().collect();
            ExtractedSamples { samples, data_path: None, is_wrapped: false, original_structure }
        }
        Value::Object(map) => {
            for key in DATA_PATH_CANDIDATES {
                if let Some(Value::Array(items)) = map.get(*key) {
                    if !items.is_empty() {
                        let samples = items.iter().take(max_samples).cloned().collect();
                        return ExtractedSamples {
                            samples,
                            data_path: Some((*key).to_string()),
                            is_wrapped: true,
                            original_structure,
                        };
                    }
                }
            }
            for (key, value) in map.iter() {
                if DATA_PATH_CANDIDATES.contains(&key.as_str()) {
                    continue;
                }
                if let Value::Array(items) = value {
                    if !items.is_empty() && items.iter().all(Value::is_object) {
                        let samples = items.iter().take(max_samples).cloned().collect();
                        return ExtractedSamples {
                            samples,
                            data_path: Some(key.clone()),
                            is_wrapped: true,
                            original_structure,
                        };
                    }
                }
            }
            ExtractedSamples {
                samples: vec![data.clone()],
                data_path: None,
                is_wrapped: false,
                original_structure,
            }
        }
        other => ExtractedSamples {
            samples: vec![other.clone()],
            data_path: None,
            is_wrapped: false,
            original_structure,
        },
    }
}

/// Traverse a dot-separated path (`"a.b.c"`) through nested objects/arrays.
/// Returns `None` on any intermediate miss, matching the teacher's
/// `PathBuilder` traversal discipline.
pub fn get_nested_value<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Sorted union of top-level keys across object samples.
pub fn extract_field_names(samples: &[Value]) -> Vec<String> {
    use std::collections::BTreeSet;
    let mut names = BTreeSet::new();
    for sample in samples {
        if let Value::Object(map) = sample {
            for key in map.keys() {
                names.insert(key.clone());
            }
        }
    }
    names.into_iter().collect()
}

/// Each sample's value at `name`, falling back to a nested dot-path lookup
/// when the field is not a direct top-level key.
pub fn extract_field_values<'a>(samples: &'a [Value], name: &str) -> Vec<Option<&'a Value>> {
    samples
        .iter()
        .map(|sample| match sample {
            Value::Object(map) => map.get(name).or_else(|| get_nested_value(sample, name)),
            _ => None,
        })
        .collect()
}

/// Canonical serialization used for dedup; bounded to avoid pathological
/// blow-up on huge nested samples (mirrors the teacher's `UniqueChecker`
/// size-bounded canonicalization for uniqueness tracking).
fn canonical_key(value: &Value) -> Option<String> {
    serde_json::to_string(value).ok()
}

/// Merge `new` samples into `existing`, deduplicating by canonical
/// serialization and preserving insertion order up to `cap`.
pub fn merge_samples(existing: &[Value], new: &[Value], cap: usize) -> Vec<Value> {
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::with_capacity(cap.min(existing.len() + new.len()));

    for value in existing.iter().chain(new.iter()) {
        if merged.len() >= cap {
            break;
        }
        match canonical_key(value) {
            Some(key) => {
                if seen.insert(key) {
                    merged.push(value.clone());
                }
            }
            None => merged.push(value.clone()),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_root_is_unwrapped() {
        let data = json!([{"id": 1}, {"id": 2}]);
        let extracted = extract(&data, 100);
        assert_eq!(extracted.samples.len(), 2);
        assert!(!extracted.is_wrapped);
        assert_eq!(extracted.data_path, None);
    }

    #[test]
    fn wrapped_list_uses_precedence_key() {
        let data = json!({"results": [{"id": "a1"}, {"id": "c3"}], "total": 42});
        let extracted = extract(&data, 100);
        assert_eq!(extracted.data_path.as_deref(), Some("results"));
        assert!(extracted.is_wrapped);
        assert_eq!(extracted.samples.len(), 2);
    }

    #[test]
    fn unrecognized_wrapper_key_falls_back_to_scan() {
        let data = json!({"payload": [{"id": 1}], "status": "ok"});
        let extracted = extract(&data, 100);
        assert_eq!(extracted.data_path.as_deref(), Some("payload"));
    }

    #[test]
    fn single_object_becomes_one_sample() {
        let data = json!({"id": 1, "name": "solo"});
        let extracted = extract(&data, 100);
        assert_eq!(extracted.samples.len(), 1);
        assert!(!extracted.is_wrapped);
    }

    #[test]
    fn max_samples_truncates() {
        let data = json!([{"id": 1}, {"id": 2}, {"id": 3}]);
        let extracted = extract(&data, 2);
        assert_eq!(extracted.samples.len(), 2);
    }

    #[test]
    fn nested_value_traversal() {
        let data = json!({"a": {"b": {"c": 7}}});
        assert_eq!(get_nested_value(&data, "a.b.c"), Some(&json!(7)));
        assert_eq!(get_nested_value(&data, "a.x.c"), None);
    }

    #[test]
    fn field_names_are_sorted_union() {
        let samples = vec![json!({"b": 1, "a": 2}), json!({"c": 3})];
        assert_eq!(extract_field_names(&samples), vec!["a", "b", "c"]);
    }

    #[test]
    fn merge_samples_dedups_and_respects_cap() {
        let existing = vec![json!({"id": 1})];
        let new = vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})];
        let merged = merge_samples(&existing, &new, 2);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], json!({"id": 1}));
    }
}
