//! Computes the shape of a raw response: array vs. wrapped vs. single
//! record, where metadata lives, and how deep it nests.
//!
//! Grounded on the recursive object/array walk in `other_examples`'
//! flowplane schema-inference engine, generalized beyond type inference to
//! structural bucketing.

use crate::config::EngineConfig;
use crate::patterns::keys::META_KEYWORDS;
use serde_json::Value;

/// Structural bucket for `ResponseStructure::structure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureBucket {
    Flat,
    Nested,
    DeeplyNested,
}

impl StructureBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureBucket::Flat => "flat",
            StructureBucket::Nested => "nested",
            StructureBucket::DeeplyNested => "deeply_nested",
        }
    }
}

/// Full structural analysis of a raw response.
#[derive(Debug, Clone)]
pub struct ResponseStructure {
    pub is_array: bool,
    pub is_wrapped: bool,
    pub data_path: Option<String>,
    pub meta_paths: Vec<String>,
    pub item_count: usize,
    pub structure: StructureBucket,
    pub max_depth: usize,
}

fn max_depth_of(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.first().map(max_depth_of).unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(max_depth_of).max().unwrap_or(0),
        _ => 0,
    }
}

fn bucket_for_depth(depth: usize) -> StructureBucket {
    if depth <= 2 {
        StructureBucket::Flat
    } else if depth <= 4 {
        StructureBucket::Nested
    } else {
        StructureBucket::DeeplyNested
    }
}

fn key_looks_like_metadata(key: &str) -> bool {
    META_KEYWORDS
        .iter()
        .any(|keyword| key.to_lowercase().contains(&keyword.to_lowercase()) || keyword.to_lowercase().contains(&key.to_lowercase()))
}

fn collect_meta_paths(
    value: &Value,
    prefix: &str,
    exclude: Option<&str>,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<String>,
) {
    if depth > max_depth {
        return;
    }
    if let Value::Object(map) = value {
        for (key, nested) in map {
            let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
            if Some(path.as_str()) == exclude {
                continue;
            }
            if key_looks_like_metadata(key) {
                out.push(path.clone());
            }
            if let Value::Object(inner) = nested {
                if inner.len() <= 8 {
                    collect_meta_paths(nested, &path, exclude, depth + 1, max_depth, out);
                }
            }
        }
    }
}

/// Compute the full structural analysis of a raw (un-extracted) response.
/// Meta-path discovery recurses into nested wrapper objects up to
/// `config.max_analysis_recursion_depth`.
pub fn analyze(
    raw: &Value,
    data_path: Option<&str>,
    is_wrapped: bool,
    item_count: usize,
    config: &EngineConfig,
) -> ResponseStructure {
    let is_array = raw.is_array();
    let max_depth = max_depth_of(raw);
    let structure = bucket_for_depth(max_depth);

    let mut meta_paths = Vec::new();
    if is_wrapped {
        collect_meta_paths(raw, "", data_path, 0, config.max_analysis_recursion_depth, &mut meta_paths);
    }

    ResponseStructure {
        is_array,
        is_wrapped,
        data_path: data_path.map(str::to_string),
        meta_paths,
        item_count,
        structure,
        max_depth,
    }
}

/// Heuristic "does this look like a list response" confidence.
pub fn is_list_response(raw: &Value) -> f64 {
    if raw.is_array() {
        return 0.95;
    }
    if let Value::Object(map) = raw {
        for value in map.values() {
            if let Value::Array(items) = value {
                if !items.is_empty() && items.iter().all(Value::is_object) {
                    return 0.9;
                }
            }
        }
        if map.keys().any(|key| key_looks_like_metadata(key)) {
            return 0.7;
        }
    }
    0.8
}

/// Whether two response structures are compatible enough to be compared.
pub fn are_structures_compatible(a: &ResponseStructure, b: &ResponseStructure) -> bool {
    if a.is_array != b.is_array {
        return false;
    }
    if a.data_path != b.data_path {
        return false;
    }
    true
}
