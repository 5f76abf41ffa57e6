//! Pagination pattern detection from response body, request params, and
//! response headers.
//!
//! No close analog exists in the corpus — qsv and flowplane infer schemas,
//! not pagination — so this module is grounded directly in spec §4.8's
//! formulas rather than in ported code.

use crate::config::EngineConfig;
use crate::patterns::{self, keys};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationType {
    None,
    Offset,
    Page,
    Cursor,
}

impl PaginationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaginationType::None => "none",
            PaginationType::Offset => "offset",
            PaginationType::Page => "page",
            PaginationType::Cursor => "cursor",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaginationConfig {
    pub data_path: Option<String>,
    pub total_path: Option<String>,
    pub has_more_path: Option<String>,
    pub next_cursor_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaginationAnalysis {
    pub detected: bool,
    pub pagination_type: PaginationType,
    pub confidence: f64,
    pub config: Option<PaginationConfig>,
}

fn contains_ci(haystack: &[String], needle: &str) -> bool {
    haystack.iter().any(|k| k.eq_ignore_ascii_case(needle))
}

fn any_param_matches(params: &[String], candidates: &[&str]) -> bool {
    candidates.iter().any(|candidate| contains_ci(params, candidate))
}

/// Breadth-first search for the first object, at or below `max_depth`
/// levels deep, that carries one of `candidates` as a direct key. Shallower
/// matches always win over deeper ones because the whole current level is
/// exhausted before any child is queued.
fn find_path(body: &Value, candidates: &[&str], max_depth: usize) -> Option<String> {
    let mut queue: VecDeque<(&Value, String, usize)> = VecDeque::new();
    queue.push_back((body, String::new(), 0));

    while let Some((value, prefix, depth)) = queue.pop_front() {
        let Value::Object(map) = value else { continue };

        for candidate in candidates {
            if map.contains_key(*candidate) {
                return Some(if prefix.is_empty() {
                    (*candidate).to_string()
                } else {
                    format!("{prefix}.{candidate}")
                });
            }
        }

        if depth < max_depth {
            for (key, nested) in map {
                if nested.is_object() {
                    let child_prefix = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                    queue.push_back((nested, child_prefix, depth + 1));
                }
            }
        }
    }

    None
}

/// Same bounded breadth-first search as [`find_path`], but looking for a
/// non-empty array rather than any key presence.
fn find_data_path(body: &Value, max_depth: usize) -> Option<String> {
    let mut queue: VecDeque<(&Value, String, usize)> = VecDeque::new();
    queue.push_back((body, String::new(), 0));

    while let Some((value, prefix, depth)) = queue.pop_front() {
        let Value::Object(map) = value else { continue };

        for key in keys::DATA_PATH_CANDIDATES {
            if let Some(Value::Array(items)) = map.get(*key) {
                if !items.is_empty() {
                    return Some(if prefix.is_empty() {
                        (*key).to_string()
                    } else {
                        format!("{prefix}.{key}")
                    });
                }
            }
        }

        if depth < max_depth {
            for (key, nested) in map {
                if nested.is_object() {
                    let child_prefix = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                    queue.push_back((nested, child_prefix, depth + 1));
                }
            }
        }
    }

    None
}

fn has_link_header_next(headers: &HashMap<String, String>) -> bool {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("link"))
        .map(|(_, v)| v.contains("rel=\"next\"") || v.contains("rel=next"))
        .unwrap_or(false)
}

/// Detect the pagination pattern exposed by a response.
///
/// `request_params` are the query/body parameter names sent with the
/// request (case-insensitive membership tests only); `headers` map header
/// name to value. Response-body lookups (data path, total/has-more/cursor
/// paths) recurse into nested wrapper objects up to
/// `config.pagination_recursion_depth` levels, so a body like
/// `{"data": [...], "pagination": {"total": 100, "has_more": true}}` is
/// found even though `total`/`has_more` aren't top-level keys.
pub fn detect_pagination(
    body: &Value,
    request_params: &[String],
    headers: &HashMap<String, String>,
    config: &EngineConfig,
) -> PaginationAnalysis {
    let max_depth = config.pagination_recursion_depth;

    let has_offset_param = any_param_matches(request_params, keys::OFFSET_PARAMS);
    let has_limit_param = any_param_matches(request_params, keys::LIMIT_PARAMS);
    let has_page_param = any_param_matches(request_params, keys::PAGE_PARAMS);
    let has_cursor_param = any_param_matches(request_params, keys::CURSOR_PARAMS);

    let cursor_path = find_path(body, keys::CURSOR_RESPONSE_PATHS, max_depth);
    let has_cursor_in_response = cursor_path.is_some();
    let has_link_next = has_link_header_next(headers);

    let total_path = find_path(body, keys::TOTAL_PATHS, max_depth);
    let has_more_path = find_path(body, keys::HAS_MORE_PATHS, max_depth);
    let data_path = find_data_path(body, max_depth);

    let indicators = [
        has_offset_param,
        has_limit_param,
        has_page_param,
        has_cursor_param,
        has_cursor_in_response,
        has_link_next,
        total_path.is_some(),
        has_more_path.is_some(),
        data_path.is_some(),
    ]
    .iter()
    .filter(|b| **b)
    .count();
    const MAX_INDICATORS: usize = 9;

    let any_hint = has_offset_param
        || has_limit_param
        || has_page_param
        || has_cursor_param
        || has_cursor_in_response
        || has_link_next
        || total_path.is_some()
        || has_more_path.is_some();

    if !any_hint && data_path.is_none() {
        trace!("no pagination indicators found; treating response as unpaginated");
        return PaginationAnalysis {
            detected: false,
            pagination_type: PaginationType::None,
            confidence: 0.9,
            config: None,
        };
    }

    let pagination_type = if has_cursor_in_response || has_cursor_param {
        PaginationType::Cursor
    } else if has_page_param {
        PaginationType::Page
    } else if has_offset_param {
        PaginationType::Offset
    } else if data_path.is_some() && (total_path.is_some() || has_more_path.is_some()) {
        PaginationType::Offset
    } else {
        PaginationType::None
    };

    let confidence = patterns::pagination_confidence(indicators, MAX_INDICATORS);

    if pagination_type == PaginationType::None {
        trace!(indicators, "pagination indicators present but ambiguous; rejecting below threshold");
        return PaginationAnalysis { detected: false, pagination_type, confidence: 0.9, config: None };
    }

    debug!(?pagination_type, confidence, indicators, "pagination pattern accepted");

    PaginationAnalysis {
        detected: true,
        pagination_type,
        confidence,
        config: Some(PaginationConfig {
            data_path,
            total_path,
            has_more_path,
            next_cursor_path: cursor_path,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn no_hint_and_no_data_path_means_not_paginated() {
        let body = json!({"message": "ok"});
        let analysis = detect_pagination(&body, &[], &HashMap::new(), &cfg());
        assert!(!analysis.detected);
        assert_eq!(analysis.pagination_type, PaginationType::None);
        assert_eq!(analysis.confidence, 0.9);
    }

    #[test]
    fn page_param_wins_classification() {
        let body = json!({"results": [{"id": 1}], "total": 42, "page": 1, "per_page": 2, "has_more": true});
        let params = vec!["page".to_string()];
        let analysis = detect_pagination(&body, &params, &HashMap::new(), &cfg());
        assert!(analysis.detected);
        assert_eq!(analysis.pagination_type, PaginationType::Page);
    }

    #[test]
    fn ambiguous_paginated_response_defaults_to_offset() {
        let body = json!({"results": [{"id": 1}], "total": 42, "has_more": true});
        let analysis = detect_pagination(&body, &[], &HashMap::new(), &cfg());
        assert!(analysis.detected);
        assert_eq!(analysis.pagination_type, PaginationType::Offset);
        let config = analysis.config.unwrap();
        assert_eq!(config.data_path.as_deref(), Some("results"));
        assert_eq!(config.total_path.as_deref(), Some("total"));
        assert_eq!(config.has_more_path.as_deref(), Some("has_more"));
    }

    #[test]
    fn cursor_in_response_wins_over_offset() {
        let body = json!({"data": [{"id": 1}], "next_cursor": "abc123"});
        let analysis = detect_pagination(&body, &[], &HashMap::new(), &cfg());
        assert_eq!(analysis.pagination_type, PaginationType::Cursor);
    }

    #[test]
    fn detection_is_idempotent() {
        let body = json!({"results": [{"id": 1}], "total": 42, "page": 1});
        let params = vec!["page".to_string()];
        let first = detect_pagination(&body, &params, &HashMap::new(), &cfg());
        let second = detect_pagination(&body, &params, &HashMap::new(), &cfg());
        assert_eq!(first.detected, second.detected);
        assert_eq!(first.pagination_type, second.pagination_type);
        assert_eq!(first.confidence, second.confidence);
    }

    #[test]
    fn nested_metadata_is_found_by_recursion() {
        let body = json!({
            "data": [{"id": 1}, {"id": 2}],
            "pagination": {"total": 100, "has_more": true}
        });
        let analysis = detect_pagination(&body, &[], &HashMap::new(), &cfg());
        assert!(analysis.detected);
        assert_eq!(analysis.pagination_type, PaginationType::Offset);
        let config = analysis.config.unwrap();
        assert_eq!(config.data_path.as_deref(), Some("data"));
        assert_eq!(config.total_path.as_deref(), Some("pagination.total"));
        assert_eq!(config.has_more_path.as_deref(), Some("pagination.has_more"));
    }

    #[test]
    fn recursion_is_bounded_by_configured_depth() {
        let body = json!({
            "data": [{"id": 1}],
            "envelope": {"wrapper": {"meta": {"total": 100}}}
        });
        let mut shallow = cfg();
        shallow.pagination_recursion_depth = 1;
        let analysis = detect_pagination(&body, &[], &HashMap::new(), &shallow);
        assert!(analysis.config.unwrap().total_path.is_none());

        let mut deep = cfg();
        deep.pagination_recursion_depth = 3;
        let analysis = detect_pagination(&body, &[], &HashMap::new(), &deep);
        assert_eq!(analysis.config.unwrap().total_path.as_deref(), Some("envelope.wrapper.meta.total"));
    }
}
