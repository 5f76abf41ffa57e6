//! Shared regex library and confidence formulas.
//!
//! All semantic string patterns and the canonical pagination/PK/FK name
//! lists live here in one place, compiled once
//! via `once_cell::sync::Lazy`, the same idiom the teacher crate's
//! `FORMAT_VALIDATORS` uses. Confidence is centralized here too so no analyzer invents its own
//! formula.

use once_cell::sync::Lazy;
use regex::Regex;

/// Semantic string pattern tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternTag {
    Uuid,
    ObjectId,
    Email,
    Url,
    Uri,
    Ipv4,
    DateTimeIso,
    DateIso,
    Time,
    DateUs,
    DateEu,
    DateDash,
    DateDot,
    Json,
    PlainString,
}

impl PatternTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternTag::Uuid => "uuid",
            PatternTag::ObjectId => "object-id",
            PatternTag::Email => "email",
            PatternTag::Url => "url",
            PatternTag::Uri => "uri",
            PatternTag::Ipv4 => "ipv4",
            PatternTag::DateTimeIso => "iso-datetime",
            PatternTag::DateIso => "iso-date",
            PatternTag::Time => "time",
            PatternTag::DateUs => "date-us",
            PatternTag::DateEu => "date-eu",
            PatternTag::DateDash => "date-dash",
            PatternTag::DateDot => "date-dot",
            PatternTag::Json => "json",
            PatternTag::PlainString => "string",
        }
    }
}

struct PatternLibrary {
    uuid: Regex,
    object_id: Regex,
    email: Regex,
    url: Regex,
    iso_datetime: Regex,
    iso_date: Regex,
    time: Regex,
    date_us: Regex,
    date_eu: Regex,
    date_dash: Regex,
    date_dot: Regex,

    pk_name: Regex,
    fk_suffix: Regex,
    fk_prefix: Regex,
}

static PATTERNS: Lazy<PatternLibrary> = Lazy::new(|| PatternLibrary {
    uuid: Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
    )
    .unwrap(),
    object_id: Regex::new(r"^[0-9a-fA-F]{24}$").unwrap(),
    email: Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap(),
    url: Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap(),
    iso_datetime: Regex::new(
        r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?$",
    )
    .unwrap(),
    iso_date: Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap(),
    time: Regex::new(r"^\d{2}:\d{2}(:\d{2})?$").unwrap(),
    date_us: Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").unwrap(),
    date_eu: Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}$").unwrap(),
    date_dash: Regex::new(r"^\d{4}/\d{1,2}/\d{1,2}$").unwrap(),
    date_dot: Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$").unwrap(),

    pk_name: Regex::new(r"(?i)^(id|_id|pk|primary_key|uuid|guid|key)$").unwrap(),
    fk_suffix: Regex::new(r"(?i).+(_id|Id|ID|_ID)$").unwrap(),
    fk_prefix: Regex::new(r"(?i)^(id_|fk_|ref_).+$").unwrap(),
});

pub fn is_uuid(s: &str) -> bool {
    PATTERNS.uuid.is_match(s)
}

pub fn is_object_id(s: &str) -> bool {
    PATTERNS.object_id.is_match(s)
}

pub fn is_email(s: &str) -> bool {
    PATTERNS.email.is_match(s)
}

pub fn is_url(s: &str) -> bool {
    PATTERNS.url.is_match(s)
}

pub fn is_iso_datetime(s: &str) -> bool {
    PATTERNS.iso_datetime.is_match(s)
}

pub fn is_iso_date(s: &str) -> bool {
    PATTERNS.iso_date.is_match(s)
}

pub fn is_time(s: &str) -> bool {
    PATTERNS.time.is_match(s)
}

pub fn is_known_date_format(s: &str) -> bool {
    PATTERNS.date_us.is_match(s)
        || PATTERNS.date_eu.is_match(s)
        || PATTERNS.date_dash.is_match(s)
        || PATTERNS.date_dot.is_match(s)
}

pub fn is_json_like(s: &str) -> bool {
    let trimmed = s.trim();
    let looks_like = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    looks_like && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
}

pub fn matches_primary_key_name(name: &str) -> bool {
    PATTERNS.pk_name.is_match(name)
}

pub fn matches_foreign_key_name(name: &str) -> bool {
    PATTERNS.fk_suffix.is_match(name) || PATTERNS.fk_prefix.is_match(name)
}

/// Canonical key-name sets used by the Pagination and Structure Analyzers
///. Kept as plain slices rather than regexes: these are
/// membership/substring tests against known key vocabularies, not pattern
/// matches against arbitrary strings.
pub mod keys {
    pub const OFFSET_PARAMS: &[&str] = &["offset", "skip", "start", "from"];
    pub const LIMIT_PARAMS: &[&str] = &["limit", "per_page", "perPage", "pageSize", "size", "count", "take"];
    pub const PAGE_PARAMS: &[&str] = &["page", "pageNumber", "p"];
    pub const CURSOR_PARAMS: &[&str] = &["cursor", "after", "before", "next", "continuation", "nextToken"];

    pub const DATA_PATH_CANDIDATES: &[&str] = &[
        "data", "results", "items", "records", "content", "rows", "list", "entries", "objects",
        "documents",
    ];

    pub const CURSOR_RESPONSE_PATHS: &[&str] =
        &["cursor", "next_cursor", "nextCursor", "next_token", "nextToken", "next", "nextPage"];
    pub const TOTAL_PATHS: &[&str] = &["total", "totalCount", "total_count", "count"];
    pub const HAS_MORE_PATHS: &[&str] = &["hasMore", "has_more", "hasNext", "has_next"];

    pub const META_KEYWORDS: &[&str] = &[
        "total", "count", "page", "limit", "offset", "cursor", "next", "prev", "hasMore",
        "has_more", "meta", "pagination", "links",
    ];

    pub const PK_NAME_CANDIDATES: &[&str] = &["id", "_id", "ID", "pk", "uuid", "guid"];

    pub const TITLE_FIELD_NAMES: &[&str] = &["title", "name", "subject"];
    pub const DESCRIPTION_FIELD_NAMES: &[&str] = &["description", "content", "body"];
    pub const EVENT_TITLE_FIELD_NAMES: &[&str] = &["title", "name", "event"];
    pub const LATITUDE_FIELD_NAMES: &[&str] = &["lat", "latitude", "geo_lat"];
    pub const LONGITUDE_FIELD_NAMES: &[&str] = &["lng", "lon", "longitude", "geo_lng", "geo_lon"];
    pub const STATUS_FIELD_SUBSTRINGS: &[&str] = &["status", "state", "stage"];
}

/// Centralized confidence formulas. All return values are in
/// `[0.0, 0.95]` except `type_confidence`, which the spec caps at `0.99`.

pub fn type_confidence(matching: usize, non_null: usize) -> f64 {
    if non_null == 0 {
        return 0.0;
    }
    let ratio = matching as f64 / non_null as f64;
    let size_term = (non_null as f64 + 1.0).log10().min(1.0) / 2.0;
    (ratio * 0.8 + ratio * size_term * 0.2).min(0.99)
}

pub fn enum_confidence(unique: usize, sample_count: usize, max_enum_values: usize, repeat_ratio: f64) -> f64 {
    let rarity_term = (1.0 - unique as f64 / max_enum_values as f64) * 0.3;
    let repeat_term = repeat_ratio * 0.5;
    let size_term = (sample_count as f64 / 10.0).min(1.0) * 0.2;
    (rarity_term + repeat_term + size_term).clamp(0.0, 0.95)
}

pub fn relationship_confidence(name_score: f64, type_score: f64, _reserved: f64) -> f64 {
    (name_score * 0.5 + type_score * 0.3).min(0.95)
}

pub fn pagination_confidence(indicators: usize, max_indicators: usize) -> f64 {
    if max_indicators == 0 {
        return 0.0;
    }
    let ratio = indicators as f64 / max_indicators as f64;
    if indicators < 2 {
        ratio * 0.5
    } else {
        (0.5 + ratio * 0.45).min(0.95)
    }
}

pub fn adjust_for_sample_size(confidence: f64, sample_count: usize, k: usize) -> f64 {
    if sample_count >= k {
        confidence
    } else {
        confidence * (0.5 + 0.5 * sample_count as f64 / k as f64)
    }
}

pub fn clamp_confidence(value: f64) -> f64 {
    value.clamp(0.0, 0.95)
}
