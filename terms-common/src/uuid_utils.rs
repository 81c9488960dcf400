//! UUID utilities

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Canonical textual UUID: version nibble 1-5, RFC 4122 variant nibble
static CANONICAL_UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("static UUID pattern compiles")
});

/// Generate a new UUIDv4 in the lowercase hyphenated form stored in records
pub fn generate_string() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// True when `s` is an 8-4-4-4-12 hex UUID with version 1-5 and variant 8/9/a/b
///
/// Stricter than `Uuid::parse_str`: braces, URNs, simple (unhyphenated) forms, the nil
/// UUID and versions 0 or 6+ are all rejected.
pub fn is_canonical(s: &str) -> bool {
    CANONICAL_UUID.is_match(s)
}
