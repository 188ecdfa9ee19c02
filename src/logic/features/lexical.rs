//! Lexical Features
//!
//! String-level measurements over the raw URL. These never depend on a
//! successful parse, which keeps the heuristic tier useful for malformed
//! input.

use once_cell::sync::Lazy;
use regex::Regex;

use super::extractor::{FeatureExtractor, UrlParts};
use super::vector::FeatureVector;

/// Lure words commonly found in phishing URLs
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "phish", "login", "signin", "verify", "account", "secure", "update",
    "bank", "confirm", "password", "webscr", "paypal", "wallet", "suspend",
];

/// Characters counted by `special_char_count`
const SPECIAL_CHARS: &[char] = &['~', '%', '=', '&', '_', '!', '*'];

/// Dotted-quad anywhere in the string, for input the parser rejected
static RAW_IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[/@:])\d{1,3}(\.\d{1,3}){3}($|[/:?#])").expect("static regex")
});

pub struct LexicalFeatures;

impl LexicalFeatures {
    /// Number of distinct lure keywords present
    pub fn keyword_count(lower: &str) -> usize {
        SUSPICIOUS_KEYWORDS.iter().filter(|k| lower.contains(*k)).count()
    }
}

impl FeatureExtractor for LexicalFeatures {
    fn extract(&self, parts: &UrlParts<'_>, vector: &mut FeatureVector) {
        let raw = parts.raw;
        let lower = raw.to_lowercase();

        let digit_count = raw.chars().filter(|c| c.is_ascii_digit()).count();

        vector.set_by_name("url_length", raw.chars().count() as f32);
        vector.set_by_name("dot_count", raw.matches('.').count() as f32);
        vector.set_by_name("has_digit", flag(digit_count > 0));
        vector.set_by_name("has_http_token", flag(raw.contains("http")));
        vector.set_by_name("digit_count", digit_count as f32);
        vector.set_by_name("has_at_symbol", flag(raw.contains('@')));
        vector.set_by_name("uses_https", flag(parts.scheme == "https"));
        vector.set_by_name("suspicious_keyword_count", Self::keyword_count(&lower) as f32);
        vector.set_by_name(
            "special_char_count",
            raw.chars().filter(|c| SPECIAL_CHARS.contains(c)).count() as f32,
        );

        if parts.host.is_empty() && RAW_IPV4.is_match(raw) {
            vector.set_by_name("is_ip_host", 1.0);
        }
    }
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}
