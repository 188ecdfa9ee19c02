//! URL Feature Extractor
//!
//! Turns a raw URL string into a `FeatureVector`. Extraction is total:
//! unparsable input still yields a vector, with the missing components
//! measured as zero-length.

use url::{Host, ParseError, Url};

use super::host::HostFeatures;
use super::lexical::LexicalFeatures;
use super::vector::FeatureVector;

/// Trait for feature extractors
pub trait FeatureExtractor {
    /// Extract features and update the vector
    fn extract(&self, parts: &UrlParts<'_>, vector: &mut FeatureVector);
}

/// Components of a URL after best-effort parsing
#[derive(Debug, Clone, Default)]
pub struct UrlParts<'a> {
    /// Input exactly as received
    pub raw: &'a str,
    pub scheme: String,
    pub host: String,
    pub is_ip: bool,
    pub path: String,
    pub query: String,
}

impl<'a> UrlParts<'a> {
    /// Parse `raw`, retrying as `http://<raw>` when the scheme is missing.
    pub fn parse(raw: &'a str) -> Self {
        let trimmed = raw.trim();

        let parsed = match Url::parse(trimmed) {
            Ok(url) if url.host().is_none() && !trimmed.contains("://") => {
                Url::parse(&format!("http://{}", trimmed)).or(Ok(url))
            }
            Err(ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&format!("http://{}", trimmed))
            }
            other => other,
        };

        match parsed {
            Ok(url) => {
                let (host, is_ip) = match url.host() {
                    Some(Host::Domain(d)) => (d.to_lowercase(), false),
                    Some(Host::Ipv4(ip)) => (ip.to_string(), true),
                    Some(Host::Ipv6(ip)) => (ip.to_string(), true),
                    None => (String::new(), false),
                };

                // "/" is what the parser inserts for an empty path
                let path = match url.path() {
                    "/" => String::new(),
                    p => p.to_string(),
                };

                Self {
                    raw,
                    scheme: url.scheme().to_string(),
                    host,
                    is_ip,
                    path,
                    query: url.query().unwrap_or_default().to_string(),
                }
            }
            Err(e) => {
                tracing::debug!("Unparsable URL ({}), measuring raw string only", e);
                Self {
                    raw,
                    ..Default::default()
                }
            }
        }
    }
}

/// Extract the full feature vector from a raw URL
pub fn extract(url: &str) -> FeatureVector {
    extract_parts(&UrlParts::parse(url))
}

/// Extract from already-parsed components
pub fn extract_parts(parts: &UrlParts<'_>) -> FeatureVector {
    let mut vector = FeatureVector::new();

    LexicalFeatures.extract(parts, &mut vector);
    HostFeatures.extract(parts, &mut vector);

    vector
}
