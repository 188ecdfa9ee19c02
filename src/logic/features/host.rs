//! Host & Structure Features
//!
//! Measurements over the parsed components. Missing components are zero.

use std::collections::BTreeMap;

use super::extractor::{FeatureExtractor, UrlParts};
use super::vector::FeatureVector;

pub struct HostFeatures;

impl HostFeatures {
    /// Labels beyond the registrable `name.tld` pair
    pub fn subdomain_count(host: &str, is_ip: bool) -> usize {
        if is_ip || host.is_empty() {
            return 0;
        }
        host.trim_end_matches('.').split('.').count().saturating_sub(2)
    }

    /// Shannon entropy in bits per character
    ///
    /// Counts are kept ordered and summed in f64 so repeated calls are
    /// bit-identical.
    pub fn shannon_entropy(s: &str) -> f32 {
        if s.is_empty() {
            return 0.0;
        }

        let mut counts: BTreeMap<char, usize> = BTreeMap::new();
        let mut total = 0usize;
        for c in s.chars() {
            *counts.entry(c).or_insert(0) += 1;
            total += 1;
        }

        let total = total as f64;
        let entropy: f64 = counts.values()
            .map(|&n| {
                let p = n as f64 / total;
                -p * p.log2()
            })
            .sum();

        entropy as f32
    }
}

impl FeatureExtractor for HostFeatures {
    fn extract(&self, parts: &UrlParts<'_>, vector: &mut FeatureVector) {
        vector.set_by_name("host_length", parts.host.chars().count() as f32);
        vector.set_by_name("path_length", parts.path.chars().count() as f32);
        vector.set_by_name("query_length", parts.query.chars().count() as f32);
        vector.set_by_name(
            "subdomain_count",
            Self::subdomain_count(&parts.host, parts.is_ip) as f32,
        );
        vector.set_by_name("hyphen_count", parts.host.matches('-').count() as f32);
        vector.set_by_name("host_entropy", Self::shannon_entropy(&parts.host));

        if parts.is_ip {
            vector.set_by_name("is_ip_host", 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_count() {
        assert_eq!(HostFeatures::subdomain_count("example.com", false), 0);
        assert_eq!(HostFeatures::subdomain_count("a.b.c.example.com", false), 3);
        assert_eq!(HostFeatures::subdomain_count("localhost", false), 0);
        assert_eq!(HostFeatures::subdomain_count("10.0.0.1", true), 0);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(HostFeatures::shannon_entropy(""), 0.0);
        assert_eq!(HostFeatures::shannon_entropy("aaaa"), 0.0);
        assert!((HostFeatures::shannon_entropy("ab") - 1.0).abs() < 1e-6);
        assert!(HostFeatures::shannon_entropy("x7k2q9vz1m.info") > 3.5);
    }

    #[test]
    fn test_entropy_is_bit_identical_across_calls() {
        for host in ["phish-bank-login.com", "x7k2q9vz1m.info", "a.b.c.example.co.uk"] {
            let first = HostFeatures::shannon_entropy(host).to_bits();
            for _ in 0..200 {
                assert_eq!(HostFeatures::shannon_entropy(host).to_bits(), first, "{}", host);
            }
        }
    }

    #[test]
    fn test_host_measurements() {
        let parts = UrlParts::parse("https://secure-pay-login.example.com/path?q=1");
        let mut vector = FeatureVector::new();
        HostFeatures.extract(&parts, &mut vector);

        assert_eq!(vector.get_by_name("host_length"), Some(28.0));
        assert_eq!(vector.get_by_name("hyphen_count"), Some(2.0));
        assert_eq!(vector.get_by_name("subdomain_count"), Some(1.0));
        assert_eq!(vector.get_by_name("path_length"), Some(5.0));
        assert_eq!(vector.get_by_name("query_length"), Some(3.0));
    }
}
