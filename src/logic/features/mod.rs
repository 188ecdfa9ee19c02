//! Features Module - URL Feature Extraction Engine
//!
//! Derives the fixed-width, versioned numeric vector every classifier tier
//! consumes. Adding a feature means touching `layout.rs` and one extractor.

pub mod layout;
pub mod vector;
pub mod extractor;
pub mod lexical;
pub mod host;


// Re-export common types
pub use layout::{FEATURE_COUNT, FEATURE_VERSION, FEATURE_LAYOUT, LayoutInfo, LayoutMismatchError, layout_hash};
pub use vector::FeatureVector;
pub use extractor::{extract, extract_parts, FeatureExtractor, UrlParts};
