//! Detection logic
//!
//! Everything below the HTTP boundary: feature extraction, model registry,
//! classification and known-threat reference data.

pub mod external_intel;
pub mod features;
pub mod model;
pub mod threat;
