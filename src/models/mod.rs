//! Request and response models

pub mod admin;
pub mod check;

pub use admin::*;
pub use check::*;
