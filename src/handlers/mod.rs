//! HTTP handlers

pub mod health;
pub mod check;
pub mod status;
pub mod model;
pub mod feeds;
