//! PhishGuard - phishing URL classification service
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        PHISHGUARD                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │   POST /api/check-url                                       │
//! │          │                                                  │
//! │          ▼                                                  │
//! │   ┌─────────────┐   ┌──────────────────────────────────┐    │
//! │   │  Feature    │──▶│  Classification Engine           │    │
//! │   │  Extractor  │   │   1. current model (registry)    │    │
//! │   └─────────────┘   │   2. heuristic rules (fallback)  │    │
//! │                     └───────────────┬──────────────────┘    │
//! │                                     ▼                       │
//! │   ┌─────────────┐            ┌─────────────┐                │
//! │   │ Threat Feed │──zero-day─▶│  Decision   │                │
//! │   └─────────────┘            └─────────────┘                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use logic::external_intel::{ThreatIntel, ThreatReference};
use logic::model::ModelRegistry;
use logic::threat::{ClassificationEngine, HeuristicRuleSet};

pub use config::Config;
pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ClassificationEngine>,
    pub intel: Arc<ThreatIntel>,
    pub config: Config,
}

impl AppState {
    /// Wire registry, rules and feeds from configuration
    ///
    /// A model that fails to load is logged and the service starts
    /// heuristic-only. A broken rule table is fatal.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let registry = Arc::new(ModelRegistry::new());

        if let Some(path) = &config.model_path {
            match registry.load(path, config.model_schema_version) {
                Ok(handle) => tracing::info!("Loaded model {} from {}", handle.version, path.display()),
                Err(e) => tracing::warn!("Model unavailable, running heuristic-only: {}", e),
            }
        } else {
            tracing::info!("MODEL_PATH not set, running heuristic-only");
        }

        let rules = match &config.heuristic_rules_path {
            Some(path) => HeuristicRuleSet::from_file(path)?,
            None => HeuristicRuleSet::default(),
        };

        let intel = Arc::new(ThreatIntel::new(config.feed_sources()));
        let engine = ClassificationEngine::new(
            registry,
            rules,
            Arc::clone(&intel) as Arc<dyn ThreatReference>,
            config.inference_timeout,
        )?;

        Ok(Self {
            engine: Arc::new(engine),
            intel,
            config,
        })
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/check-url", post(handlers::check::check_url))
        .route("/api/status", get(handlers::status::status))
        .route("/api/model", get(handlers::model::current));

    // Admin routes (bearer ADMIN_TOKEN)
    let admin_routes = Router::new()
        .route("/api/admin/model/reload", post(handlers::model::reload))
        .route("/api/admin/model/load", post(handlers::model::load))
        .route("/api/admin/model/activate", post(handlers::model::activate))
        .route("/api/admin/feeds/sync", post(handlers::feeds::sync))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
