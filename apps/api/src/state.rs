use std::sync::Arc;

use crate::agent::orchestrator::Orchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the context store, usage records and provider handle.
    pub orchestrator: Arc<Orchestrator>,
}
