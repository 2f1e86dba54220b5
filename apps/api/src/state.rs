use std::sync::Arc;

use sqlx::PgPool;

use crate::assessments::sync::EmployeeSummaryStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Single writer for the employee summary fields
    /// (`current_level`, `last_assessment_date`). Trait object so tests can
    /// substitute an in-memory store.
    pub summary_store: Arc<dyn EmployeeSummaryStore>,
}
