pub mod health;

use axum::{routing::get, Router};

use crate::assessments::{handlers as assessments, reports};
use crate::competencies::handlers as competencies;
use crate::employees::{handlers as employees, stats};
use crate::positions::handlers as positions;
use crate::state::AppState;
use crate::stores::handlers as stores;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessments
        .route(
            "/api/v1/assessments",
            get(assessments::handle_list_assessments).post(assessments::handle_create_assessment),
        )
        .route(
            "/api/v1/assessments/reports/overview",
            get(reports::handle_reports_overview),
        )
        .route(
            "/api/v1/assessments/:id",
            get(assessments::handle_get_assessment)
                .put(assessments::handle_update_assessment)
                .delete(assessments::handle_delete_assessment),
        )
        // Employees
        .route(
            "/api/v1/employees",
            get(employees::handle_list_employees).post(employees::handle_create_employee),
        )
        .route(
            "/api/v1/employees/stats/overview",
            get(stats::handle_employee_stats),
        )
        .route(
            "/api/v1/employees/:id",
            get(employees::handle_get_employee)
                .put(employees::handle_update_employee)
                .delete(employees::handle_delete_employee),
        )
        // Competencies
        .route(
            "/api/v1/competencies",
            get(competencies::handle_list_competencies)
                .post(competencies::handle_create_competency),
        )
        .route(
            "/api/v1/competencies/categories",
            get(competencies::handle_list_categories),
        )
        .route(
            "/api/v1/competencies/:id",
            get(competencies::handle_get_competency)
                .put(competencies::handle_update_competency)
                .delete(competencies::handle_delete_competency),
        )
        // Stores
        .route(
            "/api/v1/stores",
            get(stores::handle_list_stores).post(stores::handle_create_store),
        )
        .route(
            "/api/v1/stores/:id",
            get(stores::handle_get_store)
                .put(stores::handle_update_store)
                .delete(stores::handle_delete_store),
        )
        .route("/api/v1/stores/:id/stats", get(stores::handle_store_stats))
        // Positions
        .route(
            "/api/v1/positions",
            get(positions::handle_list_positions).post(positions::handle_create_position),
        )
        .route(
            "/api/v1/positions/:id",
            get(positions::handle_get_position)
                .put(positions::handle_update_position)
                .delete(positions::handle_delete_position),
        )
        .with_state(state)
}
