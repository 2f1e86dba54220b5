use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::assessment::AssessmentRow;
use crate::models::employee::{EmployeeRow, EmployeeStatus};
use crate::response::{ApiResponse, ListResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListQuery {
    pub store: Option<Uuid>,
    pub position: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub store: Uuid,
    pub hire_date: NaiveDate,
    pub department: Option<String>,
    pub status: Option<EmployeeStatus>,
}

/// Update payload. `currentLevel` and `lastAssessmentDate` are deliberately
/// not writable here: the assessment-save synchronizer is their only writer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    pub employee_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub store: Option<Uuid>,
    pub hire_date: Option<NaiveDate>,
    pub department: Option<String>,
    pub status: Option<EmployeeStatus>,
}

#[derive(Debug, Serialize)]
pub struct EmployeeDetail {
    pub employee: EmployeeRow,
    pub assessments: Vec<AssessmentRow>,
}

/// GET /api/v1/employees
pub async fn handle_list_employees(
    State(state): State<AppState>,
    _actor: Actor,
    Query(params): Query<EmployeeListQuery>,
) -> Result<Json<ListResponse<EmployeeRow>>, AppError> {
    let search = params.search.map(|s| format!("%{s}%"));

    let employees: Vec<EmployeeRow> = sqlx::query_as(
        r#"
        SELECT * FROM employees
        WHERE ($1::uuid IS NULL OR store_id = $1)
          AND ($2::text IS NULL OR position = $2)
          AND ($3::text IS NULL OR status = $3)
          AND ($4::text IS NULL
               OR name ILIKE $4 OR employee_id ILIKE $4 OR email ILIKE $4)
        ORDER BY created_at DESC
        "#,
    )
    .bind(params.store)
    .bind(params.position)
    .bind(params.status)
    .bind(search)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ListResponse::new(employees)))
}

/// GET /api/v1/employees/:id
/// Returns the employee together with their assessments, newest first.
pub async fn handle_get_employee(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EmployeeDetail>>, AppError> {
    let employee = fetch_employee(&state, id).await?;

    let assessments: Vec<AssessmentRow> = sqlx::query_as(
        "SELECT * FROM assessments WHERE employee_id = $1 ORDER BY assessment_date DESC",
    )
    .bind(id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ApiResponse::new(EmployeeDetail {
        employee,
        assessments,
    })))
}

/// POST /api/v1/employees
pub async fn handle_create_employee(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EmployeeRow>>), AppError> {
    if !actor.can_manage() {
        return Err(AppError::Forbidden);
    }

    let duplicate_id: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM employees WHERE employee_id = $1")
            .bind(&req.employee_id)
            .fetch_optional(&state.db)
            .await?;
    if duplicate_id.is_some() {
        return Err(AppError::Conflict(format!(
            "Employee id '{}' already exists",
            req.employee_id
        )));
    }

    let duplicate_email: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM employees WHERE email = $1")
            .bind(&req.email)
            .fetch_optional(&state.db)
            .await?;
    if duplicate_email.is_some() {
        return Err(AppError::Conflict(format!(
            "Email '{}' is already in use",
            req.email
        )));
    }

    let status = req.status.unwrap_or(EmployeeStatus::Active);

    let employee: EmployeeRow = sqlx::query_as(
        r#"
        INSERT INTO employees
            (employee_id, name, email, phone, position, store_id,
             hire_date, department, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(&req.employee_id)
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.position)
    .bind(req.store)
    .bind(req.hire_date)
    .bind(&req.department)
    .bind(status.as_str())
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(employee))))
}

/// PUT /api/v1/employees/:id
pub async fn handle_update_employee(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEmployeeRequest>,
) -> Result<Json<ApiResponse<EmployeeRow>>, AppError> {
    if !actor.can_manage() {
        return Err(AppError::Forbidden);
    }

    let employee: Option<EmployeeRow> = sqlx::query_as(
        r#"
        UPDATE employees
        SET employee_id = COALESCE($2, employee_id),
            name = COALESCE($3, name),
            email = COALESCE($4, email),
            phone = COALESCE($5, phone),
            position = COALESCE($6, position),
            store_id = COALESCE($7, store_id),
            hire_date = COALESCE($8, hire_date),
            department = COALESCE($9, department),
            status = COALESCE($10, status),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.employee_id)
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.position)
    .bind(req.store)
    .bind(req.hire_date)
    .bind(&req.department)
    .bind(req.status.map(|s| s.as_str()))
    .fetch_optional(&state.db)
    .await?;

    let employee = employee.ok_or_else(|| AppError::NotFound(format!("Employee {id} not found")))?;
    Ok(Json(ApiResponse::new(employee)))
}

/// DELETE /api/v1/employees/:id
///
/// Removes the employee's assessments first — an explicit cleanup step, not
/// a storage-level cascade.
pub async fn handle_delete_employee(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }

    fetch_employee(&state, id).await?;

    sqlx::query("DELETE FROM assessments WHERE employee_id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Employee deleted"
    })))
}

async fn fetch_employee(state: &AppState, id: Uuid) -> Result<EmployeeRow, AppError> {
    let employee: Option<EmployeeRow> = sqlx::query_as("SELECT * FROM employees WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;

    employee.ok_or_else(|| AppError::NotFound(format!("Employee {id} not found")))
}
