use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::assessments::scoring::{
    normalize_ratings_for_create, normalize_ratings_for_update, score_and_classify,
};
use crate::assessments::sync::sync_after_save;
use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::assessment::{AssessmentRow, AssessmentStatus, CompetencyRatingInput};
use crate::response::{ApiResponse, ListResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentListQuery {
    pub employee: Option<Uuid>,
    pub evaluator: Option<Uuid>,
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssessmentRequest {
    /// Required; surfaced as a validation failure rather than a parse error
    /// so the client gets the same 400 contract as the rest of the API.
    pub employee: Option<Uuid>,
    pub assessment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub competency_ratings: Vec<CompetencyRatingInput>,
    pub status: Option<AssessmentStatus>,
    pub notes: Option<String>,
}

/// Update payload. `employee` and `evaluator` are immutable after creation
/// and deliberately absent here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssessmentRequest {
    pub assessment_date: Option<DateTime<Utc>>,
    pub competency_ratings: Option<Vec<CompetencyRatingInput>>,
    pub status: Option<AssessmentStatus>,
    pub notes: Option<String>,
}

/// Save response. The assessment commit and the employee-summary write are
/// two sequential operations with no cross-record transaction; when the
/// second fails the assessment stays committed and `employeeSynced`/`syncError`
/// tell the caller the summary may be stale.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSaveResponse {
    pub success: bool,
    pub data: AssessmentRow,
    pub employee_synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<String>,
}

/// GET /api/v1/assessments
pub async fn handle_list_assessments(
    State(state): State<AppState>,
    _actor: Actor,
    Query(params): Query<AssessmentListQuery>,
) -> Result<Json<ListResponse<AssessmentRow>>, AppError> {
    let assessments: Vec<AssessmentRow> = sqlx::query_as(
        r#"
        SELECT * FROM assessments
        WHERE ($1::uuid IS NULL OR employee_id = $1)
          AND ($2::uuid IS NULL OR evaluator_id = $2)
          AND ($3::text IS NULL OR status = $3)
          AND ($4::timestamptz IS NULL OR assessment_date >= $4)
          AND ($5::timestamptz IS NULL OR assessment_date <= $5)
        ORDER BY assessment_date DESC
        "#,
    )
    .bind(params.employee)
    .bind(params.evaluator)
    .bind(params.status)
    .bind(params.start_date)
    .bind(params.end_date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ListResponse::new(assessments)))
}

/// GET /api/v1/assessments/:id
pub async fn handle_get_assessment(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AssessmentRow>>, AppError> {
    let assessment = fetch_assessment(&state, id).await?;
    Ok(Json(ApiResponse::new(assessment)))
}

/// POST /api/v1/assessments
///
/// Pipeline: validate → normalize ratings → score → commit assessment
/// (primary write) → employee summary sync (secondary write).
pub async fn handle_create_assessment(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateAssessmentRequest>,
) -> Result<(StatusCode, Json<AssessmentSaveResponse>), AppError> {
    if !actor.can_manage() {
        return Err(AppError::Forbidden);
    }

    let employee_id = req
        .employee
        .ok_or_else(|| AppError::Validation("employee is required".to_string()))?;

    let employee_exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM employees WHERE id = $1")
        .bind(employee_id)
        .fetch_optional(&state.db)
        .await?;
    if employee_exists.is_none() {
        return Err(AppError::NotFound(format!("Employee {employee_id} not found")));
    }

    let ratings = normalize_ratings_for_create(&req.competency_ratings);
    let outcome = score_and_classify(&ratings);
    let assessment_date = req.assessment_date.unwrap_or_else(Utc::now);
    let status = req.status.unwrap_or(AssessmentStatus::Completed);

    // Primary write. On failure nothing has been committed and no sync runs.
    let assessment: AssessmentRow = sqlx::query_as(
        r#"
        INSERT INTO assessments
            (employee_id, evaluator_id, assessment_date, competency_ratings,
             overall_score, classification, status, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(employee_id)
    .bind(actor.user_id)
    .bind(assessment_date)
    .bind(sqlx::types::Json(&ratings))
    .bind(outcome.overall_score)
    .bind(outcome.classification.map(|c| c.as_str()))
    .bind(status.as_str())
    .bind(&req.notes)
    .fetch_one(&state.db)
    .await?;

    let sync = sync_after_save(
        state.summary_store.as_ref(),
        employee_id,
        &outcome,
        assessment.assessment_date,
        true,
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(AssessmentSaveResponse {
            success: true,
            employee_synced: sync.synced(),
            sync_error: sync.error().map(str::to_string),
            data: assessment,
        }),
    ))
}

/// PUT /api/v1/assessments/:id
///
/// Mutable only by the owning evaluator or an admin. Ratings omitted from
/// the payload keep the stored set; the score and classification are always
/// recomputed from whatever the final rating set is.
pub async fn handle_update_assessment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAssessmentRequest>,
) -> Result<Json<AssessmentSaveResponse>, AppError> {
    if !actor.can_manage() {
        return Err(AppError::Forbidden);
    }

    let existing = fetch_assessment(&state, id).await?;

    if existing.evaluator_id != actor.user_id && !actor.is_admin() {
        return Err(AppError::Forbidden);
    }

    let ratings = match &req.competency_ratings {
        Some(inputs) => normalize_ratings_for_update(inputs, &existing.competency_ratings.0),
        None => existing.competency_ratings.0.clone(),
    };
    let outcome = score_and_classify(&ratings);
    let assessment_date = req.assessment_date.unwrap_or(existing.assessment_date);
    let status = req
        .status
        .map(|s| s.as_str().to_string())
        .unwrap_or(existing.status);
    let notes = req.notes.or(existing.notes);

    let assessment: AssessmentRow = sqlx::query_as(
        r#"
        UPDATE assessments
        SET assessment_date = $2,
            competency_ratings = $3,
            overall_score = $4,
            classification = $5,
            status = $6,
            notes = $7,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(assessment_date)
    .bind(sqlx::types::Json(&ratings))
    .bind(outcome.overall_score)
    .bind(outcome.classification.map(|c| c.as_str()))
    .bind(status)
    .bind(notes)
    .fetch_one(&state.db)
    .await?;

    // isCreate=false: last_assessment_date stays untouched even if
    // assessment_date changed.
    let sync = sync_after_save(
        state.summary_store.as_ref(),
        existing.employee_id,
        &outcome,
        assessment.assessment_date,
        false,
    )
    .await;

    Ok(Json(AssessmentSaveResponse {
        success: true,
        employee_synced: sync.synced(),
        sync_error: sync.error().map(str::to_string),
        data: assessment,
    }))
}

/// DELETE /api/v1/assessments/:id
///
/// Deletion does not recompute the employee's summary fields; they keep
/// reflecting the last saved assessment.
pub async fn handle_delete_assessment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }

    let result = sqlx::query("DELETE FROM assessments WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Assessment {id} not found")));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Assessment deleted"
    })))
}

async fn fetch_assessment(state: &AppState, id: Uuid) -> Result<AssessmentRow, AppError> {
    let assessment: Option<AssessmentRow> =
        sqlx::query_as("SELECT * FROM assessments WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?;

    assessment.ok_or_else(|| AppError::NotFound(format!("Assessment {id} not found")))
}
