use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::competency::CompetencyRow;
use crate::response::{ApiResponse, ListResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyListQuery {
    pub category: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompetencyRequest {
    pub code: String,
    pub name: String,
    pub name_vi: String,
    pub definition: String,
    pub category: String,
    pub level1: Option<String>,
    pub level2: Option<String>,
    pub level3: Option<String>,
    pub level4: Option<String>,
    pub evidence: Option<String>,
    pub training_method: Option<String>,
    #[serde(default)]
    pub applicable_positions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompetencyRequest {
    pub name: Option<String>,
    pub name_vi: Option<String>,
    pub definition: Option<String>,
    pub category: Option<String>,
    pub level1: Option<String>,
    pub level2: Option<String>,
    pub level3: Option<String>,
    pub level4: Option<String>,
    pub evidence: Option<String>,
    pub training_method: Option<String>,
    pub applicable_positions: Option<Vec<String>>,
}

/// GET /api/v1/competencies
pub async fn handle_list_competencies(
    State(state): State<AppState>,
    _actor: Actor,
    Query(params): Query<CompetencyListQuery>,
) -> Result<Json<ListResponse<CompetencyRow>>, AppError> {
    let competencies: Vec<CompetencyRow> = sqlx::query_as(
        r#"
        SELECT * FROM competencies
        WHERE ($1::text IS NULL OR category = $1)
          AND ($2::text IS NULL OR $2 = ANY(applicable_positions))
        ORDER BY code
        "#,
    )
    .bind(params.category)
    .bind(params.position)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ListResponse::new(competencies)))
}

/// GET /api/v1/competencies/categories
pub async fn handle_list_categories(
    State(state): State<AppState>,
    _actor: Actor,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let categories: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT category FROM competencies ORDER BY category")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(ApiResponse::new(categories)))
}

/// GET /api/v1/competencies/:id
pub async fn handle_get_competency(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CompetencyRow>>, AppError> {
    let competency: Option<CompetencyRow> =
        sqlx::query_as("SELECT * FROM competencies WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?;

    let competency =
        competency.ok_or_else(|| AppError::NotFound(format!("Competency {id} not found")))?;
    Ok(Json(ApiResponse::new(competency)))
}

/// POST /api/v1/competencies
pub async fn handle_create_competency(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateCompetencyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CompetencyRow>>), AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }

    let duplicate: Option<Uuid> = sqlx::query_scalar("SELECT id FROM competencies WHERE code = $1")
        .bind(&req.code)
        .fetch_optional(&state.db)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict(format!(
            "Competency code '{}' already exists",
            req.code
        )));
    }

    let competency: CompetencyRow = sqlx::query_as(
        r#"
        INSERT INTO competencies
            (code, name, name_vi, definition, category,
             level1, level2, level3, level4,
             evidence, training_method, applicable_positions)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(&req.code)
    .bind(&req.name)
    .bind(&req.name_vi)
    .bind(&req.definition)
    .bind(&req.category)
    .bind(&req.level1)
    .bind(&req.level2)
    .bind(&req.level3)
    .bind(&req.level4)
    .bind(&req.evidence)
    .bind(&req.training_method)
    .bind(&req.applicable_positions)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(competency))))
}

/// PUT /api/v1/competencies/:id
pub async fn handle_update_competency(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCompetencyRequest>,
) -> Result<Json<ApiResponse<CompetencyRow>>, AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }

    let competency: Option<CompetencyRow> = sqlx::query_as(
        r#"
        UPDATE competencies
        SET name = COALESCE($2, name),
            name_vi = COALESCE($3, name_vi),
            definition = COALESCE($4, definition),
            category = COALESCE($5, category),
            level1 = COALESCE($6, level1),
            level2 = COALESCE($7, level2),
            level3 = COALESCE($8, level3),
            level4 = COALESCE($9, level4),
            evidence = COALESCE($10, evidence),
            training_method = COALESCE($11, training_method),
            applicable_positions = COALESCE($12, applicable_positions),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.name_vi)
    .bind(&req.definition)
    .bind(&req.category)
    .bind(&req.level1)
    .bind(&req.level2)
    .bind(&req.level3)
    .bind(&req.level4)
    .bind(&req.evidence)
    .bind(&req.training_method)
    .bind(&req.applicable_positions)
    .fetch_optional(&state.db)
    .await?;

    let competency =
        competency.ok_or_else(|| AppError::NotFound(format!("Competency {id} not found")))?;
    Ok(Json(ApiResponse::new(competency)))
}

/// DELETE /api/v1/competencies/:id
pub async fn handle_delete_competency(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }

    let result = sqlx::query("DELETE FROM competencies WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Competency {id} not found")));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Competency deleted"
    })))
}
