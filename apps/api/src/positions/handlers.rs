use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::position::{PositionLevel, PositionRow};
use crate::response::{ApiResponse, ListResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePositionRequest {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub level: PositionLevel,
    #[serde(default)]
    pub required_competencies: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePositionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub level: Option<PositionLevel>,
    pub required_competencies: Option<Vec<Uuid>>,
}

/// GET /api/v1/positions
pub async fn handle_list_positions(
    State(state): State<AppState>,
    _actor: Actor,
) -> Result<Json<ListResponse<PositionRow>>, AppError> {
    let positions: Vec<PositionRow> = sqlx::query_as("SELECT * FROM positions ORDER BY code")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(ListResponse::new(positions)))
}

/// GET /api/v1/positions/:id
pub async fn handle_get_position(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PositionRow>>, AppError> {
    let position: Option<PositionRow> = sqlx::query_as("SELECT * FROM positions WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;

    let position = position.ok_or_else(|| AppError::NotFound(format!("Position {id} not found")))?;
    Ok(Json(ApiResponse::new(position)))
}

/// POST /api/v1/positions
pub async fn handle_create_position(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreatePositionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PositionRow>>), AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }

    let duplicate: Option<Uuid> = sqlx::query_scalar("SELECT id FROM positions WHERE code = $1")
        .bind(&req.code)
        .fetch_optional(&state.db)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict(format!(
            "Position code '{}' already exists",
            req.code
        )));
    }

    let position: PositionRow = sqlx::query_as(
        r#"
        INSERT INTO positions (code, name, description, level, required_competencies)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&req.code)
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.level.as_str())
    .bind(&req.required_competencies)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(position))))
}

/// PUT /api/v1/positions/:id
pub async fn handle_update_position(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePositionRequest>,
) -> Result<Json<ApiResponse<PositionRow>>, AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }

    let position: Option<PositionRow> = sqlx::query_as(
        r#"
        UPDATE positions
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            level = COALESCE($4, level),
            required_competencies = COALESCE($5, required_competencies),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.level.map(|l| l.as_str()))
    .bind(&req.required_competencies)
    .fetch_optional(&state.db)
    .await?;

    let position = position.ok_or_else(|| AppError::NotFound(format!("Position {id} not found")))?;
    Ok(Json(ApiResponse::new(position)))
}

/// DELETE /api/v1/positions/:id
pub async fn handle_delete_position(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }

    let result = sqlx::query("DELETE FROM positions WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Position {id} not found")));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Position deleted"
    })))
}
