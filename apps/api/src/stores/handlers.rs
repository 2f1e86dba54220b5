use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::employee::EmployeeRow;
use crate::models::store::StoreRow;
use crate::response::{ApiResponse, ListResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub code: String,
    pub name: String,
    pub region: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub manager: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub region: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub manager: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StoreDetail {
    pub store: StoreRow,
    pub employees: Vec<EmployeeRow>,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PositionCount {
    pub position: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub store: StoreRow,
    pub total_employees: i64,
    pub position_stats: Vec<PositionCount>,
}

/// GET /api/v1/stores
pub async fn handle_list_stores(
    State(state): State<AppState>,
    _actor: Actor,
) -> Result<Json<ListResponse<StoreRow>>, AppError> {
    let stores: Vec<StoreRow> = sqlx::query_as("SELECT * FROM stores ORDER BY code")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(ListResponse::new(stores)))
}

/// GET /api/v1/stores/:id
/// Returns the store with its employees.
pub async fn handle_get_store(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StoreDetail>>, AppError> {
    let store = fetch_store(&state, id).await?;

    let employees: Vec<EmployeeRow> =
        sqlx::query_as("SELECT * FROM employees WHERE store_id = $1 ORDER BY name")
            .bind(id)
            .fetch_all(&state.db)
            .await?;

    Ok(Json(ApiResponse::new(StoreDetail { store, employees })))
}

/// GET /api/v1/stores/:id/stats
pub async fn handle_store_stats(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StoreStats>>, AppError> {
    let store = fetch_store(&state, id).await?;

    let total_employees: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM employees WHERE store_id = $1 AND status = 'active'",
    )
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    let position_stats: Vec<PositionCount> = sqlx::query_as(
        r#"
        SELECT position, COUNT(*) AS count
        FROM employees
        WHERE store_id = $1 AND status = 'active'
        GROUP BY position
        ORDER BY count DESC
        "#,
    )
    .bind(id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ApiResponse::new(StoreStats {
        store,
        total_employees,
        position_stats,
    })))
}

/// POST /api/v1/stores
pub async fn handle_create_store(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StoreRow>>), AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }

    let duplicate: Option<Uuid> = sqlx::query_scalar("SELECT id FROM stores WHERE code = $1")
        .bind(&req.code)
        .fetch_optional(&state.db)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict(format!(
            "Store code '{}' already exists",
            req.code
        )));
    }

    let store: StoreRow = sqlx::query_as(
        r#"
        INSERT INTO stores (code, name, region, address, phone, manager)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&req.code)
    .bind(&req.name)
    .bind(&req.region)
    .bind(&req.address)
    .bind(&req.phone)
    .bind(&req.manager)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(store))))
}

/// PUT /api/v1/stores/:id
pub async fn handle_update_store(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStoreRequest>,
) -> Result<Json<ApiResponse<StoreRow>>, AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }

    let store: Option<StoreRow> = sqlx::query_as(
        r#"
        UPDATE stores
        SET name = COALESCE($2, name),
            region = COALESCE($3, region),
            address = COALESCE($4, address),
            phone = COALESCE($5, phone),
            manager = COALESCE($6, manager),
            status = COALESCE($7, status),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.region)
    .bind(&req.address)
    .bind(&req.phone)
    .bind(&req.manager)
    .bind(&req.status)
    .fetch_optional(&state.db)
    .await?;

    let store = store.ok_or_else(|| AppError::NotFound(format!("Store {id} not found")))?;
    Ok(Json(ApiResponse::new(store)))
}

/// DELETE /api/v1/stores/:id
pub async fn handle_delete_store(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }

    let assigned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE store_id = $1")
        .bind(id)
        .fetch_one(&state.db)
        .await?;
    if assigned > 0 {
        return Err(AppError::Conflict(format!(
            "Store still has {assigned} employees assigned"
        )));
    }

    let result = sqlx::query("DELETE FROM stores WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Store {id} not found")));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Store deleted"
    })))
}

async fn fetch_store(state: &AppState, id: Uuid) -> Result<StoreRow, AppError> {
    let store: Option<StoreRow> = sqlx::query_as("SELECT * FROM stores WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;

    store.ok_or_else(|| AppError::NotFound(format!("Store {id} not found")))
}
