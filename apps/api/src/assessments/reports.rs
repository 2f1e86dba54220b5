use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub store: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationStat {
    pub classification: Option<String>,
    pub count: i64,
    pub avg_score: Option<f64>,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyStat {
    pub competency: Uuid,
    pub competency_name: Option<String>,
    pub avg_level: Option<f64>,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsOverview {
    pub classification_stats: Vec<ClassificationStat>,
    pub competency_stats: Vec<CompetencyStat>,
}

/// GET /api/v1/assessments/reports/overview
///
/// Classification distribution plus the ten competencies with the highest
/// average rated level, optionally scoped to one store and a date range.
pub async fn handle_reports_overview(
    State(state): State<AppState>,
    _actor: Actor,
    Query(params): Query<ReportQuery>,
) -> Result<Json<ApiResponse<ReportsOverview>>, AppError> {
    let classification_stats: Vec<ClassificationStat> = sqlx::query_as(
        r#"
        SELECT a.classification, COUNT(*) AS count, AVG(a.overall_score) AS avg_score
        FROM assessments a
        JOIN employees e ON e.id = a.employee_id
        WHERE ($1::uuid IS NULL OR e.store_id = $1)
          AND ($2::timestamptz IS NULL OR a.assessment_date >= $2)
          AND ($3::timestamptz IS NULL OR a.assessment_date <= $3)
        GROUP BY a.classification
        "#,
    )
    .bind(params.store)
    .bind(params.start_date)
    .bind(params.end_date)
    .fetch_all(&state.db)
    .await?;

    let competency_stats: Vec<CompetencyStat> = sqlx::query_as(
        r#"
        SELECT (r->>'competency')::uuid AS competency,
               c.name_vi AS competency_name,
               AVG((r->>'levelNumber')::float8) AS avg_level,
               COUNT(*) AS count
        FROM assessments a
        JOIN employees e ON e.id = a.employee_id
        CROSS JOIN LATERAL jsonb_array_elements(a.competency_ratings) AS r
        LEFT JOIN competencies c ON c.id = (r->>'competency')::uuid
        WHERE ($1::uuid IS NULL OR e.store_id = $1)
          AND ($2::timestamptz IS NULL OR a.assessment_date >= $2)
          AND ($3::timestamptz IS NULL OR a.assessment_date <= $3)
        GROUP BY 1, 2
        ORDER BY avg_level DESC
        LIMIT 10
        "#,
    )
    .bind(params.store)
    .bind(params.start_date)
    .bind(params.end_date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ApiResponse::new(ReportsOverview {
        classification_stats,
        competency_stats,
    })))
}
