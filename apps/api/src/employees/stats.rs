use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LevelDistribution {
    pub critical: i64,
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

impl LevelDistribution {
    /// Folds `(classification, count)` aggregation rows into the fixed
    /// four-bucket shape the dashboard renders. Unknown or NULL
    /// classifications are dropped.
    pub fn from_rows(rows: &[(Option<String>, i64)]) -> Self {
        let mut dist = LevelDistribution::default();
        for (classification, count) in rows {
            match classification.as_deref() {
                Some("CRITICAL") => dist.critical = *count,
                Some("LOW") => dist.low = *count,
                Some("MEDIUM") => dist.medium = *count,
                Some("HIGH") => dist.high = *count,
                _ => {}
            }
        }
        dist
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    pub total_employees: i64,
    pub completed_assessments: i64,
    pub completion_rate: i64,
    pub level_distribution: LevelDistribution,
}

/// GET /api/v1/employees/stats/overview
pub async fn handle_employee_stats(
    State(state): State<AppState>,
    _actor: Actor,
) -> Result<Json<ApiResponse<EmployeeStats>>, AppError> {
    let total_employees: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE status = 'active'")
            .fetch_one(&state.db)
            .await?;

    let classification_rows: Vec<(Option<String>, i64)> = sqlx::query_as(
        "SELECT classification, COUNT(*) FROM assessments GROUP BY classification",
    )
    .fetch_all(&state.db)
    .await?;

    let completed_assessments: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM assessments WHERE status = 'completed'")
            .fetch_one(&state.db)
            .await?;

    let completion_rate = if total_employees > 0 {
        ((completed_assessments as f64 / total_employees as f64) * 100.0).round() as i64
    } else {
        0
    };

    Ok(Json(ApiResponse::new(EmployeeStats {
        total_employees,
        completed_assessments,
        completion_rate,
        level_distribution: LevelDistribution::from_rows(&classification_rows),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_fills_named_buckets() {
        let rows = vec![
            (Some("CRITICAL".to_string()), 2),
            (Some("MEDIUM".to_string()), 7),
            (None, 3),
        ];
        let dist = LevelDistribution::from_rows(&rows);
        assert_eq!(dist.critical, 2);
        assert_eq!(dist.medium, 7);
        assert_eq!(dist.low, 0);
        assert_eq!(dist.high, 0);
    }

    #[test]
    fn test_distribution_serializes_screaming_keys() {
        let dist = LevelDistribution::from_rows(&[(Some("HIGH".to_string()), 1)]);
        let value = serde_json::to_value(&dist).unwrap();
        assert_eq!(value["HIGH"], 1);
        assert_eq!(value["CRITICAL"], 0);
    }
}
