use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One competency's rating inside an assessment. Embedded in the
/// `competency_ratings` JSONB column; has no identity of its own.
///
/// `rated_level` is the source of truth; `level_number` is derived from it
/// by the fixed label mapping and must always agree with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyRating {
    /// Reference to the competency being rated. Immutable once created.
    pub competency: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competency_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competency_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated_level: Option<String>,
    pub level_number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A rating as submitted by the client. `levelNumber` is never taken from
/// the wire; it is always re-derived server-side.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyRatingInput {
    pub competency: Uuid,
    pub competency_id: Option<String>,
    pub competency_name: Option<String>,
    pub rated_level: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    Draft,
    Completed,
    Reviewed,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "draft",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::Reviewed => "reviewed",
        }
    }
}

/// A persisted assessment. `overall_score` and `classification` are derived
/// fields, recomputed from `competency_ratings` on every save.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub evaluator_id: Uuid,
    pub assessment_date: DateTime<Utc>,
    pub competency_ratings: Json<Vec<CompetencyRating>>,
    pub overall_score: Option<f64>,
    pub classification: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rating_uses_client_field_names() {
        let rating = CompetencyRating {
            competency: Uuid::new_v4(),
            competency_id: Some("C-01".to_string()),
            competency_name: None,
            rated_level: Some("High".to_string()),
            level_number: 4,
            comment: None,
        };
        let value = serde_json::to_value(&rating).unwrap();
        assert_eq!(value["ratedLevel"], "High");
        assert_eq!(value["levelNumber"], 4);
        assert_eq!(value["competencyId"], "C-01");
        assert!(value.get("competencyName").is_none());
    }

    #[test]
    fn test_rating_input_ignores_client_level_number() {
        // Clients routinely echo back stored records including levelNumber;
        // the field is not part of the input type and must not break parsing.
        let input: CompetencyRatingInput = serde_json::from_value(json!({
            "competency": Uuid::new_v4(),
            "ratedLevel": "Medium",
            "levelNumber": 9,
            "comment": "steady"
        }))
        .unwrap();
        assert_eq!(input.rated_level.as_deref(), Some("Medium"));
        assert_eq!(input.comment.as_deref(), Some("steady"));
    }

    #[test]
    fn test_status_round_trips_lowercase() {
        let status: AssessmentStatus = serde_json::from_value(json!("reviewed")).unwrap();
        assert_eq!(status, AssessmentStatus::Reviewed);
        assert_eq!(status.as_str(), "reviewed");
    }
}
