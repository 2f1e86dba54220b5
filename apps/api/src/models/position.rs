use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionLevel {
    Entry,
    Intermediate,
    Senior,
    Management,
}

impl PositionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionLevel::Entry => "entry",
            PositionLevel::Intermediate => "intermediate",
            PositionLevel::Senior => "senior",
            PositionLevel::Management => "management",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PositionRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub level: String,
    pub required_competencies: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
