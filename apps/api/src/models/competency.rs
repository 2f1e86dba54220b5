use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A competency from the fixed framework: one skill/behavior dimension with
/// four textual level descriptions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyRow {
    pub id: Uuid,
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
    pub applicable_positions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
