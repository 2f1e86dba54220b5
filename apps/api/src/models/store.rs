use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoreRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub region: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub manager: Option<String>,
    pub employee_count: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
