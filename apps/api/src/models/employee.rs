use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    Terminated,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
            EmployeeStatus::Terminated => "terminated",
        }
    }
}

/// An employee record. `current_level` and `last_assessment_date` are
/// denormalized summaries of the most recently saved assessment; the
/// employee-summary synchronizer is their only writer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRow {
    pub id: Uuid,
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub store_id: Uuid,
    pub hire_date: NaiveDate,
    pub department: Option<String>,
    pub status: String,
    pub current_level: Option<i32>,
    pub last_assessment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
