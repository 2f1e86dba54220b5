//! Employee summary synchronization — propagates a saved assessment's
//! outcome into the owning employee's denormalized summary fields.
//!
//! `current_level` and `last_assessment_date` have exactly one writer: this
//! module. The sync runs strictly after the assessment row is committed and
//! is a best-effort secondary write — a failure here leaves the two records
//! inconsistent and is reported distinctly, never rolled back.
//!
//! `AppState` holds an `Arc<dyn EmployeeSummaryStore>` so handlers and tests
//! can swap the storage backend without touching the sync logic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::assessments::scoring::ScoreOutcome;
use crate::errors::AppError;

/// Partial update for the two denormalized employee fields.
/// `last_assessment_date` is only present on assessment creation; updates
/// leave the stored date untouched even when `assessment_date` changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryPatch {
    pub current_level: i32,
    pub last_assessment_date: Option<DateTime<Utc>>,
}

/// Builds the summary patch for a saved assessment: the employee's level is
/// the overall score rounded half-up (2.5 → 3).
pub fn summary_patch(
    overall_score: f64,
    assessment_date: DateTime<Utc>,
    is_create: bool,
) -> SummaryPatch {
    SummaryPatch {
        current_level: overall_score.round() as i32,
        last_assessment_date: is_create.then_some(assessment_date),
    }
}

/// Storage seam for the employee summary write. Only the two fields in
/// `SummaryPatch` may be touched.
#[async_trait]
pub trait EmployeeSummaryStore: Send + Sync {
    async fn update_summary(&self, employee_id: Uuid, patch: &SummaryPatch)
        -> Result<(), AppError>;
}

/// Production store backed by the shared PostgreSQL pool.
pub struct PgSummaryStore {
    pool: PgPool,
}

impl PgSummaryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeSummaryStore for PgSummaryStore {
    async fn update_summary(
        &self,
        employee_id: Uuid,
        patch: &SummaryPatch,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE employees
            SET current_level = $2,
                last_assessment_date = COALESCE($3, last_assessment_date),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(employee_id)
        .bind(patch.current_level)
        .bind(patch.last_assessment_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Outcome of the secondary write, reported to the caller alongside the
/// committed assessment.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Synced,
    /// No sync attempted: the assessment carried no score (empty rating set).
    Skipped,
    Failed(String),
}

impl SyncStatus {
    /// True when the employee summary is consistent with the saved
    /// assessment — either the write landed or there was nothing to write.
    pub fn synced(&self) -> bool {
        matches!(self, SyncStatus::Synced | SyncStatus::Skipped)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SyncStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Runs the employee sync after an assessment save. Must only be called once
/// the assessment row is durably committed.
pub async fn sync_after_save(
    store: &dyn EmployeeSummaryStore,
    employee_id: Uuid,
    outcome: &ScoreOutcome,
    assessment_date: DateTime<Utc>,
    is_create: bool,
) -> SyncStatus {
    let Some(overall_score) = outcome.overall_score else {
        return SyncStatus::Skipped;
    };

    let patch = summary_patch(overall_score, assessment_date, is_create);
    match store.update_summary(employee_id, &patch).await {
        Ok(()) => SyncStatus::Synced,
        Err(e) => {
            tracing::error!(
                %employee_id,
                error = %e,
                "employee summary sync failed after assessment commit; records are inconsistent"
            );
            SyncStatus::Failed(format!("employee summary not updated: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessments::scoring::{score_and_classify, Classification};
    use crate::models::assessment::CompetencyRating;
    use std::sync::Mutex;

    struct RecordingStore {
        calls: Mutex<Vec<(Uuid, SummaryPatch)>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EmployeeSummaryStore for RecordingStore {
        async fn update_summary(
            &self,
            employee_id: Uuid,
            patch: &SummaryPatch,
        ) -> Result<(), AppError> {
            self.calls.lock().unwrap().push((employee_id, *patch));
            Ok(())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl EmployeeSummaryStore for FailingStore {
        async fn update_summary(
            &self,
            _employee_id: Uuid,
            _patch: &SummaryPatch,
        ) -> Result<(), AppError> {
            Err(AppError::Database(sqlx::Error::PoolClosed))
        }
    }

    fn make_rating(level_number: i32) -> CompetencyRating {
        CompetencyRating {
            competency: Uuid::new_v4(),
            competency_id: None,
            competency_name: None,
            rated_level: None,
            level_number,
            comment: None,
        }
    }

    #[test]
    fn test_half_scores_round_up() {
        let patch = summary_patch(2.5, Utc::now(), false);
        assert_eq!(patch.current_level, 3);
    }

    #[test]
    fn test_rounding_below_half_goes_down() {
        let patch = summary_patch(3.25, Utc::now(), false);
        assert_eq!(patch.current_level, 3);
    }

    #[test]
    fn test_create_sets_last_assessment_date() {
        let date = Utc::now();
        let patch = summary_patch(3.25, date, true);
        assert_eq!(patch.last_assessment_date, Some(date));
    }

    #[test]
    fn test_update_leaves_last_assessment_date_alone() {
        let patch = summary_patch(3.25, Utc::now(), false);
        assert_eq!(patch.last_assessment_date, None);
    }

    #[tokio::test]
    async fn test_sync_writes_rounded_level() {
        let store = RecordingStore::new();
        let employee_id = Uuid::new_v4();
        let ratings: Vec<_> = [4, 4, 3, 2].into_iter().map(make_rating).collect();
        let outcome = score_and_classify(&ratings);
        assert_eq!(outcome.classification, Some(Classification::Medium));

        let status = sync_after_save(&store, employee_id, &outcome, Utc::now(), true).await;
        assert_eq!(status, SyncStatus::Synced);

        let calls = store.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, employee_id);
        assert_eq!(calls[0].1.current_level, 3);
        assert!(calls[0].1.last_assessment_date.is_some());
    }

    #[tokio::test]
    async fn test_sync_skipped_when_no_score() {
        let store = RecordingStore::new();
        let outcome = score_and_classify(&[]);

        let status = sync_after_save(&store, Uuid::new_v4(), &outcome, Utc::now(), true).await;
        assert_eq!(status, SyncStatus::Skipped);
        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_failure_is_reported_not_propagated() {
        let outcome = score_and_classify(&[make_rating(1)]);

        let status = sync_after_save(&FailingStore, Uuid::new_v4(), &outcome, Utc::now(), false).await;
        assert!(!status.synced());
        assert!(status.error().is_some());
    }

    #[tokio::test]
    async fn test_single_critical_rating_syncs_level_one() {
        let store = RecordingStore::new();
        let outcome = score_and_classify(&[make_rating(1)]);
        assert_eq!(outcome.overall_score, Some(1.0));

        sync_after_save(&store, Uuid::new_v4(), &outcome, Utc::now(), true).await;

        let calls = store.calls.lock().unwrap();
        assert_eq!(calls[0].1.current_level, 1);
    }
}
