//! Assessment scoring — label→level mapping, overall score, classification.
//!
//! Runs synchronously inside every assessment create/update, before the row
//! is committed. All functions here are pure; the only side effect is an
//! ERROR log when an internal scoring invariant is violated.

use serde::{Deserialize, Serialize};

use crate::models::assessment::{CompetencyRating, CompetencyRatingInput};

pub const LEVEL_MIN: i32 = 1;
pub const LEVEL_MAX: i32 = 4;

// ────────────────────────────────────────────────────────────────────────────
// Rating normalizer
// ────────────────────────────────────────────────────────────────────────────

/// Maps a rating label to its level number: Critical→1, Low→2, Medium→3,
/// High→4. Total and case-sensitive; any other input (including the empty
/// string) silently maps to 1.
///
/// The silent default is inherited behavior the existing client depends on,
/// not a deliberate policy. Do not turn it into an error without a product
/// decision.
pub fn level_number_for_label(label: &str) -> i32 {
    match label {
        "Critical" => 1,
        "Low" => 2,
        "Medium" => 3,
        "High" => 4,
        _ => 1,
    }
}

/// Resolves level numbers for a freshly created assessment. Labels are the
/// only input; anything the client put in `levelNumber` is discarded.
pub fn normalize_ratings_for_create(inputs: &[CompetencyRatingInput]) -> Vec<CompetencyRating> {
    inputs
        .iter()
        .map(|input| CompetencyRating {
            competency: input.competency,
            competency_id: input.competency_id.clone(),
            competency_name: input.competency_name.clone(),
            rated_level: input.rated_level.clone(),
            level_number: level_number_for_label(input.rated_level.as_deref().unwrap_or("")),
            comment: input.comment.clone(),
        })
        .collect()
}

/// Resolves level numbers for an assessment update. A supplied label wins
/// (unknown labels still default to 1); with no label, the rating keeps the
/// previously stored level for the same competency, or 1 if none existed.
pub fn normalize_ratings_for_update(
    inputs: &[CompetencyRatingInput],
    prior: &[CompetencyRating],
) -> Vec<CompetencyRating> {
    inputs
        .iter()
        .map(|input| {
            let level_number = match input.rated_level.as_deref() {
                Some(label) => level_number_for_label(label),
                None => prior
                    .iter()
                    .find(|p| p.competency == input.competency)
                    .map(|p| p.level_number)
                    .unwrap_or(1),
            };
            CompetencyRating {
                competency: input.competency,
                competency_id: input.competency_id.clone(),
                competency_name: input.competency_name.clone(),
                rated_level: input.rated_level.clone(),
                level_number,
                comment: input.comment.clone(),
            }
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Scorer
// ────────────────────────────────────────────────────────────────────────────

/// Four-bucket classification derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Critical,
    Low,
    Medium,
    High,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Critical => "CRITICAL",
            Classification::Low => "LOW",
            Classification::Medium => "MEDIUM",
            Classification::High => "HIGH",
        }
    }

    /// Buckets partition [1.0, 4.0] into disjoint intervals, each inclusive
    /// of its upper bound: [1.0, 1.5] CRITICAL, (1.5, 2.5] LOW,
    /// (2.5, 3.5] MEDIUM, (3.5, 4.0] HIGH. A boundary score belongs to the
    /// bucket that closes at it (1.5 is CRITICAL, 2.5 is LOW, 3.5 is MEDIUM).
    /// Scores outside [1.0, 4.0] have no bucket.
    pub fn for_score(score: f64) -> Option<Self> {
        if (1.0..=1.5).contains(&score) {
            Some(Classification::Critical)
        } else if score > 1.5 && score <= 2.5 {
            Some(Classification::Low)
        } else if score > 2.5 && score <= 3.5 {
            Some(Classification::Medium)
        } else if score > 3.5 && score <= 4.0 {
            Some(Classification::High)
        } else {
            None
        }
    }
}

/// Result of scoring one assessment's rating set. Both fields stay unset when
/// the rating set is empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub overall_score: Option<f64>,
    pub classification: Option<Classification>,
}

impl ScoreOutcome {
    pub const UNSET: ScoreOutcome = ScoreOutcome {
        overall_score: None,
        classification: None,
    };
}

/// Computes the overall score (plain arithmetic mean of level numbers, full
/// precision) and its classification bucket.
///
/// A level number outside [1, 4] can only reach this function through a
/// defect in normalization; it is logged loudly and never silently clamped.
pub fn score_and_classify(ratings: &[CompetencyRating]) -> ScoreOutcome {
    if ratings.is_empty() {
        return ScoreOutcome::UNSET;
    }

    for rating in ratings {
        if !(LEVEL_MIN..=LEVEL_MAX).contains(&rating.level_number) {
            tracing::error!(
                competency = %rating.competency,
                level_number = rating.level_number,
                "scoring invariant violated: level number outside [1, 4] reached the scorer"
            );
        }
    }

    let sum: i32 = ratings.iter().map(|r| r.level_number).sum();
    let overall = sum as f64 / ratings.len() as f64;

    let classification = Classification::for_score(overall);
    if classification.is_none() {
        tracing::error!(
            overall_score = overall,
            "scoring invariant violated: overall score outside [1.0, 4.0]; classification left unset"
        );
    }

    ScoreOutcome {
        overall_score: Some(overall),
        classification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

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

    fn make_input(competency: Uuid, rated_level: Option<&str>) -> CompetencyRatingInput {
        CompetencyRatingInput {
            competency,
            competency_id: None,
            competency_name: None,
            rated_level: rated_level.map(str::to_string),
            comment: None,
        }
    }

    #[test]
    fn test_label_mapping_is_total() {
        assert_eq!(level_number_for_label("Critical"), 1);
        assert_eq!(level_number_for_label("Low"), 2);
        assert_eq!(level_number_for_label("Medium"), 3);
        assert_eq!(level_number_for_label("High"), 4);
    }

    #[test]
    fn test_unknown_label_defaults_to_one() {
        assert_eq!(level_number_for_label(""), 1);
        assert_eq!(level_number_for_label("high"), 1); // case-sensitive
        assert_eq!(level_number_for_label("Excellent"), 1);
    }

    #[test]
    fn test_mean_is_exact() {
        let ratings: Vec<_> = [1, 2, 3, 4].into_iter().map(make_rating).collect();
        let outcome = score_and_classify(&ratings);
        assert_eq!(outcome.overall_score, Some(2.5));
    }

    #[test]
    fn test_boundary_scores_belong_to_closing_bucket() {
        assert_eq!(Classification::for_score(1.0), Some(Classification::Critical));
        assert_eq!(Classification::for_score(1.5), Some(Classification::Critical));
        assert_eq!(Classification::for_score(2.5), Some(Classification::Low));
        assert_eq!(Classification::for_score(3.5), Some(Classification::Medium));
        assert_eq!(Classification::for_score(4.0), Some(Classification::High));
    }

    #[test]
    fn test_interior_scores() {
        assert_eq!(Classification::for_score(1.6), Some(Classification::Low));
        assert_eq!(Classification::for_score(3.0), Some(Classification::Medium));
        assert_eq!(Classification::for_score(3.51), Some(Classification::High));
    }

    #[test]
    fn test_out_of_range_score_has_no_bucket() {
        assert_eq!(Classification::for_score(0.99), None);
        assert_eq!(Classification::for_score(4.01), None);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let ratings: Vec<_> = [4, 3, 2].into_iter().map(make_rating).collect();
        let first = score_and_classify(&ratings);
        let second = score_and_classify(&ratings);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_ratings_leave_both_fields_unset() {
        let outcome = score_and_classify(&[]);
        assert_eq!(outcome.overall_score, None);
        assert_eq!(outcome.classification, None);
    }

    #[test]
    fn test_high_high_medium_low_is_medium() {
        let ratings: Vec<_> = [4, 4, 3, 2].into_iter().map(make_rating).collect();
        let outcome = score_and_classify(&ratings);
        assert_eq!(outcome.overall_score, Some(3.25));
        assert_eq!(outcome.classification, Some(Classification::Medium));
    }

    #[test]
    fn test_single_critical_rating_is_critical() {
        let outcome = score_and_classify(&[make_rating(1)]);
        assert_eq!(outcome.overall_score, Some(1.0));
        assert_eq!(outcome.classification, Some(Classification::Critical));
    }

    #[test]
    fn test_out_of_range_level_leaves_classification_unset() {
        let outcome = score_and_classify(&[make_rating(7)]);
        assert_eq!(outcome.overall_score, Some(7.0));
        assert_eq!(outcome.classification, None);
    }

    #[test]
    fn test_classification_serializes_screaming() {
        let value = serde_json::to_value(Classification::Medium).unwrap();
        assert_eq!(value, "MEDIUM");
        assert_eq!(Classification::High.as_str(), "HIGH");
    }

    #[test]
    fn test_create_normalization_derives_from_label_only() {
        let inputs = vec![
            make_input(Uuid::new_v4(), Some("High")),
            make_input(Uuid::new_v4(), Some("bogus")),
            make_input(Uuid::new_v4(), None),
        ];
        let ratings = normalize_ratings_for_create(&inputs);
        assert_eq!(ratings[0].level_number, 4);
        assert_eq!(ratings[1].level_number, 1);
        assert_eq!(ratings[2].level_number, 1);
    }

    #[test]
    fn test_update_keeps_prior_level_when_label_omitted() {
        let competency = Uuid::new_v4();
        let prior = vec![CompetencyRating {
            competency,
            competency_id: None,
            competency_name: None,
            rated_level: Some("High".to_string()),
            level_number: 4,
            comment: None,
        }];
        let ratings = normalize_ratings_for_update(&[make_input(competency, None)], &prior);
        assert_eq!(ratings[0].level_number, 4);
    }

    #[test]
    fn test_update_label_overrides_prior_level() {
        let competency = Uuid::new_v4();
        let prior = vec![CompetencyRating {
            competency,
            competency_id: None,
            competency_name: None,
            rated_level: Some("High".to_string()),
            level_number: 4,
            comment: None,
        }];
        let ratings = normalize_ratings_for_update(&[make_input(competency, Some("Low"))], &prior);
        assert_eq!(ratings[0].level_number, 2);
    }

    #[test]
    fn test_update_without_label_or_prior_defaults_to_one() {
        let ratings = normalize_ratings_for_update(&[make_input(Uuid::new_v4(), None)], &[]);
        assert_eq!(ratings[0].level_number, 1);
    }
}
