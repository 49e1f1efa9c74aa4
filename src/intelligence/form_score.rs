// ABOUTME: Maps per-repetition classification labels to scores and folds them into form scores
// ABOUTME: Two-term smoother for exercise scores and the session-level mean roll-up
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

//! Form score algorithms
//!
//! The exercise-level score is a two-term smoother, not a running mean: each new
//! repetition is averaged with the previous smoothed value, so the newest sample always
//! carries half of the weight regardless of how many repetitions came before.
//!
//! ```text
//! a0 = score(label0)
//! ai = round2((a(i-1) + score(labeli)) / 2)
//! ```
//!
//! Only the last value is stored; there is no sample count.

use athletix_core::constants::form_scores::SCORE_DECIMALS;
use athletix_core::errors::AppResult;
use athletix_core::models::FormStatus;

use super::rounding::round_to_decimals;

/// Score for a classification label: 100, 50 or 0
#[must_use]
pub const fn repetition_score(status: FormStatus) -> f64 {
    status.score()
}

/// Score for a raw label string
///
/// # Errors
///
/// Returns `InvalidInput` for any label other than `correct`, `partial` or `incorrect`
pub fn score_for_label(label: &str) -> AppResult<f64> {
    let status: FormStatus = label.parse()?;
    Ok(repetition_score(status))
}

/// Fold one repetition into the previous smoothed score
#[must_use]
pub fn smooth_form_score(previous: Option<f64>, status: FormStatus) -> f64 {
    let score = repetition_score(status);
    previous.map_or(score, |prev| {
        round_to_decimals((prev + score) / 2.0, SCORE_DECIMALS)
    })
}

/// Fold a whole sequence of labels, as the aggregator does one repetition at a time
#[must_use]
pub fn fold_form_scores<I>(labels: I) -> Option<f64>
where
    I: IntoIterator<Item = FormStatus>,
{
    labels
        .into_iter()
        .fold(None, |acc, status| Some(smooth_form_score(acc, status)))
}

/// Session-level score: arithmetic mean of the scored exercises
///
/// Exercises without any repetition result are excluded rather than counted as zero.
/// Returns `None` when no exercise has a score.
#[must_use]
pub fn overall_form_score<I>(exercise_scores: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = exercise_scores
        .into_iter()
        .flatten()
        .fold((0.0_f64, 0_u32), |(sum, count), score| (sum + score, count + 1));

    if count == 0 {
        return None;
    }
    Some(round_to_decimals(sum / f64::from(count), SCORE_DECIMALS))
}

#[cfg(test)]
mod tests {
    use std::iter;

    use super::*;
    use athletix_core::errors::ErrorCode;

    fn approx(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|v| (v - expected).abs() < 1e-9)
    }

    #[test]
    fn test_label_scores() {
        assert!((score_for_label("correct").unwrap() - 100.0).abs() < f64::EPSILON);
        assert!((score_for_label("partial").unwrap() - 50.0).abs() < f64::EPSILON);
        assert!(score_for_label("incorrect").unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_label_rejected() {
        let err = score_for_label("great").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_first_repetition_sets_score_directly() {
        assert!(approx(Some(smooth_form_score(None, FormStatus::Partial)), 50.0));
    }

    #[test]
    fn test_correct_partial_incorrect_sequence() {
        let mut score = None;
        let mut seen = Vec::new();
        for status in [FormStatus::Correct, FormStatus::Partial, FormStatus::Incorrect] {
            score = Some(smooth_form_score(score, status));
            seen.push(score);
        }
        assert!(approx(seen[0], 100.0));
        assert!(approx(seen[1], 75.0));
        assert!(approx(seen[2], 37.5));
    }

    #[test]
    fn test_newest_sample_carries_half_the_weight() {
        // Ten correct reps followed by one incorrect still drops the score to 50
        let labels = iter::repeat(FormStatus::Correct)
            .take(10)
            .chain(iter::once(FormStatus::Incorrect));
        assert!(approx(fold_form_scores(labels), 50.0));
    }

    #[test]
    fn test_fold_rounds_at_each_step() {
        // 100 -> 50 -> 25 -> 12.5 -> 6.25 -> 3.12 (3.125 ties to even)
        let labels = iter::once(FormStatus::Correct)
            .chain(iter::repeat(FormStatus::Incorrect).take(5));
        assert!(approx(fold_form_scores(labels), 3.12));
        assert_eq!(fold_form_scores(iter::empty()), None);
    }

    #[test]
    fn test_overall_score_excludes_unscored_exercises() {
        assert!(approx(
            overall_form_score([Some(100.0), None, Some(37.5)]),
            68.75
        ));
        assert!(approx(
            overall_form_score([Some(100.0), Some(50.0), Some(50.0)]),
            66.67
        ));
        assert_eq!(overall_form_score([None, None]), None);
        assert_eq!(overall_form_score(Vec::<Option<f64>>::new()), None);
    }
}
