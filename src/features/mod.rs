//! Feature stage: derives overall average, letter grade, performance
//! category and best/worst subject for each validated record.
//!
//! Derivation is a pure function of the scores and the grading config.

pub mod grade;

use crate::config::GradingConfig;
use crate::record::{Record, Subject, SubjectScores, ValidatedRecord};
use tracing::debug;

pub use grade::{letter_grade, performance_category};

/// Mean of present scores plus the highest and lowest subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreProfile {
    pub mean: f64,
    pub best: Subject,
    pub worst: Subject,
}

/// Absent subjects are excluded from both sum and divisor. Ties for best
/// or worst go to the earlier subject. Returns `None` if nothing is present.
pub fn score_profile(scores: &SubjectScores) -> Option<ScoreProfile> {
    let mut present = scores.present();
    let (first, first_score) = present.next()?;

    let mut sum = first_score;
    let mut count = 1usize;
    let (mut best, mut best_score) = (first, first_score);
    let (mut worst, mut worst_score) = (first, first_score);

    for (subject, score) in present {
        sum += score;
        count += 1;
        if score > best_score {
            best = subject;
            best_score = score;
        }
        if score < worst_score {
            worst = subject;
            worst_score = score;
        }
    }

    Some(ScoreProfile {
        mean: sum / count as f64,
        best,
        worst,
    })
}

/// Derives all features for one record from its cached score profile.
pub fn derive(record: ValidatedRecord, config: &GradingConfig) -> Record {
    let mean = record.profile().mean;
    Record::from_parts(
        record,
        letter_grade(mean),
        performance_category(mean, &config.performance),
    )
}

/// Derives features for a whole cleaned collection, preserving order.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn derive_all(records: Vec<ValidatedRecord>, config: &GradingConfig) -> Vec<Record> {
    let derived: Vec<Record> = records.into_iter().map(|r| derive(r, config)).collect();
    debug!(records = derived.len(), "Features derived");
    derived
}

/// Builds a derived record from `(subject, score)` pairs with default
/// thresholds.
#[cfg(test)]
pub(crate) fn test_record(
    student_id: u32,
    grade_level: u8,
    gender: Option<crate::record::Gender>,
    scores: &[(Subject, f64)],
) -> Record {
    let scores = scores
        .iter()
        .fold(SubjectScores::default(), |acc, &(s, v)| acc.with(s, v));
    let base = ValidatedRecord::new(student_id, None, grade_level, gender, scores)
        .expect("test record needs a score");
    derive(base, &GradingConfig::default())
}
