//! Data types produced by the aggregation engine.

use crate::record::{Gender, LetterGrade, PerformanceCategory, Subject};
use serde::Serialize;
use std::fmt;

/// Why a statistic has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ComputationGap {
    /// The input collection (or the relevant subset) is empty.
    NoData,
    /// Fewer samples than the statistic needs.
    InsufficientSamples { samples: usize },
    /// A series is constant, so a correlation is undefined.
    ZeroVariance,
}

impl fmt::Display for ComputationGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputationGap::NoData => f.write_str("no data"),
            ComputationGap::InsufficientSamples { samples } => {
                write!(f, "not computable ({samples} samples)")
            }
            ComputationGap::ZeroVariance => f.write_str("not computable (zero variance)"),
        }
    }
}

/// A statistic that is either a real value or an explicit gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Computed<T> {
    Value(T),
    Gap(ComputationGap),
}

impl<T> Computed<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Computed::Value(v) => Some(v),
            Computed::Gap(_) => None,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, Computed::Gap(_))
    }
}

/// Spread of `overall_average` across the collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
}

/// Count and share of records in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBucket<K> {
    pub key: K,
    pub count: usize,
    pub percent: f64,
}

/// Score statistics for one subject over records where it is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectStat {
    pub subject: Subject,
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
}

/// Subjects ordered by mean score, best first. Subjects that no record has
/// a score for are listed separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectRanking {
    pub ranked: Vec<SubjectStat>,
    pub unranked: Vec<Subject>,
}

impl SubjectRanking {
    pub fn best(&self) -> Option<&SubjectStat> {
        self.ranked.first()
    }

    pub fn worst(&self) -> Option<&SubjectStat> {
        self.ranked.last()
    }
}

/// Mean `overall_average` for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean<K> {
    pub key: K,
    pub count: usize,
    pub mean: f64,
}

/// Pairwise-complete Pearson correlation between two subjects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationEntry {
    pub a: Subject,
    pub b: Subject,
    pub samples: usize,
    pub coefficient: Computed<f64>,
}

/// Upper triangle of the subject correlation matrix, in subject order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub entries: Vec<CorrelationEntry>,
}

impl CorrelationMatrix {
    /// Looks up a pair in either order. The diagonal is not stored.
    pub fn get(&self, a: Subject, b: Subject) -> Option<&CorrelationEntry> {
        self.entries
            .iter()
            .find(|e| (e.a == a && e.b == b) || (e.a == b && e.b == a))
    }
}

/// One row of a top/bottom performer listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformerEntry {
    pub student_id: u32,
    pub name: Option<String>,
    pub grade_level: u8,
    pub overall_average: f64,
    pub letter_grade: LetterGrade,
}

/// Every aggregate over one record collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_records: usize,
    pub overall: Computed<OverallStats>,
    pub letter_distribution: Computed<Vec<DistributionBucket<LetterGrade>>>,
    pub performance_distribution: Computed<Vec<DistributionBucket<PerformanceCategory>>>,
    pub subject_ranking: Computed<SubjectRanking>,
    pub grade_level_trend: Computed<Vec<GroupMean<u8>>>,
    pub gender_comparison: Computed<Vec<GroupMean<Gender>>>,
    pub correlations: Computed<CorrelationMatrix>,
    pub top_performers: Computed<Vec<PerformerEntry>>,
    pub bottom_performers: Computed<Vec<PerformerEntry>>,
}
