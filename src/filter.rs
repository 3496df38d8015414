//! Filter engine shared by the text report and the interactive view.
//!
//! Predicates are conjunctive across categories and disjunctive within one.
//! An empty allowed-set places no restriction on its category.

use crate::record::{LetterGrade, PerformanceCategory, Record};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub grade_levels: BTreeSet<u8>,
    #[serde(default)]
    pub letter_grades: BTreeSet<LetterGrade>,
    #[serde(default)]
    pub performance_categories: BTreeSet<PerformanceCategory>,
}

impl FilterSet {
    pub fn with_grade_levels(mut self, levels: impl IntoIterator<Item = u8>) -> Self {
        self.grade_levels.extend(levels);
        self
    }

    pub fn with_letter_grades(mut self, grades: impl IntoIterator<Item = LetterGrade>) -> Self {
        self.letter_grades.extend(grades);
        self
    }

    pub fn with_performance_categories(
        mut self,
        categories: impl IntoIterator<Item = PerformanceCategory>,
    ) -> Self {
        self.performance_categories.extend(categories);
        self
    }

    /// True when no category is restricted.
    pub fn is_pass_through(&self) -> bool {
        self.grade_levels.is_empty()
            && self.letter_grades.is_empty()
            && self.performance_categories.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        allows(&self.grade_levels, &record.grade_level())
            && allows(&self.letter_grades, &record.letter_grade())
            && allows(&self.performance_categories, &record.performance_category())
    }
}

fn allows<T: Ord>(allowed: &BTreeSet<T>, value: &T) -> bool {
    allowed.is_empty() || allowed.contains(value)
}

/// Returns the records matching `predicates`, in input order.
pub fn filter<'a, R: Borrow<Record>>(records: &'a [R], predicates: &FilterSet) -> Vec<&'a Record> {
    let kept: Vec<&Record> = records
        .iter()
        .map(<R as Borrow<Record>>::borrow)
        .filter(|r| predicates.matches(r))
        .collect();
    debug!(input = records.len(), kept = kept.len(), ?predicates, "Filter applied");
    kept
}
