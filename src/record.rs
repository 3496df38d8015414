//! Record model: raw rows, validated records and fully derived records.
//!
//! The closed categorical sets (subjects, genders, letter grades and
//! performance categories) are enums with total mappings from their
//! string forms.

use crate::features::{ScoreProfile, score_profile};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of graded subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    Math,
    Science,
    English,
    History,
    Art,
}

impl Subject {
    /// All subjects in column order.
    pub const ALL: [Subject; 5] = [
        Subject::Math,
        Subject::Science,
        Subject::English,
        Subject::History,
        Subject::Art,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Science => "Science",
            Subject::English => "English",
            Subject::History => "History",
            Subject::Art => "Art",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    /// Case-insensitive, whitespace-trimmed match against the closed set.
    pub fn parse(raw: &str) -> Option<Gender> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Some(Gender::Male),
            "f" | "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Letter grade bands, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub const ALL: [LetterGrade; 5] = [
        LetterGrade::A,
        LetterGrade::B,
        LetterGrade::C,
        LetterGrade::D,
        LetterGrade::F,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LetterGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LetterGrade::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown letter grade: {s}"))
    }
}

/// Coarse performance bands, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PerformanceCategory {
    Excellent,
    Good,
    Average,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl PerformanceCategory {
    pub const ALL: [PerformanceCategory; 4] = [
        PerformanceCategory::Excellent,
        PerformanceCategory::Good,
        PerformanceCategory::Average,
        PerformanceCategory::NeedsImprovement,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PerformanceCategory::Excellent => "Excellent",
            PerformanceCategory::Good => "Good",
            PerformanceCategory::Average => "Average",
            PerformanceCategory::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for PerformanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PerformanceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.split_whitespace().collect::<Vec<_>>().join(" ");
        PerformanceCategory::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(&wanted) || format!("{c:?}").eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown performance category: {s}"))
    }
}

/// Per-subject scores where `None` means no score was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubjectScores([Option<f64>; 5]);

impl SubjectScores {
    pub fn get(&self, subject: Subject) -> Option<f64> {
        self.0[subject.index()]
    }

    pub fn set(&mut self, subject: Subject, score: Option<f64>) {
        self.0[subject.index()] = score;
    }

    pub fn with(mut self, subject: Subject, score: f64) -> Self {
        self.set(subject, Some(score));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subject, Option<f64>)> + '_ {
        Subject::ALL.into_iter().map(|s| (s, self.get(s)))
    }

    /// Present scores only, in subject order.
    pub fn present(&self) -> impl Iterator<Item = (Subject, f64)> + '_ {
        self.iter().filter_map(|(s, v)| v.map(|v| (s, v)))
    }

    pub fn present_count(&self) -> usize {
        self.0.iter().filter(|v| v.is_some()).count()
    }
}

/// One input row before repair. Every cell is kept as text so malformed
/// values survive until cleaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub student_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub grade_level: Option<String>,
    pub gender: Option<String>,
    #[serde(rename = "Math")]
    pub math: Option<String>,
    #[serde(rename = "Science")]
    pub science: Option<String>,
    #[serde(rename = "English")]
    pub english: Option<String>,
    #[serde(rename = "History")]
    pub history: Option<String>,
    #[serde(rename = "Art")]
    pub art: Option<String>,
}

impl RawRecord {
    pub fn score(&self, subject: Subject) -> Option<&str> {
        let cell = match subject {
            Subject::Math => &self.math,
            Subject::Science => &self.science,
            Subject::English => &self.english,
            Subject::History => &self.history,
            Subject::Art => &self.art,
        };
        cell.as_deref()
    }

    pub fn set_score(&mut self, subject: Subject, value: Option<String>) {
        let cell = match subject {
            Subject::Math => &mut self.math,
            Subject::Science => &mut self.science,
            Subject::English => &mut self.english,
            Subject::History => &mut self.history,
            Subject::Art => &mut self.art,
        };
        *cell = value;
    }
}

/// A repaired record with at least one present score. The score profile is
/// computed once here, so it exists for every validated record.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    student_id: u32,
    name: Option<String>,
    grade_level: u8,
    gender: Option<Gender>,
    scores: SubjectScores,
    profile: ScoreProfile,
}

impl ValidatedRecord {
    /// Returns `None` when every subject score is absent.
    pub fn new(
        student_id: u32,
        name: Option<String>,
        grade_level: u8,
        gender: Option<Gender>,
        scores: SubjectScores,
    ) -> Option<Self> {
        let profile = score_profile(&scores)?;
        Some(Self {
            student_id,
            name,
            grade_level,
            gender,
            scores,
            profile,
        })
    }

    pub fn student_id(&self) -> u32 {
        self.student_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn grade_level(&self) -> u8 {
        self.grade_level
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn scores(&self) -> &SubjectScores {
        &self.scores
    }

    pub fn profile(&self) -> ScoreProfile {
        self.profile
    }
}

/// A fully derived student record. Only [`crate::features::derive`] builds
/// these, so the derived fields always match the scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    base: ValidatedRecord,
    letter_grade: LetterGrade,
    performance_category: PerformanceCategory,
}

impl Record {
    pub(crate) fn from_parts(
        base: ValidatedRecord,
        letter_grade: LetterGrade,
        performance_category: PerformanceCategory,
    ) -> Self {
        Self {
            base,
            letter_grade,
            performance_category,
        }
    }

    pub fn student_id(&self) -> u32 {
        self.base.student_id
    }

    pub fn name(&self) -> Option<&str> {
        self.base.name()
    }

    pub fn grade_level(&self) -> u8 {
        self.base.grade_level
    }

    pub fn gender(&self) -> Option<Gender> {
        self.base.gender
    }

    pub fn scores(&self) -> &SubjectScores {
        &self.base.scores
    }

    pub fn overall_average(&self) -> f64 {
        self.base.profile.mean
    }

    pub fn letter_grade(&self) -> LetterGrade {
        self.letter_grade
    }

    pub fn performance_category(&self) -> PerformanceCategory {
        self.performance_category
    }

    pub fn best_subject(&self) -> Subject {
        self.base.profile.best
    }

    pub fn worst_subject(&self) -> Subject {
        self.base.profile.worst
    }
}
