//! Cleaning stage: repairs raw rows into validated records.
//!
//! The transform is pure. Fatal problems (no usable `student_id` or
//! `grade_level`) abort with a [`SchemaError`]; everything else is repaired
//! and tallied in a [`CleaningReport`].

use crate::error::SchemaError;
use crate::record::{Gender, RawRecord, Subject, SubjectScores, ValidatedRecord};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// A repairable per-record defect.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    MissingScore {
        student_id: u32,
        subject: Subject,
    },
    ScoreClamped {
        student_id: u32,
        subject: Subject,
        original: f64,
        clamped: f64,
    },
    ScoreCoerced {
        student_id: u32,
        subject: Subject,
        raw: String,
    },
    GenderNormalized {
        student_id: u32,
        raw: String,
    },
    GenderUnrecognized {
        student_id: u32,
        raw: String,
    },
    GradeLevelNormalized {
        student_id: u32,
        raw: String,
    },
    NameTrimmed {
        student_id: u32,
    },
    DuplicateRemoved {
        student_id: u32,
    },
    RecordDropped {
        student_id: u32,
    },
}

/// Counts of every repair made while cleaning. Feeds the text report only.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub records_read: usize,
    pub records_kept: usize,

    // repairs
    pub records_dropped: usize,
    pub scores_missing: usize,
    pub scores_clamped: usize,
    pub scores_coerced_absent: usize,
    pub genders_normalized: usize,
    pub genders_unrecognized: usize,
    pub grade_levels_normalized: usize,
    pub names_trimmed: usize,
    pub duplicates_removed: usize,
}

impl CleaningReport {
    fn record(&mut self, warning: ValidationWarning) {
        debug!(?warning, "Validation warning");
        match warning {
            ValidationWarning::MissingScore { .. } => self.scores_missing += 1,
            ValidationWarning::ScoreClamped { .. } => self.scores_clamped += 1,
            ValidationWarning::ScoreCoerced { .. } => self.scores_coerced_absent += 1,
            ValidationWarning::GenderNormalized { .. } => self.genders_normalized += 1,
            ValidationWarning::GenderUnrecognized { .. } => self.genders_unrecognized += 1,
            ValidationWarning::GradeLevelNormalized { .. } => self.grade_levels_normalized += 1,
            ValidationWarning::NameTrimmed { .. } => self.names_trimmed += 1,
            ValidationWarning::DuplicateRemoved { .. } => self.duplicates_removed += 1,
            ValidationWarning::RecordDropped { .. } => self.records_dropped += 1,
        }
    }

    /// Total number of repairs, excluding plain missing scores.
    pub fn total_repairs(&self) -> usize {
        self.records_dropped
            + self.scores_clamped
            + self.scores_coerced_absent
            + self.genders_normalized
            + self.genders_unrecognized
            + self.grade_levels_normalized
            + self.names_trimmed
            + self.duplicates_removed
    }
}

/// Raw row with its required keys already parsed.
struct KeyedRow<'a> {
    student_id: u32,
    id_prefix: &'a str,
    grade_level: u8,
    grade_level_canonical: bool,
    raw: &'a RawRecord,
}

enum ScoreCell {
    Missing,
    Present(f64),
    Clamped { original: f64, clamped: f64 },
    Coerced,
}

/// Repairs `raw` rows into validated records.
///
/// Rows sharing a `student_id` collapse to the last occurrence, kept at the
/// position of the first one. Records with no present score are dropped.
///
/// # Errors
///
/// Returns [`SchemaError`] on the first row whose `student_id` or
/// `grade_level` is missing or unusable. No partial output is produced.
#[tracing::instrument(skip_all, fields(rows = raw.len()))]
pub fn clean(raw: &[RawRecord]) -> Result<(Vec<ValidatedRecord>, CleaningReport), SchemaError> {
    let mut report = CleaningReport {
        records_read: raw.len(),
        ..Default::default()
    };

    let mut keyed: Vec<KeyedRow> = Vec::with_capacity(raw.len());
    for (i, row) in raw.iter().enumerate() {
        let row_keys = key_row(i + 1, row)?;
        // Ids are compared by number, so every row must share one prefix.
        if let Some(first) = keyed.first() {
            if !row_keys.id_prefix.eq_ignore_ascii_case(first.id_prefix) {
                return Err(SchemaError::InvalidField {
                    row: i + 1,
                    field: "student_id",
                    value: row.student_id.clone().unwrap_or_default(),
                });
            }
        }
        keyed.push(row_keys);
    }

    // Deduplicate with overwrite semantics before any repair.
    let mut slot_by_id: HashMap<u32, usize> = HashMap::new();
    let mut slots: Vec<KeyedRow> = Vec::with_capacity(keyed.len());
    for row in keyed {
        match slot_by_id.get(&row.student_id) {
            Some(&slot) => {
                report.record(ValidationWarning::DuplicateRemoved {
                    student_id: row.student_id,
                });
                slots[slot] = row;
            }
            None => {
                slot_by_id.insert(row.student_id, slots.len());
                slots.push(row);
            }
        }
    }

    let mut cleaned = Vec::with_capacity(slots.len());
    for row in slots {
        if let Some(record) = repair_row(&row, &mut report) {
            cleaned.push(record);
        }
    }

    report.records_kept = cleaned.len();
    info!(
        records_read = report.records_read,
        records_kept = report.records_kept,
        records_dropped = report.records_dropped,
        duplicates_removed = report.duplicates_removed,
        scores_clamped = report.scores_clamped,
        scores_coerced_absent = report.scores_coerced_absent,
        "Cleaning complete"
    );

    Ok((cleaned, report))
}

fn key_row(row: usize, raw: &RawRecord) -> Result<KeyedRow<'_>, SchemaError> {
    let id_cell = non_blank(raw.student_id.as_deref()).ok_or(SchemaError::MissingField {
        row,
        field: "student_id",
    })?;
    let (id_prefix, student_id) =
        parse_student_id(id_cell).ok_or_else(|| SchemaError::InvalidField {
            row,
            field: "student_id",
            value: id_cell.to_string(),
        })?;

    let level_cell = non_blank(raw.grade_level.as_deref()).ok_or(SchemaError::MissingField {
        row,
        field: "grade_level",
    })?;
    let (grade_level, grade_level_canonical) =
        parse_grade_level(level_cell).ok_or_else(|| SchemaError::InvalidField {
            row,
            field: "grade_level",
            value: level_cell.to_string(),
        })?;

    Ok(KeyedRow {
        student_id,
        id_prefix,
        grade_level,
        grade_level_canonical,
        raw,
    })
}

fn repair_row(row: &KeyedRow, report: &mut CleaningReport) -> Option<ValidatedRecord> {
    let student_id = row.student_id;
    let raw = row.raw;

    if !row.grade_level_canonical {
        report.record(ValidationWarning::GradeLevelNormalized {
            student_id,
            raw: raw.grade_level.clone().unwrap_or_default(),
        });
    }

    let gender_cell = raw.gender.as_deref().unwrap_or("");
    let gender = Gender::parse(gender_cell);
    match gender {
        Some(g) if g.label() != gender_cell => {
            report.record(ValidationWarning::GenderNormalized {
                student_id,
                raw: gender_cell.to_string(),
            });
        }
        Some(_) => {}
        None => report.record(ValidationWarning::GenderUnrecognized {
            student_id,
            raw: gender_cell.to_string(),
        }),
    }

    let name = raw.name.as_deref().and_then(|n| {
        let trimmed = n.trim();
        if trimmed.len() != n.len() {
            report.record(ValidationWarning::NameTrimmed { student_id });
        }
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let mut scores = SubjectScores::default();
    for subject in Subject::ALL {
        let value = match parse_score(raw.score(subject)) {
            ScoreCell::Missing => {
                report.record(ValidationWarning::MissingScore {
                    student_id,
                    subject,
                });
                None
            }
            ScoreCell::Present(v) => Some(v),
            ScoreCell::Clamped { original, clamped } => {
                report.record(ValidationWarning::ScoreClamped {
                    student_id,
                    subject,
                    original,
                    clamped,
                });
                Some(clamped)
            }
            ScoreCell::Coerced => {
                report.record(ValidationWarning::ScoreCoerced {
                    student_id,
                    subject,
                    raw: raw.score(subject).unwrap_or_default().to_string(),
                });
                None
            }
        };
        scores.set(subject, value);
    }

    let record = ValidatedRecord::new(student_id, name, row.grade_level, gender, scores);
    if record.is_none() {
        report.record(ValidationWarning::RecordDropped { student_id });
    }
    record
}

fn non_blank(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|c| !c.is_empty())
}

/// Accepts `7` or a code with an alphabetic prefix such as `STU007`.
/// Returns the prefix (possibly empty) and the numeric id.
pub fn parse_student_id(raw: &str) -> Option<(&str, u32)> {
    let trimmed = raw.trim();
    let digits = trimmed.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let prefix = &trimmed[..trimmed.len() - digits.len()];
    let id = digits.parse::<u32>().ok().filter(|&id| id > 0)?;
    Some((prefix, id))
}

/// Parses `9`, `9th`, `10TH` and friends. The flag is `true` when the cell
/// was already in a canonical spelling (`N` or `Nth`).
pub fn parse_grade_level(raw: &str) -> Option<(u8, bool)> {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let number = lower.strip_suffix("th").unwrap_or(&lower);
    let level = number.parse::<u8>().ok().filter(|l| (9..=12).contains(l))?;

    let canonical = raw == level.to_string() || raw == format!("{level}th");
    Some((level, canonical))
}

fn parse_score(cell: Option<&str>) -> ScoreCell {
    let Some(text) = non_blank(cell) else {
        return ScoreCell::Missing;
    };
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            let clamped = v.clamp(0.0, 100.0);
            if clamped == v {
                ScoreCell::Present(v)
            } else {
                ScoreCell::Clamped {
                    original: v,
                    clamped,
                }
            }
        }
        _ => ScoreCell::Coerced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, level: &str, gender: &str, scores: [&str; 5]) -> RawRecord {
        let mut row = RawRecord {
            student_id: Some(id.to_string()),
            grade_level: Some(level.to_string()),
            gender: Some(gender.to_string()),
            ..Default::default()
        };
        for (subject, cell) in Subject::ALL.into_iter().zip(scores) {
            row.set_score(subject, (!cell.is_empty()).then(|| cell.to_string()));
        }
        row
    }

    #[test]
    fn test_parse_student_id() {
        assert_eq!(parse_student_id("7"), Some(("", 7)));
        assert_eq!(parse_student_id("STU007"), Some(("STU", 7)));
        assert_eq!(parse_student_id(" 12 "), Some(("", 12)));
        assert_eq!(parse_student_id("0"), None);
        assert_eq!(parse_student_id("-3"), None);
        assert_eq!(parse_student_id("STU"), None);
        assert_eq!(parse_student_id("1.5"), None);
    }

    #[test]
    fn test_parse_grade_level() {
        assert_eq!(parse_grade_level("9"), Some((9, true)));
        assert_eq!(parse_grade_level("9th"), Some((9, true)));
        assert_eq!(parse_grade_level("10TH"), Some((10, false)));
        assert_eq!(parse_grade_level(" 11th "), Some((11, false)));
        assert_eq!(parse_grade_level("8th"), None);
        assert_eq!(parse_grade_level("13"), None);
        assert_eq!(parse_grade_level("senior"), None);
    }

    #[test]
    fn test_later_duplicate_wins() {
        let rows = vec![
            raw("1", "9", "M", ["70", "70", "70", "70", "70"]),
            raw("1", "9", "M", ["90", "90", "90", "90", "90"]),
        ];
        let (cleaned, report) = clean(&rows).unwrap();

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].scores().get(Subject::Math), Some(90.0));
        assert_eq!(report.duplicates_removed, 1);
    }

    #[test]
    fn test_duplicate_keeps_first_position() {
        let rows = vec![
            raw("1", "9", "M", ["70", "", "", "", ""]),
            raw("2", "9", "F", ["60", "", "", "", ""]),
            raw("1", "10", "M", ["90", "", "", "", ""]),
        ];
        let (cleaned, _) = clean(&rows).unwrap();

        let ids: Vec<_> = cleaned.iter().map(|r| r.student_id()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(cleaned[0].grade_level(), 10);
    }

    #[test]
    fn test_all_absent_record_is_dropped() {
        let rows = vec![
            raw("1", "9", "M", ["80", "", "", "", ""]),
            raw("2", "9", "F", ["", "", "", "", ""]),
        ];
        let (cleaned, report) = clean(&rows).unwrap();

        assert!(cleaned.iter().all(|r| r.student_id() != 2));
        assert_eq!(report.records_dropped, 1);
        assert_eq!(report.records_kept, 1);
    }

    #[test]
    fn test_non_numeric_only_scores_are_dropped_not_zeroed() {
        let rows = vec![raw("3", "9", "M", ["n/a", "NaN", "inf", "", "x"])];
        let (cleaned, report) = clean(&rows).unwrap();

        assert!(cleaned.is_empty());
        assert_eq!(report.scores_coerced_absent, 4);
        assert_eq!(report.scores_missing, 1);
        assert_eq!(report.records_dropped, 1);
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let rows = vec![raw("1", "9", "M", ["-5", "104.5", "100", "0", "55.5"])];
        let (cleaned, report) = clean(&rows).unwrap();

        let scores = cleaned[0].scores();
        assert_eq!(scores.get(Subject::Math), Some(0.0));
        assert_eq!(scores.get(Subject::Science), Some(100.0));
        assert_eq!(scores.get(Subject::English), Some(100.0));
        assert_eq!(scores.get(Subject::Art), Some(55.5));
        assert_eq!(report.scores_clamped, 2);
    }

    #[test]
    fn test_gender_normalization() {
        let rows = vec![
            raw("1", "9", "M", ["80", "", "", "", ""]),
            raw("2", "9", " female", ["80", "", "", "", ""]),
            raw("3", "9", "unknown", ["80", "", "", "", ""]),
        ];
        let (cleaned, report) = clean(&rows).unwrap();

        assert_eq!(cleaned.len(), 3);
        assert_eq!(cleaned[0].gender(), Some(Gender::Male));
        assert_eq!(cleaned[1].gender(), Some(Gender::Female));
        assert_eq!(cleaned[2].gender(), None);
        assert_eq!(report.genders_normalized, 1);
        assert_eq!(report.genders_unrecognized, 1);
    }

    #[test]
    fn test_names_are_trimmed() {
        let mut row = raw("1", "9", "M", ["80", "", "", "", ""]);
        row.name = Some("  Student 1  ".into());
        let (cleaned, report) = clean(&[row]).unwrap();

        assert_eq!(cleaned[0].name(), Some("Student 1"));
        assert_eq!(report.names_trimmed, 1);
    }

    #[test]
    fn test_missing_student_id_is_schema_error() {
        let mut row = raw("1", "9", "M", ["80", "", "", "", ""]);
        row.student_id = None;
        let err = clean(&[row]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingField {
                row: 1,
                field: "student_id"
            }
        );
    }

    #[test]
    fn test_missing_grade_level_is_schema_error() {
        let ok = raw("1", "9", "M", ["80", "", "", "", ""]);
        let mut bad = raw("2", "9", "M", ["80", "", "", "", ""]);
        bad.grade_level = Some("   ".into());
        let err = clean(&[ok, bad]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingField {
                row: 2,
                field: "grade_level"
            }
        );
    }

    #[test]
    fn test_padded_grade_level_counts_as_normalized() {
        let rows = vec![
            raw("1", " 11th ", "M", ["80", "", "", "", ""]),
            raw("2", "11th", "F", ["70", "", "", "", ""]),
        ];
        let (cleaned, report) = clean(&rows).unwrap();

        assert_eq!(cleaned[0].grade_level(), 11);
        assert_eq!(report.grade_levels_normalized, 1);
    }

    #[test]
    fn test_mixed_id_prefixes_are_rejected() {
        let rows = vec![
            raw("STU007", "9", "M", ["80", "", "", "", ""]),
            raw("ABC7", "9", "F", ["70", "", "", "", ""]),
        ];
        let err = clean(&rows).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidField {
                row: 2,
                field: "student_id",
                value: "ABC7".into()
            }
        );

        let bare = vec![
            raw("STU007", "9", "M", ["80", "", "", "", ""]),
            raw("7", "9", "F", ["70", "", "", "", ""]),
        ];
        assert!(clean(&bare).is_err());
    }

    #[test]
    fn test_id_prefix_case_is_ignored() {
        let rows = vec![
            raw("STU007", "9", "M", ["80", "", "", "", ""]),
            raw("stu007", "9", "M", ["90", "", "", "", ""]),
        ];
        let (cleaned, report) = clean(&rows).unwrap();
        assert_eq!(cleaned.len(), 1);
        assert_eq!(report.duplicates_removed, 1);
    }

    #[test]
    fn test_clean_is_deterministic() {
        let rows = vec![
            raw("STU003", "10TH", "f", ["88", "", "120", "x", "71"]),
            raw("STU001", "12", "M", ["45", "50", "", "", ""]),
            raw("stu003", "11", "F", ["91", "93", "", "", ""]),
        ];
        let first = clean(&rows).unwrap();
        let second = clean(&rows).unwrap();
        assert_eq!(first, second);
    }
}
