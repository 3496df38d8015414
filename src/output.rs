//! Output formatting and persistence for derived records and summaries.
//!
//! Supports JSON serialization and the cleaned CSV export.

use crate::error::PipelineResult;
use crate::record::{Gender, LetterGrade, PerformanceCategory, Record, Subject};
use csv::WriterBuilder;
use serde::Serialize;
use std::borrow::Borrow;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// One row of the cleaned dataset export. Column order is a stable contract.
#[derive(Debug, Serialize)]
pub struct CleanedRow<'a> {
    pub student_id: u32,
    pub name: Option<&'a str>,
    pub grade_level: u8,
    pub gender: Option<Gender>,
    #[serde(rename = "Math")]
    pub math: Option<f64>,
    #[serde(rename = "Science")]
    pub science: Option<f64>,
    #[serde(rename = "English")]
    pub english: Option<f64>,
    #[serde(rename = "History")]
    pub history: Option<f64>,
    #[serde(rename = "Art")]
    pub art: Option<f64>,
    pub overall_average: f64,
    pub letter_grade: LetterGrade,
    pub performance_category: PerformanceCategory,
    pub best_subject: Subject,
    pub worst_subject: Subject,
}

impl<'a> From<&'a Record> for CleanedRow<'a> {
    fn from(r: &'a Record) -> Self {
        let scores = r.scores();
        CleanedRow {
            student_id: r.student_id(),
            name: r.name(),
            grade_level: r.grade_level(),
            gender: r.gender(),
            math: scores.get(Subject::Math),
            science: scores.get(Subject::Science),
            english: scores.get(Subject::English),
            history: scores.get(Subject::History),
            art: scores.get(Subject::Art),
            overall_average: r.overall_average(),
            letter_grade: r.letter_grade(),
            performance_category: r.performance_category(),
            best_subject: r.best_subject(),
            worst_subject: r.worst_subject(),
        }
    }
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> PipelineResult<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Renders records as CSV text with the cleaned-dataset columns.
pub fn cleaned_csv<R: Borrow<Record>>(records: &[R]) -> PipelineResult<Vec<u8>> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    for r in records {
        writer.serialize(CleanedRow::from(<R as Borrow<Record>>::borrow(r)))?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Writes the cleaned dataset to `path`. The file is produced in one write,
/// so a failed export never leaves a partial table behind.
pub fn write_cleaned<R: Borrow<Record>>(path: &str, records: &[R]) -> PipelineResult<()> {
    let bytes = cleaned_csv(records)?;
    ensure_parent(path)?;
    fs::write(path, bytes)?;
    info!(path, rows = records.len(), "Cleaned dataset written");
    Ok(())
}

/// Writes `value` to `path` as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> PipelineResult<()> {
    let body = serde_json::to_vec_pretty(value)?;
    ensure_parent(path)?;
    fs::write(path, body)?;
    debug!(path, "JSON written");
    Ok(())
}

pub(crate) fn ensure_parent(path: &str) -> PipelineResult<()> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
