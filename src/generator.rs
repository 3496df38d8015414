//! Deterministic sample data with injected defects.
//!
//! Scores are drawn from a normal distribution around 75. A fixed seed gives
//! the same rows on every run, including the defects the cleaning stage is
//! meant to repair.

use crate::error::PipelineResult;
use crate::record::{RawRecord, Subject};
use csv::WriterBuilder;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::fs;
use std::path::Path;
use tracing::info;

const GRADE_LEVELS: [&str; 4] = ["9th", "10th", "11th", "12th"];
const GENDERS: [&str; 2] = ["M", "F"];
const MISSING_SCORE_RATE: f64 = 0.05;

#[derive(Debug, Clone, Copy)]
pub struct GeneratorOptions {
    pub students: usize,
    pub seed: u64,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            students: 100,
            seed: 42,
        }
    }
}

/// Produces raw rows for `options.students` students plus injected defects.
pub fn generate(options: GeneratorOptions) -> Vec<RawRecord> {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let scores = Normal::new(75.0, 15.0).expect("constant distribution parameters are valid");

    let mut rows: Vec<RawRecord> = (1..=options.students)
        .map(|i| {
            let mut row = RawRecord {
                student_id: Some(format!("STU{i:03}")),
                name: Some(format!("Student {i}")),
                grade_level: GRADE_LEVELS.choose(&mut rng).map(|s| s.to_string()),
                gender: GENDERS.choose(&mut rng).map(|s| s.to_string()),
                ..Default::default()
            };
            for subject in Subject::ALL {
                if rng.gen_bool(MISSING_SCORE_RATE) {
                    continue;
                }
                let score: f64 = scores.sample(&mut rng);
                let score = (score.clamp(0.0, 100.0) * 10.0).round() / 10.0;
                row.set_score(subject, Some(format!("{score:.1}")));
            }
            row
        })
        .collect();

    inject_defects(&mut rows, &mut rng);
    rows
}

fn inject_defects(rows: &mut Vec<RawRecord>, rng: &mut StdRng) {
    let n = rows.len();

    // padded names
    for row in rows.iter_mut().take(6) {
        row.name = row.name.as_ref().map(|name| format!("  {name}  "));
    }

    // upper-case ordinal suffixes
    for row in rows.iter_mut().skip(10).take(6) {
        row.grade_level = row.grade_level.as_ref().map(|g| g.replace("th", "TH"));
    }

    // inconsistent gender spellings
    let spellings = [" male", "FEMALE", "m", "f ", "unknown"];
    for (row, spelling) in rows.iter_mut().skip(20).zip(spellings) {
        row.gender = Some(spelling.to_string());
    }

    // out-of-range and non-numeric scores
    if n > 30 {
        rows[30].set_score(Subject::Math, Some("104.5".into()));
        rows[31].set_score(Subject::Science, Some("-3".into()));
        rows[32].set_score(Subject::English, Some("absent".into()));
    }

    // a student with no scores at all
    if n > 40 {
        for subject in Subject::ALL {
            rows[40].set_score(subject, None);
        }
    }

    // re-submitted rows for a few existing students
    for idx in [2, 50, 75] {
        if idx >= n {
            break;
        }
        let mut duplicate = rows[idx].clone();
        let score: f64 = rng.gen_range(40.0..100.0);
        duplicate.set_score(Subject::Art, Some(format!("{score:.1}")));
        rows.push(duplicate);
    }
}

/// Writes raw rows to a CSV file, creating parent directories.
pub fn write_raw_records(path: &str, rows: &[RawRecord]) -> PipelineResult<()> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path, rows = rows.len(), "Sample data written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::clean;
    use crate::parser::read_raw_records;
    use std::env;

    #[test]
    fn test_same_seed_same_rows() {
        let options = GeneratorOptions::default();
        assert_eq!(generate(options), generate(options));
    }

    #[test]
    fn test_generated_rows_exercise_every_repair() {
        let rows = generate(GeneratorOptions::default());
        assert_eq!(rows.len(), 103);

        let (cleaned, report) = clean(&rows).unwrap();
        assert_eq!(report.duplicates_removed, 3);
        assert_eq!(report.records_dropped, 1);
        assert_eq!(report.scores_clamped, 2);
        assert_eq!(report.scores_coerced_absent, 1);
        assert_eq!(report.genders_normalized, 4);
        assert_eq!(report.genders_unrecognized, 1);
        assert_eq!(report.grade_levels_normalized, 6);
        assert_eq!(report.names_trimmed, 6);
        assert_eq!(cleaned.len(), 99);
    }

    #[test]
    fn test_write_then_read_back() {
        let path = format!(
            "{}/academic_analytics_generator_test.csv",
            env::temp_dir().display()
        );
        let rows = generate(GeneratorOptions {
            students: 12,
            seed: 7,
        });

        write_raw_records(&path, &rows).unwrap();
        let read = read_raw_records(&path).unwrap();
        assert_eq!(read.len(), rows.len());
        assert_eq!(read[0].student_id.as_deref(), Some("STU001"));

        fs::remove_file(&path).unwrap();
    }
}
