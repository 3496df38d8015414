//! CSV reader for raw student rows.

use crate::error::{PipelineResult, SchemaError};
use crate::record::RawRecord;
use std::fs::File;
use std::io::Read;
use tracing::debug;

/// Columns every input table must carry. `name` is optional.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "student_id",
    "grade_level",
    "gender",
    "Math",
    "Science",
    "English",
    "History",
    "Art",
];

/// Reads raw rows from a CSV file at `path`.
///
/// # Errors
///
/// Returns [`SchemaError::MissingColumn`] if a required header is absent,
/// or an IO/CSV error if the file cannot be read.
#[tracing::instrument]
pub fn read_raw_records(path: &str) -> PipelineResult<Vec<RawRecord>> {
    let file = File::open(path)?;
    let rows = parse_raw_records(file)?;
    debug!(rows = rows.len(), "Raw rows loaded");
    Ok(rows)
}

/// Reads raw rows from any CSV source.
pub fn parse_raw_records<R: Read>(reader: R) -> PipelineResult<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::None)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(SchemaError::MissingColumn(column.to_string()).into());
        }
    }

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: RawRecord = result?;
        rows.push(record);
    }

    Ok(rows)
}
