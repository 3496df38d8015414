//! Plain-text analysis report.

use crate::analyzers::types::{Computed, DistributionBucket, GroupMean, PerformerEntry};
use crate::analyzers::Summary;
use crate::cleaning::CleaningReport;
use crate::error::PipelineResult;
use crate::output::ensure_parent;
use chrono::{DateTime, Utc};
use std::fmt::{Display, Write};
use std::fs;
use tracing::info;

const RULE: &str = "==================================================";

/// Renders the summary and cleaning counts as a text report.
pub fn render(
    summary: &Summary,
    cleaning: &CleaningReport,
    generated_at: DateTime<Utc>,
) -> PipelineResult<String> {
    let mut out = String::new();
    write_report(&mut out, summary, cleaning, generated_at)?;
    Ok(out)
}

/// Renders the report and writes it to `path`.
pub fn write_report_file(
    path: &str,
    summary: &Summary,
    cleaning: &CleaningReport,
    generated_at: DateTime<Utc>,
) -> PipelineResult<()> {
    let text = render(summary, cleaning, generated_at)?;
    ensure_parent(path)?;
    fs::write(path, text)?;
    info!(path, "Report written");
    Ok(())
}

fn write_report(
    out: &mut String,
    summary: &Summary,
    cleaning: &CleaningReport,
    generated_at: DateTime<Utc>,
) -> std::fmt::Result {
    writeln!(out, "STUDENT GRADE ANALYSIS REPORT")?;
    writeln!(out, "Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S"))?;

    section(out, "SUMMARY STATISTICS")?;
    writeln!(out, "Total Students: {}", summary.total_records)?;
    match &summary.overall {
        Computed::Value(s) => {
            writeln!(out, "Average Overall Grade: {:.1}", s.mean)?;
            writeln!(out, "Standard Deviation: {:.1}", s.stddev)?;
            writeln!(out, "Highest Grade: {:.1}", s.max)?;
            writeln!(out, "Lowest Grade: {:.1}", s.min)?;
        }
        Computed::Gap(gap) => writeln!(out, "Overall statistics: n/a ({gap})")?,
    }

    section(out, "SUBJECT PERFORMANCE")?;
    match &summary.subject_ranking {
        Computed::Value(ranking) => {
            for (i, s) in ranking.ranked.iter().enumerate() {
                writeln!(
                    out,
                    "{}. {}: {:.1} (n={}, sd={:.1}, range {:.1}-{:.1})",
                    i + 1,
                    s.subject,
                    s.mean,
                    s.count,
                    s.stddev,
                    s.min,
                    s.max
                )?;
            }
            for subject in &ranking.unranked {
                writeln!(out, "-. {subject}: n/a (no scores)")?;
            }
            if let (Some(best), Some(worst)) = (ranking.best(), ranking.worst()) {
                writeln!(out, "Best Subject: {} ({:.1})", best.subject, best.mean)?;
                writeln!(out, "Worst Subject: {} ({:.1})", worst.subject, worst.mean)?;
            }
        }
        Computed::Gap(gap) => writeln!(out, "n/a ({gap})")?,
    }

    section(out, "GRADE DISTRIBUTION")?;
    buckets(out, &summary.letter_distribution)?;

    section(out, "PERFORMANCE CATEGORIES")?;
    buckets(out, &summary.performance_distribution)?;

    section(out, "PERFORMANCE BY GRADE LEVEL")?;
    group_means(out, &summary.grade_level_trend, |level| format!("Grade {level}"))?;

    section(out, "PERFORMANCE BY GENDER")?;
    group_means(out, &summary.gender_comparison, |g| g.to_string())?;

    section(out, "SUBJECT CORRELATIONS")?;
    match &summary.correlations {
        Computed::Value(matrix) => {
            for e in &matrix.entries {
                match &e.coefficient {
                    Computed::Value(r) => {
                        writeln!(out, "{} / {}: {:+.2} (n={})", e.a, e.b, r, e.samples)?
                    }
                    Computed::Gap(gap) => writeln!(out, "{} / {}: n/a ({gap})", e.a, e.b)?,
                }
            }
        }
        Computed::Gap(gap) => writeln!(out, "n/a ({gap})")?,
    }

    section(out, "TOP PERFORMERS")?;
    performers(out, &summary.top_performers)?;

    section(out, "BOTTOM PERFORMERS")?;
    performers(out, &summary.bottom_performers)?;

    section(out, "DATA QUALITY")?;
    writeln!(out, "Rows read: {}", cleaning.records_read)?;
    writeln!(out, "Records kept: {}", cleaning.records_kept)?;
    writeln!(out, "Records dropped (no scores): {}", cleaning.records_dropped)?;
    writeln!(out, "Duplicate ids removed: {}", cleaning.duplicates_removed)?;
    writeln!(out, "Missing scores: {}", cleaning.scores_missing)?;
    writeln!(out, "Scores clamped to 0-100: {}", cleaning.scores_clamped)?;
    writeln!(out, "Non-numeric scores treated as absent: {}", cleaning.scores_coerced_absent)?;
    writeln!(out, "Genders normalized: {}", cleaning.genders_normalized)?;
    writeln!(out, "Genders unrecognized: {}", cleaning.genders_unrecognized)?;
    writeln!(out, "Grade levels normalized: {}", cleaning.grade_levels_normalized)?;
    writeln!(out, "Names trimmed: {}", cleaning.names_trimmed)?;
    writeln!(out, "Total repairs: {}", cleaning.total_repairs())?;

    Ok(())
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "{title}")?;
    writeln!(out, "{RULE}")
}

fn buckets<K: Display>(
    out: &mut String,
    dist: &Computed<Vec<DistributionBucket<K>>>,
) -> std::fmt::Result {
    match dist {
        Computed::Value(buckets) => {
            for b in buckets {
                writeln!(out, "{}: {} students ({:.1}%)", b.key, b.count, b.percent)?;
            }
            Ok(())
        }
        Computed::Gap(gap) => writeln!(out, "n/a ({gap})"),
    }
}

fn performers(out: &mut String, entries: &Computed<Vec<PerformerEntry>>) -> std::fmt::Result {
    match entries {
        Computed::Value(entries) => {
            for (i, p) in entries.iter().enumerate() {
                writeln!(
                    out,
                    "{}. {} {} (grade {}): {:.1} {}",
                    i + 1,
                    p.student_id,
                    p.name.as_deref().unwrap_or("-"),
                    p.grade_level,
                    p.overall_average,
                    p.letter_grade
                )?;
            }
            Ok(())
        }
        Computed::Gap(gap) => writeln!(out, "n/a ({gap})"),
    }
}

fn group_means<K>(
    out: &mut String,
    means: &Computed<Vec<GroupMean<K>>>,
    label: impl Fn(&K) -> String,
) -> std::fmt::Result {
    match means {
        Computed::Value(groups) => {
            for g in groups {
                writeln!(out, "{}: {:.1} (n={})", label(&g.key), g.mean, g.count)?;
            }
            Ok(())
        }
        Computed::Gap(gap) => writeln!(out, "n/a ({gap})"),
    }
}
