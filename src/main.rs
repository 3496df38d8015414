//! CLI entry point for the academic analytics tool.
//!
//! Provides subcommands for generating sample data, running the full
//! clean/derive/aggregate pipeline with a text report, and summarizing a
//! filtered slice of the records.

use academic_analytics::{
    analyzers::{Summary, aggregate},
    cleaning::{CleaningReport, clean},
    config::GradingConfig,
    features::derive_all,
    filter::{FilterSet, filter},
    generator::{GeneratorOptions, generate, write_raw_records},
    output::{print_json, write_cleaned, write_json},
    parser::read_raw_records,
    record::{LetterGrade, PerformanceCategory, Record},
    report::write_report_file,
    view::InteractiveView,
};
use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "academic_analytics")]
#[command(about = "Clean, grade and summarize student academic records", long_about = None)]
struct Cli {
    /// JSON file with grading thresholds
    #[arg(long, global = true, env = "GRADING_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a deterministic sample dataset with injected defects
    Generate {
        /// CSV file to write
        #[arg(short, long, default_value = "data/student_grades.csv")]
        output: String,

        /// Number of students to generate
        #[arg(short = 'n', long, default_value_t = 100)]
        students: usize,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Clean, derive and aggregate a dataset, then write the report
    Analyze {
        /// Raw CSV input
        #[arg(short, long, default_value = "data/student_grades.csv")]
        input: String,

        /// Generate sample data at the input path if it does not exist
        #[arg(long, default_value_t = false)]
        generate_if_missing: bool,

        /// Cleaned dataset export
        #[arg(long, default_value = "data/cleaned_grades.csv")]
        cleaned_output: String,

        /// Text report destination
        #[arg(short, long, default_value = "analysis_report.txt")]
        report: String,

        /// Optional: write the summary and cleaning counts as JSON
        #[arg(long)]
        summary_json: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Summarize the records matching a set of filters
    Filter {
        /// Raw CSV input
        #[arg(short, long, default_value = "data/student_grades.csv")]
        input: String,

        /// Optional: export the matching rows as CSV
        #[arg(long)]
        export: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Repeatable filter options. An omitted option does not filter.
#[derive(Args, Debug)]
struct FilterArgs {
    /// Allowed grade level (9-12)
    #[arg(long = "grade-level", value_parser = clap::value_parser!(u8).range(9..=12))]
    grade_levels: Vec<u8>,

    /// Allowed letter grade (A-F)
    #[arg(long = "letter")]
    letter_grades: Vec<LetterGrade>,

    /// Allowed performance category
    #[arg(long = "category")]
    performance_categories: Vec<PerformanceCategory>,
}

impl FilterArgs {
    fn to_filter_set(&self) -> FilterSet {
        FilterSet::default()
            .with_grade_levels(self.grade_levels.iter().copied())
            .with_letter_grades(self.letter_grades.iter().copied())
            .with_performance_categories(self.performance_categories.iter().copied())
    }
}

#[derive(Serialize)]
struct AnalysisOutput<'a> {
    generated_at: chrono::DateTime<Utc>,
    filters: &'a FilterSet,
    cleaning: &'a CleaningReport,
    summary: &'a Summary,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/academic_analytics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("academic_analytics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GradingConfig::load(path)?,
        None => GradingConfig::default(),
    };

    match cli.command {
        Commands::Generate {
            output,
            students,
            seed,
        } => {
            let rows = generate(GeneratorOptions { students, seed });
            write_raw_records(&output, &rows)?;
        }
        Commands::Analyze {
            input,
            generate_if_missing,
            cleaned_output,
            report,
            summary_json,
            filters,
        } => {
            if !Path::new(&input).exists() {
                if generate_if_missing {
                    warn!(input = %input, "Input not found, generating sample data");
                    write_raw_records(&input, &generate(GeneratorOptions::default()))?;
                } else {
                    anyhow::bail!("input file not found: {input}");
                }
            }

            let (records, cleaning) = load_records(&input, &config)?;
            write_cleaned(&cleaned_output, &records)?;

            let predicates = filters.to_filter_set();
            let selected = filter(&records, &predicates);
            let summary = aggregate(&selected);
            let generated_at = Utc::now();

            write_report_file(&report, &summary, &cleaning, generated_at)?;

            if let Some(path) = summary_json {
                write_json(
                    &path,
                    &AnalysisOutput {
                        generated_at,
                        filters: &predicates,
                        cleaning: &cleaning,
                        summary: &summary,
                    },
                )?;
            }

            info!(
                students = summary.total_records,
                cleaned_output = %cleaned_output,
                report = %report,
                "Analysis complete"
            );
        }
        Commands::Filter {
            input,
            export,
            filters,
        } => {
            let (records, _) = load_records(&input, &config)?;
            let predicates = filters.to_filter_set();

            let mut view = InteractiveView::new(&records);
            if let Some(path) = export {
                write_cleaned(&path, &view.rows(&predicates))?;
            }

            let summary = view.summarize(&predicates);
            info!(matching = summary.total_records, ?predicates, "Filtered students");
            print_json(summary)?;
        }
    }

    Ok(())
}

/// Reads raw rows and runs the cleaning and feature stages.
#[tracing::instrument(skip(config))]
fn load_records(input: &str, config: &GradingConfig) -> Result<(Vec<Record>, CleaningReport)> {
    let raw = read_raw_records(input)?;
    let (validated, cleaning) = clean(&raw)?;
    let records = derive_all(validated, config);
    Ok((records, cleaning))
}
