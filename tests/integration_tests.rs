use academic_analytics::analyzers::aggregate;
use academic_analytics::cleaning::clean;
use academic_analytics::config::GradingConfig;
use academic_analytics::features::derive_all;
use academic_analytics::filter::{FilterSet, filter};
use academic_analytics::output::cleaned_csv;
use academic_analytics::parser::read_raw_records;
use academic_analytics::record::{Gender, LetterGrade, PerformanceCategory, Record, Subject};
use academic_analytics::report::render;
use academic_analytics::view::InteractiveView;
use chrono::{TimeZone, Utc};

const FIXTURE: &str = "tests/fixtures/student_grades.csv";

fn load() -> Vec<Record> {
    let raw = read_raw_records(FIXTURE).expect("Failed to read fixture");
    let (validated, _) = clean(&raw).expect("Fixture should clean");
    derive_all(validated, &GradingConfig::default())
}

fn ids(records: &[&Record]) -> Vec<u32> {
    records.iter().map(|r| r.student_id()).collect()
}

#[test]
fn test_cleaning_counts_on_fixture() {
    let raw = read_raw_records(FIXTURE).unwrap();
    assert_eq!(raw.len(), 8);

    let (validated, report) = clean(&raw).unwrap();
    assert_eq!(validated.len(), 6);
    assert_eq!(report.records_read, 8);
    assert_eq!(report.records_kept, 6);
    assert_eq!(report.records_dropped, 1);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.scores_clamped, 2);
    assert_eq!(report.scores_coerced_absent, 1);
    // STU003 History, STU005 all five, STU007 English and Art
    assert_eq!(report.scores_missing, 8);
    assert_eq!(report.genders_normalized, 3);
    assert_eq!(report.genders_unrecognized, 1);
    assert_eq!(report.grade_levels_normalized, 1);
    assert_eq!(report.names_trimmed, 1);
}

#[test]
fn test_full_pipeline() {
    let records = load();
    let kept: Vec<u32> = records.iter().map(|r| r.student_id()).collect();
    assert_eq!(kept, vec![1, 2, 3, 4, 6, 7]);

    let stu1 = &records[0];
    assert_eq!(stu1.name(), Some("Student 1"));
    assert!((stu1.overall_average() - 90.2).abs() < 1e-9);
    assert_eq!(stu1.letter_grade(), LetterGrade::A);
    assert_eq!(stu1.best_subject(), Subject::English);
    assert_eq!(stu1.worst_subject(), Subject::Art);

    // the re-submitted row replaces the first one
    let stu2 = &records[1];
    assert_eq!(stu2.scores().get(Subject::Science), Some(91.0));
    assert!((stu2.overall_average() - 87.9).abs() < 1e-9);
    assert_eq!(stu2.letter_grade(), LetterGrade::B);
    assert_eq!(stu2.performance_category(), PerformanceCategory::Excellent);

    let stu3 = &records[2];
    assert_eq!(stu3.grade_level(), 11);
    assert_eq!(stu3.gender(), Some(Gender::Female));

    let stu4 = &records[3];
    assert_eq!(stu4.gender(), None);
    assert_eq!(stu4.scores().get(Subject::Math), Some(100.0));
    assert_eq!(stu4.scores().get(Subject::Science), Some(0.0));
    assert_eq!(stu4.scores().get(Subject::English), None);
    assert!((stu4.overall_average() - 59.0).abs() < 1e-9);
    assert_eq!(stu4.letter_grade(), LetterGrade::F);

    let summary = aggregate(&records);
    assert_eq!(summary.total_records, 6);

    let overall = summary.overall.value().unwrap();
    assert_eq!(overall.count, 6);
    assert!((overall.max - 90.2).abs() < 1e-9);
    assert!((overall.min - 55.875).abs() < 1e-9);

    let letters: Vec<(LetterGrade, usize)> = summary
        .letter_distribution
        .value()
        .unwrap()
        .iter()
        .map(|b| (b.key, b.count))
        .collect();
    assert_eq!(
        letters,
        vec![
            (LetterGrade::A, 1),
            (LetterGrade::B, 2),
            (LetterGrade::C, 0),
            (LetterGrade::D, 1),
            (LetterGrade::F, 2),
        ]
    );

    let genders = summary.gender_comparison.value().unwrap();
    let counted: usize = genders.iter().map(|g| g.count).sum();
    assert_eq!(counted, 5);

    let correlations = summary.correlations.value().unwrap();
    assert_eq!(correlations.entries.len(), 10);
    assert_eq!(correlations.get(Subject::Math, Subject::English).unwrap().samples, 4);
    assert_eq!(correlations.get(Subject::Art, Subject::Math).unwrap().samples, 5);

    let top: Vec<u32> = summary
        .top_performers
        .value()
        .unwrap()
        .iter()
        .map(|p| p.student_id)
        .collect();
    assert_eq!(top, vec![1, 2, 7, 6, 4, 3]);
}

#[test]
fn test_pipeline_is_idempotent() {
    let first = cleaned_csv(&load()).unwrap();
    let second = cleaned_csv(&load()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_filtering_fixture() {
    let records = load();

    let all = filter(&records, &FilterSet::default());
    assert_eq!(ids(&all), vec![1, 2, 3, 4, 6, 7]);

    let predicates = FilterSet::default()
        .with_grade_levels([10, 11])
        .with_letter_grades([LetterGrade::B]);
    assert_eq!(ids(&filter(&records, &predicates)), vec![2, 7]);

    let nobody = FilterSet::default()
        .with_performance_categories([PerformanceCategory::NeedsImprovement]);
    let selected = filter(&records, &nobody);
    assert!(selected.is_empty());
    assert!(aggregate(&selected).overall.is_gap());
}

#[test]
fn test_view_and_report_agree() {
    let records = load();
    let predicates = FilterSet::default().with_grade_levels([10]);

    let mut view = InteractiveView::new(&records);
    let summary = view.summarize(&predicates).clone();
    assert_eq!(summary, aggregate(&filter(&records, &predicates)));

    let raw = read_raw_records(FIXTURE).unwrap();
    let (_, cleaning) = clean(&raw).unwrap();
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let text = render(&summary, &cleaning, at).unwrap();

    assert!(text.contains("Total Students: 2"));
    assert!(text.contains("Grade 10: 78.3 (n=2)"));
    assert!(text.contains("Duplicate ids removed: 1"));
    assert!(text.contains("1. 2 Student 2 (grade 10): 87.9 B"));
}
