use crate::analyzers::types::{
    ComputationGap, Computed, CorrelationEntry, CorrelationMatrix, DistributionBucket, GroupMean,
    OverallStats, PerformerEntry, SubjectRanking, SubjectStat, Summary,
};
use crate::analyzers::utility::{mean, pct, pearson, stddev};
use crate::record::{Gender, LetterGrade, PerformanceCategory, Record, Subject};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Number of students listed in the top and bottom performer tables.
pub const PERFORMER_LIMIT: usize = 10;

/// Computes every aggregate over `records`.
///
/// Works on owned records or on references (e.g. the output of
/// [`crate::filter::filter`]).
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn aggregate<R: Borrow<Record>>(records: &[R]) -> Summary {
    let records = as_refs(records);
    let summary = Summary {
        total_records: records.len(),
        overall: overall_stats(&records),
        letter_distribution: letter_distribution(&records),
        performance_distribution: performance_distribution(&records),
        subject_ranking: subject_ranking(&records),
        grade_level_trend: grade_level_trend(&records),
        gender_comparison: gender_comparison(&records),
        correlations: correlation_matrix(&records),
        top_performers: top_performers(&records, PERFORMER_LIMIT),
        bottom_performers: bottom_performers(&records, PERFORMER_LIMIT),
    };
    debug!(total = summary.total_records, "Summary computed");
    summary
}

fn as_refs<R: Borrow<Record>>(records: &[R]) -> Vec<&Record> {
    records.iter().map(<R as Borrow<Record>>::borrow).collect()
}

/// Computes one [`Summary`] per distinct key, ordered by key.
pub fn aggregate_grouped<R, K, F>(records: &[R], key: F) -> Vec<(K, Summary)>
where
    R: Borrow<Record>,
    K: Ord,
    F: Fn(&Record) -> K,
{
    let mut groups: BTreeMap<K, Vec<&Record>> = BTreeMap::new();
    for r in as_refs(records) {
        groups.entry(key(r)).or_default().push(r);
    }

    groups
        .into_iter()
        .map(|(k, members)| (k, aggregate(&members)))
        .collect()
}

/// Count, mean, spread and range of `overall_average`.
pub fn overall_stats<R: Borrow<Record>>(records: &[R]) -> Computed<OverallStats> {
    let values: Vec<f64> = as_refs(records)
        .iter()
        .map(|r| r.overall_average())
        .collect();
    let Some(avg) = mean(&values) else {
        return Computed::Gap(ComputationGap::NoData);
    };

    Computed::Value(OverallStats {
        count: values.len(),
        mean: avg,
        stddev: stddev(&values, avg).unwrap_or_default(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Count and percentage per letter grade, A to F, including empty bands.
pub fn letter_distribution<R: Borrow<Record>>(
    records: &[R],
) -> Computed<Vec<DistributionBucket<LetterGrade>>> {
    distribution(records, &LetterGrade::ALL, |r| r.letter_grade())
}

/// Count and percentage per performance category, best first.
pub fn performance_distribution<R: Borrow<Record>>(
    records: &[R],
) -> Computed<Vec<DistributionBucket<PerformanceCategory>>> {
    distribution(records, &PerformanceCategory::ALL, |r| r.performance_category())
}

fn distribution<R, K, F>(records: &[R], keys: &[K], key_of: F) -> Computed<Vec<DistributionBucket<K>>>
where
    R: Borrow<Record>,
    K: Copy + PartialEq,
    F: Fn(&Record) -> K,
{
    let records = as_refs(records);
    let total = records.len();
    if total == 0 {
        return Computed::Gap(ComputationGap::NoData);
    }

    let buckets = keys
        .iter()
        .map(|&key| {
            let count = records.iter().filter(|r| key_of(r) == key).count();
            DistributionBucket {
                key,
                count,
                percent: pct(count, total),
            }
        })
        .collect();

    Computed::Value(buckets)
}

/// Per-subject statistics over present scores, ordered by mean descending.
/// Equal means are ordered by subject name.
pub fn subject_ranking<R: Borrow<Record>>(records: &[R]) -> Computed<SubjectRanking> {
    let records = as_refs(records);
    if records.is_empty() {
        return Computed::Gap(ComputationGap::NoData);
    }

    let mut ranked = Vec::new();
    let mut unranked = Vec::new();

    for subject in Subject::ALL {
        let series: Vec<f64> = records
            .iter()
            .filter_map(|r| r.scores().get(subject))
            .collect();

        match mean(&series) {
            Some(avg) => ranked.push(SubjectStat {
                subject,
                count: series.len(),
                mean: avg,
                stddev: stddev(&series, avg).unwrap_or_default(),
                min: series.iter().copied().fold(f64::INFINITY, f64::min),
                max: series.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }),
            None => unranked.push(subject),
        }
    }

    ranked.sort_by(|a, b| {
        b.mean
            .partial_cmp(&a.mean)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.subject.name().cmp(b.subject.name()))
    });

    Computed::Value(SubjectRanking { ranked, unranked })
}

/// Mean `overall_average` per grade level, ascending by level.
pub fn grade_level_trend<R: Borrow<Record>>(records: &[R]) -> Computed<Vec<GroupMean<u8>>> {
    group_means(records, |r| Some(r.grade_level()))
}

/// Mean `overall_average` per gender. Records without a recognized gender
/// are left out of this statistic only.
pub fn gender_comparison<R: Borrow<Record>>(records: &[R]) -> Computed<Vec<GroupMean<Gender>>> {
    group_means(records, |r| r.gender())
}

fn group_means<R, K, F>(records: &[R], key_of: F) -> Computed<Vec<GroupMean<K>>>
where
    R: Borrow<Record>,
    K: Ord,
    F: Fn(&Record) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for r in as_refs(records) {
        if let Some(key) = key_of(r) {
            groups.entry(key).or_default().push(r.overall_average());
        }
    }

    if groups.is_empty() {
        return Computed::Gap(ComputationGap::NoData);
    }

    let means = groups
        .into_iter()
        .filter_map(|(key, values)| {
            mean(&values).map(|m| GroupMean {
                key,
                count: values.len(),
                mean: m,
            })
        })
        .collect();

    Computed::Value(means)
}

/// Pairwise-complete Pearson correlations for every subject pair. Each pair
/// uses only the records where both subjects are present.
pub fn correlation_matrix<R: Borrow<Record>>(records: &[R]) -> Computed<CorrelationMatrix> {
    let records = as_refs(records);
    if records.is_empty() {
        return Computed::Gap(ComputationGap::NoData);
    }

    let mut entries = Vec::new();
    for (i, &a) in Subject::ALL.iter().enumerate() {
        for &b in &Subject::ALL[i + 1..] {
            let (xs, ys): (Vec<f64>, Vec<f64>) = records
                .iter()
                .filter_map(|r| {
                    let scores = r.scores();
                    Some((scores.get(a)?, scores.get(b)?))
                })
                .unzip();

            entries.push(CorrelationEntry {
                a,
                b,
                samples: xs.len(),
                coefficient: pearson(&xs, &ys),
            });
        }
    }

    Computed::Value(CorrelationMatrix { entries })
}

/// Highest `overall_average` first; ties by `student_id` ascending.
pub fn top_performers<R: Borrow<Record>>(
    records: &[R],
    n: usize,
) -> Computed<Vec<PerformerEntry>> {
    ranked_performers(records, n, |a, b| {
        b.overall_average()
            .partial_cmp(&a.overall_average())
            .unwrap_or(Ordering::Equal)
    })
}

/// Lowest `overall_average` first; ties by `student_id` ascending.
pub fn bottom_performers<R: Borrow<Record>>(
    records: &[R],
    n: usize,
) -> Computed<Vec<PerformerEntry>> {
    ranked_performers(records, n, |a, b| {
        a.overall_average()
            .partial_cmp(&b.overall_average())
            .unwrap_or(Ordering::Equal)
    })
}

fn ranked_performers<R, F>(records: &[R], n: usize, order: F) -> Computed<Vec<PerformerEntry>>
where
    R: Borrow<Record>,
    F: Fn(&Record, &Record) -> Ordering,
{
    let mut sorted = as_refs(records);
    if sorted.is_empty() {
        return Computed::Gap(ComputationGap::NoData);
    }
    sorted.sort_by(|a, b| order(a, b).then_with(|| a.student_id().cmp(&b.student_id())));

    let entries = sorted
        .into_iter()
        .take(n)
        .map(|r| PerformerEntry {
            student_id: r.student_id(),
            name: r.name().map(str::to_string),
            grade_level: r.grade_level(),
            overall_average: r.overall_average(),
            letter_grade: r.letter_grade(),
        })
        .collect();

    Computed::Value(entries)
}
