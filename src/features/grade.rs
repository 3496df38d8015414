use crate::config::PerformanceThresholds;
use crate::record::{LetterGrade, PerformanceCategory};

pub const LETTER_A: f64 = 90.0;
pub const LETTER_B: f64 = 80.0;
pub const LETTER_C: f64 = 70.0;
pub const LETTER_D: f64 = 60.0;

/// Converts an overall average (0–100) into a letter grade.
///
/// | Range  | Grade |
/// |--------|-------|
/// | >= 90  | A     |
/// | >= 80  | B     |
/// | >= 70  | C     |
/// | >= 60  | D     |
/// | < 60   | F     |
pub fn letter_grade(avg: f64) -> LetterGrade {
    match avg {
        a if a >= LETTER_A => LetterGrade::A,
        a if a >= LETTER_B => LetterGrade::B,
        a if a >= LETTER_C => LetterGrade::C,
        a if a >= LETTER_D => LetterGrade::D,
        _ => LetterGrade::F,
    }
}

/// Converts an overall average (0–100) into a performance category.
///
/// | Range (defaults) | Category          |
/// |------------------|-------------------|
/// | >= 85            | Excellent         |
/// | >= 70            | Good              |
/// | >= 50            | Average           |
/// | < 50             | Needs Improvement |
pub fn performance_category(avg: f64, t: &PerformanceThresholds) -> PerformanceCategory {
    match avg {
        a if a >= t.excellent => PerformanceCategory::Excellent,
        a if a >= t.good => PerformanceCategory::Good,
        a if a >= t.average => PerformanceCategory::Average,
        _ => PerformanceCategory::NeedsImprovement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_grade_boundaries() {
        assert_eq!(letter_grade(100.0), LetterGrade::A);
        assert_eq!(letter_grade(90.0), LetterGrade::A);
        assert_eq!(letter_grade(89.999), LetterGrade::B);
        assert_eq!(letter_grade(80.0), LetterGrade::B);
        assert_eq!(letter_grade(79.99), LetterGrade::C);
        assert_eq!(letter_grade(70.0), LetterGrade::C);
        assert_eq!(letter_grade(69.99), LetterGrade::D);
        assert_eq!(letter_grade(60.0), LetterGrade::D);
        assert_eq!(letter_grade(59.99), LetterGrade::F);
        assert_eq!(letter_grade(0.0), LetterGrade::F);
    }

    #[test]
    fn test_performance_category_boundaries() {
        let t = PerformanceThresholds::default();
        assert_eq!(performance_category(85.0, &t), PerformanceCategory::Excellent);
        assert_eq!(performance_category(84.9, &t), PerformanceCategory::Good);
        assert_eq!(performance_category(70.0, &t), PerformanceCategory::Good);
        assert_eq!(performance_category(69.9, &t), PerformanceCategory::Average);
        assert_eq!(performance_category(50.0, &t), PerformanceCategory::Average);
        assert_eq!(
            performance_category(49.9, &t),
            PerformanceCategory::NeedsImprovement
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let t = PerformanceThresholds {
            excellent: 85.0,
            good: 75.0,
            average: 65.0,
        };
        assert_eq!(performance_category(74.9, &t), PerformanceCategory::Average);
        assert_eq!(
            performance_category(64.9, &t),
            PerformanceCategory::NeedsImprovement
        );
        assert_eq!(letter_grade(90.0), LetterGrade::A);
    }
}
