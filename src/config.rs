//! Grading thresholds for the feature stage.
//!
//! Letter grades use the fixed table in [`crate::features::grade`]; only the
//! performance bands are configurable. Stored as a JSON object on disk:
//! ```json
//! {
//!   "performance": { "excellent": 85.0, "good": 70.0, "average": 50.0 }
//! }
//! ```
//! Every cutoff is the inclusive lower edge of its band.

use crate::error::{ConfigError, PipelineResult};
use crate::features::grade::{LETTER_A, LETTER_D};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerformanceThresholds {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            excellent: 85.0,
            good: 70.0,
            average: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradingConfig {
    #[serde(default)]
    pub performance: PerformanceThresholds,
}

impl GradingConfig {
    /// Loads the config from a JSON file at `path` and validates it.
    pub fn load(path: &str) -> PipelineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GradingConfig = serde_json::from_str(&content)?;
        config.validate()?;
        debug!(path, ?config, "Grading config loaded");
        Ok(config)
    }

    /// Checks that the performance ladder is strictly descending inside
    /// [0, 100] and cannot disagree with the letter table: an A average is
    /// never "Needs Improvement" and an F average is never "Excellent".
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.performance;

        check_ladder(&[
            ("excellent", p.excellent),
            ("good", p.good),
            ("average", p.average),
        ])?;

        if p.average > LETTER_A {
            return Err(ConfigError::Inconsistent(format!(
                "average cutoff {} is above the A cutoff {LETTER_A}",
                p.average
            )));
        }
        if p.excellent < LETTER_D {
            return Err(ConfigError::Inconsistent(format!(
                "excellent cutoff {} is below the D cutoff {LETTER_D}",
                p.excellent
            )));
        }
        Ok(())
    }
}

fn check_ladder(ladder: &[(&'static str, f64)]) -> Result<(), ConfigError> {
    for &(name, value) in ladder {
        if !(0.0..=100.0).contains(&value) {
            return Err(ConfigError::OutOfRange { name, value });
        }
    }
    for pair in ladder.windows(2) {
        let (upper, hi) = pair[0];
        let (lower, lo) = pair[1];
        if hi <= lo {
            return Err(ConfigError::NotDescending { upper, lower });
        }
    }
    Ok(())
}
