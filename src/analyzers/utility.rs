use crate::analyzers::types::{ComputationGap, Computed};

/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns `None` for empty input.
pub fn stddev(values: &[f64], mean: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    Some(variance.sqrt())
}

/// Share of `part` in `total` as a percentage. Callers guarantee `total > 0`.
pub fn pct(part: usize, total: usize) -> f64 {
    (part as f64 / total as f64) * 100.0
}

/// Pearson correlation of two equally long series.
///
/// Fewer than two pairs, or a constant series, yields a gap rather than a number.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Computed<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Computed::Gap(ComputationGap::InsufficientSamples { samples: n });
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);

    let mx = xs.iter().sum::<f64>() / n as f64;
    let my = ys.iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Computed::Gap(ComputationGap::ZeroVariance);
    }

    Computed::Value((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}
