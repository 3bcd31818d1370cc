//! Statistical primitives shared by the single-crop and multi-variety pipelines.

/// Bounds applied to the coefficient-of-variation confidence.
pub const MIN_CONFIDENCE: f64 = 0.1;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Confidence reported when a series is too short to measure its dispersion.
pub const UNMEASURED_CONFIDENCE: f64 = 0.5;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance.
pub fn variance(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    Some(values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Simple exponential smoothing: `s[0] = x[0]`, `s[i] = a*x[i] + (1-a)*s[i-1]`.
pub fn exponential_smoothing(series: &[f64], alpha: f64) -> Vec<f64> {
    let mut smoothed = Vec::with_capacity(series.len());
    let mut previous: Option<f64> = None;
    for &value in series {
        let next = match previous {
            None => value,
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
        };
        smoothed.push(next);
        previous = Some(next);
    }
    smoothed
}

/// Ordinary least-squares slope of `values` against their indices.
///
/// Returns 0.0 for fewer than two points or a degenerate x-spread.
pub fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let n_f = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }
    let denominator = n_f * sum_xx - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }
    (n_f * sum_xy - sum_x * sum_y) / denominator
}

/// OLS slope over the trailing `window` points.
pub fn trailing_slope(values: &[f64], window: usize) -> f64 {
    let start = values.len().saturating_sub(window);
    ols_slope(&values[start..])
}

/// Three-point centred moving average over the interior points of `series`.
///
/// A series of length `n >= 3` yields `n - 2` values; shorter input yields none.
pub fn centered_moving_average(series: &[f64]) -> Vec<f64> {
    series
        .windows(3)
        .map(|w| (w[0] + w[1] + w[2]) / 3.0)
        .collect()
}

/// Confidence derived from the dispersion of a demand series.
///
/// Smooths the series with a three-point moving average and returns
/// `1 - CV` of the result, clamped to [`MIN_CONFIDENCE`], [`MAX_CONFIDENCE`].
/// A non-positive mean has no meaningful CV and scores the minimum.
pub fn dispersion_confidence(series: &[f64]) -> f64 {
    if series.len() < 3 {
        return UNMEASURED_CONFIDENCE;
    }
    let averaged = centered_moving_average(series);
    let (Some(mu), Some(var)) = (mean(&averaged), variance(&averaged)) else {
        return UNMEASURED_CONFIDENCE;
    };
    if !mu.is_finite() || mu <= f64::EPSILON {
        return MIN_CONFIDENCE;
    }
    let cv = var.sqrt() / mu;
    if !cv.is_finite() {
        return MIN_CONFIDENCE;
    }
    (1.0 - cv).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// Rounds to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
