//! Numeric helpers for trajectory smoothing.

/// Exponential moving average over an irregularly-sampled series.
///
/// The smoothing weight adapts to the gap between samples so the
/// effective time constant `tau_sec` holds regardless of sample rate:
/// `alpha = 1 - exp(-dt / tau)`. The first sample passes through.
pub fn ema_irregular(samples: &[(f64, f64)], tau_sec: f64) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(samples.len());
    let mut prev: Option<(f64, f64)> = None;

    for &(t, value) in samples {
        let smoothed = match prev {
            None => value,
            Some((prev_t, prev_value)) => {
                let dt = (t - prev_t).max(0.0);
                let alpha = 1.0 - (-dt / tau_sec).exp();
                prev_value + alpha * (value - prev_value)
            }
        };
        out.push((t, smoothed));
        prev = Some((t, smoothed));
    }

    out
}

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. Zero for fewer than two values.
pub fn std_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
