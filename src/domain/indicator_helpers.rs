//! Shared helper functions for indicator calculations.

/// Applies `reduce` to each right-aligned window of up to `window` rows.
///
/// The window shrinks at the start of the series instead of producing
/// undefined values. Gaps inside a window are skipped; a window with no
/// present values yields `None`.
pub fn rolling<F>(values: &[Option<f64>], window: usize, reduce: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = Vec::with_capacity(values.len());
    let mut buf: Vec<f64> = Vec::with_capacity(window);

    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        buf.clear();
        buf.extend(values[start..=i].iter().flatten());
        out.push(if buf.is_empty() { None } else { Some(reduce(&buf)) });
    }

    out
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Recursive (unadjusted) exponential moving average:
/// `ema[0] = x[0]`, `ema[i] = alpha * x[i] + (1 - alpha) * ema[i-1]`.
pub fn ema_unadjusted(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &x in values {
        let next = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}
