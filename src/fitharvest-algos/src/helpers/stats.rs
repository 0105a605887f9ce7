pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0_f64
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Exact mean of heart-rate values; the integer sum keeps the result
/// independent of input order.
pub fn mean_bpm(values: &[u8]) -> f64 {
    if values.is_empty() {
        0_f64
    } else {
        let sum = values.iter().map(|&v| u64::from(v)).sum::<u64>();
        sum as f64 / values.len() as f64
    }
}

/// Linear-interpolation quantile over an ascending slice, `p` in percent.
pub fn percentile(sorted: &[u8], p: f64) -> f64 {
    match sorted {
        [] => 0_f64,
        [only] => f64::from(*only),
        _ => {
            let rank = (sorted.len() - 1) as f64 * (p / 100.0).clamp(0.0, 1.0);
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let low = f64::from(sorted[lower]);
            let high = f64::from(sorted[upper]);
            low + (high - low) * (rank - lower as f64)
        }
    }
}
