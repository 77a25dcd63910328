//! Small sample statistics shared by the metrics engine.

/// Dispersion at or below this level is treated as zero. Real daily return
/// series sit many orders of magnitude above it; constant-growth series land
/// below it through floating-point noise alone.
pub const DEGENERATE_DISPERSION: f64 = 1e-12;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (n - 1 denominator). Needs at least two values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some(sum_sq / (values.len() - 1) as f64)
}

pub fn sample_std(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Sample covariance of two equally long slices.
pub fn sample_covariance(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let ma = mean(a)?;
    let mb = mean(b)?;
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    Some(sum / (a.len() - 1) as f64)
}

/// `numerator / denominator`, undefined when either side is undefined, the
/// denominator is degenerate, or the result is not finite.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d.abs() <= DEGENERATE_DISPERSION {
        return None;
    }
    Some(n / d).filter(|v| v.is_finite())
}
