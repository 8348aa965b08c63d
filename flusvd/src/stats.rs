//! Order-independent summary statistics.
//!
//! Values are sorted before summation, so every permutation of the same
//! values gives a bit-identical result.

/// Sum of `values`, independent of their order.
pub fn sum(values: &[f64]) -> f64
{
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.iter().sum()
}

/// Arithmetic mean, `None` for no values.
pub fn mean(values: &[f64]) -> Option<f64>
{
    if values.is_empty() {
        None
    }
    else {
        Some(sum(values) / values.len() as f64)
    }
}

/// Sample standard deviation (`n - 1` denominator), `None` for less than two values.
pub fn sample_std(values: &[f64]) -> Option<f64>
{
    if values.len() < 2 {
        return None;
    }

    let m = mean(values)?;
    let sq: Vec<f64> = values.iter().map(|v| (v - m) * (v - m)).collect();
    Some((sum(&sq) / (values.len() - 1) as f64).sqrt())
}

//
