//! Column post-processing: rescaling to 0–100 and weighted totals.

use acc_core::RescaleMethod;

/// Rescale a column of index values to the 0–100 range.
///
/// | Method          | Formula                          |
/// |-----------------|----------------------------------|
/// | `MinMax`        | `100 · (x − min) / (max − min)`  |
/// | `InverseMinMax` | `100 · (max − x) / (max − min)`  |
/// | `MaxRatio`      | `100 · x / max`                  |
///
/// A column with no spread (or a zero maximum for `MaxRatio`) rescales to
/// all zeros.  Non-finite inputs are ignored when finding the range and
/// come out as 0.
pub fn rescale(values: &[f64], method: RescaleMethod) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return vec![0.0; values.len()];
    }

    let span = max - min;
    values
        .iter()
        .map(|&x| {
            if !x.is_finite() {
                return 0.0;
            }
            match method {
                RescaleMethod::MinMax if span > 0.0 => 100.0 * (x - min) / span,
                RescaleMethod::InverseMinMax if span > 0.0 => 100.0 * (max - x) / span,
                RescaleMethod::MaxRatio if max != 0.0 => 100.0 * x / max,
                _ => 0.0,
            }
        })
        .collect()
}

/// Weighted mean of equally long columns: `Σ wᵢ·colᵢ / Σ wᵢ` per row.
///
/// Returns all zeros if the weights sum to zero.
///
/// # Panics
/// Panics if the columns differ in length.
pub fn weighted_total(columns: &[(&[f64], f64)]) -> Vec<f64> {
    let rows = columns.first().map_or(0, |(c, _)| c.len());
    assert!(
        columns.iter().all(|(c, _)| c.len() == rows),
        "weighted_total: columns differ in length"
    );
    let weight_sum: f64 = columns.iter().map(|(_, w)| w).sum();
    if weight_sum == 0.0 {
        return vec![0.0; rows];
    }
    (0..rows)
        .map(|i| columns.iter().map(|(c, w)| w * c[i]).sum::<f64>() / weight_sum)
        .collect()
}
