use ordered_float::OrderedFloat;

/// Largest value in a series of floats, or None if the series is empty.
pub fn max_of_series(values: &[f64]) -> Option<f64> {
    values.iter().copied().map(OrderedFloat).max().map(|value| value.0)
}
