/// Small numeric helpers shared by the load and sizing calculations.
use interp::{interp, InterpMode};
use statrs::statistics::Statistics;

/// Linear interpolation holding the end values outside the range of `xp`,
/// matching numpy's `interp`.
pub fn np_interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    interp(xp, fp, x, &InterpMode::FirstLast)
}

/// Arithmetic mean, or zero for an empty series.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.
    } else {
        values.mean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn numbers() -> [f64; 10] {
        [9.0, 3.0, 3.0, 4.0, 5.0, 4.9, 8.0, 3.3, 2.0, 0.1]
    }

    #[rstest]
    fn test_mean(numbers: [f64; 10]) {
        assert_relative_eq!(mean(&numbers), 4.23, max_relative = 1e-9);
        assert_eq!(mean(&[]), 0.);
    }

    #[rstest]
    #[case(-10., 1.)]
    #[case(0., 1.)]
    #[case(5., 1.5)]
    #[case(20., 3.)]
    #[case(30., 3.)]
    fn test_np_interp(#[case] x: f64, #[case] expected: f64) {
        assert_relative_eq!(
            np_interp(x, &[0., 10., 20.], &[1., 2., 3.]),
            expected,
            max_relative = 1e-12
        );
    }
}
