/// Arithmetic mean of the last `period` values, or `None` when the series is
/// shorter than `period`.
pub fn trailing_sma(values: &[f64], period: usize) -> Option<f64> {
    assert!(period > 0, "SMA period must be > 0");
    if values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_only_the_tail() {
        let values = [100.0, 1.0, 2.0, 3.0];
        let v = trailing_sma(&values, 3).unwrap();
        assert!((v - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn full_length_window() {
        let values = [10.0, 20.0, 30.0, 40.0];
        let v = trailing_sma(&values, 4).unwrap();
        assert!((v - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_series_has_no_value() {
        assert_eq!(trailing_sma(&[1.0, 2.0], 3), None);
        assert_eq!(trailing_sma(&[], 1), None);
    }

    #[test]
    fn single_period_is_last_value() {
        let v = trailing_sma(&[42.0, 99.0], 1).unwrap();
        assert!((v - 99.0).abs() < f64::EPSILON);
    }

    #[test]
    #[should_panic(expected = "SMA period must be > 0")]
    fn zero_period_panics() {
        trailing_sma(&[1.0], 0);
    }
}
