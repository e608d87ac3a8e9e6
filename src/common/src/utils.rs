use chrono::NaiveDateTime;

pub fn starts_with_any(name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| name.starts_with(prefix))
}

/// Rounds to `digits` decimal places, half away from zero.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Signed number of seconds from `start` to `end`, with microsecond precision.
pub fn seconds_between(start: &NaiveDateTime, end: &NaiveDateTime) -> f64 {
    let delta = end.signed_duration_since(*start);
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_seconds() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    #[case(12.345_678_9, 4, 12.3457)]
    #[case(100.0, 4, 100.0)]
    #[case(0.000_04, 4, 0.0)]
    #[case(66.666_666, 4, 66.6667)]
    fn rounds_to_digits(#[case] value: f64, #[case] digits: i32, #[case] expected: f64) {
        assert!((round_to(value, digits) - expected).abs() < 1e-9);
    }

    #[test]
    fn prefix_matching() {
        assert!(starts_with_any("stage_in_f00", &["clean", "stage_"]));
        assert!(!starts_with_any("merge_1", &["clean", "stage_"]));
    }

    #[test]
    fn seconds_between_keeps_fractions() {
        let day = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let start = day.and_hms_micro_opt(10, 0, 0, 250_000).unwrap();
        let end = day.and_hms_micro_opt(10, 0, 2, 0).unwrap();
        assert_eq!(seconds_between(&start, &end), 1.75);
        assert_eq!(seconds_between(&end, &start), -1.75);
    }
}
