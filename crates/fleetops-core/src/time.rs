use chrono::{Duration, NaiveTime};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Default start time for tasks planned from a booking with no pickup time
pub fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

/// Add a (possibly fractional) number of hours to a wall-clock time.
///
/// Rounds to the nearest minute and wraps past midnight. Non-finite hours
/// (or too large to count in minutes) add nothing.
pub fn add_hours(start: NaiveTime, hours: f64) -> NaiveTime {
    let minutes = (hours * 60.0).round();
    if !minutes.is_finite() {
        return start;
    }
    // Whole days fall away on a wall clock; reduce before the cast saturates
    let minutes = ((minutes % MINUTES_PER_DAY as f64) as i64).rem_euclid(MINUTES_PER_DAY);
    let (end, _) = start.overflowing_add_signed(Duration::minutes(minutes));
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_add_whole_hours() {
        assert_eq!(add_hours(t(9, 0), 8.0), t(17, 0));
    }

    #[test]
    fn test_add_fractional_hours() {
        assert_eq!(add_hours(t(9, 15), 2.5), t(11, 45));
    }

    #[test]
    fn test_wraps_past_midnight() {
        assert_eq!(add_hours(t(22, 0), 3.0), t(1, 0));
    }

    #[test]
    fn test_whole_days_fall_away() {
        assert_eq!(add_hours(t(9, 0), 24.0 * 1000.0 + 1.0), t(10, 0));
        assert_eq!(add_hours(t(0, 30), -1.0), t(23, 30));
    }

    #[test]
    fn test_huge_and_non_finite_hours_do_not_panic() {
        let start = t(9, 0);
        // 1e17 h = 6e18 min, which leaves 960 min (16 h) past whole days
        assert_eq!(add_hours(start, 1e17), t(1, 0));
        assert_eq!(add_hours(start, 24.0 * 1e12 + 2.0), t(11, 0));
        assert_eq!(add_hours(start, f64::MAX), start);
        assert_eq!(add_hours(start, f64::NAN), start);
        assert_eq!(add_hours(start, f64::INFINITY), start);
    }
}
