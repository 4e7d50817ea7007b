//! Interval parsing and wall-clock alignment.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::SchedulerError;

/// Parse an interval such as `30s`, `1m` or `250ms`.
///
/// Accepted units: `ms`, `s`/`sec`/`second(s)`, `m`/`min`/`minute(s)`,
/// `h`/`hour(s)`, `d`/`day(s)`.
pub fn parse_interval(value: &str) -> Result<Duration, SchedulerError> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (amount, unit) = value.split_at(split);

    let amount: u64 = amount
        .parse()
        .map_err(|_| SchedulerError::InvalidInterval(value.to_string()))?;
    let interval = interval_from_unit(amount, unit.trim())?;

    if interval.is_zero() {
        return Err(SchedulerError::ZeroInterval);
    }
    Ok(interval)
}

/// Convert an amount in the given unit to a duration.
pub fn interval_from_unit(amount: u64, unit: &str) -> Result<Duration, SchedulerError> {
    let millis_per_unit: u64 = match unit {
        "ms" | "millisec" | "millisecond" | "milliseconds" => 1,
        "s" | "sec" | "second" | "seconds" => 1_000,
        "m" | "min" | "minute" | "minutes" => 60 * 1_000,
        "h" | "hour" | "hours" => 60 * 60 * 1_000,
        "d" | "day" | "days" => 24 * 60 * 60 * 1_000,
        other => return Err(SchedulerError::InvalidUnit(other.to_string())),
    };
    Ok(Duration::from_millis(amount.saturating_mul(millis_per_unit)))
}

/// Time from `now` until the next multiple of `interval` since the Unix epoch.
///
/// A `now` that sits exactly on a boundary fires immediately.
pub fn initial_delay(now: SystemTime, interval: Duration) -> Duration {
    let period = interval.as_nanos();
    if period == 0 {
        return Duration::ZERO;
    }

    let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let remainder = since_epoch % period;
    if remainder == 0 {
        return Duration::ZERO;
    }

    let wait = period - remainder;
    Duration::new((wait / 1_000_000_000) as u64, (wait % 1_000_000_000) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64, millis: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs) + Duration::from_millis(millis)
    }

    #[test]
    fn parses_unit_grammar() {
        assert_eq!(parse_interval("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_interval("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_interval("2 hours").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_interval("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_interval("1d").unwrap(), Duration::from_secs(86_400));
    }

    #[test]
    fn rejects_unknown_units_and_zero() {
        assert!(matches!(parse_interval("3 weeks"), Err(SchedulerError::InvalidUnit(_))));
        assert!(matches!(parse_interval("s"), Err(SchedulerError::InvalidInterval(_))));
        assert!(matches!(parse_interval("0s"), Err(SchedulerError::ZeroInterval)));
    }

    #[test]
    fn first_run_aligns_to_next_boundary() {
        let minute = Duration::from_secs(60);

        // 12:00:10 → fires at 12:01:00, not 12:01:10
        assert_eq!(initial_delay(at(43_210, 0), minute), Duration::from_secs(50));
        assert_eq!(initial_delay(at(43_259, 500), minute), Duration::from_millis(500));
    }

    #[test]
    fn on_boundary_fires_immediately() {
        assert_eq!(initial_delay(at(43_200, 0), Duration::from_secs(60)), Duration::ZERO);
    }

    #[test]
    fn tasks_with_equal_intervals_share_boundaries() {
        let interval = Duration::from_secs(30);
        let a = at(1_000, 0);
        let b = at(1_013, 250);
        assert_eq!(a + initial_delay(a, interval), b + initial_delay(b, interval));
    }
}
