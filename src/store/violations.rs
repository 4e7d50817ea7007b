//! Violation log retention.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::types::RateViolation;

/// How long a violation stays in an identity's log.
pub const VIOLATION_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Keep only violations newer than the retention window, measured from `now`.
pub fn prune_violations(violations: &mut Vec<RateViolation>, now: u64) {
    let cutoff = now.saturating_sub(VIOLATION_RETENTION.as_millis() as u64);
    violations.retain(|v| v.timestamp > cutoff);
}
