//! Local duration composition.
//!
//! ```text
//! total = whole_millis(now - start)
//! total -= DurationRemote   (if reported)
//! total -= DurationDiff     (if reported)
//! DurationLocal = total     (unless pre-set to -1)
//! ```
//!
//! The result is not clamped: reported durations larger than the measured
//! wall time yield a negative `DurationLocal`.

use std::time::{Duration, Instant};

use crate::timing::extensions::TimingExtensions;

/// Whole milliseconds in `d`, truncated.
pub fn whole_millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

/// Wall time minus the reported remote and diff durations, in milliseconds.
pub fn local_duration(elapsed: Duration, remote: Option<i64>, diff: Option<i64>) -> i64 {
    let mut total = whole_millis(elapsed);
    if let Some(remote) = remote {
        total = total.saturating_sub(remote);
    }
    if let Some(diff) = diff {
        total = total.saturating_sub(diff);
    }
    total
}

/// Writes `DurationLocal` for a call that started at `start` and finished at `now`.
pub fn compose(start: Instant, now: Instant, ext: &mut TimingExtensions) {
    let elapsed = now.saturating_duration_since(start);
    let total = local_duration(elapsed, ext.duration_remote, ext.duration_diff);

    if !ext.is_local_suppressed() {
        ext.duration_local = Some(total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::extensions::DURATION_LOCAL_SUPPRESSED;

    fn window(ms: u64) -> (Instant, Instant) {
        let start = Instant::now();
        (start, start + Duration::from_millis(ms))
    }

    #[test]
    fn test_plain_wall_time() {
        let (start, now) = window(100);
        let mut ext = TimingExtensions::default();
        compose(start, now, &mut ext);
        assert_eq!(ext.duration_local, Some(100));
    }

    #[test]
    fn test_excludes_remote_and_diff() {
        let (start, now) = window(100);
        let mut ext = TimingExtensions {
            duration_remote: Some(40),
            duration_diff: Some(10),
            ..Default::default()
        };
        compose(start, now, &mut ext);
        assert_eq!(ext.duration_local, Some(50));
        assert_eq!(ext.duration_remote, Some(40));
        assert_eq!(ext.duration_diff, Some(10));
    }

    #[test]
    fn test_suppressed_local_is_untouched() {
        let (start, now) = window(100);
        let mut ext = TimingExtensions {
            duration_local: Some(DURATION_LOCAL_SUPPRESSED),
            duration_remote: Some(40),
            ..Default::default()
        };
        compose(start, now, &mut ext);
        assert_eq!(ext.duration_local, Some(DURATION_LOCAL_SUPPRESSED));
    }

    #[test]
    fn test_negative_result_is_not_clamped() {
        let (start, now) = window(30);
        let mut ext = TimingExtensions {
            duration_remote: Some(40),
            duration_diff: Some(10),
            ..Default::default()
        };
        compose(start, now, &mut ext);
        assert_eq!(ext.duration_local, Some(-20));
    }

    #[test]
    fn test_sub_millisecond_truncates() {
        assert_eq!(whole_millis(Duration::from_micros(999)), 0);
        assert_eq!(whole_millis(Duration::from_micros(1_999)), 1);
        assert_eq!(local_duration(Duration::from_micros(500), None, None), 0);
    }

    #[test]
    fn test_clock_going_backwards_reads_zero() {
        let (start, now) = window(10);
        let mut ext = TimingExtensions::default();
        compose(now, start, &mut ext);
        assert_eq!(ext.duration_local, Some(0));
    }
}
