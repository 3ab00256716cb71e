//! Simulated time.
//!
//! Times are integer ticks relative to the project start (t=0). The unit
//! (hours, days, shifts) is defined by the duration model.

/// A point in simulated time, or a duration, in ticks.
pub type Time = i64;

/// Number of workers of a single type.
pub type WorkerCount = u32;

/// Practical infinity. Time arithmetic in the simulator saturates here.
pub const TIME_INF: Time = 2_000_000_000;

/// Adds two times, saturating at [`TIME_INF`].
#[inline]
pub fn saturating_add(a: Time, b: Time) -> Time {
    a.saturating_add(b).min(TIME_INF)
}

/// Whether a time has reached [`TIME_INF`].
#[inline]
pub fn is_inf(t: Time) -> bool {
    t >= TIME_INF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_add() {
        assert_eq!(saturating_add(2, 3), 5);
        assert_eq!(saturating_add(TIME_INF - 1, 10), TIME_INF);
        assert_eq!(saturating_add(i64::MAX, 1), TIME_INF);
    }

    #[test]
    fn test_is_inf() {
        assert!(is_inf(TIME_INF));
        assert!(!is_inf(TIME_INF - 1));
    }
}
