//! Period clock: pure time-to-period arithmetic.
//!
//! # Responsibility
//! - Map a caller-supplied "now" to the period index of one definition.
//! - Map a period index back to its nominal `[start, end)` window.
//!
//! # Invariants
//! - `period_for` is monotonically non-decreasing in `now`.
//! - `period_for` returns `0` for every `now < start_time`.
//! - Window arithmetic saturates at the `i64` edge instead of wrapping.
//!
//! Nothing here reads a wall clock; callers always pass `now`.

use crate::model::chore::{ChoreDefinition, Period};

/// Period index of `def` at `now`.
pub fn period_at(def: &ChoreDefinition, now: i64) -> Period {
    period_for(def.start_time, def.frequency, now)
}

/// `floor((now - start_time) / frequency)` when `now >= start_time`, else `0`.
///
/// A non-positive `frequency` never reaches here from validated definitions;
/// it maps to period `0` rather than dividing by zero.
pub fn period_for(start_time: i64, frequency: i64, now: i64) -> Period {
    if frequency <= 0 || now < start_time {
        return 0;
    }

    let elapsed = i128::from(now) - i128::from(start_time);
    let period = elapsed / i128::from(frequency);
    Period::try_from(period).unwrap_or(Period::MAX)
}

/// Inclusive start of `period` in epoch seconds.
pub fn period_start(start_time: i64, frequency: i64, period: Period) -> i64 {
    let offset = i128::from(period) * i128::from(frequency);
    saturate(i128::from(start_time) + offset)
}

/// Exclusive end of `period` in epoch seconds.
pub fn period_end(start_time: i64, frequency: i64, period: Period) -> i64 {
    saturate(i128::from(period_start(start_time, frequency, period)) + i128::from(frequency))
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
mod tests {
    use super::{period_end, period_for, period_start};

    #[test]
    fn before_start_is_period_zero() {
        assert_eq!(period_for(1_000, 100, 0), 0);
        assert_eq!(period_for(1_000, 100, 999), 0);
        assert_eq!(period_for(1_000, 100, i64::MIN), 0);
    }

    #[test]
    fn start_time_itself_is_period_zero() {
        assert_eq!(period_for(1_000, 100, 1_000), 0);
    }

    #[test]
    fn exact_multiples_open_the_next_period() {
        assert_eq!(period_for(1_000, 100, 1_099), 0);
        assert_eq!(period_for(1_000, 100, 1_100), 1);
        assert_eq!(period_for(1_000, 100, 1_199), 1);
        assert_eq!(period_for(1_000, 100, 1_200), 2);
    }

    #[test]
    fn one_second_frequency_counts_every_second() {
        assert_eq!(period_for(1, 1, 1), 0);
        assert_eq!(period_for(1, 1, 2), 1);
        assert_eq!(period_for(1, 1, 86_401), 86_400);
    }

    #[test]
    fn period_is_non_decreasing_in_now() {
        let mut previous = 0;
        for now in 900..1_500 {
            let current = period_for(1_000, 37, now);
            assert!(current >= previous, "period went back at now={now}");
            previous = current;
        }
    }

    #[test]
    fn extreme_now_does_not_overflow() {
        assert_eq!(period_for(1, 1, i64::MAX), (i64::MAX - 1) as u64);
    }

    #[test]
    fn non_positive_frequency_maps_to_zero() {
        assert_eq!(period_for(1_000, 0, 5_000), 0);
        assert_eq!(period_for(1_000, -5, 5_000), 0);
    }

    #[test]
    fn window_bounds_follow_period_index() {
        assert_eq!(period_start(1_000, 100, 0), 1_000);
        assert_eq!(period_start(1_000, 100, 2), 1_200);
        assert_eq!(period_end(1_000, 100, 2), 1_300);
    }

    #[test]
    fn window_bounds_saturate() {
        assert_eq!(period_start(1_000, 100, u64::MAX), i64::MAX);
        assert_eq!(period_end(i64::MAX - 10, 100, 0), i64::MAX);
    }
}
