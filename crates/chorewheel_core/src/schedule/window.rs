//! Period enumeration over a query window.
//!
//! # Responsibility
//! - Yield every period of one definition whose nominal window intersects
//!   `[start, end)`, in ascending order.
//!
//! # Invariants
//! - A definition with `start_time >= end` yields nothing.
//! - An empty or inverted window (`start >= end`) yields nothing.
//! - Iteration is not capped; callers bound the window.

use crate::model::chore::{ChoreDefinition, Period};
use crate::schedule::period::{period_for, period_start};

/// Iterator of `(period, period_start)` pairs intersecting one window.
#[derive(Debug, Clone)]
pub struct PeriodWindow {
    start_time: i64,
    frequency: i64,
    end: i64,
    next: Option<Period>,
}

impl PeriodWindow {
    /// Builds the iterator for `def` over `[start, end)`.
    pub fn new(def: &ChoreDefinition, start: i64, end: i64) -> Self {
        let next = if start >= end || def.start_time >= end || def.frequency <= 0 {
            None
        } else if def.start_time < start {
            // Fast-forward whole periods; the period containing `start` still
            // intersects the window.
            Some(period_for(def.start_time, def.frequency, start))
        } else {
            Some(0)
        };

        Self {
            start_time: def.start_time,
            frequency: def.frequency,
            end,
            next,
        }
    }
}

impl Iterator for PeriodWindow {
    type Item = (Period, i64);

    fn next(&mut self) -> Option<Self::Item> {
        let period = self.next?;
        let candidate_start = period_start(self.start_time, self.frequency, period);
        if candidate_start >= self.end {
            self.next = None;
            return None;
        }

        self.next = period.checked_add(1);
        Some((period, candidate_start))
    }
}
