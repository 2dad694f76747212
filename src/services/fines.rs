//! Overdue fines, derived on every read from the deadline and the clock

use chrono::{DateTime, Utc};

/// Currency units charged per started day past the deadline
pub const FINE_PER_DAY: i64 = 30;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Fine owed at `now` for a loan due at `deadline`, at the default rate
pub fn compute_fine(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    FineCalculator::default().compute(deadline, now)
}

/// Whole days between two instants, partial days rounded up
fn days_rounded_up(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let millis = (to - from).num_milliseconds();
    // ceil for positive and negative spans alike
    millis.div_euclid(MILLIS_PER_DAY) + i64::from(millis.rem_euclid(MILLIS_PER_DAY) != 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FineCalculator {
    per_day: i64,
}

impl FineCalculator {
    pub fn new(per_day: i64) -> Self {
        Self { per_day }
    }

    /// Zero up to and including the deadline, then `per_day` for each
    /// started day (one hour late owes a full day).
    pub fn compute(&self, deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        if now <= deadline {
            return 0;
        }
        days_rounded_up(deadline, now) * self.per_day
    }

    /// Days left before the deadline, rounded up; negative once overdue
    pub fn days_remaining(&self, deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        days_rounded_up(now, deadline)
    }
}

impl Default for FineCalculator {
    fn default() -> Self {
        Self::new(FINE_PER_DAY)
    }
}
