//! # Schedule Matcher
//!
//! Pure opening-hours matching: "is this pharmacy open on this day, at this
//! time?".
//!
//! ## Matching Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Interval Matching                                  │
//! │                                                                         │
//! │  Query: (Mon, 08:00)                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Filter intervals to the query day                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Any interval with open <= time <= close?                              │
//! │       │                                                                 │
//! │       ├── {Mon 08:00-17:00}, time 08:00 → open (inclusive start)       │
//! │       ├── {Mon 08:00-17:00}, time 17:00 → open (inclusive end)         │
//! │       ├── {Mon 08:00-17:00}, time 17:01 → closed                       │
//! │       └── {Tue ...} for a Mon query     → never considered             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Overlapping intervals are tolerated (redundant, not conflicting), and no
//! sorting is required: a pharmacy's interval set is small, a linear scan is
//! enough. Intervals never wrap past midnight; a `close < open` row is
//! ill-formed by construction and simply never matches.
//!
//! Every function here is pure: no state, no clock access, no locking. Any
//! number of concurrent callers may use the matcher over a stable snapshot
//! of intervals.

use chrono::NaiveTime;

use crate::error::ValidationError;
use crate::types::{DayOfWeek, OpeningHours};

/// Checks whether one interval covers the given day and clock time.
///
/// Both bounds are inclusive: a pharmacy is considered open exactly at its
/// opening and closing instant.
pub fn interval_covers(interval: &OpeningHours, day: DayOfWeek, time: NaiveTime) -> bool {
    interval.day_of_week == day && interval.open_time <= time && time <= interval.close_time
}

/// Checks whether any interval in a pharmacy's weekly schedule covers the
/// given day and clock time.
///
/// Returns `false` when no interval matches the day, or none contains the
/// time.
pub fn is_open_at(intervals: &[OpeningHours], day: DayOfWeek, time: NaiveTime) -> bool {
    intervals
        .iter()
        .any(|interval| interval_covers(interval, day, time))
}

/// Parses a clock-time string as supplied by the API collaborator.
///
/// ## Accepted Forms
/// - `"14"` → 14:00:00
/// - `"14:30"` → 14:30:00
/// - `"14:30:15"` → 14:30:15
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, ValidationError> {
    let value = value.trim();

    if let Ok(t) = NaiveTime::parse_from_str(value, "%H:%M:%S") {
        return Ok(t);
    }
    if let Ok(t) = NaiveTime::parse_from_str(value, "%H:%M") {
        return Ok(t);
    }

    // Bare hour, e.g. "14"
    value
        .parse::<u32>()
        .ok()
        .and_then(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .ok_or_else(|| ValidationError::MalformedTime {
            value: value.to_string(),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
