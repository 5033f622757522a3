//! Consecutive-period streaks over a habit's completion log.

use chrono::NaiveDate;

use std::collections::BTreeSet;

use crate::period::{period_start, previous_period_start, Cadence};

/// Counts consecutive `cadence` periods ending at the most recent eligible
/// period that contain at least one completion.
///
/// A streak stays alive while either the current period or the one before it
/// has a completion, so a habit done yesterday but not yet today still shows
/// its streak. Two empty periods in a row reset it to zero, and a gap further
/// back ends the count even if older completions exist. Completions dated after
/// the current period do not count.
pub fn calculate_streak<I>(dates: I, cadence: Cadence, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let current = period_start(today, cadence);
    let periods: BTreeSet<NaiveDate> = dates
        .into_iter()
        .map(|date| period_start(date, cadence))
        .filter(|start| *start <= current)
        .collect();

    let anchor = if periods.contains(&current) {
        current
    } else {
        match previous_period_start(current, cadence) {
            Some(previous) if periods.contains(&previous) => previous,
            _ => return 0,
        }
    };

    let mut streak = 0u32;
    let mut cursor = Some(anchor);
    while let Some(start) = cursor {
        // Every counted period is a distinct member of `periods`.
        if streak as usize >= periods.len() || !periods.contains(&start) {
            break;
        }
        streak += 1;
        cursor = previous_period_start(start, cadence);
    }

    streak
}
