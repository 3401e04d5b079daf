//! Daily wall-clock schedule math.
//! A trigger fires once per day at `HH:MM` in a given timezone.

use chrono::{DateTime, Days, NaiveTime, TimeZone};

/// Next occurrence of `at` strictly after `after`, in `after`'s timezone.
///
/// Days where `at` falls into a DST gap are skipped; on a DST overlap the
/// earlier instant wins.
pub fn next_daily_run<Tz: TimeZone>(at: NaiveTime, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = after.timezone();
    let today = after.date_naive();

    // Today, tomorrow, and one spare day for a DST gap.
    for offset in 0..3 {
        let day = today.checked_add_days(Days::new(offset))?;
        let Some(candidate) = tz.from_local_datetime(&day.and_time(at)).earliest() else {
            tracing::debug!("Skipping {day} {at}: not a valid local time");
            continue;
        };
        if candidate > *after {
            return Some(candidate);
        }
    }

    None
}
