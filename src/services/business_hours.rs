//! Business-hours calendar arithmetic.
//!
//! Pure functions over a schedule value and wall-clock instants; no I/O and
//! no failure modes. Calculations convert each instant into the schedule's
//! IANA zone and work on the local wall-clock components, which keeps the
//! math correct across DST transitions. Malformed schedule data (missing or
//! unparseable entries, unknown zones) degrades to "closed" / UTC instead of
//! erroring.
//!
//! The walks are deliberately minute-by-minute: simple, obviously correct
//! over arbitrary entry boundaries and holidays, and bounded by the safety
//! limits below so corrupt schedules cannot run away.

use chrono::{DateTime, Datelike, Days, Duration, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::domain::entities::BusinessHoursSchedule;

/// Upper bound on forward day scanning when looking for the next window.
const NEXT_START_SCAN_DAYS: u64 = 14;

/// Upper bound on minute iteration for deadline and elapsed walks.
const MAX_WALK_MINUTES: i64 = 365 * 24 * 60;

/// Result of an elapsed-minutes calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessMinutesReport {
    pub business_minutes: i64,
    /// Whether the `end` instant itself falls inside business hours.
    pub is_within_business_hours: bool,
    /// Next window start after `end`, when `end` is outside business hours.
    pub next_business_hours_start: Option<DateTime<Utc>>,
}

/// True when `instant` falls inside a business-hours window.
///
/// The window is half-open: the start minute counts, the end minute does not
/// (an instant exactly at closing time is outside).
pub fn is_within_business_hours(schedule: &BusinessHoursSchedule, instant: DateTime<Utc>) -> bool {
    if schedule.is_24x7 {
        return true;
    }
    is_within_local(schedule, &schedule.tz(), instant)
}

fn is_within_local(schedule: &BusinessHoursSchedule, tz: &Tz, instant: DateTime<Utc>) -> bool {
    let local = instant.with_timezone(tz);
    if schedule.is_holiday(local.date_naive()) {
        return false;
    }
    let entry = match schedule.entry_for(local.weekday()) {
        Some(entry) if entry.enabled => entry,
        _ => return false,
    };
    let (start, end) = match (entry.start(), entry.end()) {
        (Some(start), Some(end)) => (start, end),
        _ => return false,
    };
    // Minute resolution; seconds within the minute are irrelevant.
    let time_of_day = NaiveTime::from_hms_opt(local.hour(), local.minute(), 0)
        .unwrap_or_else(|| local.time());
    time_of_day >= start && time_of_day < end
}

/// The start of the next business-hours window at or after `instant`.
///
/// Returns `instant` itself when it is already inside a window (the caller
/// only needs a representative in-window instant). Scans forward at most 14
/// days; if no window exists within the bound the input is returned
/// unchanged — a documented fallback, not an error.
pub fn next_business_hours_start(
    schedule: &BusinessHoursSchedule,
    instant: DateTime<Utc>,
) -> DateTime<Utc> {
    if schedule.is_24x7 || is_within_business_hours(schedule, instant) {
        return instant;
    }

    let tz = schedule.tz();
    let local_date = instant.with_timezone(&tz).date_naive();

    for day_offset in 0..=NEXT_START_SCAN_DAYS {
        let date = match local_date.checked_add_days(Days::new(day_offset)) {
            Some(date) => date,
            None => break,
        };
        if schedule.is_holiday(date) {
            continue;
        }
        let entry = match schedule.entry_for(date.weekday()) {
            Some(entry) if entry.enabled => entry,
            _ => continue,
        };
        let start = match entry.start() {
            Some(start) => start,
            None => continue,
        };
        // `earliest` resolves DST-ambiguous local times; a window start that
        // falls into a spring-forward gap is skipped.
        let candidate = match tz.from_local_datetime(&date.and_time(start)).earliest() {
            Some(candidate) => candidate.with_timezone(&Utc),
            None => continue,
        };
        if candidate > instant {
            return candidate;
        }
    }

    instant
}

/// Business minutes elapsed between `start` and `end` (0 when `end <= start`).
pub fn elapsed_business_minutes(
    schedule: &BusinessHoursSchedule,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> BusinessMinutesReport {
    let within_end = is_within_business_hours(schedule, end);
    let next_start = if within_end {
        None
    } else {
        Some(next_business_hours_start(schedule, end))
    };

    if end <= start {
        return BusinessMinutesReport {
            business_minutes: 0,
            is_within_business_hours: within_end,
            next_business_hours_start: next_start,
        };
    }

    if schedule.is_24x7 {
        return BusinessMinutesReport {
            business_minutes: (end - start).num_minutes(),
            is_within_business_hours: within_end,
            next_business_hours_start: next_start,
        };
    }

    let tz = schedule.tz();
    let mut cursor = start;
    let mut minutes = 0i64;
    let mut steps = 0i64;
    while cursor < end && steps < MAX_WALK_MINUTES {
        if is_within_local(schedule, &tz, cursor) {
            minutes += 1;
        }
        cursor += Duration::minutes(1);
        steps += 1;
    }

    BusinessMinutesReport {
        business_minutes: minutes,
        is_within_business_hours: within_end,
        next_business_hours_start: next_start,
    }
}

/// The instant at which `target_minutes` of business time have been consumed
/// starting from `start`.
pub fn calculate_deadline(
    schedule: &BusinessHoursSchedule,
    start: DateTime<Utc>,
    target_minutes: i64,
) -> DateTime<Utc> {
    if target_minutes <= 0 {
        return start;
    }
    if schedule.is_24x7 {
        return start + Duration::minutes(target_minutes);
    }

    let tz = schedule.tz();
    let mut cursor = start;
    if !is_within_local(schedule, &tz, cursor) {
        cursor = next_business_hours_start(schedule, cursor);
    }

    let mut remaining = target_minutes;
    let mut steps = 0i64;
    while remaining > 0 && steps < MAX_WALK_MINUTES {
        if is_within_local(schedule, &tz, cursor) {
            cursor += Duration::minutes(1);
            remaining -= 1;
        } else {
            let next = next_business_hours_start(schedule, cursor);
            if next > cursor {
                cursor = next;
            } else {
                // No window within the scan bound; keep stepping so the
                // iteration cap still terminates the walk.
                cursor += Duration::minutes(1);
            }
        }
        steps += 1;
    }

    cursor
}

/// Signed business minutes between `now` and `deadline`: positive while the
/// deadline is ahead, negative once it is overdue.
pub fn remaining_business_minutes(
    schedule: &BusinessHoursSchedule,
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
) -> i64 {
    if now <= deadline {
        elapsed_business_minutes(schedule, now, deadline).business_minutes
    } else {
        -elapsed_business_minutes(schedule, deadline, now).business_minutes
    }
}

/// Human display for a minute count: "30m", "2h", "1h 30m", "1d", "1d 4h".
/// Negative values are formatted from the absolute magnitude with a leading
/// minus.
pub fn format_remaining_time(minutes: i64) -> String {
    if minutes < 0 {
        return format!("-{}", format_remaining_time(-minutes));
    }
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    if minutes < 24 * 60 {
        let hours = minutes / 60;
        let rem = minutes % 60;
        if rem == 0 {
            return format!("{}h", hours);
        }
        return format!("{}h {}m", hours, rem);
    }
    let days = minutes / (24 * 60);
    let rem_hours = (minutes % (24 * 60)) / 60;
    if rem_hours == 0 {
        return format!("{}d", days);
    }
    format!("{}d {}h", days, rem_hours)
}
