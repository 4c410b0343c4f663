//! Recurring-task generation.
//!
//! [`next_occurrence`] looks at one task and, when its due date has passed,
//! builds the next occurrence one recurrence unit later. It is pure: the
//! current instant comes in as a parameter and the input is never touched.
//! [`roll_forward`] is the caller-side pass over a whole task list that
//! persists which sources already produced a successor.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Local, NaiveDate, NaiveDateTime, SecondsFormat,
    Duration, TimeZone, Utc,
};
use tracing::debug;

use crate::models::{new_task_id, Recurrence, Status, Task};

/// Naive layouts accepted for due dates without an offset. Read as local time.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a due date as written by a client.
///
/// Accepts RFC 3339 (`2024-01-31T12:00:00+02:00`), a naive date-time
/// (`2024-01-31T12:00:00`) or a bare date (`2024-01-31`, local midnight).
/// Input without an offset is local time, pinned to the local offset in
/// effect at that instant. Anything else yields `None`.
pub fn parse_due_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return from_local(naive);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(from_local)
}

/// Resolves a wall-clock time in the local zone. Times skipped by a DST
/// jump move forward one hour.
fn from_local(naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| Local.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.fixed_offset())
}

/// Formats a due date the way generated occurrences store it.
pub fn format_due_date(due: &DateTime<FixedOffset>) -> String {
    due.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Adds `months` calendar months, clamping the day to the target month's
/// length. Jan 31 + 1 lands on Feb 28 or Feb 29, never in March.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    add_months_anchored(date, months, date.day())
}

/// Like [`add_months`], but aims for `anchor_day` rather than `date`'s own
/// day, so a series anchored on the 31st comes back to the 31st after
/// passing through a shorter month.
pub fn add_months_anchored(date: NaiveDate, months: u32, anchor_day: u32) -> Option<NaiveDate> {
    let total = date.year() * 12 + date.month0() as i32 + i32::try_from(months).ok()?;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = anchor_day.clamp(1, 31).min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Advances `last_due` by one unit of `recurrence`, keeping the wall-clock
/// time and the offset it was written in.
///
/// Returns `None` for `Recurrence::None` and unrecognized tags.
pub fn advance(
    last_due: DateTime<FixedOffset>,
    recurrence: &Recurrence,
    anchor_day: Option<u32>,
) -> Option<DateTime<FixedOffset>> {
    let local = last_due.naive_local();
    let next_local = match recurrence {
        Recurrence::Daily => local.checked_add_days(Days::new(1))?,
        Recurrence::Weekly => local.checked_add_days(Days::new(7))?,
        Recurrence::Monthly => {
            let anchor = anchor_day.unwrap_or_else(|| local.day());
            add_months_anchored(local.date(), 1, anchor)?.and_time(local.time())
        }
        Recurrence::None | Recurrence::Unrecognized(_) => return None,
    };
    last_due.offset().from_local_datetime(&next_local).single()
}

/// Computes the next occurrence of `task`, if one is due at `now`.
///
/// Returns `None` when the task does not recur, has no parsable due date,
/// carries an unrecognized recurrence tag, or is not yet past due
/// (`due >= now`). Otherwise returns a copy with a fresh id, the lifecycle
/// reset to pending, both timestamps set to `now` and the due date moved one
/// unit forward. At most one occurrence is produced per call.
pub fn next_occurrence(task: &Task, now: DateTime<Utc>) -> Option<Task> {
    if !task.recurrence.is_recurring() {
        return None;
    }

    let Some(last_due) = task.due_date.as_deref().and_then(parse_due_date) else {
        debug!(task_id = %task.id, due_date = ?task.due_date, "recurring task has no usable due date");
        return None;
    };

    let anchor_day = match task.recurrence {
        Recurrence::Monthly => Some(
            task.anchor_day
                .filter(|d| (1..=31).contains(d))
                .unwrap_or_else(|| last_due.day()),
        ),
        _ => None,
    };

    let Some(next_due) = advance(last_due, &task.recurrence, anchor_day) else {
        debug!(task_id = %task.id, recurrence = %task.recurrence, "cannot advance due date");
        return None;
    };

    if last_due.with_timezone(&Utc) >= now {
        return None;
    }

    let mut next = task.clone();
    next.id = new_task_id();
    next.completed = false;
    next.status = Status::Pending;
    next.created_at = now;
    next.updated_at = now;
    next.due_date = Some(format_due_date(&next_due));
    next.superseded_by = None;
    if anchor_day.is_some() {
        next.anchor_day = anchor_day;
    }

    debug!(
        source_id = %task.id,
        next_id = %next.id,
        due_date = %format_due_date(&next_due),
        "generated next occurrence"
    );
    Some(next)
}

/// Runs [`next_occurrence`] over every task in `tasks` and appends the results.
///
/// Sources that already produced a successor (`superseded_by` set) and
/// deleted tasks are skipped; each source that produces one now gets
/// `superseded_by` pointed at it, so re-running at the same instant adds
/// nothing. Generated tasks are only evaluated on the next pass. Returns the
/// newly appended tasks.
pub fn roll_forward(tasks: &mut Vec<Task>, now: DateTime<Utc>) -> Vec<Task> {
    let mut generated = Vec::new();
    for source in tasks.iter_mut() {
        if source.deleted || source.superseded_by.is_some() {
            continue;
        }
        if let Some(next) = next_occurrence(source, now) {
            source.superseded_by = Some(next.id.clone());
            source.updated_at = now;
            generated.push(next);
        }
    }
    tasks.extend(generated.iter().cloned());
    generated
}
