use chrono::{Duration, SecondsFormat, Utc};
use tasktide::models::{Priority, Status, Task};
use tasktide::urgency::compute_urgency;

fn task_due_in(hours: i64, priority: Priority) -> Task {
    let now = Utc::now();
    let mut task = Task::new("Test", now);
    task.priority = priority;
    task.due_date = Some((now + Duration::hours(hours)).to_rfc3339_opts(SecondsFormat::Secs, true));
    task
}

#[test]
fn test_urgency_calculation() {
    let task = task_due_in(24, Priority::Medium);
    let urgency = compute_urgency(&task, Utc::now());
    // Urgency should be positive
    assert!(urgency > 0.0);
}

#[test]
fn test_urgency_overdue() {
    let task = task_due_in(-24, Priority::Low);
    let urgency = compute_urgency(&task, Utc::now());
    // Should be very high because it's overdue (base 100 + ...)
    assert!(urgency > 100.0);
}

#[test]
fn test_urgency_priority_breaks_ties() {
    let now = Utc::now();
    let low = task_due_in(72, Priority::Low);
    let urgent = task_due_in(72, Priority::Urgent);
    assert!(compute_urgency(&urgent, now) > compute_urgency(&low, now));
}

#[test]
fn test_urgency_completed_is_negative() {
    let now = Utc::now();
    let mut task = task_due_in(-24, Priority::Urgent);
    task.set_status(Status::Completed, now);
    assert_eq!(compute_urgency(&task, now), -1.0);
}

#[test]
fn test_urgency_without_due_date() {
    let task = Task::new("Someday", Utc::now());
    assert_eq!(compute_urgency(&task, Utc::now()), 5.0);
}
