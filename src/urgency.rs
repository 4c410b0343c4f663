use chrono::{DateTime, Utc};

use crate::models::{Priority, Status, Task};
use crate::recurrence::parse_due_date;

/// Calculates the urgency score for a given task at `now`.
///
/// The score is based on:
/// - **Due Date**: Closer deadlines yield higher scores. Overdue tasks get a significant boost.
/// - **Priority**: Each priority level adds a fixed bonus.
///
/// # Returns
/// - `-1.0` if the task is completed or archived.
/// - A non-negative float representing urgency (higher is more urgent).
pub fn compute_urgency(task: &Task, now: DateTime<Utc>) -> f64 {
    if task.completed || task.status == Status::Archived {
        return -1.0;
    }
    let priority_bonus = match task.priority {
        Priority::Low => 0.0,
        Priority::Medium => 5.0,
        Priority::High => 10.0,
        Priority::Urgent => 20.0,
    };
    let due_score = match task.due_date.as_deref().and_then(parse_due_date) {
        None => 0.0,
        Some(due) => {
            let days_left = (due.with_timezone(&Utc) - now).num_minutes() as f64 / (24.0 * 60.0);
            if days_left <= 0.0 {
                // overdue -> high urgency, growing with every day late
                100.0 + days_left.abs() * 2.0
            } else {
                // anything due within the hour counts as an hour away
                (1.0 / days_left.max(1.0 / 24.0)) * 10.0
            }
        }
    };
    let score = due_score + priority_bonus;
    if score.is_finite() { score } else { 0.0 }
}
