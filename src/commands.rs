use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Priority, Recurrence, Status, Task};
use crate::recurrence::{format_due_date, parse_due_date, roll_forward};
use crate::storage::Storage;
use crate::urgency::compute_urgency;

/// Characters of the id shown in tables. Any unique prefix is accepted as input.
const SHORT_ID_LEN: usize = 8;

/// Optional field changes for [`cmd_edit`].
#[derive(Debug, Default, Clone)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due: Option<String>,
    pub recurrence: Option<Recurrence>,
}

/// Validates a due date and rewrites it in the stored RFC 3339 form.
fn normalize_due(raw: &str) -> Result<String> {
    parse_due_date(raw)
        .map(|d| format_due_date(&d))
        .ok_or_else(|| Error::InvalidDate(raw.to_string()))
}

/// Finds a task by exact id or by unique id prefix.
fn find_index(tasks: &[Task], id: &str) -> Result<usize> {
    if let Some(idx) = tasks.iter().position(|t| t.id == id) {
        return Ok(idx);
    }
    let mut matches = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| !id.is_empty() && t.id.starts_with(id));
    match (matches.next(), matches.next()) {
        (Some((idx, _)), None) => Ok(idx),
        (Some(_), Some(_)) => Err(Error::InvalidArgument(format!(
            "id prefix '{}' matches more than one task",
            id
        ))),
        _ => Err(Error::TaskNotFound(id.to_string())),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Adds a new task to the database and returns its id.
pub fn cmd_add(
    storage: &Storage,
    title: String,
    description: Option<String>,
    priority: Option<Priority>,
    due: Option<String>,
    recurrence: Option<Recurrence>,
    silent: bool,
) -> Result<String> {
    let due_date = due.as_deref().map(normalize_due).transpose()?;
    let recurrence = recurrence.unwrap_or_default();
    if recurrence.is_recurring() && due_date.is_none() && !silent {
        eprintln!("Warning: recurring task has no due date and will not repeat.");
    }

    let mut task = Task::new(title, Utc::now());
    task.description = description;
    task.priority = priority.unwrap_or_default();
    task.due_date = due_date;
    task.recurrence = recurrence;

    storage.save_task(&task)?;
    info!(task_id = %task.id, "task added");
    if !silent {
        println!("Task added (id = {})", task.id);
    }
    Ok(task.id)
}

/// Marks a task as complete.
///
/// The next occurrence of a recurring task is not created here; it appears
/// on the next roll-forward once the due date has passed.
pub fn cmd_complete(storage: &Storage, id: &str, silent: bool) -> Result<()> {
    cmd_set_status(storage, id, Status::Completed, silent)
}

/// Moves a task to another lifecycle status.
pub fn cmd_set_status(storage: &Storage, id: &str, status: Status, silent: bool) -> Result<()> {
    let mut tasks = storage.load_tasks()?;
    let idx = find_index(&tasks, id)?;
    tasks[idx].set_status(status, Utc::now());
    storage.save_tasks(&tasks)?;
    if !silent {
        println!("Task {} marked as {}.", short_id(&tasks[idx].id), status);
    }
    Ok(())
}

/// Edits an existing task's details.
///
/// Changing the due date or the recurrence starts a new series: the monthly
/// anchor day is dropped and the task becomes eligible to recur again even
/// if it already produced a successor.
pub fn cmd_edit(storage: &Storage, id: &str, edit: TaskEdit, silent: bool) -> Result<()> {
    let mut tasks = storage.load_tasks()?;
    let idx = find_index(&tasks, id)?;
    let due_date = edit.due.as_deref().map(normalize_due).transpose()?;

    let t = &mut tasks[idx];
    if let Some(title) = edit.title {
        t.title = title;
    }
    if let Some(d) = edit.description {
        t.description = Some(d);
    }
    if let Some(p) = edit.priority {
        t.priority = p;
    }
    if let Some(d) = due_date {
        t.due_date = Some(d);
        t.anchor_day = None;
        t.superseded_by = None;
    }
    if let Some(r) = edit.recurrence {
        t.recurrence = r;
        t.anchor_day = None;
        t.superseded_by = None;
    }
    t.updated_at = Utc::now();
    let short = short_id(&t.id).to_string();

    storage.save_tasks(&tasks)?;
    if !silent {
        println!("Task {} updated.", short);
    }
    Ok(())
}

/// Removes a task. Soft-deletes unless `purge` is set.
pub fn cmd_remove(storage: &Storage, id: &str, purge: bool, silent: bool) -> Result<()> {
    let mut tasks = storage.load_tasks()?;
    let idx = find_index(&tasks, id)?;
    let full_id = tasks[idx].id.clone();
    if purge {
        tasks.remove(idx);
    } else {
        tasks[idx].deleted = true;
        tasks[idx].updated_at = Utc::now();
    }
    storage.save_tasks(&tasks)?;
    if !silent {
        println!("Task {} removed.", short_id(&full_id));
    }
    Ok(())
}

/// Generates the next occurrence of every elapsed recurring task and
/// persists them. Returns the generated tasks.
pub fn cmd_recur(storage: &Storage, now: DateTime<Utc>, silent: bool) -> Result<Vec<Task>> {
    let mut tasks = storage.load_tasks()?;
    let generated = roll_forward(&mut tasks, now);
    if generated.is_empty() {
        if !silent {
            println!("No recurring tasks due.");
        }
        return Ok(generated);
    }
    storage.save_tasks(&tasks)?;
    for t in &generated {
        info!(task_id = %t.id, due_date = ?t.due_date, "recurring task generated");
        if !silent {
            println!(
                "Recurring task '{}' created (id = {}) due {}",
                t.title,
                t.id,
                t.due_date.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(generated)
}

/// Lists tasks in a formatted table, sorted by urgency.
///
/// Elapsed recurring tasks are rolled forward first. Completed and archived
/// tasks are hidden unless `all` is true; deleted tasks are never shown.
pub fn cmd_list(storage: &Storage, all: bool) -> Result<()> {
    let now = Utc::now();
    cmd_recur(storage, now, true)?;

    let mut tasks = storage.load_tasks()?;
    tasks.retain(|t| !t.deleted && (all || t.is_active()));
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    // Sort by urgency descending
    tasks.sort_by(|a, b| compute_urgency(b, now).total_cmp(&compute_urgency(a, now)));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Time Left").add_attribute(Attribute::Bold),
            Cell::new("Repeats").add_attribute(Attribute::Bold),
            Cell::new("Urg").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    let today = now.with_timezone(&Local).date_naive();

    for t in &tasks {
        let urgency = compute_urgency(t, now);
        let due = t.due_date.as_deref().and_then(parse_due_date);
        let (due_str, time_left_str, overdue) = match due {
            Some(d) => {
                let days_left = (d.with_timezone(&Local).date_naive() - today).num_days();
                let left = if days_left < 0 {
                    format!("{}d overdue", days_left.abs())
                } else if days_left == 0 {
                    "Today".to_string()
                } else {
                    format!("{}d", days_left)
                };
                (d.format("%Y-%m-%d %H:%M").to_string(), left, d.with_timezone(&Utc) < now)
            }
            None => ("-".to_string(), "-".to_string(), false),
        };

        let urgency_color = if t.completed {
            Color::Grey
        } else if urgency > 50.0 {
            Color::Red
        } else if urgency > 20.0 {
            Color::Yellow
        } else {
            Color::Green
        };

        let status_color = match t.status {
            Status::Completed => Color::Green,
            Status::Archived => Color::Grey,
            Status::InProgress => Color::Cyan,
            Status::Pending => Color::Yellow,
        };

        table.add_row(vec![
            Cell::new(short_id(&t.id)),
            Cell::new(&t.title),
            Cell::new(t.priority),
            Cell::new(due_str),
            Cell::new(time_left_str).fg(if overdue && !t.completed { Color::Red } else { Color::Reset }),
            Cell::new(if t.recurrence.is_recurring() { t.recurrence.to_string() } else { String::new() }),
            Cell::new(format!("{:.1}", urgency)).fg(urgency_color),
            Cell::new(t.status).fg(status_color),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Counts shown by [`cmd_stats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub overdue: usize,
    pub recurring: usize,
    pub completed: usize,
}

/// Summarizes the non-deleted tasks at `now`.
///
/// A task is overdue when it has a due date, is not completed, and the due
/// instant is before `now`.
pub fn summarize(tasks: &[Task], now: DateTime<Utc>) -> Summary {
    tasks.iter().filter(|t| !t.deleted).fold(Summary::default(), |mut s, t| {
        s.total += 1;
        if t.completed {
            s.completed += 1;
        }
        if t.recurrence.is_recurring() {
            s.recurring += 1;
        }
        let past_due = t
            .due_date
            .as_deref()
            .and_then(parse_due_date)
            .is_some_and(|d| d.with_timezone(&Utc) < now);
        if past_due && !t.completed {
            s.overdue += 1;
        }
        s
    })
}

/// Prints the task summary.
pub fn cmd_stats(storage: &Storage) -> Result<()> {
    let summary = summarize(&storage.load_tasks()?, Utc::now());
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Count"]);
    table.add_row(vec![Cell::new("Total Tasks"), Cell::new(summary.total)]);
    table.add_row(vec![
        Cell::new("Overdue"),
        Cell::new(summary.overdue).fg(if summary.overdue > 0 { Color::Red } else { Color::Reset }),
    ]);
    table.add_row(vec![Cell::new("Recurring Tasks"), Cell::new(summary.recurring)]);
    table.add_row(vec![Cell::new("Completed"), Cell::new(summary.completed).fg(Color::Green)]);
    println!("{table}");
    Ok(())
}

/// Resets the database by deleting all tasks.
pub fn cmd_reset(storage: &Storage, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all tasks? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }

    storage.delete_database()?;
    println!("Database {} reset successfully.", storage.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with_id(id: &str) -> Task {
        let mut t = Task::new("t", Utc::now());
        t.id = id.to_string();
        t
    }

    #[test]
    fn find_index_accepts_unique_prefix() {
        let tasks = vec![task_with_id("abc123"), task_with_id("abd456")];
        assert_eq!(find_index(&tasks, "abd").unwrap(), 1);
        assert_eq!(find_index(&tasks, "abc123").unwrap(), 0);
    }

    #[test]
    fn find_index_rejects_ambiguous_or_unknown() {
        let tasks = vec![task_with_id("abc123"), task_with_id("abd456")];
        assert!(matches!(find_index(&tasks, "ab"), Err(Error::InvalidArgument(_))));
        assert!(matches!(find_index(&tasks, "zzz"), Err(Error::TaskNotFound(_))));
        assert!(matches!(find_index(&tasks, ""), Err(Error::TaskNotFound(_))));
    }

    #[test]
    fn normalize_due_rewrites_to_rfc3339() {
        assert_eq!(normalize_due("2025-12-01T08:30:00+02:00").unwrap(), "2025-12-01T08:30:00+02:00");
        assert_eq!(normalize_due("2025-12-01T08:30:00.000Z").unwrap(), "2025-12-01T08:30:00Z");
        assert!(matches!(normalize_due("tomorrow"), Err(Error::InvalidDate(_))));
    }
}
