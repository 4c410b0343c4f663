use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How often a task regenerates once its due date has passed.
///
/// Tags outside the closed set can still arrive from hand-edited files or
/// other clients; they deserialize into `Unrecognized` and never recur.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(from = "Option<String>", into = "String")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Unrecognized(String),
}

impl Recurrence {
    /// Whether the task carries any recurrence tag at all.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }
}

impl From<Option<String>> for Recurrence {
    fn from(tag: Option<String>) -> Self {
        match tag {
            None => Recurrence::None,
            Some(tag) => match tag.trim().to_lowercase().as_str() {
                "" | "none" => Recurrence::None,
                "daily" => Recurrence::Daily,
                "weekly" => Recurrence::Weekly,
                "monthly" => Recurrence::Monthly,
                _ => Recurrence::Unrecognized(tag),
            },
        }
    }
}

impl From<Recurrence> for String {
    fn from(r: Recurrence) -> Self {
        r.to_string()
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::None => f.write_str("none"),
            Recurrence::Daily => f.write_str("daily"),
            Recurrence::Weekly => f.write_str("weekly"),
            Recurrence::Monthly => f.write_str("monthly"),
            Recurrence::Unrecognized(tag) => f.write_str(tag),
        }
    }
}

/// Strict parse used for user input: unknown tags are rejected here rather
/// than stored.
impl FromStr for Recurrence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Recurrence::from(Some(s.to_string())) {
            Recurrence::Unrecognized(tag) => Err(Error::InvalidArgument(format!(
                "unknown recurrence '{}'. Supported: none, daily, weekly, monthly",
                tag
            ))),
            r => Ok(r),
        }
    }
}

/// Lifecycle state of a single occurrence.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Completed,
    Archived,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
            Status::Archived => "archived",
        };
        f.write_str(s)
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(Status::Pending),
            "in_progress" => Ok(Status::InProgress),
            "completed" | "done" => Ok(Status::Completed),
            "archived" => Ok(Status::Archived),
            other => Err(Error::InvalidArgument(format!(
                "unknown status '{}'. Supported: pending, in_progress, completed, archived",
                other
            ))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(Error::InvalidArgument(format!(
                "unknown priority '{}'. Supported: low, medium, high, urgent",
                other
            ))),
        }
    }
}

/// Represents a single task occurrence.
///
/// Field names follow the camelCase JSON used by the web client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique identifier.
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the current occurrence has been completed.
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    /// Due instant as written by the client. Parsed leniently by
    /// [`crate::recurrence::parse_due_date`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Day-of-month a monthly series keeps returning to after short months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_day: Option<u32>,
    /// Id of the occurrence generated from this one, once there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending, non-recurring task with a fresh id.
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Task {
            id: new_task_id(),
            title: title.into(),
            description: None,
            completed: false,
            status: Status::Pending,
            priority: Priority::default(),
            due_date: None,
            recurrence: Recurrence::None,
            anchor_day: None,
            superseded_by: None,
            deleted: false,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets status and keeps the `completed` flag in sync with it.
    pub fn set_status(&mut self, status: Status, now: DateTime<Utc>) {
        self.status = status;
        self.completed = status == Status::Completed;
        self.updated_at = now;
    }

    /// Whether the task still belongs on the active board.
    pub fn is_active(&self) -> bool {
        !self.deleted && !self.completed && self.status != Status::Archived
    }
}

/// Fresh identifier for a task: a random UUID v4, unique without any shared
/// counter or coordination between callers.
pub fn new_task_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurrence_tags_deserialize_leniently() {
        let parse = |json: &str| serde_json::from_str::<Recurrence>(json).unwrap();
        assert_eq!(parse("\"daily\""), Recurrence::Daily);
        assert_eq!(parse("\"Monthly\""), Recurrence::Monthly);
        assert_eq!(parse("null"), Recurrence::None);
        assert_eq!(parse("\"yearly\""), Recurrence::Unrecognized("yearly".into()));
    }

    #[test]
    fn recurrence_serializes_as_tag() {
        assert_eq!(serde_json::to_string(&Recurrence::Weekly).unwrap(), "\"weekly\"");
        assert_eq!(
            serde_json::to_string(&Recurrence::Unrecognized("hourly".into())).unwrap(),
            "\"hourly\""
        );
    }

    #[test]
    fn recurrence_from_str_rejects_unknown_tags() {
        assert_eq!("weekly".parse::<Recurrence>().unwrap(), Recurrence::Weekly);
        assert!("fortnightly".parse::<Recurrence>().is_err());
    }

    #[test]
    fn task_reads_web_client_json() {
        let json = r#"{
            "id": "task_1",
            "title": "Task #1",
            "description": "Description for task 1",
            "completed": false,
            "status": "in_progress",
            "priority": "urgent",
            "dueDate": "2024-01-10T09:00:00Z",
            "deleted": false,
            "userId": "user_1",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
            "recurrence": "daily"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.recurrence, Recurrence::Daily);
        assert_eq!(task.due_date.as_deref(), Some("2024-01-10T09:00:00Z"));
        assert_eq!(task.anchor_day, None);
    }

    #[test]
    fn new_task_ids_are_distinct_v4_uuids() {
        let a = new_task_id();
        let b = new_task_id();
        assert_ne!(a, b);
        assert_eq!(uuid::Uuid::parse_str(&a).unwrap().get_version_num(), 4);
    }

    #[test]
    fn set_status_keeps_completed_flag_in_sync() {
        let now = Utc::now();
        let mut task = Task::new("Write report", now);
        task.set_status(Status::Completed, now);
        assert!(task.completed);
        task.set_status(Status::InProgress, now);
        assert!(!task.completed);
    }
}
