//! # tasktide
//!
//! A terminal task manager whose recurring tasks roll themselves forward.
//!
//! The heart of the crate is [`recurrence::next_occurrence`]: given a task
//! and the current instant it decides whether the task's due date has
//! passed and, if so, builds the next occurrence one day, week or month
//! later (clamping Jan 31 to the end of February, keeping Feb 29 anchors out
//! of March). Everything else here is the caller around it: a JSON task
//! store, the CLI commands, and urgency sorting.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod storage;
pub mod urgency;

pub use error::{Error, Result};
pub use models::{Priority, Recurrence, Status, Task};
pub use recurrence::{next_occurrence, roll_forward};
