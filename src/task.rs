//! Task data structure and deadline arithmetic.
//!
//! A task is one struct tagged with its `Kind`. The variants differ only in how
//! the time left before the deadline is presented, which `Remaining` captures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};
use crate::fields::*;

/// Date format used for deadlines on disk and on screen.
pub const DEADLINE_FORMAT: &str = "%d/%m/%Y";

/// A single tracked task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(with = "deadline_format")]
    pub deadline: NaiveDate,
    pub priority: Priority,
    pub color: Color,
    #[serde(rename = "task_status", default)]
    pub status: Status,
    #[serde(rename = "type")]
    pub kind: Kind,
    pub task_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// User-supplied fields for a task that has not been numbered yet.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub deadline: NaiveDate,
    pub priority: Priority,
    pub color: Color,
    pub note: Option<String>,
}

/// Time left before a task's deadline, shaped by its variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remaining {
    /// Relative label ("Today", "Next Week", a weekday...) and the raw day count.
    Personal { label: String, days: i64 },
    /// Raw day count and the absolute deadline as `dd/mm/yyyy`.
    Work { days: i64, deadline: String },
}

impl Task {
    pub fn new(kind: Kind, task_number: u32, new: NewTask) -> Self {
        Task {
            name: new.name,
            deadline: new.deadline,
            priority: new.priority,
            color: new.color,
            status: Status::Pending,
            kind,
            task_number,
            note: new.note.filter(|n| !n.is_empty()),
        }
    }

    /// Compute the time left relative to `today`.
    pub fn remaining_days(&self, today: NaiveDate) -> Remaining {
        let days = (self.deadline - today).num_days();
        match self.kind {
            Kind::Personal => Remaining::Personal {
                label: personal_label(self.deadline, days),
                days,
            },
            Kind::Work => Remaining::Work {
                days,
                deadline: format_deadline(self.deadline),
            },
        }
    }

    /// Set or replace the note.
    pub fn add_note(&mut self, note: impl Into<String>) {
        self.note = Some(note.into());
    }

    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }
}

fn personal_label(deadline: NaiveDate, days: i64) -> String {
    match days {
        d if d < 0 => "Overdue".into(),
        0 => "Today".into(),
        1 => "Tomorrow".into(),
        2..=7 => deadline.format("%A").to_string(),
        8..=14 => "Next Week".into(),
        15..=30 => "This Month".into(),
        31..=60 => "Next Month".into(),
        _ => "There is still more time.".into(),
    }
}

/// Parse a `dd/mm/yyyy` deadline.
pub fn parse_deadline(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DEADLINE_FORMAT)
        .map_err(|_| DbError::InvalidDeadline(s.trim().to_string()))
}

pub fn format_deadline(d: NaiveDate) -> String {
    d.format(DEADLINE_FORMAT).to_string()
}

mod deadline_format {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::DEADLINE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(DEADLINE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDate::parse_from_str(raw.trim(), DEADLINE_FORMAT).map_err(de::Error::custom)
    }
}
