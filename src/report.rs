//! Task listings.
//!
//! Personal tasks are always listed before work tasks. Each variant formats its
//! remaining time in its own field order.

use chrono::{Local, NaiveDate};

use crate::db::Database;
use crate::fields::Kind;
use crate::task::{Remaining, Task};

/// Format one listing line, with the note appended when `with_note` is set.
pub fn format_task_line(task: &Task, today: NaiveDate, with_note: bool) -> String {
    let mut line = match task.remaining_days(today) {
        Remaining::Personal { label, days } => format!(
            "PersonalTask: {}, {}, {}, {}, Priority: {}, Remaining Days: {}, Task status: {}",
            task.task_number, task.name, label, task.color, task.priority, days, task.status
        ),
        Remaining::Work { days, deadline } => format!(
            "WorkTask: {}, {}, {}, {}, Priority: {}, Remaining Days: {}, Task status: {}",
            task.task_number, task.name, deadline, task.color, task.priority, days, task.status
        ),
    };
    if with_note {
        if let Some(note) = task.note.as_deref().filter(|n| !n.is_empty()) {
            line.push_str(&format!(", Note: {note}"));
        }
    }
    line
}

fn grouped<'a>(db: &'a Database, keep: impl Fn(&Task) -> bool) -> (Vec<&'a Task>, Vec<&'a Task>) {
    db.tasks()
        .iter()
        .filter(|&t| keep(t))
        .partition(|t| t.kind == Kind::Personal)
}

/// Pending tasks, in store order within each variant.
pub fn pending_lines(db: &Database, today: NaiveDate) -> Vec<String> {
    let (personal, work) = grouped(db, Task::is_pending);
    personal
        .into_iter()
        .chain(work)
        .map(|t| format_task_line(t, today, false))
        .collect()
}

/// Every task, ordered by number within each variant, notes included.
pub fn all_lines(db: &Database, today: NaiveDate) -> Vec<String> {
    let (mut personal, mut work) = grouped(db, |_| true);
    personal.sort_by_key(|t| t.task_number);
    work.sort_by_key(|t| t.task_number);
    personal
        .into_iter()
        .chain(work)
        .map(|t| format_task_line(t, today, true))
        .collect()
}

pub fn print_pending(db: &Database) {
    for line in pending_lines(db, Local::now().date_naive()) {
        println!("{line}");
    }
}

pub fn print_all(db: &Database) {
    for line in all_lines(db, Local::now().date_naive()) {
        println!("{line}");
    }
}
