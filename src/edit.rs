//! Search, edit and delete operations.
//!
//! Edit and delete share one flow: look tasks up by a free-form identifier,
//! then pick one of the matches by its position in the result list.

use crate::db::Database;
use crate::error::{DbError, Result};
use crate::fields::{parse_color, parse_priority};
use crate::task::{parse_deadline, Task};

/// Field overrides for an edit. Empty or missing values leave the field alone.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub deadline: Option<String>,
    pub priority: Option<String>,
    pub color: Option<String>,
}

fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.deadline, &self.priority, &self.color]
            .into_iter()
            .all(|v| supplied(v).is_none())
    }

    /// Validate every supplied value, then apply them all.
    pub fn apply(&self, task: &mut Task) -> Result<()> {
        let deadline = supplied(&self.deadline).map(parse_deadline).transpose()?;
        let priority = supplied(&self.priority)
            .map(|p| parse_priority(p).ok_or_else(|| invalid("priority", p)))
            .transpose()?;
        let color = supplied(&self.color)
            .map(|c| parse_color(c).ok_or_else(|| invalid("color", c)))
            .transpose()?;

        if let Some(name) = supplied(&self.name) { task.name = name.to_string(); }
        if let Some(d) = deadline { task.deadline = d; }
        if let Some(p) = priority { task.priority = p; }
        if let Some(c) = color { task.color = c; }
        Ok(())
    }
}

fn invalid(field: &'static str, value: &str) -> DbError {
    DbError::InvalidValue { field, value: value.to_string() }
}

/// Does `identifier` select `task`: case-insensitive name substring, or exact number.
pub fn matches_identifier(task: &Task, identifier: &str) -> bool {
    task.name.to_lowercase().contains(&identifier.to_lowercase())
        || task.task_number.to_string() == identifier
}

impl Database {
    /// Store positions of every task matching `identifier`, in store order.
    pub fn similar_indices(&self, identifier: &str) -> Vec<usize> {
        self.tasks()
            .iter()
            .enumerate()
            .filter(|(_, t)| matches_identifier(t, identifier))
            .map(|(i, _)| i)
            .collect()
    }

    /// Every task matching `identifier`, in store order.
    pub fn find_similar(&self, identifier: &str) -> Vec<&Task> {
        self.tasks()
            .iter()
            .filter(|t| matches_identifier(t, identifier))
            .collect()
    }

    /// Resolve a user's pick among the matches for `identifier` to a store position.
    pub fn select(&self, identifier: &str, selection: &str) -> Result<usize> {
        let matches = self.similar_indices(identifier);
        if matches.is_empty() {
            return Err(DbError::NoMatches(identifier.to_string()));
        }
        let index: usize = selection
            .trim()
            .parse()
            .map_err(|_| DbError::InvalidIndex(selection.trim().to_string()))?;
        matches
            .get(index)
            .copied()
            .ok_or(DbError::IndexOutOfRange { index, len: matches.len() })
    }

    /// Apply `edit` to the selected match. The task is untouched on error.
    pub fn edit(&mut self, identifier: &str, selection: &str, edit: &TaskEdit) -> Result<&Task> {
        let idx = self.select(identifier, selection)?;
        let task = self
            .get_mut(idx)
            .ok_or(DbError::IndexOutOfRange { index: idx, len: 0 })?;
        edit.apply(task)?;
        Ok(&*task)
    }

    /// Remove the selected match and return it.
    pub fn delete(&mut self, identifier: &str, selection: &str) -> Result<Task> {
        let idx = self.select(identifier, selection)?;
        self.remove_at(idx)
            .ok_or(DbError::IndexOutOfRange { index: idx, len: 0 })
    }
}
