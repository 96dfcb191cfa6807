//! In-memory task store and its JSON persistence.
//!
//! The file on disk is a flat JSON array with one object per task. The store
//! owns per-variant counters so task numbers stay unique within a variant.

use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{DbError, Result};
use crate::fields::*;
use crate::task::{NewTask, Task};

/// In-memory database for storing and managing tasks.
#[derive(Debug, Default)]
pub struct Database {
    tasks: Vec<Task>,
    personal_count: u32,
    work_count: u32,
}

/// A task as read from disk, before it has a guaranteed number.
#[derive(Deserialize)]
struct TaskRecord {
    name: String,
    #[serde(deserialize_with = "deserialize_deadline")]
    deadline: NaiveDate,
    priority: Priority,
    color: Color,
    #[serde(default)]
    task_status: Status,
    #[serde(rename = "type")]
    kind: Kind,
    #[serde(default)]
    task_number: Option<u32>,
    #[serde(default)]
    note: Option<String>,
}

fn deserialize_deadline<'de, D: serde::Deserializer<'de>>(d: D) -> std::result::Result<NaiveDate, D::Error> {
    let raw = String::deserialize(d)?;
    crate::task::parse_deadline(&raw).map_err(serde::de::Error::custom)
}

impl Database {
    /// Load the store from a JSON file.
    ///
    /// Records missing a `task_number` get one past the highest number seen so
    /// far for their variant. Records that cannot be decoded, or that carry
    /// number 0, are skipped; the file is then copied to `<name>.json.bak` so
    /// the next save cannot lose them.
    pub fn load(path: &Path) -> Result<Self> {
        let mut buf = String::new();
        match File::open(path) {
            Ok(mut f) => {
                f.read_to_string(&mut buf)?;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DbError::MissingFile(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        }

        let records: Vec<serde_json::Value> = serde_json::from_str(&buf)?;
        let mut db = Database::default();
        let mut skipped = 0;
        for (i, value) in records.into_iter().enumerate() {
            let record: TaskRecord = match serde_json::from_value(value) {
                Ok(r) => r,
                Err(e) => {
                    warn!(index = i, error = %e, "skipping unreadable task record");
                    skipped += 1;
                    continue;
                }
            };
            let number = match record.task_number {
                Some(0) => None,
                Some(n) => Some(n),
                None => db.counter(record.kind).checked_add(1),
            };
            let Some(number) = number else {
                warn!(index = i, name = %record.name, "skipping task record without a usable number");
                skipped += 1;
                continue;
            };
            db.push(Task {
                name: record.name,
                deadline: record.deadline,
                priority: record.priority,
                color: record.color,
                status: record.task_status,
                kind: record.kind,
                task_number: number,
                note: record.note,
            });
        }
        if skipped > 0 {
            let backup = path.with_extension("json.bak");
            fs::copy(path, &backup)?;
            warn!(skipped, backup = %backup.display(), "kept a copy of the task file before dropping records");
        }
        info!(path = %path.display(), tasks = db.tasks.len(), "loaded tasks");
        Ok(db)
    }

    /// Load the store for a session that will save back to `path`.
    ///
    /// A missing file starts an empty store. A file that exists but cannot be
    /// read or parsed is an error, so it is never overwritten.
    pub fn open(path: &Path) -> Result<Self> {
        match Database::load(path) {
            Err(e @ DbError::MissingFile(_)) => {
                warn!("{e}");
                Ok(Database::default())
            }
            other => other,
        }
    }

    /// Save every task to JSON using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(&self.tasks)?;
        let written = File::create(&tmp)
            .and_then(|mut f| {
                f.write_all(data.as_bytes())?;
                f.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(path = %path.display(), tasks = self.tasks.len(), "saved tasks");
        Ok(())
    }

    fn counter(&self, kind: Kind) -> u32 {
        match kind {
            Kind::Personal => self.personal_count,
            Kind::Work => self.work_count,
        }
    }

    fn counter_mut(&mut self, kind: Kind) -> &mut u32 {
        match kind {
            Kind::Personal => &mut self.personal_count,
            Kind::Work => &mut self.work_count,
        }
    }

    /// The number the next task of `kind` will receive.
    pub fn next_number(&self, kind: Kind) -> Result<u32> {
        self.counter(kind)
            .checked_add(1)
            .ok_or(DbError::NumbersExhausted(kind))
    }

    /// Create and append a task, numbering it within its variant.
    pub fn add(&mut self, kind: Kind, new: NewTask) -> Result<&Task> {
        let number = self.next_number(kind)?;
        self.push(Task::new(kind, number, new));
        let idx = self.tasks.len() - 1;
        Ok(&self.tasks[idx])
    }

    /// Append an already-numbered task.
    pub fn push(&mut self, task: Task) {
        let counter = self.counter_mut(task.kind);
        *counter = (*counter).max(task.task_number);
        self.tasks.push(task);
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Task> {
        self.tasks.get_mut(index)
    }

    /// First task whose name matches exactly.
    pub fn find_by_name(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    fn find_by_name_mut(&mut self, name: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| DbError::NotFound(name.to_string()))
    }

    /// Mark the first task named `name` as completed.
    pub fn mark_completed(&mut self, name: &str) -> Result<()> {
        let task = self.find_by_name_mut(name)?;
        task.status = Status::Completed;
        Ok(())
    }

    /// Status of the first task named `name`.
    pub fn get_status(&self, name: &str) -> Result<Status> {
        self.find_by_name(name)
            .map(|t| t.status)
            .ok_or_else(|| DbError::NotFound(name.to_string()))
    }

    /// Attach a note to the first task named `name`.
    pub fn add_note(&mut self, name: &str, note: &str) -> Result<()> {
        self.find_by_name_mut(name)?.add_note(note);
        Ok(())
    }

    /// Remove the task at a store position. Numbers of other tasks are untouched.
    pub fn remove_at(&mut self, index: usize) -> Option<Task> {
        if index < self.tasks.len() {
            Some(self.tasks.remove(index))
        } else {
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tempfile::TempDir;

    use super::*;

    pub(crate) fn new_task(name: &str, deadline: &str) -> NewTask {
        NewTask {
            name: name.into(),
            deadline: crate::task::parse_deadline(deadline).unwrap(),
            priority: Priority::Medium,
            color: Color::Red,
            note: None,
        }
    }

    #[test]
    fn test_numbering_is_per_variant() {
        let mut db = Database::default();
        assert_eq!(db.add(Kind::Personal, new_task("a", "01/01/2030")).unwrap().task_number, 1);
        assert_eq!(db.add(Kind::Work, new_task("b", "01/01/2030")).unwrap().task_number, 1);
        assert_eq!(db.add(Kind::Personal, new_task("c", "01/01/2030")).unwrap().task_number, 2);
        let same_kind = db.tasks().iter().filter(|t| t.kind == Kind::Work).count() as u32;
        assert_eq!(db.add(Kind::Work, new_task("d", "01/01/2030")).unwrap().task_number, same_kind + 1);
    }

    #[test]
    fn test_delete_does_not_renumber_other_variant() {
        let mut db = Database::default();
        db.add(Kind::Personal, new_task("p1", "01/01/2030")).unwrap();
        db.add(Kind::Work, new_task("w1", "01/01/2030")).unwrap();
        db.add(Kind::Work, new_task("w2", "01/01/2030")).unwrap();
        db.remove_at(0);
        let numbers: Vec<u32> = db.tasks().iter().map(|t| t.task_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        // Numbers are not reused after deletion.
        assert_eq!(db.add(Kind::Personal, new_task("p2", "01/01/2030")).unwrap().task_number, 2);
    }

    #[test]
    fn test_mark_completed_first_match() {
        let mut db = Database::default();
        db.add(Kind::Personal, new_task("dup", "01/01/2030")).unwrap();
        db.add(Kind::Work, new_task("dup", "01/01/2030")).unwrap();
        db.mark_completed("dup").unwrap();
        assert_eq!(db.tasks()[0].status, Status::Completed);
        assert_eq!(db.tasks()[1].status, Status::Pending);
        assert_eq!(db.get_status("dup").unwrap(), Status::Completed);
    }

    #[test]
    fn test_mark_completed_missing_leaves_store_unchanged() {
        let mut db = Database::default();
        db.add(Kind::Personal, new_task("a", "01/01/2030")).unwrap();
        let before = db.tasks().to_vec();
        assert!(matches!(db.mark_completed("nope"), Err(DbError::NotFound(n)) if n == "nope"));
        assert_eq!(db.tasks(), &before[..]);
        assert!(matches!(db.get_status("nope"), Err(DbError::NotFound(_))));
        assert!(matches!(db.add_note("nope", "x"), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let mut db = Database::default();
        db.add(Kind::Personal, new_task("Buy milk", "05/03/2024")).unwrap();
        db.add(Kind::Work, new_task("Buy report", "06/03/2024")).unwrap();
        db.add(Kind::Work, new_task("Ship", "07/03/2024")).unwrap();
        db.remove_at(1);
        db.mark_completed("Ship").unwrap();
        db.add_note("Buy milk", "semi-skimmed").unwrap();
        db.save(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = Database::load(&path).unwrap();
        assert_eq!(loaded.tasks(), db.tasks());
        assert_eq!(loaded.next_number(Kind::Work).unwrap(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(Database::load(&path), Err(DbError::MissingFile(p)) if p == path));
        assert!(Database::open(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_assigns_missing_numbers_per_variant() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let json = r#"[
            {"name": "a", "deadline": "01/01/2030", "priority": "low", "color": "red", "task_status": "pending", "type": "PersonalTask"},
            {"name": "b", "deadline": "01/01/2030", "priority": "low", "color": "red", "task_status": "pending", "type": "WorkTask", "task_number": 4},
            {"name": "c", "deadline": "01/01/2030", "priority": "low", "color": "red", "task_status": "completed", "type": "PersonalTask"},
            {"name": "d", "deadline": "01/01/2030", "priority": "low", "color": "red", "task_status": "pending", "type": "WorkTask", "colour": "extra"}
        ]"#;
        fs::write(&path, json).unwrap();
        let db = Database::load(&path).unwrap();
        let numbers: Vec<(Kind, u32)> = db.tasks().iter().map(|t| (t.kind, t.task_number)).collect();
        assert_eq!(numbers, vec![(Kind::Personal, 1), (Kind::Work, 4), (Kind::Personal, 2), (Kind::Work, 5)]);
        assert_eq!(db.tasks()[2].status, Status::Completed);
    }

    #[test]
    fn test_load_skips_bad_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let json = r#"[
            {"name": "ok", "deadline": "01/01/2030", "priority": "high", "color": "blue", "type": "WorkTask", "task_number": 1},
            {"name": "bad type", "deadline": "01/01/2030", "priority": "high", "color": "blue", "type": "Chore"},
            {"name": "bad date", "deadline": "2030-01-01", "priority": "high", "color": "blue", "type": "WorkTask"}
        ]"#;
        fs::write(&path, json).unwrap();
        let db = Database::load(&path).unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(db.tasks()[0].name, "ok");
    }

    #[test]
    fn test_load_rejects_non_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{\"tasks\": []}").unwrap();
        assert!(matches!(Database::load(&path), Err(DbError::Json(_))));
        assert!(matches!(Database::open(&path), Err(DbError::Json(_))));
    }

    #[test]
    fn test_open_leaves_corrupt_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let json = r#"[{"name": "keep me", "deadline": "01/01/2030", "priority": "low", "color": "red", "type": "WorkTask", "task_number": 1},]"#;
        fs::write(&path, json).unwrap();

        assert!(matches!(Database::open(&path), Err(DbError::Json(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), json);
        assert!(!path.with_extension("json.bak").exists());
    }

    #[test]
    fn test_load_backs_up_file_with_skipped_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let json = r#"[
            {"name": "ok", "deadline": "01/01/2030", "priority": "high", "color": "blue", "type": "WorkTask", "task_number": 1},
            {"name": "odd", "deadline": "01/01/2030", "priority": "someday", "color": "blue", "type": "WorkTask", "task_number": 2}
        ]"#;
        fs::write(&path, json).unwrap();

        let db = Database::open(&path).unwrap();
        db.save(&path).unwrap();
        assert!(!fs::read_to_string(&path).unwrap().contains("odd"));
        assert_eq!(fs::read_to_string(path.with_extension("json.bak")).unwrap(), json);
    }

    #[test]
    fn test_load_skips_number_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let json = r#"[
            {"name": "zero", "deadline": "01/01/2030", "priority": "low", "color": "red", "type": "PersonalTask", "task_number": 0},
            {"name": "one", "deadline": "01/01/2030", "priority": "low", "color": "red", "type": "PersonalTask", "task_number": 1}
        ]"#;
        fs::write(&path, json).unwrap();
        let db = Database::load(&path).unwrap();
        assert_eq!(db.len(), 1);
        assert!(db.tasks().iter().all(|t| t.task_number > 0));
        assert_eq!(db.next_number(Kind::Personal).unwrap(), 2);
    }

    #[test]
    fn test_add_after_highest_number_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let json = r#"[
            {"name": "last", "deadline": "01/01/2030", "priority": "low", "color": "red", "type": "PersonalTask", "task_number": 4294967295},
            {"name": "unnumbered", "deadline": "01/01/2030", "priority": "low", "color": "red", "type": "PersonalTask"}
        ]"#;
        fs::write(&path, json).unwrap();
        let mut db = Database::load(&path).unwrap();
        assert_eq!(db.len(), 1);

        let err = db.add(Kind::Personal, new_task("more", "01/01/2030")).unwrap_err();
        assert!(matches!(err, DbError::NumbersExhausted(Kind::Personal)));
        assert_eq!(db.len(), 1);
        // The other variant still numbers from its own counter.
        assert_eq!(db.add(Kind::Work, new_task("w", "01/01/2030")).unwrap().task_number, 1);
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        fs::create_dir(&path).unwrap();
        let mut db = Database::default();
        db.add(Kind::Work, new_task("w", "01/01/2030")).unwrap();

        assert!(matches!(db.save(&path), Err(DbError::Io(_))));
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.is_dir());
    }
}
