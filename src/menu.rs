//! Numbered text menu driving the task store.
//!
//! Reads answers line by line from any `BufRead` and writes prompts and
//! results to any `Write`, so sessions can be scripted. Bad input is reported
//! and the menu keeps running; end of input leaves the loop.

use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::{Local, NaiveDate};

use crate::cmd::{format_match, status_label};
use crate::db::Database;
use crate::edit::TaskEdit;
use crate::error::DbError;
use crate::fields::*;
use crate::report::{all_lines, pending_lines};
use crate::task::{format_deadline, parse_deadline, NewTask};

const MENU: [&str; 11] = [
    "Add Personal Task",
    "Add Work Task",
    "Mark a Task as Completed",
    "Get Task Status",
    "List All Tasks",
    "List Pending Tasks",
    "Save Tasks to JSON",
    "Edit Task",
    "Add Note to Task",
    "Delete a Task",
    "Exit",
];

enum Flow {
    Continue,
    Exit,
}

struct Menu<'a, R, W> {
    db: &'a mut Database,
    db_path: &'a Path,
    input: R,
    out: W,
    today: NaiveDate,
}

/// Run the menu until the user exits or input ends.
pub fn run_menu<R: BufRead, W: Write>(db: &mut Database, db_path: &Path, input: R, out: W) -> io::Result<()> {
    run_menu_on(db, db_path, input, out, Local::now().date_naive())
}

fn run_menu_on<R: BufRead, W: Write>(
    db: &mut Database,
    db_path: &Path,
    input: R,
    out: W,
    today: NaiveDate,
) -> io::Result<()> {
    let mut menu = Menu { db, db_path, input, out, today };
    loop {
        menu.show_menu()?;
        let Some(choice) = menu.prompt("Enter your choice (1-11): ")? else {
            break;
        };
        let flow = match choice.as_str() {
            "1" => menu.add_task(Kind::Personal)?,
            "2" => menu.add_task(Kind::Work)?,
            "3" => menu.mark_completed()?,
            "4" => menu.task_status()?,
            "5" => {
                let lines = all_lines(menu.db, menu.today);
                menu.write_lines(lines)?
            }
            "6" => {
                let lines = pending_lines(menu.db, menu.today);
                menu.write_lines(lines)?
            }
            "7" => menu.save()?,
            "8" => menu.edit_task()?,
            "9" => menu.add_note()?,
            "10" => menu.delete_task()?,
            "11" => {
                writeln!(menu.out, "Exiting program.")?;
                Flow::Exit
            }
            _ => {
                writeln!(menu.out, "Invalid choice. Please enter a valid option.")?;
                Flow::Continue
            }
        };
        if let Flow::Exit = flow {
            break;
        }
    }
    Ok(())
}

impl<R: BufRead, W: Write> Menu<'_, R, W> {
    fn show_menu(&mut self) -> io::Result<()> {
        for (i, item) in MENU.iter().enumerate() {
            writeln!(self.out, "{}- {}", i + 1, item)?;
        }
        Ok(())
    }

    /// Print `msg` and read one trimmed line. `None` at end of input.
    fn prompt(&mut self, msg: &str) -> io::Result<Option<String>> {
        write!(self.out, "{msg}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Offer a numbered list until a valid entry is picked.
    fn choose<T: Copy + std::fmt::Display>(&mut self, options: &[T]) -> io::Result<Option<T>> {
        for (i, option) in options.iter().enumerate() {
            writeln!(self.out, "{}. {}", i + 1, option)?;
        }
        loop {
            let Some(answer) = self.prompt("Enter your choice: ")? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(options[n - 1])),
                _ => writeln!(self.out, "Invalid choice. Please enter a valid number.")?,
            }
        }
    }

    fn write_lines(&mut self, lines: Vec<String>) -> io::Result<Flow> {
        if lines.is_empty() {
            writeln!(self.out, "No tasks.")?;
        }
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        Ok(Flow::Continue)
    }

    fn report(&mut self, err: impl std::fmt::Display) -> io::Result<Flow> {
        writeln!(self.out, "{err}")?;
        Ok(Flow::Continue)
    }

    fn add_task(&mut self, kind: Kind) -> io::Result<Flow> {
        let Some(name) = self.prompt("Enter task name: ")? else { return Ok(Flow::Exit) };
        let Some(raw) = self.prompt("Enter task deadline (format: dd/mm/yyyy): ")? else { return Ok(Flow::Exit) };
        let deadline = match parse_deadline(&raw) {
            Ok(d) => d,
            Err(e) => return self.report(e),
        };
        let Some(priority) = self.choose(&PRIORITIES)? else { return Ok(Flow::Exit) };
        let Some(color) = self.choose(&COLORS)? else { return Ok(Flow::Exit) };

        let added = self.db.add(kind, NewTask { name, deadline, priority, color, note: None }).map(|_| ());
        if let Err(e) = added {
            return self.report(e);
        }
        match kind {
            Kind::Personal => writeln!(self.out, "Personal task added successfully!")?,
            Kind::Work => writeln!(self.out, "Work task added successfully!")?,
        }
        Ok(Flow::Continue)
    }

    fn mark_completed(&mut self) -> io::Result<Flow> {
        let Some(name) = self.prompt("Enter the name of the task to mark as completed: ")? else {
            return Ok(Flow::Exit);
        };
        match self.db.mark_completed(&name) {
            Ok(()) => writeln!(self.out, "Task '{name}' marked as completed.")?,
            Err(e) => writeln!(self.out, "{e}")?,
        }
        Ok(Flow::Continue)
    }

    fn task_status(&mut self) -> io::Result<Flow> {
        let Some(name) = self.prompt("Enter the name of the task to get its status: ")? else {
            return Ok(Flow::Exit);
        };
        match self.db.get_status(&name) {
            Ok(status) => writeln!(self.out, "Task '{name}' status: {}", status_label(status))?,
            Err(e) => writeln!(self.out, "{e}")?,
        }
        Ok(Flow::Continue)
    }

    fn save(&mut self) -> io::Result<Flow> {
        match self.db.save(self.db_path) {
            Ok(()) => writeln!(self.out, "Tasks saved to JSON successfully!")?,
            Err(e) => writeln!(self.out, "{e}")?,
        }
        Ok(Flow::Continue)
    }

    fn add_note(&mut self) -> io::Result<Flow> {
        let Some(name) = self.prompt("Enter the name of the task to add a note: ")? else { return Ok(Flow::Exit) };
        let Some(note) = self.prompt("Enter the note: ")? else { return Ok(Flow::Exit) };
        match self.db.add_note(&name, &note) {
            Ok(()) => writeln!(self.out, "Note added successfully!")?,
            Err(e) => writeln!(self.out, "{e}")?,
        }
        Ok(Flow::Continue)
    }

    /// Shared lookup for edit and delete: list matches and read a selection.
    /// Returns the identifier, the raw selection and the chosen store index.
    fn pick(&mut self, verb: &str) -> io::Result<Option<(String, String, Option<usize>)>> {
        let Some(identifier) = self.prompt(&format!("Enter the name or number of the task you want to {verb}: "))? else {
            return Ok(None);
        };
        let matches: Vec<String> = self
            .db
            .find_similar(&identifier)
            .iter()
            .enumerate()
            .map(|(i, t)| format_match(i, t))
            .collect();
        if matches.is_empty() {
            writeln!(self.out, "{}", DbError::NoMatches(identifier.clone()))?;
            return Ok(Some((identifier, String::new(), None)));
        }
        writeln!(self.out, "{} matching tasks found.", matches.len())?;
        for line in &matches {
            writeln!(self.out, "{line}")?;
        }
        let Some(selection) = self.prompt(&format!("Enter the index of the task you want to {verb}: "))? else {
            return Ok(None);
        };
        match self.db.select(&identifier, &selection) {
            Ok(idx) => Ok(Some((identifier, selection, Some(idx)))),
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(Some((identifier, selection, None)))
            }
        }
    }

    fn edit_task(&mut self) -> io::Result<Flow> {
        let Some((identifier, selection, idx)) = self.pick("edit")? else { return Ok(Flow::Exit) };
        let Some(current) = idx.and_then(|i| self.db.get(i)).cloned() else {
            return Ok(Flow::Continue);
        };

        let Some(name) = self.prompt(&format!("Enter new name for the task '{}': ", current.name))? else {
            return Ok(Flow::Exit);
        };
        let Some(deadline) = self.prompt(&format!(
            "Enter new deadline for the task '{}' (format: dd/mm/yyyy): ",
            format_deadline(current.deadline)
        ))?
        else {
            return Ok(Flow::Exit);
        };
        let Some(priority) = self.prompt(&format!("Enter new priority for the task '{}': ", current.priority))? else {
            return Ok(Flow::Exit);
        };
        let Some(color) = self.prompt(&format!("Enter new color for the task '{}': ", current.color))? else {
            return Ok(Flow::Exit);
        };

        let edit = TaskEdit {
            name: Some(name),
            deadline: Some(deadline),
            priority: Some(priority),
            color: Some(color),
        };
        match self.db.edit(&identifier, &selection, &edit) {
            Ok(_) => writeln!(self.out, "Task updated successfully.")?,
            Err(e) => writeln!(self.out, "{e}")?,
        }
        Ok(Flow::Continue)
    }

    fn delete_task(&mut self) -> io::Result<Flow> {
        let Some((identifier, selection, idx)) = self.pick("delete")? else { return Ok(Flow::Exit) };
        if idx.is_none() {
            return Ok(Flow::Continue);
        }
        match self.db.delete(&identifier, &selection) {
            Ok(_) => writeln!(self.out, "Task deleted successfully.")?,
            Err(e) => writeln!(self.out, "{e}")?,
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::TempDir;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn session(db: &mut Database, path: &Path, script: &str) -> String {
        let mut out = Vec::new();
        run_menu_on(db, path, Cursor::new(script.to_string()), &mut out, today()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_add_complete_and_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let mut db = Database::default();
        let script = "1\nGym\n05/03/2024\n9\n2\n1\n\
                      2\nReport\n11/03/2024\n4\n3\n\
                      3\nGym\n4\nGym\n7\n11\n";
        let out = session(&mut db, &path, script);

        assert!(out.contains("Invalid choice. Please enter a valid number."));
        assert!(out.contains("Personal task added successfully!"));
        assert!(out.contains("Work task added successfully!"));
        assert!(out.contains("Task 'Gym' status: Completed"));
        assert!(out.contains("Tasks saved to JSON successfully!"));
        assert!(out.ends_with("Exiting program.\n"));

        let loaded = Database::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.tasks()[0].priority, Priority::Medium);
        assert_eq!(loaded.tasks()[0].color, Color::Red);
        assert_eq!(loaded.tasks()[1].priority, Priority::Urgent);
        assert_eq!(loaded.tasks()[1].color, Color::Green);
    }

    #[test]
    fn test_listing_and_bad_input_keep_running() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let mut db = Database::default();
        let script = "1\nGym\nsoon\n42\n3\nMissing\n1\nGym\n04/03/2024\n1\n1\n6\n";
        let out = session(&mut db, &path, script);

        assert!(out.contains("Invalid deadline 'soon'"));
        assert!(out.contains("Invalid choice. Please enter a valid option."));
        assert!(out.contains("Task 'Missing' not found."));
        assert!(out.contains(
            "PersonalTask: 1, Gym, Today, red, Priority: low, Remaining Days: 0, Task status: pending"
        ));
        // Input ran out without choosing exit.
        assert!(!out.contains("Exiting program."));
        assert!(!path.exists());
    }

    #[test]
    fn test_edit_and_delete_flow() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let mut db = Database::default();
        db.add(Kind::Personal, crate::db::tests::new_task("Buy milk", "05/03/2024")).unwrap();
        db.add(Kind::Work, crate::db::tests::new_task("Buy report", "06/03/2024")).unwrap();

        let script = "8\nbuy\nx\n\
                      8\nbuy\n1\nQuarterly report\n\nhigh\n\n\
                      8\nmilk\n0\n\npurple\n\n\n\
                      10\nzzz\n\
                      10\n1\n0\n11\n";
        let out = session(&mut db, &path, script);

        assert!(out.contains("2 matching tasks found."));
        assert!(out.contains("Index: 1, Name: Buy report, Deadline: 06/03/2024, Priority: medium, Color: red"));
        assert!(out.contains("Invalid input 'x'. Please enter a valid index."));
        assert!(out.contains("Task updated successfully."));
        assert!(out.contains("Invalid deadline 'purple'"));
        assert!(out.contains("No matching tasks found for 'zzz'"));
        assert!(out.contains("Task deleted successfully."));

        assert_eq!(db.len(), 1);
        let left = &db.tasks()[0];
        assert_eq!(left.name, "Quarterly report");
        assert_eq!(left.priority, Priority::High);
        assert_eq!(left.kind, Kind::Work);
    }
}
