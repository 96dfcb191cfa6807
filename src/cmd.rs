//! Command implementations for the CLI interface.
//!
//! One handler per subcommand. Mutating handlers save the task file before
//! returning; every handler reports failures through `DbError`.

use std::io;
use std::path::Path;

use clap::{Args, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::db::Database;
use crate::edit::TaskEdit;
use crate::error::Result;
use crate::fields::*;
use crate::menu::run_menu;
use crate::report::{print_all, print_pending};
use crate::task::{format_deadline, parse_deadline, NewTask, Task};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Add a personal task.
    AddPersonal(AddArgs),

    /// Add a work task.
    AddWork(AddArgs),

    /// Mark the first task with this exact name as completed.
    Complete {
        name: String,
    },

    /// Show whether the first task with this exact name is completed.
    Status {
        name: String,
    },

    /// Attach or replace a note on the first task with this exact name.
    Note {
        name: String,
        text: String,
    },

    /// List every task, ordered by number within each type.
    List,

    /// List pending tasks.
    Pending,

    /// Edit a task found by name fragment or number.
    Edit {
        /// Name fragment (case-insensitive) or task number.
        identifier: String,
        /// Index among the matches. May be omitted when there is only one.
        #[arg(long)]
        index: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Deadline: dd/mm/yyyy.
        #[arg(long)]
        deadline: Option<String>,
        /// Priority: low | medium | high | urgent.
        #[arg(long)]
        priority: Option<String>,
        /// Color: red | blue | green | yellow.
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a task found by name fragment or number.
    Delete {
        /// Name fragment (case-insensitive) or task number.
        identifier: String,
        /// Index among the matches. May be omitted when there is only one.
        #[arg(long)]
        index: Option<String>,
    },

    /// Run the interactive numbered menu.
    Menu,

    /// Launch the task board interface.
    Ui,

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct AddArgs {
    /// Task name.
    pub name: String,
    /// Deadline: dd/mm/yyyy.
    #[arg(long)]
    pub deadline: String,
    #[arg(long, value_enum)]
    pub priority: Priority,
    #[arg(long, value_enum)]
    pub color: Color,
    /// Optional note.
    #[arg(long)]
    pub note: Option<String>,
}

/// Add a new task of `kind` and save.
pub fn cmd_add(db: &mut Database, db_path: &Path, kind: Kind, args: AddArgs) -> Result<()> {
    let new = NewTask {
        name: args.name,
        deadline: parse_deadline(&args.deadline)?,
        priority: args.priority,
        color: args.color,
        note: args.note,
    };
    let number = db.add(kind, new)?.task_number;
    db.save(db_path)?;
    println!("Added {} {}", format_kind(kind), number);
    Ok(())
}

pub fn cmd_complete(db: &mut Database, db_path: &Path, name: &str) -> Result<()> {
    db.mark_completed(name)?;
    db.save(db_path)?;
    println!("Task '{name}' marked as completed.");
    Ok(())
}

pub fn cmd_status(db: &Database, name: &str) -> Result<()> {
    let status = db.get_status(name)?;
    println!("Task '{name}' status: {}", status_label(status));
    Ok(())
}

/// Human-facing completion label.
pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::Completed => "Completed",
        Status::Pending => "Not Completed",
    }
}

pub fn cmd_note(db: &mut Database, db_path: &Path, name: &str, text: &str) -> Result<()> {
    db.add_note(name, text)?;
    db.save(db_path)?;
    println!("Note added to '{name}'.");
    Ok(())
}

/// One line describing a search match, prefixed by its selection index.
pub fn format_match(index: usize, task: &Task) -> String {
    format!(
        "Index: {}, Name: {}, Deadline: {}, Priority: {}, Color: {}",
        index,
        task.name,
        format_deadline(task.deadline),
        task.priority,
        task.color
    )
}

/// Pick the selection for edit/delete. With no explicit index, a single match is
/// chosen; several matches are printed and `None` is returned.
fn resolve_selection(db: &Database, identifier: &str, index: Option<String>) -> Option<String> {
    if index.is_some() {
        return index;
    }
    let matches = db.find_similar(identifier);
    if matches.len() == 1 {
        return Some("0".into());
    }
    if !matches.is_empty() {
        println!("{} matching tasks found. Re-run with --index:", matches.len());
        for (i, t) in matches.iter().enumerate() {
            println!("{}", format_match(i, t));
        }
        return None;
    }
    // Let `select` report the miss.
    Some("0".into())
}

pub fn cmd_edit(
    db: &mut Database,
    db_path: &Path,
    identifier: &str,
    index: Option<String>,
    edit: TaskEdit,
) -> Result<()> {
    let Some(selection) = resolve_selection(db, identifier, index) else {
        return Ok(());
    };
    db.select(identifier, &selection)?;
    if edit.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }
    let number = db.edit(identifier, &selection, &edit)?.task_number;
    db.save(db_path)?;
    println!("Updated task {number}");
    Ok(())
}

pub fn cmd_delete(db: &mut Database, db_path: &Path, identifier: &str, index: Option<String>) -> Result<()> {
    let Some(selection) = resolve_selection(db, identifier, index) else {
        return Ok(());
    };
    let removed = db.delete(identifier, &selection)?;
    db.save(db_path)?;
    println!("Deleted {} {} '{}'", format_kind(removed.kind), removed.task_number, removed.name);
    Ok(())
}

pub fn cmd_list(db: &Database) {
    if db.is_empty() {
        println!("No tasks.");
        return;
    }
    print_all(db);
}

pub fn cmd_pending(db: &Database) {
    if !db.tasks().iter().any(Task::is_pending) {
        println!("No pending tasks.");
        return;
    }
    print_pending(db);
}

/// Run the numbered menu on stdin/stdout.
pub fn cmd_menu(db: &mut Database, db_path: &Path) -> Result<()> {
    let stdin = io::stdin();
    run_menu(db, db_path, stdin.lock(), io::stdout())?;
    Ok(())
}

pub fn cmd_ui(db: Database, db_path: &Path) -> Result<()> {
    run_tui(db, db_path)?;
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "tb", &mut io::stdout());
}
