//! # tb - personal and work task tracker
//!
//! A small file-backed task tracker with two kinds of task:
//!
//! - **Personal tasks** show how soon they are due in words ("Tomorrow",
//!   "Friday", "Next Week").
//! - **Work tasks** show their absolute deadline and the number of days left.
//!
//! Each kind is numbered on its own, starting at 1. Numbers are never reused,
//! so deleting a task leaves a gap.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add tasks
//! tb add-personal "Buy milk" --deadline 05/03/2030 --priority low --color blue
//! tb add-work "Quarterly report" --deadline 31/03/2030 --priority urgent --color red
//!
//! # List them
//! tb list
//! tb pending
//!
//! # Edit or delete by name fragment or number
//! tb edit report --priority high
//! tb delete 1 --index 0
//!
//! # Interactive front ends
//! tb menu
//! tb ui
//! ```
//!
//! Tasks live in `./tasks.json` unless `--db` or `TASKBOOK_DB` points elsewhere.
//! Set `RUST_LOG=debug` for load/save diagnostics.

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod db;
pub mod edit;
pub mod error;
pub mod fields;
pub mod menu;
pub mod report;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use db::Database;
use edit::TaskEdit;
use fields::Kind;

fn main() {
    // Default to WARN so one-shot commands stay quiet.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let db_path = cli.db_path();

    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    // An unreadable task file stops here rather than being replaced on save.
    let mut db = match Database::open(&db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),
        Commands::Ui => cmd_ui(db, &db_path),

        Commands::AddPersonal(args) => cmd_add(&mut db, &db_path, Kind::Personal, args),
        Commands::AddWork(args) => cmd_add(&mut db, &db_path, Kind::Work, args),
        Commands::Complete { name } => cmd_complete(&mut db, &db_path, &name),
        Commands::Status { name } => cmd_status(&db, &name),
        Commands::Note { name, text } => cmd_note(&mut db, &db_path, &name, &text),
        Commands::List => {
            cmd_list(&db);
            Ok(())
        }
        Commands::Pending => {
            cmd_pending(&db);
            Ok(())
        }
        Commands::Edit { identifier, index, name, deadline, priority, color } => {
            let edit = TaskEdit { name, deadline, priority, color };
            cmd_edit(&mut db, &db_path, &identifier, index, edit)
        }
        Commands::Delete { identifier, index } => cmd_delete(&mut db, &db_path, &identifier, index),
        Commands::Menu => cmd_menu(&mut db, &db_path),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
