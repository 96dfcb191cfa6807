use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Default task file, relative to the working directory.
pub const DEFAULT_DB: &str = "tasks.json";

/// File-backed personal and work task tracker.
/// Storage defaults to ./tasks.json, a path in $TASKBOOK_DB, or --db.
#[derive(Parser)]
#[command(name = "tb", version, about = "Personal and work task tracker")]
pub struct Cli {
    /// Path to the JSON task file.
    #[arg(long, global = true, env = "TASKBOOK_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn db_path(&self) -> PathBuf {
        self.db.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_edit_overrides() {
        let cli = Cli::try_parse_from([
            "tb", "--db", "/tmp/t.json", "edit", "report", "--index", "1", "--priority", "high",
        ])
        .unwrap();
        assert_eq!(cli.db_path(), PathBuf::from("/tmp/t.json"));
        match cli.command {
            Commands::Edit { identifier, index, priority, name, .. } => {
                assert_eq!(identifier, "report");
                assert_eq!(index.as_deref(), Some("1"));
                assert_eq!(priority.as_deref(), Some("high"));
                assert!(name.is_none());
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_add_requires_known_priority() {
        assert!(Cli::try_parse_from([
            "tb", "add-work", "Report", "--deadline", "01/01/2030", "--priority", "huge", "--color", "red",
        ])
        .is_err());
    }
}
