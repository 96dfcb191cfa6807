//! Main application logic for the task board.
//!
//! The `App` struct owns the store while the board is open, maps key presses
//! to store operations and renders the task table, search bar and dialogs.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::db::Database;
use crate::edit::matches_identifier;
use crate::fields::*;
use crate::task::{format_deadline, Remaining, Task};
use crate::tui::{
    colors::{kind_color, task_color, DARK_GREEN, DARK_RED},
    enums::AppState,
    input::InputField,
    utils::centered_rect,
};

/// Board state: the loaded store plus view and selection state.
pub struct App {
    state: AppState,
    db: Database,
    db_path: PathBuf,
    table_state: TableState,
    rows: Vec<usize>,
    show_completed: bool,
    filter: InputField,
    status_message: String,
    dirty: bool,
    quit_requested: bool,
    today: NaiveDate,
}

impl App {
    /// Create the board over a loaded store that saves back to `db_path`.
    pub fn new(db: Database, db_path: &Path) -> Self {
        App::with_database(db, db_path, Local::now().date_naive())
    }

    pub fn with_database(db: Database, db_path: &Path, today: NaiveDate) -> Self {
        let mut app = App {
            state: AppState::TaskList,
            db,
            db_path: db_path.to_path_buf(),
            table_state: TableState::default(),
            rows: Vec::new(),
            show_completed: true,
            filter: InputField::new(),
            status_message: String::new(),
            dirty: false,
            quit_requested: false,
            today,
        };
        app.refresh_rows();
        app
    }

    /// Rebuild the visible rows: personal before work, by number, filtered.
    fn refresh_rows(&mut self) {
        let filter = self.filter.value.trim().to_string();
        let mut rows: Vec<usize> = self
            .db
            .tasks()
            .iter()
            .enumerate()
            .filter(|(_, t)| self.show_completed || t.is_pending())
            .filter(|(_, t)| filter.is_empty() || matches_identifier(t, &filter))
            .map(|(i, _)| i)
            .collect();
        let tasks = self.db.tasks();
        rows.sort_by_key(|&i| (tasks[i].kind == Kind::Work, tasks[i].task_number));
        self.rows = rows;

        let selected = match self.table_state.selected() {
            _ if self.rows.is_empty() => None,
            Some(i) => Some(i.min(self.rows.len() - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);
    }

    fn selected_index(&self) -> Option<usize> {
        self.table_state.selected().and_then(|i| self.rows.get(i).copied())
    }

    fn selected_task(&self) -> Option<&Task> {
        self.selected_index().and_then(|i| self.db.get(i))
    }

    fn move_selection(&mut self, down: bool) {
        if self.rows.is_empty() {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(self.rows.len() - 1)
        } else {
            current.saturating_sub(1)
        };
        self.table_state.select(Some(next));
    }

    fn complete_selected(&mut self) {
        let Some(idx) = self.selected_index() else { return };
        if let Some(task) = self.db.get_mut(idx) {
            task.status = Status::Completed;
            self.status_message = format!("Task '{}' marked as completed.", task.name);
            self.dirty = true;
        }
        self.refresh_rows();
    }

    fn delete_selected(&mut self) {
        let Some(idx) = self.selected_index() else { return };
        if let Some(task) = self.db.remove_at(idx) {
            self.status_message = format!("Deleted {} {} '{}'", task.kind, task.task_number, task.name);
            self.dirty = true;
        }
        self.refresh_rows();
    }

    fn save(&mut self) {
        match self.db.save(&self.db_path) {
            Ok(()) => {
                self.dirty = false;
                self.status_message = format!("Saved {} tasks to {}", self.db.len(), self.db_path.display());
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    fn handle_task_list_key(&mut self, key: KeyCode) -> bool {
        if key != KeyCode::Char('q') {
            self.quit_requested = false;
        }
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.dirty && !self.quit_requested {
                    self.quit_requested = true;
                    self.status_message = "Unsaved changes: 's' to save, 'q' again to discard".into();
                    return false;
                }
                return true;
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Char('c') => self.complete_selected(),
            KeyCode::Char('d') => {
                if self.selected_index().is_some() {
                    self.state = AppState::ConfirmDelete;
                }
            }
            KeyCode::Char('a') => {
                self.show_completed = !self.show_completed;
                self.refresh_rows();
            }
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('/') => self.state = AppState::Search,
            _ => {}
        }
        false
    }

    fn handle_search_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => self.state = AppState::TaskList,
            KeyCode::Esc => {
                self.filter.clear();
                self.state = AppState::TaskList;
            }
            KeyCode::Backspace => self.filter.handle_backspace(),
            KeyCode::Left => self.filter.move_cursor_left(),
            KeyCode::Right => self.filter.move_cursor_right(),
            KeyCode::Char(c) => self.filter.handle_char(c),
            _ => return,
        }
        self.refresh_rows();
    }

    fn handle_confirm_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.delete_selected();
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.state = AppState::TaskList,
            _ => {}
        }
    }

    /// Apply one key press. Returns true when the board should close.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        if self.state != AppState::Search {
            self.status_message.clear();
        }
        match self.state {
            AppState::TaskList => return self.handle_task_list_key(key),
            AppState::Search => self.handle_search_key(key),
            AppState::ConfirmDelete => self.handle_confirm_key(key),
        }
        false
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code));
                }
            }
        }
        Ok(false)
    }

    fn task_row(&self, task: &Task) -> Row<'static> {
        let (due, remaining) = match task.remaining_days(self.today) {
            Remaining::Personal { label, days } => (label, days),
            Remaining::Work { days, deadline } => (deadline, days),
        };
        let style = match task.status {
            Status::Completed => Style::default().fg(Color::DarkGray),
            Status::Pending => Style::default().fg(task_color(task.color)),
        };
        Row::new(vec![
            Cell::from(match task.kind {
                Kind::Personal => "Personal",
                Kind::Work => "Work",
            }),
            Cell::from(task.task_number.to_string()),
            Cell::from(task.name.clone()),
            Cell::from(due),
            Cell::from(remaining.to_string()),
            Cell::from(format_priority(task.priority)),
            Cell::from(format_status(task.status)),
            Cell::from(task.note.clone().unwrap_or_default()),
        ])
        .style(style)
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let pending = self.db.tasks().iter().filter(|t| t.is_pending()).count();
        let header_text = Line::from(vec![
            Span::styled("TASKBOOK", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{} tasks, {} pending  Today: {}", self.db.len(), pending, format_deadline(self.today)),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]);
        let header_block = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, chunks[0]);

        let header_cells = ["Type", "#", "Name", "Due", "Days", "Priority", "Status", "Note"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(DARK_GREEN).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = self
            .rows
            .iter()
            .filter_map(|&i| self.db.get(i))
            .map(|t| self.task_row(t))
            .collect();

        let widths = [
            Constraint::Length(9),  // Type
            Constraint::Length(4),  // Number
            Constraint::Min(20),    // Name
            Constraint::Length(14), // Due
            Constraint::Length(6),  // Days
            Constraint::Length(9),  // Priority
            Constraint::Length(10), // Status
            Constraint::Min(10),    // Note
        ];

        let title = if self.show_completed {
            format!("Tasks ({}/{})", self.rows.len(), self.db.len())
        } else {
            format!("Pending tasks ({}/{})", self.rows.len(), self.db.len())
        };
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[1], &mut self.table_state);
    }

    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let target = self
            .selected_task()
            .map(|t| format!("delete {} {} '{}'", t.kind, t.task_number, t.name))
            .unwrap_or_default();
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(target),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.state == AppState::Search {
            format!("Search: {} (Esc to clear, Enter to confirm)", self.filter.value)
        } else if !self.filter.value.is_empty() {
            format!("Filtered by '{}' | '/' search  c complete  d delete  a toggle done  s save  q quit", self.filter.value)
        } else {
            "'/' search  c complete  d delete  a toggle done  s save  q quit".to_string()
        };
        let bg = self.selected_task().map(|t| kind_color(t.kind)).unwrap_or(DARK_GREEN);
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(bg).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Draw the whole board.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_task_list(f, chunks[0]);
        if self.state == AppState::ConfirmDelete {
            self.render_confirm(f, chunks[0]);
        }
        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop: draw, then handle input until the user quits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
