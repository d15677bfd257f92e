use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use log::error;
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};

use crate::error::Result;
use crate::store::Store;
use crate::task::{Priority, Task, TaskId};
use crate::todo_list::{FilterMode, TodoList};
use crate::transfer::{self, FileFormat, Import};

const HELP: &str =
    "a add | space toggle | d delete | f filter | e export JSON | c export CSV | i import | q quit";

/// Screen state around a task list: the active filter and the selected row
/// of the sorted view.
pub struct App<S: Store> {
    pub list: TodoList<S>,
    pub filter: FilterMode,
    pub selected: usize,
    pub status: String,
    export_dir: PathBuf,
}

impl<S: Store> App<S> {
    pub fn new(list: TodoList<S>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            list,
            filter: FilterMode::All,
            selected: 0,
            status: String::new(),
            export_dir: export_dir.into(),
        }
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.list
            .sorted_view(self.filter)
            .get(self.selected)
            .map(|task| task.id())
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.list.filter(self.filter).len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.selected = 0;
    }

    pub fn toggle_selected(&mut self) -> Result<String> {
        let Some(id) = self.selected_id() else {
            return Ok("No task selected".to_string());
        };
        self.list.toggle(id)?;
        self.clamp_selection();
        Ok(format!("Toggled task #{id}"))
    }

    pub fn remove_selected(&mut self) -> Result<String> {
        let Some(id) = self.selected_id() else {
            return Ok("No task selected".to_string());
        };
        self.list.remove(id)?;
        self.clamp_selection();
        Ok(format!("Deleted task #{id}"))
    }

    pub fn export(&mut self, format: FileFormat, today: NaiveDate) -> Result<String> {
        let path = transfer::write_export(&self.export_dir, self.list.tasks(), format, today)?;
        Ok(format!("Exported to {}", path.display()))
    }

    /// Replaces the list with an import the user has already confirmed.
    pub fn apply_import(&mut self, import: Import) -> Result<String> {
        let count = import.tasks.len();
        self.list.replace(import.tasks)?;
        self.selected = 0;
        Ok(format!("Imported {count} tasks"))
    }

    /// Shows the outcome of an action on the status line.
    pub fn report(&mut self, outcome: Result<String>) {
        self.status = match outcome {
            Ok(message) => message,
            Err(err) => {
                error!("event=action module=ui status=error error={err}");
                format!("Error: {err}")
            }
        };
    }

    fn clamp_selection(&mut self) {
        let len = self.list.filter(self.filter).len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

/// Due-date caption shown next to a task, if it has a due date.
pub fn due_label(task: &Task, today: NaiveDate) -> Option<String> {
    let due = task.due_date()?;
    let days = task.days_until_due(today)?;
    let label = if task.is_overdue(today) {
        format!("Overdue: {due}")
    } else if days == 0 {
        "Due Today".to_string()
    } else if days == 1 {
        "Due Tomorrow".to_string()
    } else if days > 1 {
        format!("Due in {days} days")
    } else {
        due.to_string()
    };
    Some(label)
}

pub fn run_app<B: Backend, S: Store>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        let today = Local::now().date_naive();
        terminal.draw(|f| draw(f, app, today))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('q') => return Ok(()), // Quit
            KeyCode::Char('a') => {
                let outcome = add_interactive(app);
                app.report(outcome);
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let outcome = app.toggle_selected();
                app.report(outcome);
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let outcome = app.remove_selected();
                app.report(outcome);
            }
            KeyCode::Char('f') | KeyCode::Tab => app.cycle_filter(),
            KeyCode::Char('e') => {
                let outcome = app.export(FileFormat::Json, today);
                app.report(outcome);
            }
            KeyCode::Char('c') => {
                let outcome = app.export(FileFormat::Csv, today);
                app.report(outcome);
            }
            KeyCode::Char('i') => {
                let outcome = import_interactive(app);
                app.report(outcome);
            }
            KeyCode::Up => app.select_previous(),
            KeyCode::Down => app.select_next(),
            _ => {}
        }
    }
}

fn draw<S: Store>(f: &mut Frame, app: &App<S>, today: NaiveDate) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(f.area());

    let stats = app.list.stats();
    let header = Paragraph::new(Line::from(vec![
        Span::raw(format!("Total: {}   ", stats.total)),
        Span::styled(
            format!("Pending: {}   ", stats.pending),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("Completed: {}", stats.completed),
            Style::default().fg(Color::Green),
        ),
    ]))
    .block(Block::default().title("To-Do List").borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = app
        .list
        .sorted_view(app.filter)
        .into_iter()
        .map(|task| task_item(task, today))
        .collect();
    let mut state =
        ListState::default().with_selected((!items.is_empty()).then_some(app.selected));
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Tasks ({})", app.filter))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, chunks[1], &mut state);

    let footer = Paragraph::new(vec![
        Line::from(app.status.as_str()),
        Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
    ])
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn task_item(task: &Task, today: NaiveDate) -> ListItem<'static> {
    let (check, text_style) = if task.is_completed() {
        (
            "[x] ",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),
        )
    } else {
        ("[ ] ", Style::default().fg(Color::White))
    };

    let mut spans = vec![
        Span::raw(check),
        Span::styled(task.description().to_string(), text_style),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", task.priority()),
            Style::default().fg(priority_color(task.priority())),
        ),
    ];
    if let Some(label) = due_label(task, today) {
        let style = if task.is_overdue(today) {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(label, style));
    }
    ListItem::new(Line::from(spans))
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn add_interactive<S: Store>(app: &mut App<S>) -> Result<String> {
    let Some(description) = prompt("Enter task description") else {
        return Ok("Add cancelled".to_string());
    };

    let priority = match prompt("Priority (low/medium/high) [medium]") {
        Some(text) if !text.is_empty() => match text.parse::<Priority>() {
            Ok(priority) => priority,
            Err(err) => return Ok(err.to_string()),
        },
        _ => Priority::default(),
    };

    let due_date = match prompt("Due date (YYYY-MM-DD, blank for none)") {
        Some(text) if !text.is_empty() => match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => return Ok(format!("Invalid due date `{text}`")),
        },
        _ => None,
    };

    let id = app.list.add(&description, priority, due_date)?;
    app.selected = 0;
    Ok(format!("Added task #{id}"))
}

fn import_interactive<S: Store>(app: &mut App<S>) -> Result<String> {
    let path = match prompt("Path of a JSON or CSV file to import") {
        Some(path) if !path.is_empty() => path,
        _ => return Ok("Import cancelled".to_string()),
    };

    let import = transfer::read_import(Path::new(&path))?;
    let skipped = match import.skipped {
        0 => String::new(),
        n => format!(" ({n} malformed rows skipped)"),
    };
    let question = format!(
        "Import {} tasks{skipped}? This will replace all existing tasks. [y/N]",
        import.tasks.len()
    );
    if !confirm(&question) {
        return Ok("Import cancelled".to_string());
    }
    app.apply_import(import)
}

fn confirm(question: &str) -> bool {
    prompt(question)
        .is_some_and(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Asks on the cooked terminal; `None` when stdin is closed or unreadable.
fn prompt(message: &str) -> Option<String> {
    disable_raw_mode().ok();
    println!("{message}");
    let answer = read_answer(&mut io::stdin().lock());
    enable_raw_mode().ok();
    answer
}

fn read_answer(input: &mut impl BufRead) -> Option<String> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn due_in(days: i64) -> Task {
        let due = today() + chrono::Duration::days(days);
        Task::new(TaskId::new(1), "a", Priority::Medium, Some(due))
    }

    #[test]
    fn due_label_describes_distance_to_due_date() {
        assert_eq!(due_label(&due_in(0), today()).as_deref(), Some("Due Today"));
        assert_eq!(due_label(&due_in(1), today()).as_deref(), Some("Due Tomorrow"));
        assert_eq!(due_label(&due_in(5), today()).as_deref(), Some("Due in 5 days"));
        assert_eq!(
            due_label(&due_in(-2), today()).as_deref(),
            Some("Overdue: 2026-10-17")
        );

        let mut done = due_in(-2);
        done.toggle();
        assert_eq!(due_label(&done, today()).as_deref(), Some("2026-10-17"));

        let undated = Task::new(TaskId::new(2), "b", Priority::Low, None);
        assert_eq!(due_label(&undated, today()), None);
    }

    #[test]
    fn due_label_agrees_with_days_until_due() {
        for days in [0, 1, 2, 30] {
            let task = due_in(days);
            let expected = task.days_until_due(today()).unwrap();
            let label = due_label(&task, today()).unwrap();
            assert_eq!(label.contains(&expected.to_string()), expected > 1, "{label}");
        }
    }

    #[test]
    fn closed_input_cancels_answer() {
        assert_eq!(read_answer(&mut &b""[..]), None);
        assert_eq!(read_answer(&mut &b"  yes \n"[..]).as_deref(), Some("yes"));
        assert_eq!(read_answer(&mut &b"\n"[..]).as_deref(), Some(""));
        assert_eq!(read_answer(&mut &b"last line"[..]).as_deref(), Some("last line"));
    }

    #[test]
    fn selection_follows_sorted_view() {
        let mut list = TodoList::open(MemoryStore::new());
        list.add("low", Priority::Low, None).unwrap();
        let high = list.add("high", Priority::High, None).unwrap();
        let mut app = App::new(list, std::env::temp_dir());

        assert_eq!(app.selected_id(), Some(high));
        app.toggle_selected().unwrap();
        assert!(app.list.get(high).unwrap().is_completed());

        app.select_next();
        app.select_next();
        assert_eq!(app.selected, 1);
        assert_eq!(app.selected_id(), Some(high));
    }

    #[test]
    fn removing_last_row_keeps_selection_in_range() {
        let mut list = TodoList::open(MemoryStore::new());
        list.add("a", Priority::Low, None).unwrap();
        list.add("b", Priority::Low, None).unwrap();
        let mut app = App::new(list, std::env::temp_dir());

        app.select_next();
        app.remove_selected().unwrap();
        assert_eq!(app.selected, 0);
        assert_eq!(app.list.len(), 1);

        app.remove_selected().unwrap();
        assert_eq!(app.remove_selected().unwrap(), "No task selected");
    }

    #[test]
    fn export_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = TodoList::open(MemoryStore::new());
        list.add("a", Priority::Low, None).unwrap();
        let mut app = App::new(list, dir.path());

        app.export(FileFormat::Csv, today()).unwrap();
        let written =
            std::fs::read_to_string(dir.path().join("todo-list-2026-10-19.csv")).unwrap();
        assert!(written.starts_with(crate::codec::CSV_HEADER));
    }

    #[test]
    fn report_shows_errors_on_status_line() {
        let mut app = App::new(TodoList::open(MemoryStore::new()), std::env::temp_dir());
        let outcome = app.list.add("   ", Priority::Low, None).map(|_| String::new());
        app.report(outcome);
        assert_eq!(app.status, "Error: task description cannot be empty");
    }
}
