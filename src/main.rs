use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};

use todolist::logging::init_logging;
use todolist::ui::{run_app, App};
use todolist::{Config, FileStore, TodoList};

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    if let Err(err) = init_logging(&config.log_level, &config.log_dir()) {
        eprintln!("Logging disabled: {}", err);
    }

    let store = FileStore::in_dir(&config.data_dir);
    info!(
        "event=store_open module=main status=ok path={}",
        store.path().display()
    );
    let mut app = App::new(TodoList::open(store), config.data_dir.clone());

    let mut terminal = enter_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    leave_terminal(&mut terminal)?;

    if let Err(err) = result {
        error!("event=ui_loop module=main status=error error={}", err);
        eprintln!("{}", err);
    }
    Ok(())
}

/// Raw mode on the alternate screen; the list has no mouse handling.
fn enter_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
        disable_raw_mode().ok();
        return Err(err);
    }
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

fn leave_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}
