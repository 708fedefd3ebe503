mod app;
mod config;
mod db;
mod form;
mod logging;
mod ui;
mod vim;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};

use app::App;
use config::Config;

fn main() -> Result<()> {
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let _log_guard = logging::init_tracing(config.log_filter.as_deref());
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "ignoring unreadable config file");
    }

    let mut terminal = init_terminal().context("failed to initialize terminal")?;
    let mut app = App::new(config);
    let res = run(&mut terminal, &mut app);
    // Closes the session on the error path too.
    app.shutdown();

    restore_terminal(terminal)?;
    tracing::info!("exiting");
    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;
        app.handle_events()?;
    }
    Ok(())
}

fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
