use crate::app::{App, ConnectionStatus, Tab};
use crate::vim::VimMode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    // Main layout: top bar, content, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs + connection status
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status bar
        ])
        .split(size);

    render_top_bar(frame, chunks[0], app);

    match app.active_tab {
        Tab::Tables => {
            let content = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
                .split(chunks[1]);
            app.table_browser.render(frame, content[0]);
            app.table_grid.render(frame, content[1]);
        }
        Tab::Query => {
            let content = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
                .split(chunks[1]);
            app.query_editor.render(frame, content[0]);
            app.query_results.render(frame, content[1]);
        }
    }

    render_status_bar(frame, chunks[2], app);

    // Popups, bottom to top
    app.connection_form.render(frame, size);
    if let Some(ref form) = app.record_form {
        super::record_form::render(frame, size, form);
    }
    if let Some(ref dialog) = app.dialog {
        dialog.render(frame, size);
    }
}

fn render_top_bar(frame: &mut Frame, area: Rect, app: &App) {
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(24)])
        .split(area);

    let selected = match app.active_tab {
        Tab::Tables => 0,
        Tab::Query => 1,
    };
    let tabs = Tabs::new(vec!["1 Tables", "2 SQL Query"])
        .select(selected)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" TUI-CRUD ", Style::default().fg(Color::Cyan))),
        )
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, parts[0]);

    let (label, color) = match app.connection_status {
        ConnectionStatus::NotConnected => ("Not Connected", Color::Red),
        ConnectionStatus::Connected => ("Connected", Color::Green),
        ConnectionStatus::Failed => ("Connection Failed", Color::Red),
    };
    let status = Paragraph::new(Span::styled(label, Style::default().fg(color)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, parts[1]);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mode_color = match app.vim_state.mode {
        VimMode::Normal => Color::Blue,
        VimMode::Insert => Color::Green,
        VimMode::Command => Color::Yellow,
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.vim_state.mode.as_str()),
            Style::default().fg(Color::Black).bg(mode_color),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", app.active_pane.as_str()),
            Style::default().fg(Color::Cyan),
        ),
    ];

    if app.vim_state.mode == VimMode::Command {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(":{}", app.vim_state.get_command()),
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(ref status) = app.status_message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("[{}] ", status.at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::raw(status.text.as_str()));
    }

    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        "a:add e:edit d:delete y:copy C:connect :q quit",
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|frame| render(frame, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn startup_shows_connection_form() {
        let mut app = App::new(Config::default());
        let screen = draw(&mut app);
        assert!(screen.contains("Database Connection"));
        assert!(screen.contains("clothing_retail_store"));
        assert!(screen.contains("Not Connected"));
    }

    #[test]
    fn query_tab_shows_editor_and_status() {
        let mut app = App::new(Config::default());
        app.connection_form.hide();
        app.active_tab = Tab::Query;
        app.set_status("Query executed successfully.");
        let screen = draw(&mut app);
        assert!(screen.contains("Enter SQL Query"));
        assert!(screen.contains("Query executed successfully."));
        assert!(!screen.contains("Database Connection"));
    }
}
