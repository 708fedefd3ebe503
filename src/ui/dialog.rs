use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Warning,
    Error,
    /// Yes/No question; the action it guards is held by the caller.
    Confirm,
}

/// A modal message box. While one is open it receives every key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
}

impl Dialog {
    fn new(kind: DialogKind, title: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn info(title: &str, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Info, title, message)
    }

    pub fn warning(title: &str, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Warning, title, message)
    }

    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Error, title, message)
    }

    pub fn confirm(title: &str, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Confirm, title, message)
    }

    fn accent(&self) -> Color {
        match self.kind {
            DialogKind::Info => Color::Green,
            DialogKind::Warning => Color::Yellow,
            DialogKind::Error => Color::Red,
            DialogKind::Confirm => Color::Cyan,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let hint = match self.kind {
            DialogKind::Confirm => "y/Enter: Yes  n/Esc: No",
            _ => "Enter/Esc: OK",
        };

        let text = vec![
            Line::from(self.message.as_str()),
            Line::from(""),
            Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        ];

        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(Span::styled(
                        format!(" {} ", self.title),
                        Style::default().fg(self.accent()).add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.accent())),
            );
        frame.render_widget(paragraph, popup_area);
    }
}
