use crate::db::{ConnectionParams, DatabaseType};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Type,
    Host,
    Port,
    User,
    Password,
    Database,
}

/// The "Database Connection" popup. It is shown at startup and whenever the
/// user asks to reconnect.
#[derive(Debug)]
pub struct ConnectionForm {
    pub visible: bool,
    pub params: ConnectionParams,
    pub active_field: FormField,
    pub error: Option<String>,
}

impl ConnectionForm {
    pub fn new(params: ConnectionParams) -> Self {
        Self {
            visible: true,
            params,
            active_field: FormField::Host,
            error: None,
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.error = None;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.error = None;
    }

    fn fields(&self) -> &'static [FormField] {
        match self.params.db_type {
            DatabaseType::MySQL => &[
                FormField::Type,
                FormField::Host,
                FormField::Port,
                FormField::User,
                FormField::Password,
                FormField::Database,
            ],
            DatabaseType::SQLite => &[FormField::Type, FormField::Database],
        }
    }

    pub fn next_field(&mut self) {
        let fields = self.fields();
        let pos = fields.iter().position(|f| *f == self.active_field).unwrap_or(0);
        self.active_field = fields[(pos + 1) % fields.len()];
    }

    pub fn prev_field(&mut self) {
        let fields = self.fields();
        let pos = fields.iter().position(|f| *f == self.active_field).unwrap_or(0);
        self.active_field = fields[(pos + fields.len() - 1) % fields.len()];
    }

    pub fn cycle_db_type(&mut self) {
        self.params.db_type = self.params.db_type.cycle();
        self.active_field = FormField::Type;
    }

    fn field_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Host => Some(&mut self.params.host),
            FormField::Port => Some(&mut self.params.port),
            FormField::User => Some(&mut self.params.user),
            FormField::Password => Some(&mut self.params.password),
            FormField::Database => Some(&mut self.params.database),
            FormField::Type => None, // cycled, not typed
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if self.active_field == FormField::Type {
            if c == ' ' {
                self.cycle_db_type();
            }
            return;
        }
        if self.active_field == FormField::Port && !c.is_ascii_digit() {
            return;
        }
        if let Some(value) = self.field_mut(self.active_field) {
            value.push(c);
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(value) = self.field_mut(self.active_field) {
            value.pop();
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let popup_area = centered_rect(60, 70, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Database Connection ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let fields = self.fields();
        let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
        constraints.push(Constraint::Min(1)); // error
        constraints.push(Constraint::Length(2)); // help

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .margin(1)
            .split(inner);

        for (idx, field) in fields.iter().enumerate() {
            let style = if *field == self.active_field {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let (title, value) = match field {
                FormField::Type => ("Database Type (Space to cycle)", self.params.db_type.to_string()),
                FormField::Host => ("Host", self.params.host.clone()),
                FormField::Port => ("Port", self.params.port.clone()),
                FormField::User => ("User", self.params.user.clone()),
                // Mask password with asterisks
                FormField::Password => ("Password", "*".repeat(self.params.password.chars().count())),
                FormField::Database => match self.params.db_type {
                    DatabaseType::MySQL => ("Database", self.params.database.clone()),
                    DatabaseType::SQLite => ("Database File Path", self.params.database.clone()),
                },
            };
            let block = Block::default().title(title).borders(Borders::ALL).border_style(style);
            frame.render_widget(Paragraph::new(value).block(block), chunks[idx]);
        }

        if let Some(ref error) = self.error {
            let para = Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: false });
            frame.render_widget(para, chunks[fields.len()]);
        }

        let help = Paragraph::new(vec![
            Line::from("Tab/Shift+Tab: Move between fields  Space: Cycle type (on Type field)"),
            Line::from("Enter: Connect  Esc: Close"),
        ])
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
        frame.render_widget(help, chunks[fields.len() + 1]);
    }
}
