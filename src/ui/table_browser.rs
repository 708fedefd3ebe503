use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Left-hand list of table names for the current session.
#[derive(Debug)]
pub struct TableBrowser {
    pub tables: Vec<String>,
    pub list_state: ListState,
    pub focused: bool,
    /// Table whose data is in the grid, which can differ from the highlight.
    pub loaded_table: Option<String>,
}

impl TableBrowser {
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            list_state: ListState::default(),
            focused: true,
            loaded_table: None,
        }
    }

    pub fn set_tables(&mut self, tables: Vec<String>) {
        let selected = if tables.is_empty() { None } else { Some(0) };
        self.tables = tables;
        self.list_state.select(selected);
        self.loaded_table = None;
    }

    pub fn clear(&mut self) {
        self.set_tables(Vec::new());
    }

    pub fn move_up(&mut self) {
        if self.tables.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = if current == 0 { self.tables.len() - 1 } else { current - 1 };
        self.list_state.select(Some(next));
    }

    pub fn move_down(&mut self) {
        if self.tables.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = if current >= self.tables.len() - 1 { 0 } else { current + 1 };
        self.list_state.select(Some(next));
    }

    pub fn goto_top(&mut self) {
        if !self.tables.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn goto_bottom(&mut self) {
        let last = self.tables.len().checked_sub(1);
        self.list_state.select(last);
    }

    pub fn selected_table(&self) -> Option<&str> {
        self.list_state
            .selected()
            .and_then(|idx| self.tables.get(idx))
            .map(String::as_str)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .tables
            .iter()
            .map(|name| {
                let marker = if self.loaded_table.as_deref() == Some(name.as_str()) {
                    "▼ "
                } else {
                    "▶ "
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Cyan)),
                    Span::styled(name.as_str(), Style::default().fg(Color::Yellow)),
                ]))
            })
            .collect();

        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Select Table ")
                    .border_style(border_style),
            )
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_both_ways() {
        let mut browser = TableBrowser::new();
        browser.set_tables(vec!["customer".into(), "product".into(), "sale".into()]);
        assert_eq!(browser.selected_table(), Some("customer"));
        browser.move_up();
        assert_eq!(browser.selected_table(), Some("sale"));
        browser.move_down();
        assert_eq!(browser.selected_table(), Some("customer"));
        browser.goto_bottom();
        assert_eq!(browser.selected_table(), Some("sale"));
    }

    #[test]
    fn empty_list_has_no_selection() {
        let mut browser = TableBrowser::new();
        browser.set_tables(Vec::new());
        browser.move_down();
        assert_eq!(browser.selected_table(), None);
    }
}
