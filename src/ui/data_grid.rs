use crate::db::{self, display_cell, QueryResult};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

/// Read-only row grid. The Tables tab uses one for the selected table and
/// the SQL Query tab uses another for console results.
#[derive(Debug)]
pub struct DataGrid {
    pub result: Option<QueryResult>,
    pub table_state: TableState,
    pub horizontal_scroll: usize, // first visible column
    pub visible_columns: usize,
    pub focused: bool,
    label: &'static str,
}

impl DataGrid {
    pub fn new(label: &'static str) -> Self {
        Self {
            result: None,
            table_state: TableState::default(),
            horizontal_scroll: 0,
            visible_columns: 10,
            focused: false,
            label,
        }
    }

    pub fn set_result(&mut self, result: QueryResult) {
        let selected = if result.rows.is_empty() { None } else { Some(0) };
        self.result = Some(result);
        self.horizontal_scroll = 0;
        self.table_state.select(selected);
    }

    pub fn clear(&mut self) {
        self.result = None;
        self.horizontal_scroll = 0;
        self.table_state.select(None);
    }

    fn row_count(&self) -> usize {
        self.result.as_ref().map_or(0, |r| r.rows.len())
    }

    pub fn move_up(&mut self, count: usize) {
        if self.row_count() == 0 {
            return;
        }
        let selected = self.table_state.selected().unwrap_or(0);
        self.table_state.select(Some(selected.saturating_sub(count)));
    }

    pub fn move_down(&mut self, count: usize) {
        let rows = self.row_count();
        if rows == 0 {
            return;
        }
        let selected = self.table_state.selected().unwrap_or(0);
        self.table_state.select(Some((selected + count).min(rows - 1)));
    }

    pub fn goto_top(&mut self) {
        if self.row_count() > 0 {
            self.table_state.select(Some(0));
        }
    }

    pub fn goto_bottom(&mut self) {
        let rows = self.row_count();
        if rows > 0 {
            self.table_state.select(Some(rows - 1));
        }
    }

    /// Highlights row `idx`, clamped to the rows present.
    pub fn select(&mut self, idx: usize) {
        let rows = self.row_count();
        if rows > 0 {
            self.table_state.select(Some(idx.min(rows - 1)));
        }
    }

    pub fn scroll_left(&mut self, count: usize) {
        self.horizontal_scroll = self.horizontal_scroll.saturating_sub(count);
    }

    pub fn scroll_right(&mut self, count: usize) {
        if let Some(ref result) = self.result {
            let max_scroll = result.columns.len().saturating_sub(self.visible_columns);
            self.horizontal_scroll = (self.horizontal_scroll + count).min(max_scroll);
        }
    }

    /// The highlighted row, if any.
    pub fn selected_row(&self) -> Option<&[db::Cell]> {
        let result = self.result.as_ref()?;
        let idx = self.table_state.selected()?;
        result.rows.get(idx).map(Vec::as_slice)
    }

    /// Highlighted row as one tab-separated line, NULLs spelled out.
    pub fn selected_row_tsv(&self) -> Option<String> {
        self.selected_row()
            .map(|row| row.iter().map(display_cell).collect::<Vec<_>>().join("\t"))
    }

    fn title(&self, start_col: usize, end_col: usize) -> String {
        let Some(ref result) = self.result else {
            return format!(" {} ", self.label);
        };

        let mut title = match result.rows_affected {
            Some(affected) => format!(" {} - {} rows affected ", self.label, affected),
            None => format!(" {} ({} rows) ", self.label, result.rows.len()),
        };
        if result.execution_time_ms > 0 {
            title.push_str(&format!("- {}ms ", result.execution_time_ms));
        }
        if result.columns.len() > self.visible_columns {
            title.push_str(&format!(
                "- Cols {}-{}/{} ",
                start_col + 1,
                end_col,
                result.columns.len()
            ));
        }
        title
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        // At least 15 cells per column, borders excluded.
        let column_count = self.result.as_ref().map_or(0, |r| r.columns.len());
        let available_width = area.width.saturating_sub(4);
        self.visible_columns = ((available_width / 15).max(1) as usize).min(column_count.max(1));

        let Some(ref result) = self.result else {
            let paragraph = Paragraph::new("No data loaded.")
                .style(Style::default().fg(Color::DarkGray))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(self.title(0, 0))
                        .border_style(border_style),
                );
            frame.render_widget(paragraph, area);
            return;
        };

        if result.is_write() {
            let affected = result.rows_affected.unwrap_or(0);
            let paragraph = Paragraph::new(format!("Affected rows: {}", affected)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.title(0, 0))
                    .border_style(border_style),
            );
            frame.render_widget(paragraph, area);
            return;
        }

        let start_col = self.horizontal_scroll.min(result.columns.len());
        let end_col = (start_col + self.visible_columns).min(result.columns.len());

        let header_style = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let header = Row::new(
            result.columns[start_col..end_col]
                .iter()
                .map(|h| Cell::from(format!(" {} ", h)).style(header_style)),
        )
        .height(1);

        let rows = result.rows.iter().map(|row| {
            let cells = (start_col..end_col).map(|col_idx| match row.get(col_idx) {
                Some(None) => Cell::from(" NULL ").style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
                Some(Some(value)) => Cell::from(format!(" {} ", value)),
                None => Cell::from(""),
            });
            Row::new(cells).height(1)
        });

        let widths: Vec<Constraint> = (start_col..end_col)
            .map(|col_idx| {
                let header_width = result.columns[col_idx].chars().count();
                let content_width = result
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col_idx))
                    .map(|cell| display_cell(cell).chars().count())
                    .max()
                    .unwrap_or(0);
                let width = header_width.max(content_width).max(10);
                Constraint::Min(width as u16 + 2)
            })
            .collect();

        let title = self.title(start_col, end_col);
        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(border_style),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Rgb(70, 70, 90))
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .column_spacing(1);

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }
}
