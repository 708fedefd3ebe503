use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Multi-line SQL input for the query console. Cursor columns count chars,
/// not bytes.
#[derive(Debug)]
pub struct QueryEditor {
    pub content: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    pub focused: bool,
    pub scroll_offset: usize,
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

impl QueryEditor {
    pub fn new() -> Self {
        Self {
            content: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
            focused: false,
            scroll_offset: 0,
        }
    }

    pub fn get_query(&self) -> String {
        self.content.join("\n")
    }

    pub fn set_query(&mut self, text: &str) {
        self.content = text.lines().map(str::to_string).collect();
        if self.content.is_empty() {
            self.content.push(String::new());
        }
        self.cursor_line = self.content.len() - 1;
        self.cursor_col = char_len(&self.content[self.cursor_line]);
        self.scroll_offset = 0;
    }

    pub fn clear(&mut self) {
        self.content = vec![String::new()];
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.scroll_offset = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        let line = &mut self.content[self.cursor_line];
        let at = byte_index(line, self.cursor_col);
        line.insert(at, c);
        self.cursor_col += 1;
    }

    pub fn insert_newline(&mut self) {
        let line = &mut self.content[self.cursor_line];
        let at = byte_index(line, self.cursor_col);
        let after = line.split_off(at);
        self.content.insert(self.cursor_line + 1, after);
        self.cursor_line += 1;
        self.cursor_col = 0;
    }

    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            let line = &mut self.content[self.cursor_line];
            let at = byte_index(line, self.cursor_col - 1);
            line.remove(at);
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            let current_line = self.content.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = char_len(&self.content[self.cursor_line]);
            self.content[self.cursor_line].push_str(&current_line);
        }
    }

    pub fn delete_char(&mut self) {
        let len = char_len(&self.content[self.cursor_line]);
        if self.cursor_col < len {
            let line = &mut self.content[self.cursor_line];
            let at = byte_index(line, self.cursor_col);
            line.remove(at);
        } else if self.cursor_line < self.content.len() - 1 {
            let next_line = self.content.remove(self.cursor_line + 1);
            self.content[self.cursor_line].push_str(&next_line);
        }
    }

    pub fn move_left(&mut self, count: usize) {
        for _ in 0..count {
            if self.cursor_col > 0 {
                self.cursor_col -= 1;
            } else if self.cursor_line > 0 {
                self.cursor_line -= 1;
                self.cursor_col = char_len(&self.content[self.cursor_line]);
            }
        }
    }

    pub fn move_right(&mut self, count: usize) {
        for _ in 0..count {
            if self.cursor_col < char_len(&self.content[self.cursor_line]) {
                self.cursor_col += 1;
            } else if self.cursor_line < self.content.len() - 1 {
                self.cursor_line += 1;
                self.cursor_col = 0;
            }
        }
    }

    pub fn move_up(&mut self, count: usize) {
        for _ in 0..count {
            if self.cursor_line > 0 {
                self.cursor_line -= 1;
                self.cursor_col = self.cursor_col.min(char_len(&self.content[self.cursor_line]));
            }
        }
    }

    pub fn move_down(&mut self, count: usize) {
        for _ in 0..count {
            if self.cursor_line < self.content.len() - 1 {
                self.cursor_line += 1;
                self.cursor_col = self.cursor_col.min(char_len(&self.content[self.cursor_line]));
            }
        }
    }

    pub fn goto_top(&mut self) {
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.scroll_offset = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.cursor_line = self.content.len() - 1;
        self.cursor_col = char_len(&self.content[self.cursor_line]);
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        // Keep the cursor line inside the visible rows.
        let visible_rows = area.height.saturating_sub(2) as usize;
        if visible_rows > 0 {
            if self.cursor_line < self.scroll_offset {
                self.scroll_offset = self.cursor_line;
            } else if self.cursor_line >= self.scroll_offset + visible_rows {
                self.scroll_offset = self.cursor_line + 1 - visible_rows;
            }
        }

        let text: Vec<Line> = self
            .content
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .map(|(i, line)| {
                let line_num = format!("{:3} ", i + 1);
                Line::from(vec![
                    Span::styled(line_num, Style::default().fg(Color::DarkGray)),
                    Span::raw(line.clone()),
                ])
            })
            .collect();

        let paragraph = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Enter SQL Query (i: insert, Ctrl+E: execute) ")
                .border_style(border_style),
        );

        frame.render_widget(paragraph, area);

        if self.focused {
            let cursor_x = area.x + 5 + self.cursor_col as u16;
            let cursor_y = area.y + 1 + (self.cursor_line - self.scroll_offset) as u16;
            if cursor_y < area.y + area.height.saturating_sub(1) {
                frame.set_cursor_position((cursor_x, cursor_y));
            }
        }
    }
}
