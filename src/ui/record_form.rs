use crate::form::{FormMode, RecordForm};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;

const FIELD_HEIGHT: u16 = 3;

/// First field index to draw so that `active` stays on screen.
fn first_visible(active: usize, total: usize, fits: usize) -> usize {
    if fits == 0 || total <= fits {
        return 0;
    }
    active.saturating_sub(fits - 1).min(total - fits)
}

pub fn render(frame: &mut Frame, area: Rect, form: &RecordForm) {
    let popup_area = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", form.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .margin(1)
        .split(inner);

    let fits = (chunks[0].height / FIELD_HEIGHT) as usize;
    let start = first_visible(form.active, form.fields.len(), fits);

    for (slot, (idx, field)) in form.fields.iter().enumerate().skip(start).take(fits).enumerate() {
        let field_area = Rect {
            x: chunks[0].x,
            y: chunks[0].y + slot as u16 * FIELD_HEIGHT,
            width: chunks[0].width,
            height: FIELD_HEIGHT,
        };

        let border_style = if idx == form.active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let text_style = if field.read_only {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let placeholder = match (&form.mode, &field.column.default) {
            (FormMode::Add, Some(default)) if field.value.is_empty() => Some(format!("default: {}", default)),
            _ => None,
        };
        let paragraph = match placeholder {
            Some(ref text) => Paragraph::new(text.as_str()).style(Style::default().fg(Color::DarkGray)),
            None => Paragraph::new(field.value.as_str()).style(text_style),
        };
        let paragraph = paragraph.block(
            Block::default()
                .title(field.label(&form.mode))
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        frame.render_widget(paragraph, field_area);

        if idx == form.active && !field.read_only {
            let cursor_x = field_area.x + 1 + field.value.chars().count() as u16;
            frame.set_cursor_position((cursor_x.min(field_area.right().saturating_sub(2)), field_area.y + 1));
        }
    }

    let help = Paragraph::new(format!(
        "Tab: next  Ctrl+S/Enter: {}  Esc: Cancel  (* required)",
        form.submit_label()
    ))
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    frame.render_widget(help, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_follows_active_field() {
        assert_eq!(first_visible(0, 10, 4), 0);
        assert_eq!(first_visible(3, 10, 4), 0);
        assert_eq!(first_visible(4, 10, 4), 1);
        assert_eq!(first_visible(9, 10, 4), 6);
        assert_eq!(first_visible(5, 3, 4), 0);
    }
}
