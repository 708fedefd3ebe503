pub mod connection_form;
pub mod data_grid;
pub mod dialog;
pub mod layout;
pub mod query_editor;
pub mod record_form;
pub mod table_browser;

pub use connection_form::ConnectionForm;
pub use data_grid::DataGrid;
pub use dialog::{Dialog, DialogKind};
pub use layout::render;
pub use query_editor::QueryEditor;
pub use table_browser::TableBrowser;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// A rectangle of the given percentages, centered in `r`. Used by popups.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
