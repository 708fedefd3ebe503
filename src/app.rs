use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::config::Config;
use crate::db::{self, ColumnInfo, Session, Statement};
use crate::form::{self, FormError, FormMode, RecordForm};
use crate::ui::{ConnectionForm, DataGrid, Dialog, DialogKind, QueryEditor, TableBrowser};
use crate::vim::{VimCommand, VimState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Tables,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    TableList,
    TableGrid,
    QueryEditor,
    QueryResults,
}

impl Pane {
    pub fn as_str(&self) -> &str {
        match self {
            Pane::TableList => "Tables",
            Pane::TableGrid => "Data",
            Pane::QueryEditor => "Query Editor",
            Pane::QueryResults => "Results",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    NotConnected,
    Connected,
    Failed,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub at: DateTime<Local>,
}

pub struct App {
    pub should_quit: bool,
    pub vim_state: VimState,
    pub active_tab: Tab,
    pub active_pane: Pane,
    pub table_browser: TableBrowser,
    pub table_grid: DataGrid,
    pub query_editor: QueryEditor,
    pub query_results: DataGrid,
    pub connection_form: ConnectionForm,
    pub record_form: Option<RecordForm>,
    pub dialog: Option<Dialog>,
    pub connection_status: ConnectionStatus,
    pub status_message: Option<StatusMessage>,
    session: Option<Box<dyn Session>>,
    /// Metadata for the table currently in `table_grid`.
    columns: Vec<ColumnInfo>,
    /// Statement waiting on the delete confirmation.
    pending_delete: Option<Statement>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let connection_form = ConnectionForm::new(config.connection.to_params());
        let mut app = Self {
            should_quit: false,
            vim_state: VimState::new(),
            active_tab: Tab::Tables,
            active_pane: Pane::TableList,
            table_browser: TableBrowser::new(),
            table_grid: DataGrid::new("Data"),
            query_editor: QueryEditor::new(),
            query_results: DataGrid::new("Results"),
            connection_form,
            record_form: None,
            dialog: None,
            connection_status: ConnectionStatus::NotConnected,
            status_message: None,
            session: None,
            columns: Vec::new(),
            pending_delete: None,
        };
        app.set_status("Ready");
        app.update_focus();
        app
    }

    /// Releases the session before the terminal is restored.
    pub fn shutdown(&mut self) {
        self.close_session();
    }

    pub fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key_event(key)?;
                }
            }
        }
        Ok(())
    }

    /// Routes a key to whatever is on top: dialog, record form, connection
    /// form, then the vim keymap.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if self.dialog.is_some() {
            self.handle_dialog_key(key);
            return Ok(());
        }

        if self.record_form.is_some() {
            self.handle_record_form_key(key);
            return Ok(());
        }

        if self.connection_form.visible {
            self.handle_connection_form_key(key);
            return Ok(());
        }

        if let Some(vim_command) = self.vim_state.handle_key(key) {
            self.execute_vim_command(vim_command)?;
        }
        Ok(())
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let Some(ref dialog) = self.dialog else {
            return;
        };

        if dialog.kind == DialogKind::Confirm {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.dialog = None;
                    self.confirm_delete();
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.dialog = None;
                    self.pending_delete = None;
                    self.set_status("Delete cancelled");
                }
                _ => {}
            }
        } else if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            self.dialog = None;
        }
    }

    fn handle_record_form_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.record_form = None;
                self.set_status("Cancelled");
                return;
            }
            KeyCode::Enter => return self.submit_record_form(),
            KeyCode::Char('s') if ctrl => return self.submit_record_form(),
            _ => {}
        }

        let Some(ref mut form) = self.record_form else {
            return;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Char(c) if !ctrl => form.insert_char(c),
            _ => {}
        }
    }

    fn handle_connection_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.connection_form.hide(),
            KeyCode::Enter => self.connect(),
            KeyCode::Tab | KeyCode::Down => self.connection_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.connection_form.prev_field(),
            KeyCode::Backspace => self.connection_form.delete_char(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.connection_form.insert_char(c)
            }
            _ => {}
        }
    }

    fn execute_vim_command(&mut self, command: VimCommand) -> Result<()> {
        match command {
            VimCommand::Quit => {
                self.should_quit = true;
            }
            VimCommand::ExecuteCommand(cmd) => {
                self.execute_command(&cmd)?;
            }
            VimCommand::NextPane | VimCommand::PrevPane => {
                self.toggle_pane();
            }
            VimCommand::SwitchToTablesTab => self.switch_tab(Tab::Tables),
            VimCommand::SwitchToQueryTab => self.switch_tab(Tab::Query),
            VimCommand::MoveDown(count) => match self.active_pane {
                Pane::TableList => {
                    for _ in 0..count {
                        self.table_browser.move_down();
                    }
                }
                Pane::TableGrid => self.table_grid.move_down(count),
                Pane::QueryEditor => self.query_editor.move_down(count),
                Pane::QueryResults => self.query_results.move_down(count),
            },
            VimCommand::MoveUp(count) => match self.active_pane {
                Pane::TableList => {
                    for _ in 0..count {
                        self.table_browser.move_up();
                    }
                }
                Pane::TableGrid => self.table_grid.move_up(count),
                Pane::QueryEditor => self.query_editor.move_up(count),
                Pane::QueryResults => self.query_results.move_up(count),
            },
            VimCommand::MoveLeft(count) => match self.active_pane {
                Pane::TableList => {}
                Pane::TableGrid => self.table_grid.scroll_left(count),
                Pane::QueryEditor => self.query_editor.move_left(count),
                Pane::QueryResults => self.query_results.scroll_left(count),
            },
            VimCommand::MoveRight(count) => match self.active_pane {
                Pane::TableList => {}
                Pane::TableGrid => self.table_grid.scroll_right(count),
                Pane::QueryEditor => self.query_editor.move_right(count),
                Pane::QueryResults => self.query_results.scroll_right(count),
            },
            VimCommand::GotoTop => match self.active_pane {
                Pane::TableList => self.table_browser.goto_top(),
                Pane::TableGrid => self.table_grid.goto_top(),
                Pane::QueryEditor => self.query_editor.goto_top(),
                Pane::QueryResults => self.query_results.goto_top(),
            },
            VimCommand::GotoBottom => match self.active_pane {
                Pane::TableList => self.table_browser.goto_bottom(),
                Pane::TableGrid => self.table_grid.goto_bottom(),
                Pane::QueryEditor => self.query_editor.goto_bottom(),
                Pane::QueryResults => self.query_results.goto_bottom(),
            },
            VimCommand::EnterInsertMode => {
                // Only the query editor takes text.
                self.switch_tab(Tab::Query);
                self.active_pane = Pane::QueryEditor;
                self.update_focus();
                self.vim_state.enter_insert_mode();
            }
            VimCommand::InsertChar(c) => self.query_editor.insert_char(c),
            VimCommand::InsertNewline => self.query_editor.insert_newline(),
            VimCommand::Backspace => self.query_editor.backspace(),
            VimCommand::DeleteChar => self.query_editor.delete_char(),
            VimCommand::Activate => match self.active_pane {
                Pane::TableList => {
                    if let Some(table) = self.table_browser.selected_table().map(str::to_string) {
                        self.load_table_data(&table);
                    }
                }
                Pane::TableGrid => self.edit_record(),
                Pane::QueryEditor | Pane::QueryResults => {}
            },
            VimCommand::AddRecord => self.add_record(),
            VimCommand::EditRecord => self.edit_record(),
            VimCommand::DeleteRecord => self.delete_record(),
            VimCommand::YankRow => self.yank_row(),
            VimCommand::RefreshData => self.refresh(),
            VimCommand::ExecuteQuery => self.execute_query(),
            VimCommand::OpenConnectionForm => self.connection_form.show(),
            VimCommand::ExitInsertMode | VimCommand::EnterCommandMode | VimCommand::CancelCommand => {}
        }
        Ok(())
    }

    fn execute_command(&mut self, cmd: &str) -> Result<()> {
        let parts: Vec<&str> = cmd.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(());
        }

        match parts[0] {
            "q" | "quit" => {
                self.should_quit = true;
            }
            "connect" | "conn" => {
                self.connection_form.show();
            }
            "exec" | "execute" => {
                self.execute_query();
            }
            "clear" => {
                self.query_editor.clear();
                self.query_results.clear();
            }
            "disconnect" | "close" => {
                self.close_session();
                self.connection_status = ConnectionStatus::NotConnected;
                self.set_status("Disconnected");
            }
            "refresh" => {
                self.refresh();
            }
            other => {
                self.set_status(format!("Unknown command: {}", other));
            }
        }
        Ok(())
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            at: Local::now(),
        });
    }

    fn show_form_error(&mut self, error: &FormError) {
        let dialog = match error {
            FormError::MissingRequired(_) => Dialog::warning("Required Fields", error.to_string()),
            FormError::NoData => Dialog::warning("Empty Data", error.to_string()),
            FormError::NoChanges => Dialog::info("No Changes", error.to_string()),
            FormError::NoSelection => Dialog::warning("No Selection", error.to_string()),
            FormError::NoPrimaryKey => Dialog::error("Error", error.to_string()),
        };
        self.dialog = Some(dialog);
    }

    /// Opens a session from the connection form, replacing any current one.
    fn connect(&mut self) {
        self.close_session();

        let params = self.connection_form.params.clone();
        match db::open_session(&params) {
            Ok(session) => {
                let database = session.database_name().to_string();
                self.session = Some(session);
                self.connection_status = ConnectionStatus::Connected;
                self.connection_form.hide();
                self.set_status(format!("Connected to {}", database));
                self.load_tables();
                if self.dialog.is_none() {
                    self.dialog = Some(Dialog::info("Connection", "Successfully connected to the database!"));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "connection failed");
                self.connection_status = ConnectionStatus::Failed;
                self.connection_form.error = Some(e.to_string());
                self.set_status("Connection failed");
                self.dialog = Some(Dialog::error("Connection Error", format!("Failed to connect: {}", e)));
            }
        }
    }

    fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close() {
                tracing::warn!(error = %e, "error while closing session");
            }
            tracing::info!(database = session.database_name(), "session closed");
        }
        self.columns.clear();
        self.table_browser.clear();
        self.table_grid.clear();
        self.query_results.clear();
        self.record_form = None;
        self.pending_delete = None;
    }

    fn load_tables(&mut self) {
        let Some(session) = self.session.as_deref_mut() else {
            self.dialog = Some(Dialog::warning("No Connection", "Please connect to a database first."));
            return;
        };

        match db::list_tables(session) {
            Ok(tables) => {
                tracing::debug!(count = tables.len(), "loaded table list");
                self.table_browser.set_tables(tables);
                self.columns.clear();
                self.table_grid.clear();
                if let Some(first) = self.table_browser.selected_table().map(str::to_string) {
                    self.load_table_data(&first);
                }
            }
            Err(e) => {
                self.dialog = Some(Dialog::error("Error", format!("Failed to load tables: {}", e)));
            }
        }
    }

    /// Describes `table` and shows every row of it in the grid.
    fn load_table_data(&mut self, table: &str) {
        let Some(session) = self.session.as_deref_mut() else {
            return;
        };

        match db::load_table(session, table) {
            Ok((columns, result)) => {
                self.columns = columns;
                self.table_grid.set_result(result);
                self.table_browser.loaded_table = Some(table.to_string());
                self.set_status(format!("Loaded data from {}", table));
            }
            Err(e) => {
                tracing::warn!(table, error = %e, "failed to load table data");
                self.dialog = Some(Dialog::error("Error", format!("Failed to load table data: {}", e)));
            }
        }
    }

    /// Reloads the open table, keeping the highlighted row where possible.
    fn reload_table(&mut self) {
        let Some(table) = self.table_browser.loaded_table.clone() else {
            return;
        };
        let selected = self.table_grid.table_state.selected();
        self.load_table_data(&table);
        if let Some(idx) = selected {
            self.table_grid.select(idx);
        }
    }

    fn refresh(&mut self) {
        if self.session.is_none() {
            self.dialog = Some(Dialog::warning("No Connection", "Please connect to a database first."));
        } else if self.table_browser.loaded_table.is_some() {
            self.reload_table();
        } else {
            self.load_tables();
        }
    }

    /// The open table, provided a session is alive.
    fn current_table(&self) -> Option<String> {
        self.session.as_ref()?;
        self.table_browser.loaded_table.clone()
    }

    fn require_table(&mut self) -> Option<String> {
        let table = self.current_table();
        if table.is_none() {
            self.dialog = Some(Dialog::warning(
                "Error",
                "Please select a table and ensure you're connected.",
            ));
        }
        table
    }

    fn add_record(&mut self) {
        let Some(table) = self.require_table() else {
            return;
        };
        self.record_form = Some(RecordForm::for_add(&table, &self.columns));
    }

    fn edit_record(&mut self) {
        let Some(table) = self.require_table() else {
            return;
        };
        let Some(row) = self.table_grid.selected_row() else {
            self.dialog = Some(Dialog::warning("No Selection", "Please select a record to edit."));
            return;
        };

        match RecordForm::for_edit(&table, &self.columns, row) {
            Ok(form) => self.record_form = Some(form),
            Err(e) => self.show_form_error(&e),
        }
    }

    fn delete_record(&mut self) {
        let Some(table) = self.require_table() else {
            return;
        };
        let Some(row) = self.table_grid.selected_row() else {
            self.dialog = Some(Dialog::warning("No Selection", "Please select a record to delete."));
            return;
        };

        match form::delete_statement(&table, &self.columns, row) {
            Ok((statement, description)) => {
                self.pending_delete = Some(statement);
                self.dialog = Some(Dialog::confirm(
                    "Confirm",
                    format!("Delete record with {}?", description),
                ));
            }
            Err(e) => self.show_form_error(&e),
        }
    }

    fn run_write(&mut self, statement: &Statement) -> Result<u64> {
        let session = self
            .session
            .as_deref_mut()
            .ok_or_else(|| anyhow!("Not connected to a database"))?;
        db::run_statement(session, statement)
    }

    fn confirm_delete(&mut self) {
        let Some(statement) = self.pending_delete.take() else {
            return;
        };

        match self.run_write(&statement) {
            Ok(affected) => {
                tracing::info!(affected, "record deleted");
                self.dialog = Some(Dialog::info("Success", "Record deleted successfully!"));
                self.reload_table();
            }
            Err(e) => {
                self.dialog = Some(Dialog::error("Error", format!("Failed to delete record: {}", e)));
            }
        }
    }

    /// Validates the open record form and runs its INSERT or UPDATE. The form
    /// stays open when anything fails so the input isn't lost.
    fn submit_record_form(&mut self) {
        let Some(ref form) = self.record_form else {
            return;
        };
        let adding = form.mode == FormMode::Add;
        let statement = match form.to_statement() {
            Ok(statement) => statement,
            Err(e) => {
                self.show_form_error(&e);
                return;
            }
        };

        match self.run_write(&statement) {
            Ok(affected) => {
                tracing::info!(affected, adding, "record saved");
                self.record_form = None;
                let message = if adding {
                    "Record added successfully!"
                } else {
                    "Record updated successfully!"
                };
                self.dialog = Some(Dialog::info("Success", message));
                self.reload_table();
            }
            Err(e) => {
                let action = if adding { "add" } else { "update" };
                self.dialog = Some(Dialog::error("Error", format!("Failed to {} record: {}", action, e)));
            }
        }
    }

    fn execute_query(&mut self) {
        let sql = self.query_editor.get_query();
        let sql = sql.trim();
        if sql.is_empty() {
            self.dialog = Some(Dialog::warning("Empty Query", "Please enter an SQL query."));
            return;
        }
        let Some(session) = self.session.as_deref_mut() else {
            self.dialog = Some(Dialog::warning("No Connection", "Please connect to a database first."));
            return;
        };

        match db::run_console(session, sql) {
            Ok(result) => {
                if let Some(affected) = result.rows_affected {
                    self.dialog = Some(Dialog::info(
                        "Success",
                        format!("Query executed successfully. Affected rows: {}", affected),
                    ));
                    self.set_status(format!("Query executed. Affected rows: {}", affected));
                } else {
                    self.set_status("Query executed successfully.");
                }
                self.query_results.set_result(result);
            }
            Err(e) => {
                tracing::warn!(error = %e, "console statement failed");
                self.dialog = Some(Dialog::error("Query Error", format!("Failed to execute query: {}", e)));
            }
        }
    }

    fn yank_row(&mut self) {
        let grid = match self.active_pane {
            Pane::QueryEditor | Pane::QueryResults => &self.query_results,
            Pane::TableList | Pane::TableGrid => &self.table_grid,
        };
        let Some(text) = grid.selected_row_tsv() else {
            self.set_status("No row selected");
            return;
        };

        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => self.set_status("Row copied to clipboard"),
            Err(e) => {
                tracing::warn!(error = %e, "clipboard unavailable");
                self.set_status(format!("Copy failed: {}", e));
            }
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.active_pane = match tab {
            Tab::Tables => Pane::TableList,
            Tab::Query => Pane::QueryEditor,
        };
        self.update_focus();
    }

    /// Each tab has two panes; Tab and Shift+Tab flip between them.
    fn toggle_pane(&mut self) {
        self.active_pane = match self.active_pane {
            Pane::TableList => Pane::TableGrid,
            Pane::TableGrid => Pane::TableList,
            Pane::QueryEditor => Pane::QueryResults,
            Pane::QueryResults => Pane::QueryEditor,
        };
        self.update_focus();
    }

    fn update_focus(&mut self) {
        self.table_browser.focused = self.active_pane == Pane::TableList;
        self.table_grid.focused = self.active_pane == Pane::TableGrid;
        self.query_editor.focused = self.active_pane == Pane::QueryEditor;
        self.query_results.focused = self.active_pane == Pane::QueryResults;
    }
}
