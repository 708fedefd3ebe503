use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VimMode {
    Normal,
    Insert,
    Command,
}

impl VimMode {
    pub fn as_str(&self) -> &str {
        match self {
            VimMode::Normal => "NORMAL",
            VimMode::Insert => "INSERT",
            VimMode::Command => "COMMAND",
        }
    }
}

#[derive(Debug, Clone)]
pub struct VimState {
    pub mode: VimMode,
    pub command_buffer: String,
    pub count: Option<usize>,
}

impl Default for VimState {
    fn default() -> Self {
        Self {
            mode: VimMode::Normal,
            command_buffer: String::new(),
            count: None,
        }
    }
}

impl VimState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_insert_mode(&mut self) {
        self.mode = VimMode::Insert;
        self.reset_state();
    }

    pub fn enter_normal_mode(&mut self) {
        self.mode = VimMode::Normal;
        self.reset_state();
    }

    pub fn enter_command_mode(&mut self) {
        self.mode = VimMode::Command;
        self.command_buffer.clear();
    }

    pub fn get_command(&self) -> &str {
        &self.command_buffer
    }

    fn set_count(&mut self, n: usize) {
        self.count = Some(match self.count {
            Some(existing) => existing.saturating_mul(10).saturating_add(n),
            None => n,
        });
    }

    fn take_count(&mut self) -> usize {
        self.count.take().unwrap_or(1)
    }

    fn reset_state(&mut self) {
        self.command_buffer.clear();
        self.count = None;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<VimCommand> {
        match self.mode {
            VimMode::Normal => self.handle_normal_mode(key),
            VimMode::Insert => self.handle_insert_mode(key),
            VimMode::Command => self.handle_command_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Option<VimCommand> {
        let command = self.normal_mode_command(key);
        // A count only survives digits; any other key consumes or drops it.
        let digit = matches!(key.code, KeyCode::Char(c) if c.is_ascii_digit())
            && !key.modifiers.contains(KeyModifiers::CONTROL);
        if !digit {
            self.count = None;
        }
        command
    }

    fn normal_mode_command(&mut self, key: KeyEvent) -> Option<VimCommand> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(VimCommand::Quit),
                KeyCode::Char('e') | KeyCode::Char('r') => Some(VimCommand::ExecuteQuery),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('h') | KeyCode::Left => Some(VimCommand::MoveLeft(self.take_count())),
            KeyCode::Char('j') | KeyCode::Down => Some(VimCommand::MoveDown(self.take_count())),
            KeyCode::Char('k') | KeyCode::Up => Some(VimCommand::MoveUp(self.take_count())),
            KeyCode::Char('l') | KeyCode::Right => Some(VimCommand::MoveRight(self.take_count())),
            KeyCode::Char('g') if matches!(self.command_buffer.chars().last(), Some('g')) => {
                self.command_buffer.clear();
                Some(VimCommand::GotoTop)
            }
            KeyCode::Char('g') => {
                self.command_buffer.push('g');
                None
            }
            KeyCode::Char('G') => Some(VimCommand::GotoBottom),
            KeyCode::Char('i') => Some(VimCommand::EnterInsertMode),
            KeyCode::Char(':') => {
                self.enter_command_mode();
                Some(VimCommand::EnterCommandMode)
            }
            KeyCode::Char('a') => Some(VimCommand::AddRecord),
            KeyCode::Char('e') => Some(VimCommand::EditRecord),
            KeyCode::Char('d') => Some(VimCommand::DeleteRecord),
            KeyCode::Char('y') => Some(VimCommand::YankRow),
            KeyCode::Char('R') => Some(VimCommand::RefreshData),
            KeyCode::Char('C') => Some(VimCommand::OpenConnectionForm),
            KeyCode::Char('q') => Some(VimCommand::Quit),
            KeyCode::Char('1') if self.count.is_none() => Some(VimCommand::SwitchToTablesTab),
            KeyCode::Char('2') if self.count.is_none() => Some(VimCommand::SwitchToQueryTab),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.set_count(c.to_digit(10).unwrap_or(0) as usize);
                None
            }
            KeyCode::Tab => Some(VimCommand::NextPane),
            KeyCode::BackTab => Some(VimCommand::PrevPane),
            KeyCode::Enter => Some(VimCommand::Activate),
            _ => None,
        }
    }

    fn handle_insert_mode(&mut self, key: KeyEvent) -> Option<VimCommand> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('e') | KeyCode::Char('r') => Some(VimCommand::ExecuteQuery),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Esc => {
                self.enter_normal_mode();
                Some(VimCommand::ExitInsertMode)
            }
            KeyCode::Char(c) => Some(VimCommand::InsertChar(c)),
            KeyCode::Backspace => Some(VimCommand::Backspace),
            KeyCode::Delete => Some(VimCommand::DeleteChar),
            KeyCode::Enter => Some(VimCommand::InsertNewline),
            KeyCode::Left => Some(VimCommand::MoveLeft(1)),
            KeyCode::Right => Some(VimCommand::MoveRight(1)),
            KeyCode::Up => Some(VimCommand::MoveUp(1)),
            KeyCode::Down => Some(VimCommand::MoveDown(1)),
            _ => None,
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Option<VimCommand> {
        match key.code {
            KeyCode::Esc => {
                self.enter_normal_mode();
                Some(VimCommand::CancelCommand)
            }
            KeyCode::Enter => {
                let cmd = self.command_buffer.clone();
                self.enter_normal_mode();
                Some(VimCommand::ExecuteCommand(cmd))
            }
            KeyCode::Char(c) => {
                self.command_buffer.push(c);
                None
            }
            KeyCode::Backspace => {
                if self.command_buffer.pop().is_none() {
                    self.enter_normal_mode();
                    return Some(VimCommand::CancelCommand);
                }
                None
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VimCommand {
    // Movement
    MoveLeft(usize),
    MoveRight(usize),
    MoveUp(usize),
    MoveDown(usize),
    GotoTop,
    GotoBottom,

    // Mode changes
    EnterInsertMode,
    ExitInsertMode,
    EnterCommandMode,
    CancelCommand,

    // Editing
    InsertChar(char),
    InsertNewline,
    Backspace,
    DeleteChar,

    // Navigation
    NextPane,
    PrevPane,
    SwitchToTablesTab,
    SwitchToQueryTab,

    // Records
    Activate,
    AddRecord,
    EditRecord,
    DeleteRecord,
    YankRow,
    RefreshData,

    ExecuteQuery,
    OpenConnectionForm,

    ExecuteCommand(String),
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn counts_prefix_movements() {
        let mut state = VimState::new();
        assert_eq!(state.handle_key(key(KeyCode::Char('3'))), None);
        assert_eq!(state.handle_key(key(KeyCode::Char('j'))), Some(VimCommand::MoveDown(3)));
        assert_eq!(state.handle_key(key(KeyCode::Char('j'))), Some(VimCommand::MoveDown(1)));
    }

    #[test]
    fn non_movement_keys_drop_a_pending_count() {
        let mut state = VimState::new();
        state.handle_key(key(KeyCode::Char('3')));
        assert_eq!(state.handle_key(key(KeyCode::Char('a'))), Some(VimCommand::AddRecord));
        assert_eq!(state.handle_key(key(KeyCode::Char('j'))), Some(VimCommand::MoveDown(1)));

        state.handle_key(key(KeyCode::Char('4')));
        state.handle_key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CONTROL));
        assert_eq!(state.handle_key(key(KeyCode::Char('k'))), Some(VimCommand::MoveUp(1)));

        state.handle_key(key(KeyCode::Char('5')));
        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.handle_key(key(KeyCode::Char('1'))), Some(VimCommand::SwitchToTablesTab));
    }

    #[test]
    fn tab_shortcuts_only_without_pending_count() {
        let mut state = VimState::new();
        assert_eq!(state.handle_key(key(KeyCode::Char('2'))), Some(VimCommand::SwitchToQueryTab));
        state.handle_key(key(KeyCode::Char('3')));
        assert_eq!(state.handle_key(key(KeyCode::Char('1'))), None);
        assert_eq!(state.handle_key(key(KeyCode::Char('k'))), Some(VimCommand::MoveUp(31)));
    }

    #[test]
    fn gg_goes_to_top() {
        let mut state = VimState::new();
        assert_eq!(state.handle_key(key(KeyCode::Char('g'))), None);
        assert_eq!(state.handle_key(key(KeyCode::Char('g'))), Some(VimCommand::GotoTop));
    }

    #[test]
    fn record_actions_are_single_keys() {
        let mut state = VimState::new();
        assert_eq!(state.handle_key(key(KeyCode::Char('a'))), Some(VimCommand::AddRecord));
        assert_eq!(state.handle_key(key(KeyCode::Char('e'))), Some(VimCommand::EditRecord));
        assert_eq!(state.handle_key(key(KeyCode::Char('d'))), Some(VimCommand::DeleteRecord));
        assert_eq!(state.handle_key(key(KeyCode::Char('R'))), Some(VimCommand::RefreshData));
    }

    #[test]
    fn command_mode_collects_and_submits() {
        let mut state = VimState::new();
        assert_eq!(state.handle_key(key(KeyCode::Char(':'))), Some(VimCommand::EnterCommandMode));
        for c in "exec".chars() {
            assert_eq!(state.handle_key(key(KeyCode::Char(c))), None);
        }
        assert_eq!(state.get_command(), "exec");
        assert_eq!(
            state.handle_key(key(KeyCode::Enter)),
            Some(VimCommand::ExecuteCommand("exec".to_string()))
        );
        assert_eq!(state.mode, VimMode::Normal);
    }

    #[test]
    fn backspace_on_empty_command_cancels() {
        let mut state = VimState::new();
        state.handle_key(key(KeyCode::Char(':')));
        assert_eq!(state.handle_key(key(KeyCode::Backspace)), Some(VimCommand::CancelCommand));
        assert_eq!(state.mode, VimMode::Normal);
    }

    #[test]
    fn insert_mode_passes_text_through() {
        let mut state = VimState::new();
        state.enter_insert_mode();
        assert_eq!(state.handle_key(key(KeyCode::Char('q'))), Some(VimCommand::InsertChar('q')));
        assert_eq!(
            state.handle_key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CONTROL)),
            Some(VimCommand::ExecuteQuery)
        );
        assert_eq!(state.handle_key(key(KeyCode::Esc)), Some(VimCommand::ExitInsertMode));
        assert_eq!(state.mode, VimMode::Normal);
    }
}
