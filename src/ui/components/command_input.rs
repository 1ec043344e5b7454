use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::ui::renderfns::percent_of;
use crate::commands::{self, Command};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

const MAX_SUGGESTIONS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
  /// Resolved command name, or the raw input when nothing matched
  Submitted(String),
  Cancelled,
}

/// `:` command line with fuzzy autocomplete.
#[derive(Debug, Clone, Default)]
pub struct CommandInput {
  input: TextInput,
  active: bool,
  selected: usize,
}

impl CommandInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  fn reset(&mut self) {
    self.active = false;
    self.input.clear();
    self.selected = 0;
  }

  pub fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(self.input.value())
  }

  /// Call for every key; handles activation with `:` too.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<CommandEvent> {
    if !self.active {
      if key.code == KeyCode::Char(':') {
        self.active = true;
        self.selected = 0;
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    let count = self.suggestions().len();
    match key.code {
      KeyCode::Esc => {
        self.reset();
        KeyResult::Event(CommandEvent::Cancelled)
      }
      KeyCode::Enter => {
        let command = self.resolve_command();
        self.reset();
        KeyResult::Event(CommandEvent::Submitted(command))
      }
      KeyCode::Tab | KeyCode::Down => {
        if count > 0 {
          self.selected = (self.selected + 1) % count;
        }
        KeyResult::Handled
      }
      KeyCode::BackTab | KeyCode::Up => {
        if count > 0 {
          self.selected = (self.selected + count - 1) % count;
        }
        KeyResult::Handled
      }
      _ => match self.input.handle_key(key) {
        InputResult::Consumed => {
          self.selected = 0;
          KeyResult::Handled
        }
        InputResult::NotHandled => KeyResult::NotHandled,
        InputResult::Submitted(_) | InputResult::Cancelled => KeyResult::Handled,
      },
    }
  }

  fn resolve_command(&self) -> String {
    self
      .suggestions()
      .get(self.selected)
      .map(|cmd| cmd.name.to_string())
      .unwrap_or_else(|| self.input.value().trim().to_lowercase())
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let suggestions = self.suggestions();
    let shown = suggestions.len().min(MAX_SUGGESTIONS) as u16;
    let width = percent_of(area.width, 60).clamp(30, 60).min(area.width);
    let height = (3 + shown).min(area.height);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, height);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Perintah ");
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);
    if inner.height == 0 {
      return;
    }

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(inner);

    let mut spans = vec![Span::styled(":", Style::default().fg(Color::Yellow))];
    spans.extend(self.input.spans(true));
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    if suggestions.is_empty() || chunks[1].height == 0 {
      return;
    }

    let items: Vec<ListItem> = suggestions
      .iter()
      .take(MAX_SUGGESTIONS)
      .map(|cmd| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<12}", cmd.name), Style::default().fg(Color::Cyan)),
          Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();
    let list = List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
    let mut state = ListState::default().with_selected(Some(self.selected));
    frame.render_stateful_widget(list, chunks[1], &mut state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(cmd: &mut CommandInput, text: &str) {
    for c in text.chars() {
      cmd.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_colon_activates() {
    let mut cmd = CommandInput::new();
    assert_eq!(cmd.handle_key(key(KeyCode::Char('d'))), KeyResult::NotHandled);
    assert_eq!(cmd.handle_key(key(KeyCode::Char(':'))), KeyResult::Handled);
    assert!(cmd.is_active());
  }

  #[test]
  fn test_submit_resolves_alias_to_command() {
    let mut cmd = CommandInput::new();
    cmd.handle_key(key(KeyCode::Char(':')));
    type_str(&mut cmd, "peta");
    assert_eq!(
      cmd.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(CommandEvent::Submitted("explorer".to_string()))
    );
    assert!(!cmd.is_active());
  }

  #[test]
  fn test_tab_cycles_suggestions() {
    let mut cmd = CommandInput::new();
    cmd.handle_key(key(KeyCode::Char(':')));
    let first = cmd.suggestions()[1].name;
    cmd.handle_key(key(KeyCode::Tab));
    assert_eq!(
      cmd.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(CommandEvent::Submitted(first.to_string()))
    );
  }

  #[test]
  fn test_unknown_input_submitted_raw() {
    let mut cmd = CommandInput::new();
    cmd.handle_key(key(KeyCode::Char(':')));
    type_str(&mut cmd, "ZZZ");
    assert_eq!(
      cmd.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(CommandEvent::Submitted("zzz".to_string()))
    );
  }

  #[test]
  fn test_escape_cancels() {
    let mut cmd = CommandInput::new();
    cmd.handle_key(key(KeyCode::Char(':')));
    type_str(&mut cmd, "ab");
    assert_eq!(
      cmd.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(CommandEvent::Cancelled)
    );
    assert!(cmd.suggestions().len() == commands::COMMANDS.len());
  }
}
