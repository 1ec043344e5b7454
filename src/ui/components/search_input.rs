use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::ui::renderfns::percent_of;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Query text changed; empty on cancel
  Changed(String),
  /// Enter pressed with the final query
  Submitted(String),
}

/// `/`-activated search box drawn over the top of a panel.
#[derive(Debug, Clone)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
  title: &'static str,
  placeholder: &'static str,
}

impl Default for SearchInput {
  fn default() -> Self {
    Self::new(" Cari ", "Cari makanan...")
  }
}

impl SearchInput {
  pub fn new(title: &'static str, placeholder: &'static str) -> Self {
    Self {
      input: TextInput::new(),
      active: false,
      title,
      placeholder,
    }
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn query(&self) -> &str {
    self.input.value()
  }

  /// Open the box, keeping the previous query for editing.
  pub fn activate(&mut self) {
    self.active = true;
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(query) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted(query.trim().to_string()))
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(SearchEvent::Changed(String::new()))
      }
      InputResult::Consumed => KeyResult::Event(SearchEvent::Changed(self.query().to_string())),
      // Swallow unhandled keys so global shortcuts stay quiet while typing
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = percent_of(area.width, 60).clamp(30, 60).min(area.width);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, 3.min(area.height));
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(self.title);
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);
    if inner.height == 0 {
      return;
    }

    let mut spans = vec![Span::styled("/", Style::default().fg(Color::Yellow))];
    if self.input.is_empty() {
      spans.push(Span::styled(" ", Style::default().bg(Color::Yellow)));
      spans.push(Span::styled(self.placeholder, Style::default().fg(Color::DarkGray)));
    } else {
      spans.extend(self.input.spans(true));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_slash_activates() {
    let mut search = SearchInput::default();
    assert_eq!(search.handle_key(key(KeyCode::Char('x'))), KeyResult::NotHandled);
    assert_eq!(search.handle_key(key(KeyCode::Char('/'))), KeyResult::Handled);
    assert!(search.is_active());
  }

  #[test]
  fn test_typing_emits_changes_and_submit_trims() {
    let mut search = SearchInput::default();
    search.activate();
    search.handle_key(key(KeyCode::Char('s')));
    assert_eq!(
      search.handle_key(key(KeyCode::Char('a'))),
      KeyResult::Event(SearchEvent::Changed("sa".to_string()))
    );
    search.handle_key(key(KeyCode::Char(' ')));
    assert_eq!(
      search.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(SearchEvent::Submitted("sa".to_string()))
    );
    assert!(!search.is_active());
    assert_eq!(search.query(), "sa ");
  }

  #[test]
  fn test_escape_clears_query() {
    let mut search = SearchInput::default();
    search.activate();
    search.handle_key(key(KeyCode::Char('a')));
    assert_eq!(
      search.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(SearchEvent::Changed(String::new()))
    );
    assert_eq!(search.query(), "");
  }
}
