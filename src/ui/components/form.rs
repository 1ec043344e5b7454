use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::ui::renderfns::percent_of;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  Submitted,
  Cancelled,
}

#[derive(Debug, Clone)]
enum FieldKind {
  Text(TextInput),
  /// Options with the selected index
  Select(Vec<String>, usize),
}

#[derive(Debug, Clone)]
struct Field {
  key: &'static str,
  label: &'static str,
  kind: FieldKind,
}

/// Labelled fields edited in place. Tab and arrows move focus, Left and
/// Right cycle select options, Enter submits and Esc cancels.
#[derive(Debug, Clone)]
pub struct Form {
  title: String,
  fields: Vec<Field>,
  focused: usize,
}

impl Form {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      fields: Vec::new(),
      focused: 0,
    }
  }

  pub fn text(self, key: &'static str, label: &'static str, value: &str) -> Self {
    self.with_field(key, label, FieldKind::Text(TextInput::new().with_value(value)))
  }

  pub fn password(self, key: &'static str, label: &'static str) -> Self {
    self.with_field(key, label, FieldKind::Text(TextInput::masked()))
  }

  /// Select field; `selected` is clamped to the options.
  pub fn select(self, key: &'static str, label: &'static str, options: Vec<String>, selected: usize) -> Self {
    let selected = selected.min(options.len().saturating_sub(1));
    self.with_field(key, label, FieldKind::Select(options, selected))
  }

  fn with_field(mut self, key: &'static str, label: &'static str, kind: FieldKind) -> Self {
    self.fields.push(Field { key, label, kind });
    self
  }

  /// Current value of a field, trimmed. Unknown keys read as empty.
  pub fn value(&self, key: &str) -> String {
    self
      .fields
      .iter()
      .find(|f| f.key == key)
      .map(|f| match &f.kind {
        FieldKind::Text(input) => input.value().trim().to_string(),
        FieldKind::Select(options, idx) => options.get(*idx).cloned().unwrap_or_default(),
      })
      .unwrap_or_default()
  }

  /// Selected index of a select field.
  pub fn selected(&self, key: &str) -> Option<usize> {
    self.fields.iter().find(|f| f.key == key).and_then(|f| match &f.kind {
      FieldKind::Select(options, idx) if !options.is_empty() => Some(*idx),
      _ => None,
    })
  }

  /// Split a comma separated field into trimmed, non-empty items.
  pub fn list(&self, key: &str) -> Vec<String> {
    self
      .value(key)
      .split(',')
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect()
  }

  fn move_focus(&mut self, forward: bool) {
    let len = self.fields.len().max(1);
    self.focused = if forward {
      (self.focused + 1) % len
    } else {
      (self.focused + len - 1) % len
    };
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    match key.code {
      KeyCode::Esc => return KeyResult::Event(FormEvent::Cancelled),
      KeyCode::Enter => return KeyResult::Event(FormEvent::Submitted),
      KeyCode::Tab | KeyCode::Down => {
        self.move_focus(true);
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.move_focus(false);
        return KeyResult::Handled;
      }
      _ => {}
    }

    let Some(field) = self.fields.get_mut(self.focused) else {
      return KeyResult::NotHandled;
    };
    match &mut field.kind {
      FieldKind::Text(input) => match input.handle_key(key) {
        InputResult::NotHandled => KeyResult::NotHandled,
        _ => KeyResult::Handled,
      },
      FieldKind::Select(options, idx) => {
        let len = options.len().max(1);
        match key.code {
          KeyCode::Right | KeyCode::Char(' ') => *idx = (*idx + 1) % len,
          KeyCode::Left => *idx = (*idx + len - 1) % len,
          _ => return KeyResult::Handled,
        }
        KeyResult::Handled
      }
    }
  }

  /// Draw centered over `area`.
  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let width = percent_of(area.width, 70).clamp(40, 80).min(area.width);
    let height = (self.fields.len() as u16 + 4).min(area.height);
    let rect = Rect::new(
      area.x + (area.width - width) / 2,
      area.y + (area.height - height) / 2,
      width,
      height,
    );
    frame.render_widget(Clear, rect);

    let label_width = self.fields.iter().map(|f| f.label.chars().count()).max().unwrap_or(0);
    let mut lines: Vec<Line> = self
      .fields
      .iter()
      .enumerate()
      .map(|(i, field)| {
        let focused = i == self.focused;
        let label_style = if focused {
          Style::default().fg(Color::Yellow).bold()
        } else {
          Style::default().fg(Color::Gray)
        };
        let mut spans = vec![Span::styled(
          format!("{:>width$}: ", field.label, width = label_width),
          label_style,
        )];
        match &field.kind {
          FieldKind::Text(input) => spans.extend(input.spans(focused)),
          FieldKind::Select(options, idx) => {
            let current = options.get(*idx).map(String::as_str).unwrap_or("-");
            let style = if focused {
              Style::default().fg(Color::Cyan).bold()
            } else {
              Style::default().fg(Color::Cyan)
            };
            spans.push(Span::styled(format!("‹ {} ›", current), style));
          }
        }
        Line::from(spans)
      })
      .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      "Tab pindah  ←/→ pilih  Enter simpan  Esc batal",
      Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
      .title(format!(" {} ", self.title))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(Paragraph::new(lines).block(block), rect);
  }
}
