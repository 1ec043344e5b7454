use crate::api::types::{Food, NlpResponse};
use crate::app::Services;
use crate::commands::Page;
use crate::query::{Query, QueryState};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tracing::debug;

const QUICK_PROMPTS: [&str; 4] = [
  "Rekomendasikan makanan khas Jawa Barat",
  "Apa itu Rendang?",
  "Bagaimana cara membuat Gudeg?",
  "Ceritakan sejarah Sate Padang",
];

const THINKING: &str = "Sedang berpikir...";
const NO_ANSWER: &str = "Maaf, saya tidak dapat menjawab saat ini.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
  User,
  Ai,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChatMessage {
  role: Role,
  text: String,
}

/// Conversation with the NLP endpoint, optionally about one food.
pub struct AiChatView {
  services: Services,
  about: Option<Food>,
  messages: Vec<ChatMessage>,
  input: TextInput,
  editing: bool,
  pending: Option<Query<NlpResponse>>,
  /// Lines scrolled up from the bottom of the history
  scroll_back: u16,
}

impl AiChatView {
  pub fn new(services: Services) -> Self {
    Self {
      services,
      about: None,
      messages: Vec::new(),
      input: TextInput::new(),
      editing: true,
      pending: None,
      scroll_back: 0,
    }
  }

  /// Chat whose prompts carry the food's name, region and category.
  pub fn about_food(food: Food, services: Services) -> Self {
    Self {
      about: Some(food),
      ..Self::new(services)
    }
  }

  fn send(&mut self, message: &str) {
    let message = message.trim().to_string();
    if message.is_empty() {
      return;
    }
    if self.pending.is_some() {
      self.services.notifier.warning("Tunggu jawaban sebelumnya");
      return;
    }
    debug!("Chat prompt: {}", message);

    self.messages.push(ChatMessage {
      role: Role::User,
      text: message.clone(),
    });
    self.input.clear();
    self.scroll_back = 0;

    let ai = self.services.ai.clone();
    let about = self.about.clone();
    let mut query = Query::new(move || {
      let ai = ai.clone();
      let about = about.clone();
      let message = message.clone();
      async move { Ok(ai.chat_about_food(&message, about.as_ref()).await) }
    });
    query.fetch();
    self.pending = Some(query);
  }

  fn quick_prompt(&mut self, key: KeyCode) -> bool {
    let idx = match key {
      KeyCode::F(n) if (1..=4).contains(&n) => n as usize - 1,
      _ => return false,
    };
    self.send(QUICK_PROMPTS[idx]);
    true
  }

  fn title(&self) -> String {
    match &self.about {
      Some(food) => format!(" Chat AI Kuliner · {} ", food.name),
      None => " Chat AI Kuliner ".to_string(),
    }
  }

  fn history_lines(&self) -> Vec<Line<'static>> {
    if self.messages.is_empty() {
      let mut lines = vec![
        Line::from(Span::styled(
          "Mulai percakapan tentang kuliner Nusantara!",
          Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
      ];
      for (i, prompt) in QUICK_PROMPTS.iter().enumerate() {
        lines.push(Line::from(vec![
          Span::styled(format!("F{} ", i + 1), Style::default().fg(Color::Cyan)),
          Span::raw(*prompt),
        ]));
      }
      return lines;
    }

    let mut lines = Vec::new();
    for message in &self.messages {
      let (who, color) = match message.role {
        Role::User => ("Anda", Color::Cyan),
        Role::Ai => ("AI", Color::Green),
      };
      lines.push(Line::from(Span::styled(format!("{}:", who), Style::default().fg(color).bold())));
      lines.extend(message.text.lines().map(|l| Line::from(l.to_string())));
      lines.push(Line::from(""));
    }
    if self.pending.is_some() {
      lines.push(Line::from(Span::styled("AI:", Style::default().fg(Color::Green).bold())));
      lines.push(Line::from(Span::styled(
        THINKING,
        Style::default().fg(Color::DarkGray).italic(),
      )));
    }
    lines
  }

  fn render_history(&self, frame: &mut Frame, area: Rect) {
    let lines = self.history_lines();
    let width = area.width.saturating_sub(2).max(1) as usize;
    let height = area.height.saturating_sub(2);
    // Wrapped height, close enough for keeping the tail in view
    let total: usize = lines.iter().map(|l| l.width().max(1).div_ceil(width)).sum();
    let bottom = (total as u16).saturating_sub(height);
    let offset = bottom.saturating_sub(self.scroll_back);

    let block = Block::default()
      .title(self.title())
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow));
    let history = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false })
      .scroll((offset, 0));
    frame.render_widget(history, area);
  }

  fn render_input(&self, frame: &mut Frame, area: Rect) {
    let line = if self.input.is_empty() && !self.editing {
      Line::from(Span::styled(
        "Tanya tentang kuliner Nusantara...",
        Style::default().fg(Color::DarkGray),
      ))
    } else {
      Line::from(self.input.spans(self.editing))
    };
    let border = if self.editing { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
      .title(" Kirim ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border));
    frame.render_widget(Paragraph::new(line).block(block), area);
  }
}

impl View for AiChatView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.quick_prompt(key.code) {
      return ViewAction::None;
    }
    match key.code {
      KeyCode::PageUp => {
        self.scroll_back = self.scroll_back.saturating_add(5);
        return ViewAction::None;
      }
      KeyCode::PageDown => {
        self.scroll_back = self.scroll_back.saturating_sub(5);
        return ViewAction::None;
      }
      _ => {}
    }

    if self.editing {
      match self.input.handle_key(key) {
        InputResult::Submitted(text) => self.send(&text),
        InputResult::Cancelled => self.editing = false,
        InputResult::Consumed | InputResult::NotHandled => {}
      }
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('i') | KeyCode::Enter => self.editing = true,
      KeyCode::Char('k') | KeyCode::Up => self.scroll_back = self.scroll_back.saturating_add(1),
      KeyCode::Char('j') | KeyCode::Down => self.scroll_back = self.scroll_back.saturating_sub(1),
      KeyCode::Char('c') => {
        self.messages.clear();
        self.pending = None;
        self.scroll_back = 0;
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).split(area);
    self.render_history(frame, chunks[0]);
    self.render_input(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    match &self.about {
      Some(food) => format!("{} [{}]", Page::AiChat.label(), food.name),
      None => Page::AiChat.label().to_string(),
    }
  }

  fn page(&self) -> Page {
    Page::AiChat
  }

  fn captures_input(&self) -> bool {
    self.editing
  }

  fn tick(&mut self) {
    let Some(query) = self.pending.as_mut() else {
      return;
    };
    query.poll();
    let text = match query.state() {
      QueryState::Success(answer) if !answer.response.trim().is_empty() => answer.response.clone(),
      QueryState::Success(_) | QueryState::Error(_) => NO_ANSWER.to_string(),
      QueryState::Idle | QueryState::Loading => return,
    };
    self.messages.push(ChatMessage { role: Role::Ai, text });
    self.pending = None;
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    if self.editing {
      vec![
        Shortcut::new("Enter", "kirim").with_priority(10),
        Shortcut::new("F1-F4", "contoh").with_priority(20),
        Shortcut::new("Esc", "selesai").with_priority(90),
      ]
    } else {
      vec![
        Shortcut::new(":", "command").with_priority(10),
        Shortcut::new("i", "ketik").with_priority(20),
        Shortcut::new("F1-F4", "contoh").with_priority(30),
        Shortcut::new("c", "hapus").with_priority(40),
        Shortcut::new("q", "back").with_priority(90),
      ]
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::transport::testing::{FakeTransport, Reply};
  use crate::app::test_services;
  use crate::foods::food;
  use crate::ui::views::settle;
  use crossterm::event::KeyModifiers;
  use serde_json::json;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_text(view: &mut AiChatView, text: &str) {
    for c in text.chars() {
      view.handle_key(key(KeyCode::Char(c)));
    }
  }

  fn answer(text: &str) -> Reply {
    Reply::ok(json!({"response": text, "type": "general"}))
  }

  #[tokio::test]
  async fn test_send_and_receive() {
    let transport = FakeTransport::always(answer("Rendang berasal dari Sumatera Barat."));
    let (services, _rx) = test_services(transport.clone());
    let mut view = AiChatView::new(services);

    type_text(&mut view, "Apa itu Rendang?");
    view.handle_key(key(KeyCode::Enter));
    assert!(view.pending.is_some());
    assert!(view.input.is_empty());
    assert!(view.history_lines().iter().any(|l| l.to_string() == THINKING));

    settle(&mut view).await;
    assert!(view.pending.is_none());
    assert_eq!(
      view.messages,
      vec![
        ChatMessage { role: Role::User, text: "Apa itu Rendang?".to_string() },
        ChatMessage { role: Role::Ai, text: "Rendang berasal dari Sumatera Barat.".to_string() },
      ]
    );
    let body = transport.requests()[0].body.clone().unwrap_or_default();
    assert!(body.contains("\"general\""));
  }

  #[tokio::test]
  async fn test_empty_answer_uses_fallback() {
    let (services, _rx) = test_services(FakeTransport::always(answer("  ")));
    let mut view = AiChatView::new(services);
    view.handle_key(key(KeyCode::F(2)));
    settle(&mut view).await;

    assert_eq!(view.messages[0].text, "Apa itu Rendang?");
    assert_eq!(view.messages[1].text, NO_ANSWER);
  }

  #[tokio::test]
  async fn test_failure_shows_apology() {
    let (services, _rx) = test_services(FakeTransport::always(Reply::Json(500, "{}".to_string())));
    let mut view = AiChatView::new(services);
    view.handle_key(key(KeyCode::F(1)));
    settle(&mut view).await;

    assert_eq!(view.messages[1].text, crate::ai::APOLOGY);
  }

  #[tokio::test]
  async fn test_blank_message_not_sent() {
    let transport = FakeTransport::always(answer("ok"));
    let (services, _rx) = test_services(transport.clone());
    let mut view = AiChatView::new(services);

    type_text(&mut view, "   ");
    view.handle_key(key(KeyCode::Enter));
    assert!(view.pending.is_none());
    assert!(view.messages.is_empty());
    assert_eq!(transport.calls(), 0);
  }

  #[tokio::test]
  async fn test_esc_releases_keyboard_then_pops() {
    let (services, _rx) = test_services(FakeTransport::always(answer("ok")));
    let mut view = AiChatView::new(services);
    assert!(view.captures_input());

    // 'q' is text while editing
    view.handle_key(key(KeyCode::Char('q')));
    assert_eq!(view.input.value(), "q");

    view.handle_key(key(KeyCode::Esc));
    assert!(!view.captures_input());
    assert!(matches!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::Pop));
  }

  #[tokio::test]
  async fn test_food_context_is_attached() {
    let transport = FakeTransport::always(answer("Pedas dan gurih."));
    let (services, _rx) = test_services(transport.clone());
    let mut view = AiChatView::about_food(food(7, "Rendang", "Sumatera Barat", Some(4.9)), services);

    type_text(&mut view, "Rasanya seperti apa?");
    view.handle_key(key(KeyCode::Enter));
    settle(&mut view).await;

    let body = transport.requests()[0].body.clone().unwrap_or_default();
    assert!(body.contains("\"food_name\":\"Rendang\""));
    assert!(view.breadcrumb_label().contains("Rendang"));
  }
}
