use crate::admin::AdminAuth;
use crate::ai::AiService;
use crate::api::ApiService;
use crate::commands::Page;
use crate::config::Config;
use crate::event::{Event, EventHandler, Notifier};
use crate::storage::StorageService;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult, Toasts};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::page_view;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{debug, info};

/// Everything a view needs to talk to the outside world. Cheap to clone,
/// every member is a handle.
#[derive(Clone)]
pub struct Services {
  pub api: ApiService,
  pub ai: AiService,
  pub storage: StorageService,
  pub admin: AdminAuth,
  pub notifier: Notifier,
}

impl Services {
  pub fn new(config: &Config, api: ApiService, storage: StorageService, notifier: Notifier) -> Self {
    Self {
      ai: AiService::new(api.clone()),
      admin: AdminAuth::new(storage.clone(), config.admin.clone()),
      api,
      storage,
      notifier,
    }
  }
}

/// Main application state
pub struct App {
  services: Services,

  /// Navigation stack - the page root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// `:` command line
  command_input: CommandInput,

  toasts: Toasts,

  /// Whether to quit
  should_quit: bool,
}

/// Set up the terminal, run until quit, and restore it.
pub async fn run(config: Config, start: Page) -> Result<()> {
  let storage = StorageService::open(&config.storage)?;
  let api = ApiService::new(&config.api);
  info!("Using API at {}", api.base_url());

  // Setup terminal
  enable_raw_mode()?;
  stdout().execute(EnterAlternateScreen)?;
  let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

  // Toasts travel over the same channel as input
  let mut events = EventHandler::new(Duration::from_millis(250));
  let services = Services::new(&config, api, storage, Notifier::new(events.sender()));
  let mut app = App::new(services, start);

  let result = app.event_loop(&mut terminal, &mut events).await;

  // Cleanup terminal
  disable_raw_mode()?;
  stdout().execute(LeaveAlternateScreen)?;

  result
}

impl App {
  pub fn new(services: Services, start: Page) -> Self {
    let root = page_view(start, &services);
    Self {
      services,
      view_stack: vec![root],
      command_input: CommandInput::new(),
      toasts: Toasts::new(),
      should_quit: false,
    }
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {
        self.toasts.prune();
        if let Some(view) = self.view_stack.last_mut() {
          view.tick();
        }
      }
      Event::Notify(notification) => self.toasts.push(notification),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let capturing = self.view_stack.last().is_some_and(|v| v.captures_input());
    if self.command_input.is_active() || !capturing {
      match self.command_input.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(command)) => {
          self.execute_command(&command);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }

      if let KeyCode::Char(c) = key.code {
        if let Some(page) = Page::from_digit(c) {
          self.navigate(page);
          return;
        }
      }
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => return,
    };
    self.apply(action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        debug!("Push {}", view.breadcrumb_label());
        self.view_stack.push(view);
      }
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
          if let Some(view) = self.view_stack.last_mut() {
            view.on_resume();
          }
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Navigate(page) => self.navigate(page),
    }
  }

  /// Replace the whole stack with a fresh page. Dropped views take their
  /// in-flight fetches with them.
  fn navigate(&mut self, page: Page) {
    info!("Navigate to {}", page.name());
    self.view_stack = vec![page_view(page, &self.services)];
  }

  fn execute_command(&mut self, command: &str) {
    if command == "quit" {
      self.should_quit = true;
    } else if let Some(page) = Page::from_name(command) {
      self.navigate(page);
    } else if !command.is_empty() {
      self
        .services
        .notifier
        .warning(format!("Perintah tidak dikenal: {}", command));
    }
  }

  // Accessors for UI rendering

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn current_page(&self) -> Page {
    self
      .view_stack
      .last()
      .map(|v| v.page())
      .unwrap_or_default()
  }

  pub fn shortcuts(&self) -> Vec<Shortcut> {
    self
      .view_stack
      .last()
      .map(|v| v.shortcuts())
      .unwrap_or_default()
  }

  pub fn api_host(&self) -> &str {
    ui::api_host(self.services.api.base_url())
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command_input
  }

  pub fn toasts(&self) -> &Toasts {
    &self.toasts
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}

#[cfg(test)]
pub(crate) fn test_services(
  transport: crate::api::transport::testing::FakeTransport,
) -> (Services, tokio::sync::mpsc::UnboundedReceiver<Event>) {
  use crate::config::ApiConfig;

  let config = Config {
    api: ApiConfig {
      base_url: "http://api.test/api".to_string(),
      retry_delay_secs: 0,
      ..Default::default()
    },
    ..Default::default()
  };
  let api = ApiService::with_transport(&config.api, transport);
  let (notifier, rx) = crate::event::test_notifier();
  let services = Services::new(&config, api, crate::storage::memory_storage(), notifier);
  (services, rx)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::transport::testing::{FakeTransport, Reply};
  use crate::ui::components::{Notification, ToastKind};
  use serde_json::json;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn app() -> (App, tokio::sync::mpsc::UnboundedReceiver<Event>) {
    let (services, rx) = test_services(FakeTransport::always(Reply::ok(json!({"results": []}))));
    (App::new(services, Page::Home), rx)
  }

  fn type_keys(app: &mut App, text: &str) {
    for c in text.chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[tokio::test]
  async fn test_digits_replace_the_stack() {
    let (mut app, _rx) = app();
    app.handle_key(key(KeyCode::Char('3')));
    assert_eq!(app.current_page(), Page::Directory);
    assert_eq!(app.view_breadcrumb(), vec!["Direktori"]);

    app.handle_key(key(KeyCode::Char('5')));
    assert_eq!(app.current_page(), Page::About);
    assert_eq!(app.view_stack.len(), 1);
  }

  #[tokio::test]
  async fn test_command_navigates() {
    let (mut app, _rx) = app();
    type_keys(&mut app, ":peta");
    assert!(app.command_input().is_active());
    app.handle_key(key(KeyCode::Enter));

    assert!(!app.command_input().is_active());
    assert_eq!(app.current_page(), Page::Explorer);
  }

  #[tokio::test]
  async fn test_unknown_command_warns() {
    let (mut app, mut rx) = app();
    type_keys(&mut app, ":xyz");
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(app.current_page(), Page::Home);
    match rx.try_recv() {
      Ok(Event::Notify(n)) => {
        assert_eq!(n.kind, ToastKind::Warning);
        assert_eq!(n.message, "Perintah tidak dikenal: xyz");
      }
      _ => panic!("expected a warning toast"),
    }
  }

  #[tokio::test]
  async fn test_quit_command_and_ctrl_c() {
    let (mut app, _rx) = app();
    type_keys(&mut app, ":quit");
    app.handle_key(key(KeyCode::Enter));
    assert!(app.should_quit);

    let (mut app, _rx) = self::app();
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_back_pops_then_quits_at_root() {
    let (mut app, _rx) = app();
    app.handle_key(key(KeyCode::Char('5')));
    app.apply(ViewAction::Push(Box::new(crate::ui::views::AboutView::new())));
    assert_eq!(app.view_stack.len(), 2);

    app.handle_key(key(KeyCode::Char('q')));
    assert_eq!(app.view_stack.len(), 1);
    assert!(!app.should_quit);

    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_capturing_view_keeps_digits_and_colon() {
    let (mut app, _rx) = app();
    app.handle_key(key(KeyCode::Char('4')));
    assert_eq!(app.current_page(), Page::AiChat);

    type_keys(&mut app, "1:");
    assert_eq!(app.current_page(), Page::AiChat);
    assert!(!app.command_input().is_active());

    // Esc hands the keyboard back
    app.handle_key(key(KeyCode::Esc));
    app.handle_key(key(KeyCode::Char('1')));
    assert_eq!(app.current_page(), Page::Home);
  }

  #[tokio::test]
  async fn test_notifications_become_toasts() {
    let (mut app, _rx) = app();
    assert!(app.toasts().is_empty());
    app.handle_event(Event::Notify(Notification::new(ToastKind::Success, "Tersimpan")));
    assert!(!app.toasts().is_empty());
  }

  #[tokio::test]
  async fn test_header_shows_api_host() {
    let (app, _rx) = app();
    assert_eq!(app.api_host(), "api.test");
  }
}
