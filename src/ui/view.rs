use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::commands::Page;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct Shortcut {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl Shortcut {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
  /// Replace the whole stack with a top-level page
  Navigate(Page),
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, forms, chat input) and
/// return actions for the App to execute: App → View → Components.
///
/// Views that load data asynchronously own `Query<T>`s and poll them in
/// `tick()`. Dropping a view aborts its queries.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// The navbar tab this view belongs to
  fn page(&self) -> Page;

  /// True while a text field owns the keyboard, so global keys
  /// (`:`, digits, `q`) must be passed through untouched.
  fn captures_input(&self) -> bool {
    false
  }

  /// Called on each tick to allow views to poll async queries
  fn tick(&mut self) {}

  /// Called when the view above this one was popped
  fn on_resume(&mut self) {}

  /// Get keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("1-6", "pages").with_priority(20),
      Shortcut::new("q", "back").with_priority(90),
    ]
  }
}
