pub mod components;
mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

pub use renderfns::api_host;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::vertical([
    Constraint::Length(2), // Navbar and shortcuts
    Constraint::Min(1),    // Page content
    Constraint::Length(1), // Footer
  ])
  .split(frame.area());

  let shortcuts = app.shortcuts();
  renderfns::draw_header(frame, chunks[0], app.current_page(), app.api_host(), &shortcuts);

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  renderfns::draw_footer(frame, chunks[2], &app.view_breadcrumb());

  app.command_input().render_overlay(frame, chunks[1]);
  app.toasts().render(frame, chunks[1]);
}

/// Keep a list selection inside `0..len`, selecting the first row when a
/// non-empty list has nothing selected.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    Some(idx) if idx >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ensure_valid_selection() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));

    state.select(Some(7));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}
