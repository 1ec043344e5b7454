use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::time::{Duration, Instant};

/// How long a toast stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

const MAX_VISIBLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
  Info,
  Success,
  Warning,
  Error,
}

impl ToastKind {
  fn color(&self) -> Color {
    match self {
      ToastKind::Info => Color::Cyan,
      ToastKind::Success => Color::Green,
      ToastKind::Warning => Color::Yellow,
      ToastKind::Error => Color::Red,
    }
  }

  fn icon(&self) -> &'static str {
    match self {
      ToastKind::Info => "i",
      ToastKind::Success => "✓",
      ToastKind::Warning => "!",
      ToastKind::Error => "✗",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub kind: ToastKind,
  pub message: String,
}

impl Notification {
  pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      message: message.into(),
    }
  }
}

/// Stack of live toasts, newest last.
#[derive(Debug, Default)]
pub struct Toasts {
  items: Vec<(Notification, Instant)>,
}

impl Toasts {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, notification: Notification) {
    self.push_at(notification, Instant::now());
  }

  fn push_at(&mut self, notification: Notification, at: Instant) {
    self.items.push((notification, at));
  }

  /// Drop expired toasts. Returns true if anything was removed.
  pub fn prune(&mut self) -> bool {
    self.prune_at(Instant::now())
  }

  fn prune_at(&mut self, now: Instant) -> bool {
    let before = self.items.len();
    self
      .items
      .retain(|(_, shown)| now.duration_since(*shown) < TOAST_DURATION);
    self.items.len() != before
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Draw in the top-right corner of `area`.
  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let width = (area.width / 3).clamp(24, 48).min(area.width);
    let mut y = area.y + 1;

    for (toast, _) in self.items.iter().rev().take(MAX_VISIBLE) {
      let text_width = width.saturating_sub(4).max(1) as usize;
      let lines = (toast.message.chars().count() + 2).div_ceil(text_width).max(1) as u16;
      let height = lines + 2;
      if y + height > area.y + area.height {
        break;
      }

      let rect = Rect::new(area.x + area.width - width, y, width, height);
      frame.render_widget(Clear, rect);

      let color = toast.kind.color();
      let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
      let line = Line::from(vec![
        Span::styled(format!("{} ", toast.kind.icon()), Style::default().fg(color).bold()),
        Span::raw(toast.message.as_str()),
      ]);
      let paragraph = Paragraph::new(line).block(block).wrap(Wrap { trim: true });
      frame.render_widget(paragraph, rect);

      y += height;
    }
  }
}
