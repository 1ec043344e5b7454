use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::ui::components::{Notification, ToastKind};

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for UI refresh and query polling
  Tick,
  /// Toast raised by a view or a background task
  Notify(Notification),
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    let input_tx = tx.clone();
    // crossterm polling blocks, keep it off the async workers
    tokio::task::spawn_blocking(move || loop {
      if event::poll(tick_rate).unwrap_or(false) {
        if let Ok(CrosstermEvent::Key(key)) = event::read() {
          if key.kind == KeyEventKind::Press && input_tx.send(Event::Key(key)).is_err() {
            break;
          }
        }
      } else if input_tx.send(Event::Tick).is_err() {
        break;
      }
    });

    Self { tx, rx }
  }

  pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
    self.tx.clone()
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

/// Cloneable handle views use to raise toasts.
#[derive(Clone)]
pub struct Notifier {
  tx: mpsc::UnboundedSender<Event>,
}

impl Notifier {
  pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
    Self { tx }
  }

  pub fn notify(&self, kind: ToastKind, message: impl Into<String>) {
    // App gone means we are shutting down
    let _ = self
      .tx
      .send(Event::Notify(Notification::new(kind, message)));
  }

  pub fn info(&self, message: impl Into<String>) {
    self.notify(ToastKind::Info, message);
  }

  pub fn success(&self, message: impl Into<String>) {
    self.notify(ToastKind::Success, message);
  }

  pub fn warning(&self, message: impl Into<String>) {
    self.notify(ToastKind::Warning, message);
  }

  pub fn error(&self, message: impl Into<String>) {
    self.notify(ToastKind::Error, message);
  }
}

#[cfg(test)]
pub(crate) fn test_notifier() -> (Notifier, mpsc::UnboundedReceiver<Event>) {
  let (tx, rx) = mpsc::unbounded_channel();
  (Notifier::new(tx), rx)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_notifier_sends_toast_events() {
    let (notifier, mut rx) = test_notifier();
    notifier.error("Gagal menghapus makanan");

    match rx.try_recv() {
      Ok(Event::Notify(n)) => {
        assert_eq!(n.kind, ToastKind::Error);
        assert_eq!(n.message, "Gagal menghapus makanan");
      }
      other => panic!("expected notification, got {:?}", other),
    }
  }

  #[test]
  fn test_notifier_survives_closed_channel() {
    let (notifier, rx) = test_notifier();
    drop(rx);
    notifier.info("halo");
  }
}
