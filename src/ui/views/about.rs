use crate::commands::Page;
use crate::ui::view::{View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

const INTRO: &str = "Cita Rasa adalah platform yang dirancang untuk memperkenalkan kekayaan kuliner \
Indonesia kepada masyarakat lokal dan pendatang. Kami percaya bahwa makanan adalah jembatan budaya \
yang menghubungkan orang-orang dari berbagai latar belakang.";

const FEATURES: [&str; 5] = [
  "Peta interaktif makanan daerah Indonesia",
  "Rekomendasi berbasis AI untuk menemukan makanan favorit",
  "Rating dan review dari pengguna lain",
  "Informasi detail tentang asal dan ciri khas makanan",
  "Integrasi dengan berbagai API terbuka untuk data yang akurat",
];

const TECH: &str = "Aplikasi terminal ini dibangun dengan Rust dan ratatui. Data makanan dan daerah \
diambil dari API Cita Rasa dengan cache dan percobaan ulang, sedangkan favorit, riwayat pencarian \
dan preferensi disimpan secara lokal di SQLite.";

#[derive(Default)]
pub struct AboutView {
  scroll: u16,
}

impl AboutView {
  pub fn new() -> Self {
    Self::default()
  }

  fn lines() -> Vec<Line<'static>> {
    let heading = Style::default().fg(Color::Yellow).bold();
    let mut lines = vec![
      Line::from(Span::styled("Tentang Cita Rasa", heading)),
      Line::from(""),
      Line::from(INTRO),
      Line::from(""),
      Line::from(Span::styled("Fitur Utama", heading)),
    ];
    lines.extend(FEATURES.iter().map(|f| {
      Line::from(vec![Span::styled("  ✓ ", Style::default().fg(Color::Green)), Span::raw(*f)])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Teknologi", heading)));
    lines.push(Line::from(TECH));
    lines
  }
}

impl View for AboutView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
      KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let about = Paragraph::new(Self::lines())
      .wrap(Wrap { trim: true })
      .scroll((self.scroll, 0))
      .block(
        Block::default()
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Blue)),
      );
    frame.render_widget(about, area);
  }

  fn breadcrumb_label(&self) -> String {
    Page::About.label().to_string()
  }

  fn page(&self) -> Page {
    Page::About
  }
}
