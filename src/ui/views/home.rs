use crate::api::types::Food;
use crate::app::Services;
use crate::commands::Page;
use crate::query::{Query, QueryState};
use crate::ui::renderfns::{rating_stars, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::FoodDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

const FEATURES: [(&str, &str, &str); 3] = [
  ("🗺", "Peta Interaktif", "Jelajahi lokasi makanan khas di seluruh Indonesia"),
  ("🧠", "Rekomendasi AI", "Dapatkan saran makanan berdasarkan preferensi Anda"),
  ("⭐", "Rating & Review", "Lihat rating dan ulasan dari pengunjung lainnya"),
];

/// Landing page: hero, feature cards and a random dish of the day.
pub struct HomeView {
  services: Services,
  pick: Query<Option<Food>>,
}

impl HomeView {
  pub fn new(services: Services) -> Self {
    let ai = services.ai.clone();
    let mut pick = Query::new(move || {
      let ai = ai.clone();
      async move { Ok(ai.get_random_recommendation().await) }
    });
    pick.fetch();

    Self { services, pick }
  }

  fn picked(&self) -> Option<&Food> {
    self.pick.data().and_then(|f| f.as_ref())
  }

  fn render_hero(&self, frame: &mut Frame, area: Rect) {
    let lines = vec![
      Line::from(""),
      Line::from(vec![
        Span::styled("Jelajahi ", Style::default().bold()),
        Span::styled("Cita Rasa", Style::default().fg(Color::Yellow).bold()),
        Span::styled(" Nusantara", Style::default().bold()),
      ]),
      Line::from(Span::styled(
        "Temukan makanan khas setiap daerah di Indonesia dengan pemetaan interaktif dan rekomendasi AI",
        Style::default().fg(Color::Gray),
      )),
      Line::from(""),
      Line::from(vec![
        Span::styled("[e]", Style::default().fg(Color::Cyan)),
        Span::raw(" Mulai Jelajahi    "),
        Span::styled("[d]", Style::default().fg(Color::Cyan)),
        Span::raw(" Pelajari Lebih"),
      ]),
    ];
    let hero = Paragraph::new(lines)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true })
      .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Yellow)));
    frame.render_widget(hero, area);
  }

  fn render_features(&self, frame: &mut Frame, area: Rect) {
    let cards = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    for ((icon, title, text), card) in FEATURES.iter().zip(cards.iter()) {
      let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(format!("{} {}", icon, title), Style::default().bold())),
        Line::from(Span::styled(*text, Style::default().fg(Color::Gray))),
      ])
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true })
      .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Blue)));
      frame.render_widget(paragraph, *card);
    }
  }

  fn render_pick(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Rekomendasi Hari Ini ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Green));

    let lines = match (self.pick.state(), self.picked()) {
      (QueryState::Loading, _) => vec![Line::from(Span::styled(
        "Memuat data...",
        Style::default().fg(Color::DarkGray),
      ))],
      (_, Some(food)) => vec![
        Line::from(vec![
          Span::styled(food.name.clone(), Style::default().fg(Color::Yellow).bold()),
          Span::styled(format!("  📍 {}", food.region), Style::default().fg(Color::Gray)),
        ]),
        Line::from(Span::styled(rating_stars(food.rating), Style::default().fg(Color::Yellow))),
        Line::from(truncate(
          food.description.as_deref().unwrap_or("Makanan khas Indonesia"),
          (area.width as usize).saturating_sub(4).max(10),
        )),
        Line::from(Span::styled(
          "Enter detail   r acak lagi",
          Style::default().fg(Color::DarkGray),
        )),
      ],
      _ => vec![Line::from(Span::styled(
        "Belum ada rekomendasi. Tekan r untuk mencoba lagi.",
        Style::default().fg(Color::DarkGray),
      ))],
    };
    frame.render_widget(Paragraph::new(lines).block(block), area);
  }
}

impl View for HomeView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('e') => ViewAction::Navigate(Page::Explorer),
      KeyCode::Char('d') => ViewAction::Navigate(Page::Directory),
      KeyCode::Char('r') => {
        self.pick.refetch();
        ViewAction::None
      }
      KeyCode::Enter => match self.picked() {
        Some(food) => ViewAction::Push(Box::new(FoodDetailView::new(food.clone(), self.services.clone()))),
        None => ViewAction::None,
      },
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::vertical([
      Constraint::Length(7),
      Constraint::Length(5),
      Constraint::Min(6),
    ])
    .split(area);
    self.render_hero(frame, chunks[0]);
    self.render_features(frame, chunks[1]);
    self.render_pick(frame, chunks[2]);
  }

  fn breadcrumb_label(&self) -> String {
    Page::Home.label().to_string()
  }

  fn page(&self) -> Page {
    Page::Home
  }

  fn tick(&mut self) {
    self.pick.poll();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("e", "jelajahi").with_priority(20),
      Shortcut::new("d", "direktori").with_priority(30),
      Shortcut::new("r", "acak").with_priority(40),
      Shortcut::new("q", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::transport::testing::{FakeTransport, Reply};
  use crate::app::test_services;
  use crate::ui::views::settle;
  use crossterm::event::KeyModifiers;
  use serde_json::json;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[tokio::test]
  async fn test_buttons_navigate() {
    let (services, _rx) = test_services(FakeTransport::always(Reply::ok(json!({"results": []}))));
    let mut view = HomeView::new(services);

    assert!(matches!(view.handle_key(key(KeyCode::Char('e'))), ViewAction::Navigate(Page::Explorer)));
    assert!(matches!(view.handle_key(key(KeyCode::Char('d'))), ViewAction::Navigate(Page::Directory)));
  }

  #[tokio::test]
  async fn test_enter_opens_recommended_food() {
    let transport = FakeTransport::always(Reply::ok(json!({"results": [
      {"id": 9, "name": "Gudeg", "region": "Yogyakarta", "rating": 4.7}
    ]})));
    let (services, _rx) = test_services(transport);
    let mut view = HomeView::new(services);
    settle(&mut view).await;

    assert_eq!(view.picked().map(|f| f.name.as_str()), Some("Gudeg"));
    assert!(matches!(view.handle_key(key(KeyCode::Enter)), ViewAction::Push(_)));
  }

  #[tokio::test]
  async fn test_enter_without_pick_does_nothing() {
    let (services, _rx) = test_services(FakeTransport::always(Reply::ok(json!({"results": []}))));
    let mut view = HomeView::new(services);
    settle(&mut view).await;

    assert!(view.picked().is_none());
    assert!(matches!(view.handle_key(key(KeyCode::Enter)), ViewAction::None));
  }
}
