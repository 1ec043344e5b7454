use crate::api::types::{Food, NlpResponse};
use crate::app::Services;
use crate::commands::Page;
use crate::query::{Query, QueryState};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{difficulty_color, rating_stars, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::AiChatView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AiTopic {
  Description,
  Recipe,
  Culture,
}

impl AiTopic {
  fn title(&self) -> &'static str {
    match self {
      AiTopic::Description => " Deskripsi AI ",
      AiTopic::Recipe => " Resep ",
      AiTopic::Culture => " Sejarah & Budaya ",
    }
  }
}

/// Everything about one dish, plus AI write-ups and similar dishes.
pub struct FoodDetailView {
  food: Food,
  services: Services,
  favorite: bool,
  similar: Query<Vec<Food>>,
  similar_state: ListState,
  answer: Option<(AiTopic, Query<NlpResponse>)>,
  scroll: u16,
}

impl FoodDetailView {
  pub fn new(food: Food, services: Services) -> Self {
    let favorite = match services.storage.is_favorite(food.id) {
      Ok(favorite) => favorite,
      Err(e) => {
        services.notifier.error(format!("Gagal membaca favorit: {}", e));
        false
      }
    };

    let ai = services.ai.clone();
    let food_id = food.id;
    let mut similar = Query::new(move || {
      let ai = ai.clone();
      async move { Ok(ai.get_similar_foods(food_id).await) }
    });
    similar.fetch();

    Self {
      food,
      services,
      favorite,
      similar,
      similar_state: ListState::default(),
      answer: None,
      scroll: 0,
    }
  }

  fn similar_foods(&self) -> &[Food] {
    self.similar.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn toggle_favorite(&mut self) {
    match self.services.storage.toggle_favorite(self.food.id) {
      Ok(now_favorite) => {
        self.favorite = now_favorite;
        if now_favorite {
          self.services.notifier.success(format!("{} disimpan ke favorit", self.food.name));
        } else {
          self.services.notifier.info(format!("{} dihapus dari favorit", self.food.name));
        }
      }
      Err(e) => self.services.notifier.error(format!("Gagal menyimpan favorit: {}", e)),
    }
  }

  fn ask(&mut self, topic: AiTopic) {
    info!("Asking AI about {} ({:?})", self.food.name, topic);
    let ai = self.services.ai.clone();
    let name = self.food.name.clone();
    let region = self.food.region.clone();
    let mut query = Query::new(move || {
      let ai = ai.clone();
      let name = name.clone();
      let region = region.clone();
      async move {
        Ok(match topic {
          AiTopic::Description => ai.get_food_description(&name).await,
          AiTopic::Recipe => ai.get_recipe(&name).await,
          AiTopic::Culture => ai.get_cultural_info(&name, &region).await,
        })
      }
    });
    query.fetch();
    // Replacing the previous question aborts it
    self.answer = Some((topic, query));
    self.scroll = 0;
  }

  fn render_info(&self, frame: &mut Frame, area: Rect) {
    let food = &self.food;
    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
      Line::from(vec![
        Span::styled("Daerah: ", label),
        Span::raw(if food.region.is_empty() { "Indonesia" } else { food.region.as_str() }),
      ]),
      Line::from(vec![
        Span::styled("Rating: ", label),
        Span::styled(rating_stars(food.rating), Style::default().fg(Color::Yellow)),
        Span::raw(
          food
            .rating
            .map(|r| format!(" {:.1}", r))
            .unwrap_or_else(|| " N/A".to_string()),
        ),
      ]),
    ];
    if let Some(category) = &food.category {
      lines.push(Line::from(vec![Span::styled("Kategori: ", label), Span::raw(category.clone())]));
    }
    let mut meta = Vec::new();
    if let Some(minutes) = food.preparation_time {
      meta.push(Span::styled("Waktu: ", label));
      meta.push(Span::raw(format!("{} menit  ", minutes)));
    }
    if let Some(difficulty) = food.difficulty_level {
      meta.push(Span::styled("Tingkat: ", label));
      meta.push(Span::styled(
        difficulty.as_str(),
        Style::default().fg(difficulty_color(Some(difficulty))),
      ));
    }
    if !meta.is_empty() {
      lines.push(Line::from(meta));
    }
    if !food.ingredients.is_empty() {
      lines.push(Line::from(vec![
        Span::styled("Bahan: ", label),
        Span::raw(food.ingredients.join(", ")),
      ]));
    }
    if !food.taste_profile.is_empty() {
      lines.push(Line::from(vec![
        Span::styled("Rasa: ", label),
        Span::raw(food.taste_profile.join(", ")),
      ]));
    }
    if let Some(url) = &food.image_url {
      lines.push(Line::from(vec![Span::styled("Gambar: ", label), Span::raw(url.clone())]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(
      food.description.clone().unwrap_or_else(|| "Makanan khas Indonesia".to_string()),
    ));

    let heart = if self.favorite { " ♥" } else { "" };
    let block = Block::default()
      .title(format!(" {}{} ", food.name, heart))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
  }

  fn render_answer(&self, frame: &mut Frame, area: Rect) {
    let Some((topic, query)) = &self.answer else {
      let hint = Paragraph::new("d deskripsi   r resep   c sejarah & budaya")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title(" Tanya AI ").borders(Borders::ALL));
      frame.render_widget(hint, area);
      return;
    };

    let text = match query.state() {
      QueryState::Success(answer) => answer.response.clone(),
      QueryState::Error(e) => e.clone(),
      _ => "Sedang berpikir...".to_string(),
    };
    let block = Block::default()
      .title(topic.title())
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Magenta));
    let paragraph = Paragraph::new(text)
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0))
      .block(block);
    frame.render_widget(paragraph, area);
  }

  fn render_similar(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.similar_foods().len();
    ensure_valid_selection(&mut self.similar_state, len);

    let title = if self.similar.is_loading() {
      " Makanan Serupa (loading...) ".to_string()
    } else {
      format!(" Makanan Serupa ({}) ", len)
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    if len == 0 {
      let paragraph = Paragraph::new("Tidak ada makanan serupa")
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
      frame.render_widget(paragraph, area);
      return;
    }

    let width = area.width.saturating_sub(14) as usize;
    let items: Vec<ListItem> = self
      .similar_foods()
      .iter()
      .map(|food| {
        ListItem::new(Line::from(vec![
          Span::raw(truncate(&food.name, width)),
          Span::styled(
            format!("  ⭐ {:.1}", food.rating_or_zero()),
            Style::default().fg(Color::Yellow),
          ),
        ]))
      })
      .collect();
    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.similar_state);
  }
}

impl View for FoodDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('f') => self.toggle_favorite(),
      KeyCode::Char('d') => self.ask(AiTopic::Description),
      KeyCode::Char('r') => self.ask(AiTopic::Recipe),
      KeyCode::Char('c') => self.ask(AiTopic::Culture),
      KeyCode::Char('a') => {
        return ViewAction::Push(Box::new(AiChatView::about_food(self.food.clone(), self.services.clone())));
      }
      KeyCode::Char('j') | KeyCode::Down => self.similar_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.similar_state.select_previous(),
      KeyCode::PageDown => self.scroll = self.scroll.saturating_add(5),
      KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(5),
      KeyCode::Enter => {
        let selected = self
          .similar_state
          .selected()
          .and_then(|idx| self.similar_foods().get(idx))
          .cloned();
        if let Some(food) = selected {
          return ViewAction::Push(Box::new(FoodDetailView::new(food, self.services.clone())));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let columns = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).split(area);
    self.render_info(frame, columns[0]);

    let right = Layout::vertical([Constraint::Min(6), Constraint::Length(7)]).split(columns[1]);
    self.render_answer(frame, right[0]);
    self.render_similar(frame, right[1]);
  }

  fn breadcrumb_label(&self) -> String {
    self.food.name.clone()
  }

  fn page(&self) -> Page {
    Page::Directory
  }

  fn tick(&mut self) {
    self.similar.poll();
    if let Some((_, query)) = self.answer.as_mut() {
      query.poll();
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("f", if self.favorite { "unfavorite" } else { "favorite" }).with_priority(10),
      Shortcut::new("d/r/c", "ask AI").with_priority(20),
      Shortcut::new("a", "chat").with_priority(25),
      Shortcut::new("PgUp/PgDn", "scroll").with_priority(30),
      Shortcut::new("Enter", "similar").with_priority(40),
      Shortcut::new("q", "back").with_priority(90),
    ]
  }
}
