use crate::admin::AdminSession;
use crate::api::types::{Difficulty, Food, FoodId, FoodInput, Region, RegionId, RegionInput};
use crate::app::Services;
use crate::commands::Page;
use crate::query::{Query, QueryState};
use crate::ui::components::{Form, FormEvent, KeyResult};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{difficulty_color, percent_of, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use std::collections::BTreeMap;
use tracing::{info, warn};

const DEFAULT_RATING: &str = "4.5";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
  Overview,
  Foods,
  Regions,
  Analytics,
}

impl Section {
  const ALL: [Section; 4] = [
    Section::Overview,
    Section::Foods,
    Section::Regions,
    Section::Analytics,
  ];

  fn label(&self) -> &'static str {
    match self {
      Section::Overview => "Ringkasan",
      Section::Foods => "Makanan",
      Section::Regions => "Daerah",
      Section::Analytics => "Analitik",
    }
  }

  fn step(&self, forward: bool) -> Self {
    let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
    let len = Self::ALL.len();
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    Self::ALL[next]
  }
}

/// Regions and foods as the dashboard sees them.
#[derive(Debug, Clone, Default)]
struct Dashboard {
  regions: Vec<Region>,
  foods: Vec<Food>,
  error: Option<String>,
}

impl Dashboard {
  fn average_rating(&self) -> f64 {
    if self.foods.is_empty() {
      return 0.0;
    }
    self.foods.iter().map(Food::rating_or_zero).sum::<f64>() / self.foods.len() as f64
  }

  /// Food count per region name, largest first.
  fn foods_per_region(&self) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for food in &self.foods {
      let region = if food.region.is_empty() { "-" } else { food.region.as_str() };
      *counts.entry(region.to_string()).or_default() += 1;
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
  }

  /// Counts per difficulty, with unknown levels under "-".
  fn difficulty_counts(&self) -> Vec<(&'static str, usize)> {
    let mut counts: Vec<(&'static str, usize)> = Difficulty::ALL
      .iter()
      .map(|d| (d.as_str(), self.foods.iter().filter(|f| f.difficulty_level == Some(*d)).count()))
      .collect();
    let unknown = self.foods.iter().filter(|f| f.difficulty_level.is_none()).count();
    if unknown > 0 {
      counts.push(("-", unknown));
    }
    counts
  }
}

#[derive(Debug, Clone, PartialEq)]
enum Target {
  Food(FoodId, String),
  Region(RegionId, String),
}

impl Target {
  fn question(&self) -> String {
    match self {
      Target::Food(_, name) => format!("Hapus makanan \"{}\"?", name),
      Target::Region(_, name) => format!(
        "Hapus daerah \"{}\"? Ini akan menghapus semua makanan dari daerah ini.",
        name
      ),
    }
  }
}

enum Modal {
  FoodForm { form: Form, editing: Option<FoodId> },
  RegionForm { form: Form, editing: Option<RegionId> },
  Confirm(Target),
}

/// Login-gated dashboard for managing foods and regions.
pub struct AdminView {
  services: Services,
  session: Option<AdminSession>,
  login: Form,
  login_error: Option<String>,
  section: Section,
  dashboard: Query<Dashboard>,
  list_state: ListState,
  modal: Option<Modal>,
  /// Running create/update/delete calls, each resolving to its toast text
  mutations: Vec<Query<String>>,
}

fn login_form(username: &str) -> Form {
  Form::new("Login Admin")
    .text("username", "Username", username)
    .password("password", "Password")
}

fn food_form(food: Option<&Food>, regions: &[Region]) -> Form {
  let region_idx = food
    .and_then(|f| {
      regions
        .iter()
        .position(|r| Some(r.id) == f.region_id || r.name == f.region)
    })
    .unwrap_or(0);
  let difficulty_idx = food
    .and_then(|f| f.difficulty_level)
    .and_then(|d| Difficulty::ALL.iter().position(|x| *x == d))
    .unwrap_or(0);
  let rating = food
    .and_then(|f| f.rating)
    .map(|r| r.to_string())
    .unwrap_or_else(|| DEFAULT_RATING.to_string());
  let prep = food
    .and_then(|f| f.preparation_time)
    .map(|t| t.to_string())
    .unwrap_or_default();

  Form::new(if food.is_some() { "Edit Makanan" } else { "Tambah Makanan" })
    .text("name", "Nama", food.map(|f| f.name.as_str()).unwrap_or(""))
    .select(
      "region",
      "Daerah",
      regions.iter().map(|r| r.name.clone()).collect(),
      region_idx,
    )
    .text(
      "description",
      "Deskripsi",
      food.and_then(|f| f.description.as_deref()).unwrap_or(""),
    )
    .text(
      "ingredients",
      "Bahan (koma)",
      &food.map(|f| f.ingredients.join(", ")).unwrap_or_default(),
    )
    .text(
      "taste_profile",
      "Rasa (koma)",
      &food.map(|f| f.taste_profile.join(", ")).unwrap_or_default(),
    )
    .text("rating", "Rating", &rating)
    .text(
      "image_url",
      "URL Gambar",
      food.and_then(|f| f.image_url.as_deref()).unwrap_or(""),
    )
    .text("preparation_time", "Waktu (menit)", &prep)
    .select(
      "difficulty",
      "Kesulitan",
      Difficulty::ALL.iter().map(|d| d.as_str().to_string()).collect(),
      difficulty_idx,
    )
}

fn region_form(region: Option<&Region>) -> Form {
  let coord = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
  Form::new(if region.is_some() { "Edit Daerah" } else { "Tambah Daerah" })
    .text("name", "Nama", region.map(|r| r.name.as_str()).unwrap_or(""))
    .text("category", "Kategori", region.map(|r| r.category.as_str()).unwrap_or(""))
    .text("latitude", "Latitude", &coord(region.and_then(|r| r.latitude)))
    .text("longitude", "Longitude", &coord(region.and_then(|r| r.longitude)))
    .text(
      "description",
      "Deskripsi",
      region.and_then(|r| r.description.as_deref()).unwrap_or(""),
    )
    .text("emoji", "Emoji", region.map(|r| r.emoji.as_str()).unwrap_or("📍"))
}

fn optional<T: std::str::FromStr>(value: &str, field: &str) -> Result<Option<T>, String> {
  if value.is_empty() {
    return Ok(None);
  }
  value
    .parse()
    .map(Some)
    .map_err(|_| format!("{} harus berupa angka", field))
}

fn food_input(form: &Form, regions: &[Region]) -> Result<FoodInput, String> {
  let name = form.value("name");
  if name.is_empty() {
    return Err("Nama makanan wajib diisi".to_string());
  }
  let region = form
    .selected("region")
    .and_then(|idx| regions.get(idx))
    .ok_or_else(|| "Tambahkan daerah terlebih dahulu".to_string())?;
  let rating: f64 = optional(&form.value("rating"), "Rating")?.unwrap_or(0.0);
  if !(0.0..=5.0).contains(&rating) {
    return Err("Rating harus antara 0 dan 5".to_string());
  }
  let difficulty_level = form
    .selected("difficulty")
    .and_then(|idx| Difficulty::ALL.get(idx).copied())
    .unwrap_or(Difficulty::Easy);
  let image_url = Some(form.value("image_url")).filter(|s| !s.is_empty());

  Ok(FoodInput {
    name,
    region_id: region.id,
    description: form.value("description"),
    ingredients: form.list("ingredients"),
    taste_profile: form.list("taste_profile"),
    rating,
    image_url,
    preparation_time: optional(&form.value("preparation_time"), "Waktu")?,
    difficulty_level,
  })
}

fn region_input(form: &Form) -> Result<RegionInput, String> {
  let name = form.value("name");
  if name.is_empty() {
    return Err("Nama daerah wajib diisi".to_string());
  }
  let emoji = form.value("emoji");
  Ok(RegionInput {
    name,
    category: form.value("category"),
    latitude: optional(&form.value("latitude"), "Latitude")?,
    longitude: optional(&form.value("longitude"), "Longitude")?,
    description: form.value("description"),
    emoji: if emoji.is_empty() { "📍".to_string() } else { emoji },
  })
}

impl AdminView {
  pub fn new(services: Services) -> Self {
    let api = services.api.clone();
    let dashboard = Query::new(move || {
      let api = api.clone();
      async move {
        let (regions, foods) = tokio::join!(api.get_regions(), api.search_foods(""));
        let error = [&regions, &foods]
          .iter()
          .find(|p| !p.success)
          .map(|p| p.error.clone().unwrap_or_else(|| "Gagal memuat data".to_string()));
        Ok(Dashboard {
          regions: regions.regions,
          foods: foods.results,
          error,
        })
      }
    });

    let session = services.admin.current_session().unwrap_or_else(|e| {
      warn!("Could not read admin session: {}", e);
      None
    });

    let mut view = Self {
      services,
      session: None,
      login: login_form(""),
      login_error: None,
      section: Section::Overview,
      dashboard,
      list_state: ListState::default(),
      modal: None,
      mutations: Vec::new(),
    };
    if let Some(session) = session {
      view.enter(session);
    }
    view
  }

  fn enter(&mut self, session: AdminSession) {
    self.session = Some(session);
    self.login_error = None;
    self.dashboard.fetch();
  }

  fn data(&self) -> Option<&Dashboard> {
    self.dashboard.data()
  }

  fn regions(&self) -> Vec<Region> {
    self.data().map(|d| d.regions.clone()).unwrap_or_default()
  }

  fn handle_login_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.login.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted) => {
        let username = self.login.value("username");
        match self.services.admin.login(&username, &self.login.value("password")) {
          Ok(Some(session)) => {
            self.login = login_form("");
            self.enter(session);
          }
          Ok(None) => {
            self.login = login_form(&username);
            self.login_error = Some("Username atau password salah!".to_string());
          }
          Err(e) => self.services.notifier.error(format!("Gagal login: {}", e)),
        }
        ViewAction::None
      }
      KeyResult::Event(FormEvent::Cancelled) => ViewAction::Pop,
      KeyResult::Handled | KeyResult::NotHandled => ViewAction::None,
    }
  }

  fn logout(&mut self) {
    if let Err(e) = self.services.admin.logout() {
      self.services.notifier.error(format!("Gagal logout: {}", e));
      return;
    }
    self.session = None;
    self.modal = None;
    self.dashboard.cancel();
    self.services.notifier.info("Anda telah keluar");
  }

  fn run_mutation<F, Fut>(&mut self, mutation: F)
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<String, String>> + Send + 'static,
  {
    let mut query = Query::new(mutation);
    query.fetch();
    self.mutations.push(query);
  }

  fn submit_food(&mut self, form: &Form, editing: Option<FoodId>) -> bool {
    let input = match food_input(form, &self.regions()) {
      Ok(input) => input,
      Err(message) => {
        self.services.notifier.warning(message);
        return false;
      }
    };
    info!("Saving food {:?} ({:?})", input.name, editing);
    let api = self.services.api.clone();
    self.run_mutation(move || {
      let api = api.clone();
      let input = input.clone();
      async move {
        match editing {
          Some(id) => api
            .update_food(id, &input)
            .await
            .map(|_| "Makanan berhasil diperbarui!".to_string())
            .map_err(|e| format!("Gagal memperbarui makanan: {}", e)),
          None => api
            .create_food(&input)
            .await
            .map(|_| "Makanan berhasil ditambahkan!".to_string())
            .map_err(|e| format!("Gagal menambahkan makanan: {}", e)),
        }
      }
    });
    true
  }

  fn submit_region(&mut self, form: &Form, editing: Option<RegionId>) -> bool {
    let input = match region_input(form) {
      Ok(input) => input,
      Err(message) => {
        self.services.notifier.warning(message);
        return false;
      }
    };
    info!("Saving region {:?} ({:?})", input.name, editing);
    let api = self.services.api.clone();
    self.run_mutation(move || {
      let api = api.clone();
      let input = input.clone();
      async move {
        match editing {
          Some(id) => api
            .update_region(id, &input)
            .await
            .map(|_| "Daerah berhasil diperbarui!".to_string())
            .map_err(|e| format!("Gagal memperbarui daerah: {}", e)),
          None => api
            .create_region(&input)
            .await
            .map(|_| "Daerah berhasil ditambahkan!".to_string())
            .map_err(|e| format!("Gagal menambahkan daerah: {}", e)),
        }
      }
    });
    true
  }

  fn delete(&mut self, target: Target) {
    info!("Deleting {:?}", target);
    let api = self.services.api.clone();
    self.run_mutation(move || {
      let api = api.clone();
      let target = target.clone();
      async move {
        match target {
          Target::Food(id, _) => api
            .delete_food(id)
            .await
            .map(|_| "Makanan berhasil dihapus!".to_string())
            .map_err(|e| format!("Gagal menghapus makanan: {}", e)),
          Target::Region(id, _) => api
            .delete_region(id)
            .await
            .map(|_| "Daerah berhasil dihapus!".to_string())
            .map_err(|e| format!("Gagal menghapus daerah: {}", e)),
        }
      }
    });
  }

  fn handle_modal_key(&mut self, modal: Modal, key: KeyEvent) -> Option<Modal> {
    match modal {
      Modal::Confirm(target) => match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
          self.delete(target);
          None
        }
        KeyCode::Char('n') | KeyCode::Esc => None,
        _ => Some(Modal::Confirm(target)),
      },
      Modal::FoodForm { mut form, editing } => match form.handle_key(key) {
        KeyResult::Event(FormEvent::Cancelled) => None,
        KeyResult::Event(FormEvent::Submitted) if self.submit_food(&form, editing) => None,
        _ => Some(Modal::FoodForm { form, editing }),
      },
      Modal::RegionForm { mut form, editing } => match form.handle_key(key) {
        KeyResult::Event(FormEvent::Cancelled) => None,
        KeyResult::Event(FormEvent::Submitted) if self.submit_region(&form, editing) => None,
        _ => Some(Modal::RegionForm { form, editing }),
      },
    }
  }

  fn selected_food(&self) -> Option<Food> {
    let idx = self.list_state.selected()?;
    self.data()?.foods.get(idx).cloned()
  }

  fn selected_region(&self) -> Option<Region> {
    let idx = self.list_state.selected()?;
    self.data()?.regions.get(idx).cloned()
  }

  fn open_form(&mut self, edit: bool) {
    let regions = self.regions();
    self.modal = match self.section {
      Section::Foods => {
        let food = if edit { self.selected_food() } else { None };
        if edit && food.is_none() {
          return;
        }
        Some(Modal::FoodForm {
          form: food_form(food.as_ref(), &regions),
          editing: food.map(|f| f.id),
        })
      }
      Section::Regions => {
        let region = if edit { self.selected_region() } else { None };
        if edit && region.is_none() {
          return;
        }
        Some(Modal::RegionForm {
          form: region_form(region.as_ref()),
          editing: region.map(|r| r.id),
        })
      }
      Section::Overview | Section::Analytics => return,
    };
  }

  fn confirm_delete(&mut self) {
    let target = match self.section {
      Section::Foods => self.selected_food().map(|f| Target::Food(f.id, f.name)),
      Section::Regions => self.selected_region().map(|r| Target::Region(r.id, r.name)),
      Section::Overview | Section::Analytics => None,
    };
    if let Some(target) = target {
      self.modal = Some(Modal::Confirm(target));
    }
  }

  fn refresh(&mut self) {
    self.services.api.clear_cache();
    self.dashboard.refetch();
  }

  fn render_login(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Admin Dashboard ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([Constraint::Min(6), Constraint::Length(2)]).split(inner);
    self.login.render(frame, chunks[0]);
    if let Some(error) = &self.login_error {
      frame.render_widget(
        Paragraph::new(error.as_str())
          .alignment(Alignment::Center)
          .style(Style::default().fg(Color::Red)),
        chunks[1],
      );
    }
  }

  fn render_tabs(&self, frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    for section in Section::ALL {
      let style = if section == self.section {
        Style::default().fg(Color::Black).bg(Color::Yellow).bold()
      } else {
        Style::default().fg(Color::Gray)
      };
      spans.push(Span::styled(format!(" {} ", section.label()), style));
      spans.push(Span::raw(" "));
    }
    if let Some(session) = &self.session {
      spans.push(Span::styled(
        format!("  👤 {}", session.username),
        Style::default().fg(Color::DarkGray),
      ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }

  fn render_overview(&self, frame: &mut Frame, area: Rect, data: &Dashboard) {
    let cards = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    let stats = [
      ("Total Makanan", data.foods.len().to_string()),
      ("Total Daerah", data.regions.len().to_string()),
      ("Rating Rata-rata", format!("{:.1}", data.average_rating())),
    ];
    for ((label, value), card) in stats.iter().zip(cards.iter()) {
      let stat = Paragraph::new(vec![
        Line::from(Span::styled(value.clone(), Style::default().fg(Color::Yellow).bold())),
        Line::from(Span::styled(*label, Style::default().fg(Color::Gray))),
      ])
      .alignment(Alignment::Center)
      .block(Block::default().borders(Borders::ALL));
      frame.render_widget(stat, card.intersection(Rect { height: 4, ..*card }));
    }
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect, header: String, rows: Vec<String>, empty: &str) {
    let block = Block::default()
      .title(format!(" {} ", header))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    if rows.is_empty() {
      frame.render_widget(
        Paragraph::new(empty).style(Style::default().fg(Color::DarkGray)).block(block),
        area,
      );
      return;
    }
    ensure_valid_selection(&mut self.list_state, rows.len());
    let items: Vec<ListItem> = rows.into_iter().map(ListItem::new).collect();
    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn food_rows(data: &Dashboard) -> Vec<String> {
    data
      .foods
      .iter()
      .map(|f| {
        let mut ingredients = f.ingredients.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
        if f.ingredients.len() > 3 {
          ingredients.push_str("...");
        }
        format!(
          "{:>4}  {:<24} {:<18} {:>4.1}  {}",
          f.id,
          truncate(&f.name, 24),
          truncate(&f.region, 18),
          f.rating_or_zero(),
          ingredients
        )
      })
      .collect()
  }

  fn region_rows(data: &Dashboard) -> Vec<String> {
    data
      .regions
      .iter()
      .map(|r| {
        format!(
          "{:>4}  {:<22} {:<12} {}  {}",
          r.id,
          truncate(&r.name, 22),
          truncate(&r.category, 12),
          r.emoji,
          truncate(r.description.as_deref().unwrap_or(""), 50)
        )
      })
      .collect()
  }

  fn render_analytics(&self, frame: &mut Frame, area: Rect, data: &Dashboard) {
    let columns = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).split(area);
    let bar = |count: usize, max: usize, width: usize| {
      let filled = if max == 0 { 0 } else { count * width / max };
      "█".repeat(filled.max(usize::from(count > 0)))
    };

    let per_region = data.foods_per_region();
    let max = per_region.first().map(|(_, n)| *n).unwrap_or(0);
    let lines: Vec<Line> = per_region
      .iter()
      .map(|(region, count)| {
        Line::from(vec![
          Span::raw(format!("{:<18} ", truncate(region, 18))),
          Span::styled(bar(*count, max, 20), Style::default().fg(Color::Green)),
          Span::raw(format!(" {}", count)),
        ])
      })
      .collect();
    frame.render_widget(
      Paragraph::new(lines).block(Block::default().title(" Makanan per Daerah ").borders(Borders::ALL)),
      columns[0],
    );

    let difficulty = data.difficulty_counts();
    let max = difficulty.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let lines: Vec<Line> = difficulty
      .iter()
      .map(|(level, count)| {
        let color = difficulty_color(Difficulty::parse(level));
        Line::from(vec![
          Span::raw(format!("{:<7} ", level)),
          Span::styled(bar(*count, max, 15), Style::default().fg(color)),
          Span::raw(format!(" {}", count)),
        ])
      })
      .collect();
    frame.render_widget(
      Paragraph::new(lines).block(Block::default().title(" Tingkat Kesulitan ").borders(Borders::ALL)),
      columns[1],
    );
  }

  fn render_confirm(&self, frame: &mut Frame, area: Rect, target: &Target) {
    let width = percent_of(area.width, 60).clamp(30, 70).min(area.width);
    let height = 5.min(area.height);
    let rect = Rect::new(
      area.x + (area.width - width) / 2,
      area.y + (area.height - height) / 2,
      width,
      height,
    );
    frame.render_widget(Clear, rect);
    let text = vec![
      Line::from(target.question()),
      Line::from(Span::styled("y ya   n batal", Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(
      Paragraph::new(text).wrap(Wrap { trim: true }).block(
        Block::default()
          .title(" Konfirmasi ")
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Red)),
      ),
      rect,
    );
  }
}

impl View for AdminView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.session.is_none() {
      return self.handle_login_key(key);
    }
    if let Some(modal) = self.modal.take() {
      self.modal = self.handle_modal_key(modal, key);
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Tab => {
        self.section = self.section.step(true);
        self.list_state.select(None);
      }
      KeyCode::BackTab => {
        self.section = self.section.step(false);
        self.list_state.select(None);
      }
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('a') => self.open_form(false),
      KeyCode::Char('e') | KeyCode::Enter => self.open_form(true),
      KeyCode::Char('x') | KeyCode::Delete => self.confirm_delete(),
      KeyCode::Char('R') => self.refresh(),
      KeyCode::Char('L') => self.logout(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    if self.session.is_none() {
      self.render_login(frame, area);
      return;
    }

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).split(area);
    self.render_tabs(frame, chunks[0]);
    let body = chunks[1];

    let data = match self.dashboard.state() {
      QueryState::Success(data) if data.error.is_none() => data.clone(),
      QueryState::Success(data) => {
        let error = data.error.clone().unwrap_or_default();
        frame.render_widget(
          Paragraph::new(format!("{}\nTekan R untuk mencoba lagi.", error))
            .style(Style::default().fg(Color::Red)),
          body,
        );
        return;
      }
      QueryState::Error(e) => {
        frame.render_widget(Paragraph::new(e.clone()).style(Style::default().fg(Color::Red)), body);
        return;
      }
      QueryState::Idle | QueryState::Loading => {
        frame.render_widget(
          Paragraph::new("Memuat data...").style(Style::default().fg(Color::DarkGray)),
          body,
        );
        return;
      }
    };

    match self.section {
      Section::Overview => self.render_overview(frame, body, &data),
      Section::Foods => {
        let header = format!(
          "{:>4}  {:<24} {:<18} {:>4}  {}",
          "ID", "Nama Makanan", "Daerah", "Rating", "Bahan"
        );
        self.render_table(frame, body, header, Self::food_rows(&data), "Tidak ada data makanan");
      }
      Section::Regions => {
        let header = format!(
          "{:>4}  {:<22} {:<12} {}  {}",
          "ID", "Nama Daerah", "Kategori", "Emoji", "Deskripsi"
        );
        self.render_table(frame, body, header, Self::region_rows(&data), "Tidak ada data daerah");
      }
      Section::Analytics => self.render_analytics(frame, body, &data),
    }

    match &self.modal {
      Some(Modal::FoodForm { form, .. }) | Some(Modal::RegionForm { form, .. }) => form.render(frame, body),
      Some(Modal::Confirm(target)) => self.render_confirm(frame, body, target),
      None => {}
    }
  }

  fn breadcrumb_label(&self) -> String {
    match self.section {
      Section::Overview => Page::Admin.label().to_string(),
      section => format!("{} [{}]", Page::Admin.label(), section.label()),
    }
  }

  fn page(&self) -> Page {
    Page::Admin
  }

  fn captures_input(&self) -> bool {
    self.session.is_none() || self.modal.is_some()
  }

  fn tick(&mut self) {
    self.dashboard.poll();

    let mut refresh = false;
    let services = &self.services;
    self.mutations.retain_mut(|mutation| {
      if !mutation.poll() {
        return true;
      }
      match mutation.state() {
        QueryState::Success(message) => {
          services.notifier.success(message.clone());
          refresh = true;
          false
        }
        QueryState::Error(message) => {
          services.notifier.error(message.clone());
          false
        }
        QueryState::Idle | QueryState::Loading => true,
      }
    });
    if refresh {
      self.refresh();
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    if self.session.is_none() {
      return vec![
        Shortcut::new("Tab", "pindah").with_priority(10),
        Shortcut::new("Enter", "login").with_priority(20),
        Shortcut::new("Esc", "back").with_priority(90),
      ];
    }
    vec![
      Shortcut::new("Tab", "bagian").with_priority(10),
      Shortcut::new("a", "tambah").with_priority(20),
      Shortcut::new("e", "edit").with_priority(30),
      Shortcut::new("x", "hapus").with_priority(40),
      Shortcut::new("R", "muat ulang").with_priority(50),
      Shortcut::new("L", "logout").with_priority(60),
      Shortcut::new("q", "back").with_priority(90),
    ]
  }
}
