use crate::api::types::{ApiPayload, Food, FoodId};
use crate::app::Services;
use crate::commands::Page;
use crate::foods::{FoodCatalog, FoodFilter, SortOrder};
use crate::query::Query;
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{difficulty_color, rating_stars, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::FoodDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use serde::{Deserialize, Serialize};
use tracing::info;

const SORT_PREF: &str = "directory_sort";
const MODE_PREF: &str = "directory_view";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ViewMode {
  /// Cards with description and ingredients
  #[default]
  Grid,
  /// One line per food
  List,
}

impl ViewMode {
  fn toggled(self) -> Self {
    match self {
      ViewMode::Grid => ViewMode::List,
      ViewMode::List => ViewMode::Grid,
    }
  }

  fn label(self) -> &'static str {
    match self {
      ViewMode::Grid => "Grid",
      ViewMode::List => "List",
    }
  }
}

/// Region and category names offered by the filter bar.
#[derive(Debug, Clone, Default)]
struct FilterOptions {
  regions: Vec<String>,
  categories: Vec<String>,
}

/// Searchable, filterable food list.
pub struct DirectoryView {
  services: Services,
  results: Query<ApiPayload>,
  options: Query<FilterOptions>,
  catalog: FoodCatalog,
  search: SearchInput,
  /// Query the current results were fetched with
  submitted: String,
  filter: FoodFilter,
  sort: SortOrder,
  mode: ViewMode,
  favorites: Vec<FoodId>,
  favorites_only: bool,
  recent: Vec<String>,
  recent_cursor: usize,
  list_state: ListState,
}

impl DirectoryView {
  pub fn new(services: Services) -> Self {
    let api = services.api.clone();
    let mut options = Query::new(move || {
      let api = api.clone();
      async move {
        let (regions, categories) = tokio::join!(api.get_regions(), api.get_categories());
        Ok(FilterOptions {
          regions: regions.regions.into_iter().map(|r| r.name).collect(),
          categories: categories.categories.into_iter().map(|c| c.name).collect(),
        })
      }
    });
    options.fetch();

    let storage = &services.storage;
    let notifier = &services.notifier;
    let sort = storage.get_preference(SORT_PREF, SortOrder::default()).unwrap_or_else(|e| {
      notifier.error(format!("Gagal membaca preferensi: {}", e));
      SortOrder::default()
    });
    let mode = storage.get_preference(MODE_PREF, ViewMode::default()).unwrap_or_default();
    let favorites = storage.get_favorites().unwrap_or_else(|e| {
      notifier.error(format!("Gagal membaca favorit: {}", e));
      Vec::new()
    });
    let recent = storage.get_recent_searches().unwrap_or_default();

    Self {
      results: Self::search_query(&services, ""),
      services,
      options,
      catalog: FoodCatalog::default(),
      search: SearchInput::new(" Cari ", "Cari makanan favorit Anda..."),
      submitted: String::new(),
      filter: FoodFilter::default(),
      sort,
      mode,
      favorites,
      favorites_only: false,
      recent,
      recent_cursor: 0,
      list_state: ListState::default(),
    }
  }

  fn search_query(services: &Services, query: &str) -> Query<ApiPayload> {
    let api = services.api.clone();
    let query = query.to_string();
    let mut results = Query::new(move || {
      let api = api.clone();
      let query = query.clone();
      async move { Ok(api.search_foods(&query).await) }
    });
    results.fetch();
    results
  }

  /// Fetch results for `query`, replacing (and aborting) the current fetch.
  fn run_search(&mut self, query: &str) {
    info!("Directory search for {:?}", query);
    if let Err(e) = self.services.storage.add_recent_search(query) {
      self.services.notifier.error(format!("Gagal menyimpan pencarian: {}", e));
    }
    self.recent = self.services.storage.get_recent_searches().unwrap_or_default();
    self.submitted = query.to_string();
    self.filter.query = None;
    self.results = Self::search_query(&self.services, query);
  }

  /// Error text when the last fetch came back as the fallback payload.
  fn load_error(&self) -> Option<String> {
    let payload = self.results.data()?;
    if payload.success {
      return None;
    }
    Some(payload.error.clone().unwrap_or_else(|| "Gagal memuat data".to_string()))
  }

  fn visible_foods(&self) -> Vec<Food> {
    let mut foods = self.catalog.view(&self.filter, self.sort);
    if self.favorites_only {
      foods.retain(|f| self.favorites.contains(&f.id));
    }
    foods
  }

  fn region_options(&self) -> Vec<String> {
    match self.options.data() {
      Some(options) if !options.regions.is_empty() => options.regions.clone(),
      _ => self.catalog.regions(),
    }
  }

  fn category_options(&self) -> Vec<String> {
    match self.options.data() {
      Some(options) if !options.categories.is_empty() => options.categories.clone(),
      _ => self.catalog.categories(),
    }
  }

  fn set_sort(&mut self, sort: SortOrder) {
    self.sort = sort;
    if let Err(e) = self.services.storage.set_preference(SORT_PREF, &sort) {
      self.services.notifier.error(format!("Gagal menyimpan preferensi: {}", e));
    }
  }

  fn set_mode(&mut self, mode: ViewMode) {
    self.mode = mode;
    if let Err(e) = self.services.storage.set_preference(MODE_PREF, &mode) {
      self.services.notifier.error(format!("Gagal menyimpan preferensi: {}", e));
    }
  }

  fn toggle_favorite(&mut self, food: &Food) {
    match self.services.storage.toggle_favorite(food.id) {
      Ok(true) => {
        self.favorites.push(food.id);
        self.services.notifier.success(format!("{} disimpan ke favorit", food.name));
      }
      Ok(false) => {
        self.favorites.retain(|id| *id != food.id);
        self.services.notifier.info(format!("{} dihapus dari favorit", food.name));
      }
      Err(e) => self.services.notifier.error(format!("Gagal menyimpan favorit: {}", e)),
    }
  }

  fn selected_food(&self) -> Option<Food> {
    let idx = self.list_state.selected()?;
    self.visible_foods().into_iter().nth(idx)
  }

  fn render_filters(&self, frame: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Cyan);
    let value = Style::default().fg(Color::White).bold();
    let query = self
      .filter
      .query
      .clone()
      .filter(|q| !q.is_empty())
      .unwrap_or_else(|| self.submitted.clone());
    let first = Line::from(vec![
      Span::styled("/ ", key),
      Span::styled(
        if query.is_empty() { "Semua makanan".to_string() } else { format!("\"{}\"", query) },
        value,
      ),
      Span::styled("   r ", key),
      Span::styled(
        format!("📍 {}", self.filter.region.as_deref().unwrap_or("Semua Daerah")),
        value,
      ),
      Span::styled("   c ", key),
      Span::styled(
        format!("🏷 {}", self.filter.category.as_deref().unwrap_or("Semua Kategori")),
        value,
      ),
      Span::styled("   s ", key),
      Span::styled(self.sort.label(), value),
      Span::styled("   v ", key),
      Span::styled(self.mode.label(), value),
      Span::styled("   F ", key),
      Span::styled(if self.favorites_only { "♥ Favorit" } else { "♡ Semua" }, value),
    ]);

    let count = if self.results.is_loading() {
      "Memuat data...".to_string()
    } else {
      format!("Menampilkan {} makanan", self.visible_foods().len())
    };
    let mut second = vec![Span::styled(count, Style::default().fg(Color::Gray))];
    if !self.recent.is_empty() {
      second.push(Span::styled("   Terakhir: ", Style::default().fg(Color::DarkGray)));
      second.push(Span::styled(
        truncate(&self.recent.join(", "), (area.width as usize).saturating_sub(40)),
        Style::default().fg(Color::DarkGray),
      ));
    }

    let block = Block::default()
      .title(" Direktori Makanan Nusantara ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(Paragraph::new(vec![first, Line::from(second)]).block(block), area);
  }

  fn food_item(&self, food: &Food, width: usize) -> ListItem<'static> {
    let heart = if self.favorites.contains(&food.id) { "♥ " } else { "  " };
    let region = if food.region.is_empty() { "Indonesia" } else { food.region.as_str() };
    let title = Line::from(vec![
      Span::styled(heart, Style::default().fg(Color::Red)),
      Span::styled(food.name.clone(), Style::default().bold()),
      Span::styled(format!("  📍 {}", region), Style::default().fg(Color::Gray)),
      Span::styled(format!("  {}", rating_stars(food.rating)), Style::default().fg(Color::Yellow)),
    ]);
    if self.mode == ViewMode::List {
      return ListItem::new(title);
    }

    let mut lines = vec![
      title,
      Line::from(Span::raw(format!(
        "  {}",
        truncate(food.description.as_deref().unwrap_or("Makanan khas Indonesia"), width)
      ))),
    ];
    let mut meta = Vec::new();
    if !food.ingredients.is_empty() {
      let mut ingredients = food.ingredients.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
      if food.ingredients.len() > 3 {
        ingredients.push_str("...");
      }
      meta.push(Span::styled(format!("  🥘 {}", ingredients), Style::default().fg(Color::DarkGray)));
    }
    if let Some(difficulty) = food.difficulty_level {
      meta.push(Span::styled(
        format!("  {}", difficulty.as_str()),
        Style::default().fg(difficulty_color(Some(difficulty))),
      ));
    }
    if !meta.is_empty() {
      lines.push(Line::from(meta));
    }
    lines.push(Line::from(""));
    ListItem::new(lines)
  }

  fn render_foods(&mut self, frame: &mut Frame, area: Rect) {
    let foods = self.visible_foods();
    ensure_valid_selection(&mut self.list_state, foods.len());
    let block = Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Blue));

    let message = if let Some(error) = self.load_error() {
      Some((format!("{}\nTekan R untuk mencoba lagi.", error), Color::Red))
    } else if foods.is_empty() && !self.results.is_loading() {
      Some(("Tidak ada makanan ditemukan".to_string(), Color::DarkGray))
    } else {
      None
    };
    if let Some((text, color)) = message {
      frame.render_widget(Paragraph::new(text).style(Style::default().fg(color)).block(block), area);
      return;
    }

    let width = area.width.saturating_sub(8) as usize;
    let items: Vec<ListItem> = foods.iter().map(|food| self.food_item(food, width)).collect();
    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

/// Next entry after `current` in `options`, wrapping back to "all".
fn cycle(options: &[String], current: Option<&str>) -> Option<String> {
  let next = match current.and_then(|c| options.iter().position(|o| o == c)) {
    Some(idx) => idx + 1,
    None => 0,
  };
  options.get(next).cloned()
}

impl View for DirectoryView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(text)) => {
        if text.is_empty() && !self.search.is_active() && !self.submitted.is_empty() {
          // Cancelled: back to the full list
          self.submitted.clear();
          self.results = Self::search_query(&self.services, "");
        }
        self.filter.query = Some(text).filter(|t| !t.is_empty());
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted(query)) => {
        self.run_search(&query);
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => {
        self.filter.region = cycle(&self.region_options(), self.filter.region.as_deref());
      }
      KeyCode::Char('c') => {
        self.filter.category = cycle(&self.category_options(), self.filter.category.as_deref());
      }
      KeyCode::Char('s') => self.set_sort(self.sort.next()),
      KeyCode::Char('v') => self.set_mode(self.mode.toggled()),
      KeyCode::Char('F') => self.favorites_only = !self.favorites_only,
      KeyCode::Char('f') => {
        if let Some(food) = self.selected_food() {
          self.toggle_favorite(&food);
        }
      }
      KeyCode::Char('p') => {
        if let Some(query) = self.recent.get(self.recent_cursor % self.recent.len().max(1)).cloned() {
          self.recent_cursor += 1;
          self.run_search(&query);
        }
      }
      KeyCode::Char('x') => match self.services.storage.clear_recent_searches() {
        Ok(()) => {
          self.recent.clear();
          self.services.notifier.info("Riwayat pencarian dihapus");
        }
        Err(e) => self.services.notifier.error(format!("Gagal menghapus riwayat: {}", e)),
      },
      KeyCode::Char('R') => {
        self.results.refetch();
        self.options.refetch();
      }
      KeyCode::Enter => {
        if let Some(food) = self.selected_food() {
          return ViewAction::Push(Box::new(FoodDetailView::new(food, self.services.clone())));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(4), Constraint::Min(3)]).split(area);
    self.render_filters(frame, chunks[0]);
    self.render_foods(frame, chunks[1]);
    self.search.render_overlay(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    if self.submitted.is_empty() {
      Page::Directory.label().to_string()
    } else {
      format!("{} [{}]", Page::Directory.label(), self.submitted)
    }
  }

  fn page(&self) -> Page {
    Page::Directory
  }

  fn captures_input(&self) -> bool {
    self.search.is_active()
  }

  fn tick(&mut self) {
    if self.results.poll() {
      let foods = self.results.data().map(|p| p.results.clone()).unwrap_or_default();
      self.catalog.replace(foods);
    }
    self.options.poll();
  }

  /// A popped detail view may have toggled favorites.
  fn on_resume(&mut self) {
    match self.services.storage.get_favorites() {
      Ok(favorites) => self.favorites = favorites,
      Err(e) => self
        .services
        .notifier
        .error(format!("Gagal membaca favorit: {}", e)),
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("/", "cari").with_priority(10),
      Shortcut::new("r/c", "daerah/kategori").with_priority(20),
      Shortcut::new("s", "urutkan").with_priority(30),
      Shortcut::new("v", "tampilan").with_priority(40),
      Shortcut::new("f/F", "favorit").with_priority(50),
      Shortcut::new("p/x", "riwayat").with_priority(60),
      Shortcut::new("q", "back").with_priority(90),
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

  /// Same body for every endpoint; each reader picks its own field.
  fn everything() -> Reply {
    Reply::ok(json!({
      "results": [
        {"id": 1, "name": "Soto", "region": "Jawa Timur", "rating": 4.5, "category": "Sup"},
        {"id": 2, "name": "Rawon", "region": "Jawa Timur", "rating": 4.8, "category": "Sup"},
        {"id": 3, "name": "Rendang", "region": "Sumatera Barat", "rating": 4.9, "category": "Lauk"},
      ],
      "regions": [{"id": 1, "name": "Jawa Timur"}, {"id": 2, "name": "Sumatera Barat"}],
      "categories": [{"id": 1, "name": "Sup"}, {"id": 2, "name": "Lauk"}],
    }))
  }

  fn names(view: &DirectoryView) -> Vec<String> {
    view.visible_foods().into_iter().map(|f| f.name).collect()
  }

  async fn loaded(transport: FakeTransport) -> (DirectoryView, Services) {
    let (services, _rx) = test_services(transport);
    let mut view = DirectoryView::new(services.clone());
    settle(&mut view).await;
    (view, services)
  }

  #[tokio::test]
  async fn test_sort_cycles_and_persists() {
    let (mut view, services) = loaded(FakeTransport::always(everything())).await;
    assert_eq!(names(&view), vec!["Soto", "Rawon", "Rendang"]);

    view.handle_key(key(KeyCode::Char('s')));
    assert_eq!(view.sort, SortOrder::NameAsc);
    assert_eq!(names(&view), vec!["Rawon", "Rendang", "Soto"]);

    view.handle_key(key(KeyCode::Char('s')));
    view.handle_key(key(KeyCode::Char('s')));
    assert_eq!(names(&view), vec!["Rendang", "Rawon", "Soto"]);

    let stored: SortOrder = services.storage.get_preference(SORT_PREF, SortOrder::Default).unwrap();
    assert_eq!(stored, SortOrder::RatingDesc);
  }

  #[tokio::test]
  async fn test_region_and_category_filters() {
    let (mut view, _services) = loaded(FakeTransport::always(everything())).await;

    view.handle_key(key(KeyCode::Char('r')));
    assert_eq!(view.filter.region.as_deref(), Some("Jawa Timur"));
    assert_eq!(names(&view), vec!["Soto", "Rawon"]);

    view.handle_key(key(KeyCode::Char('c')));
    view.handle_key(key(KeyCode::Char('c')));
    assert_eq!(view.filter.category.as_deref(), Some("Lauk"));
    assert!(names(&view).is_empty());

    // Past the last option wraps back to everything
    view.handle_key(key(KeyCode::Char('r')));
    view.handle_key(key(KeyCode::Char('r')));
    assert_eq!(view.filter.region, None);
    assert_eq!(names(&view), vec!["Rendang"]);
  }

  #[tokio::test]
  async fn test_live_filter_then_submit_records_recent_search() {
    let transport = FakeTransport::always(everything());
    let (mut view, services) = loaded(transport.clone()).await;

    view.handle_key(key(KeyCode::Char('/')));
    for c in "ren".chars() {
      view.handle_key(key(KeyCode::Char(c)));
    }
    assert!(view.captures_input());
    assert_eq!(names(&view), vec!["Rendang"]);

    view.handle_key(key(KeyCode::Enter));
    settle(&mut view).await;

    assert_eq!(services.storage.get_recent_searches().unwrap(), vec!["ren"]);
    assert_eq!(view.recent, vec!["ren"]);
    assert!(transport.requests().iter().any(|r| r.url.ends_with("/search?q=ren")));
  }

  #[tokio::test]
  async fn test_failed_load_shows_error() {
    let (view, _services) = loaded(FakeTransport::always(Reply::Json(503, "{}".to_string()))).await;
    assert!(view.load_error().is_some());
    assert!(view.visible_foods().is_empty());
  }

  #[tokio::test]
  async fn test_favorites_only() {
    let (mut view, services) = loaded(FakeTransport::always(everything())).await;

    view.list_state.select(Some(1));
    view.handle_key(key(KeyCode::Char('f')));
    assert!(services.storage.is_favorite(2).unwrap());

    view.handle_key(key(KeyCode::Char('F')));
    assert_eq!(names(&view), vec!["Rawon"]);
  }

  #[tokio::test]
  async fn test_favorites_reload_on_resume_only() {
    let (mut view, services) = loaded(FakeTransport::always(everything())).await;
    services.storage.add_favorite(1).unwrap();

    view.tick();
    assert!(view.favorites.is_empty());

    view.on_resume();
    assert_eq!(view.favorites, vec![1]);
  }

  #[tokio::test]
  async fn test_view_mode_persists() {
    let (mut view, services) = loaded(FakeTransport::always(everything())).await;
    view.handle_key(key(KeyCode::Char('v')));

    let reopened = DirectoryView::new(services);
    assert_eq!(reopened.mode, ViewMode::List);
  }

  #[test]
  fn test_cycle_wraps_to_none() {
    let options = vec!["a".to_string(), "b".to_string()];
    assert_eq!(cycle(&options, None).as_deref(), Some("a"));
    assert_eq!(cycle(&options, Some("a")).as_deref(), Some("b"));
    assert_eq!(cycle(&options, Some("b")), None);
    assert_eq!(cycle(&[], None), None);
  }
}
