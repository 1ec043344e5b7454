use crate::api::types::{ApiPayload, Food, Region, RegionId};
use crate::app::Services;
use crate::commands::Page;
use crate::map::{MapService, FOCUS_ZOOM};
use crate::query::{Query, QueryState};
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::FoodDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::symbols;
use ratatui::widgets::canvas::{Canvas, Map, MapResolution};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tracing::info;

const NOT_FOUND: &str = "Daerah tidak ditemukan";
const NO_FOODS: &str = "Belum ada data makanan untuk daerah ini";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
  Regions,
  Foods,
}

/// Region map with the foods of the selected region underneath.
pub struct ExplorerView {
  services: Services,
  regions: Query<ApiPayload>,
  map: MapService,
  markers_placed: bool,
  region_state: ListState,
  search: SearchInput,
  selected: Option<RegionId>,
  foods: Option<Query<ApiPayload>>,
  food_state: ListState,
  focus: Focus,
  message: Option<&'static str>,
}

impl ExplorerView {
  pub fn new(services: Services) -> Self {
    let api = services.api.clone();
    let mut regions = Query::new(move || {
      let api = api.clone();
      async move { Ok(api.get_regions().await) }
    });
    regions.fetch();

    let mut map = MapService::new();
    map.init_map(None, None);

    Self {
      services,
      regions,
      map,
      markers_placed: false,
      region_state: ListState::default(),
      search: SearchInput::new(" Cari Daerah ", "Cari daerah..."),
      selected: None,
      foods: None,
      food_state: ListState::default(),
      focus: Focus::Regions,
      message: None,
    }
  }

  fn all_regions(&self) -> &[Region] {
    self.regions.data().map(|p| p.regions.as_slice()).unwrap_or(&[])
  }

  /// Regions whose name contains the search term, case-insensitively.
  fn visible_regions(&self) -> Vec<&Region> {
    let term = self.search.query().trim().to_lowercase();
    self
      .all_regions()
      .iter()
      .filter(|r| term.is_empty() || r.name.to_lowercase().contains(&term))
      .collect()
  }

  fn region_foods(&self) -> &[Food] {
    self
      .foods
      .as_ref()
      .and_then(|q| q.data())
      .map(|p| p.foods.as_slice())
      .unwrap_or(&[])
  }

  fn place_markers(&mut self) {
    let regions = self.all_regions().to_vec();
    self.map.clear_markers();
    if !regions.is_empty() {
      self.map.add_multiple_markers(&regions);
      self.map.fit_bounds();
    }
    self.markers_placed = true;
  }

  /// Center the map on the region and load its foods.
  fn select_region(&mut self, region: &Region) {
    info!("Exploring region {}", region.name);
    if let Some((lat, lng)) = region.coordinates() {
      self.map.set_center(lat, lng, Some(FOCUS_ZOOM));
    }

    self.selected = Some(region.id);
    self.message = None;
    self.food_state = ListState::default();

    let api = self.services.api.clone();
    let region_id = region.id;
    let mut foods = Query::new(move || {
      let api = api.clone();
      async move { Ok(api.get_foods_by_region(region_id).await) }
    });
    foods.fetch();
    // Any previous region's request is aborted on drop
    self.foods = Some(foods);
  }

  fn clear_selection(&mut self) {
    self.selected = None;
    self.foods = None;
    self.message = None;
    self.focus = Focus::Regions;
  }

  fn on_search_changed(&mut self, term: &str) {
    self.region_state.select(Some(0));
    if term.trim().is_empty() {
      self.map.fit_bounds();
      self.clear_selection();
      return;
    }

    let matches: Vec<Region> = self.visible_regions().into_iter().cloned().collect();
    match matches.as_slice() {
      [] => {
        self.foods = None;
        self.selected = None;
        self.message = Some(NOT_FOUND);
      }
      [only] => {
        if self.selected != Some(only.id) {
          self.select_region(only);
        }
      }
      _ => self.message = None,
    }
  }

  fn render_regions(&mut self, frame: &mut Frame, area: Rect) {
    let visible: Vec<Region> = self.visible_regions().into_iter().cloned().collect();
    ensure_valid_selection(&mut self.region_state, visible.len());

    let title = match self.regions.state() {
      QueryState::Loading => " Daerah (loading...) ".to_string(),
      _ => format!(" Daerah ({}) ", visible.len()),
    };
    let border = if self.focus == Focus::Regions { Color::Yellow } else { Color::Blue };
    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border));

    let payload_error = self
      .regions
      .data()
      .filter(|p| !p.success)
      .map(|p| p.error.clone().unwrap_or_else(|| "Gagal memuat data".to_string()));
    if let Some(error) = payload_error {
      let paragraph = Paragraph::new(format!("{}\nTekan r untuk mencoba lagi.", error))
        .style(Style::default().fg(Color::Red))
        .block(block);
      frame.render_widget(paragraph, area);
      return;
    }

    let width = area.width.saturating_sub(8) as usize;
    let items: Vec<ListItem> = visible
      .iter()
      .map(|region| {
        let style = if Some(region.id) == self.selected {
          Style::default().fg(Color::Yellow).bold()
        } else {
          Style::default()
        };
        ListItem::new(Line::from(Span::styled(
          truncate(&format!("{} {}", region.emoji, region.name), width),
          style,
        )))
      })
      .collect();
    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.region_state);
  }

  fn render_map(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Peta Makanan Daerah Indonesia ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Green));
    let Some(viewport) = self.map.viewport() else {
      frame.render_widget(block, area);
      return;
    };

    let bounds = viewport.bounds();
    let markers = self.map.markers();
    let selected = self.selected;
    let canvas = Canvas::default()
      .block(block.title_bottom(format!(" zoom {} ", viewport.zoom)))
      .marker(symbols::Marker::Braille)
      .x_bounds([bounds.west, bounds.east])
      .y_bounds([bounds.south, bounds.north])
      .paint(move |ctx| {
        ctx.draw(&Map {
          resolution: MapResolution::High,
          color: Color::DarkGray,
        });
        ctx.layer();
        for marker in markers {
          let is_selected = selected.is_some() && marker.region_id == selected;
          let span = if is_selected {
            Span::styled(format!("● {}", marker.title), Style::default().fg(Color::Yellow).bold())
          } else {
            Span::styled("●", Style::default().fg(Color::Red))
          };
          ctx.print(marker.lng, marker.lat, span);
        }
      });
    frame.render_widget(canvas, area);
  }

  fn render_foods(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.region_foods().len();
    ensure_valid_selection(&mut self.food_state, len);

    let loading = self.foods.as_ref().is_some_and(|q| q.is_loading());
    let title = if loading {
      " Makanan di Daerah yang Dipilih (loading...) ".to_string()
    } else {
      " Makanan di Daerah yang Dipilih ".to_string()
    };
    let border = if self.focus == Focus::Foods { Color::Yellow } else { Color::Blue };
    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border));

    let placeholder = if let Some(message) = self.message {
      Some(message.to_string())
    } else if self.foods.is_none() {
      Some("Pilih daerah untuk melihat makanannya".to_string())
    } else if len == 0 && !loading {
      Some(NO_FOODS.to_string())
    } else {
      None
    };
    if let Some(text) = placeholder {
      frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)).block(block),
        area,
      );
      return;
    }

    let width = area.width.saturating_sub(20) as usize;
    let items: Vec<ListItem> = self
      .region_foods()
      .iter()
      .map(|food| {
        let rating = food
          .rating
          .map(|r| format!("{:.1}", r))
          .unwrap_or_else(|| "N/A".to_string());
        ListItem::new(Line::from(vec![
          Span::styled(format!("⭐ {:<4} ", rating), Style::default().fg(Color::Yellow)),
          Span::styled(food.name.clone(), Style::default().bold()),
          Span::styled(
            format!("  {}", truncate(food.description.as_deref().unwrap_or(""), width)),
            Style::default().fg(Color::Gray),
          ),
        ]))
      })
      .collect();
    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.food_state);
  }
}

impl View for ExplorerView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(term)) => {
        self.on_search_changed(&term);
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted(_)) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Tab => {
        self.focus = match self.focus {
          Focus::Regions if self.foods.is_some() => Focus::Foods,
          _ => Focus::Regions,
        };
      }
      KeyCode::Char('j') | KeyCode::Down => match self.focus {
        Focus::Regions => self.region_state.select_next(),
        Focus::Foods => self.food_state.select_next(),
      },
      KeyCode::Char('k') | KeyCode::Up => match self.focus {
        Focus::Regions => self.region_state.select_previous(),
        Focus::Foods => self.food_state.select_previous(),
      },
      KeyCode::Enter => match self.focus {
        Focus::Regions => {
          let region = self
            .region_state
            .selected()
            .and_then(|idx| self.visible_regions().get(idx).map(|r| (*r).clone()));
          if let Some(region) = region {
            self.select_region(&region);
          }
        }
        Focus::Foods => {
          let food = self
            .food_state
            .selected()
            .and_then(|idx| self.region_foods().get(idx))
            .cloned();
          if let Some(food) = food {
            return ViewAction::Push(Box::new(FoodDetailView::new(food, self.services.clone())));
          }
        }
      },
      KeyCode::Char('+') | KeyCode::Char('=') => self.map.zoom_by(1),
      KeyCode::Char('-') => self.map.zoom_by(-1),
      KeyCode::Char('b') => self.map.fit_bounds(),
      KeyCode::Char('r') => {
        self.markers_placed = false;
        self.regions.refetch();
      }
      KeyCode::Char('q') | KeyCode::Esc => {
        if self.selected.is_some() || self.message.is_some() {
          self.clear_selection();
          self.map.fit_bounds();
        } else {
          return ViewAction::Pop;
        }
      }
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let rows = Layout::vertical([Constraint::Percentage(65), Constraint::Percentage(35)]).split(area);
    let top = Layout::horizontal([Constraint::Length(30), Constraint::Min(20)]).split(rows[0]);

    self.render_regions(frame, top[0]);
    self.render_map(frame, top[1]);
    self.render_foods(frame, rows[1]);
    self.search.render_overlay(frame, top[0]);
  }

  fn breadcrumb_label(&self) -> String {
    let name = self
      .selected
      .and_then(|id| self.all_regions().iter().find(|r| r.id == id))
      .map(|r| r.name.clone());
    match name {
      Some(name) => format!("{} [{}]", Page::Explorer.label(), name),
      None => Page::Explorer.label().to_string(),
    }
  }

  fn page(&self) -> Page {
    Page::Explorer
  }

  fn captures_input(&self) -> bool {
    self.search.is_active()
  }

  fn tick(&mut self) {
    if self.regions.poll() || (!self.markers_placed && self.regions.data().is_some()) {
      self.place_markers();
    }
    if let Some(foods) = self.foods.as_mut() {
      foods.poll();
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("/", "cari daerah").with_priority(10),
      Shortcut::new("Enter", "pilih").with_priority(20),
      Shortcut::new("Tab", "fokus").with_priority(30),
      Shortcut::new("+/-", "zoom").with_priority(40),
      Shortcut::new("b", "fit").with_priority(50),
      Shortcut::new("q", "back").with_priority(90),
    ]
  }
}
