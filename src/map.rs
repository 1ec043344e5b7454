//! Map state for the explorer: a viewport and a set of region markers.
//!
//! Rendering lives in the explorer view, which projects `Viewport::bounds`
//! onto a ratatui canvas. This module only tracks what is shown where.

use tracing::{debug, error};

use crate::api::types::{Region, RegionId};

pub const DEFAULT_CENTER: (f64, f64) = (-2.5489, 118.0149);
pub const DEFAULT_ZOOM: u8 = 5;
pub const FOCUS_ZOOM: u8 = 8;
pub const MAX_ZOOM: u8 = 18;

/// Fraction of the marker extent added on every side by `fit_bounds`.
const FIT_PADDING: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
  pub south: f64,
  pub west: f64,
  pub north: f64,
  pub east: f64,
}

impl Bounds {
  fn around(points: impl Iterator<Item = (f64, f64)>) -> Option<Self> {
    points.fold(None, |acc: Option<Bounds>, (lat, lng)| {
      Some(match acc {
        None => Bounds {
          south: lat,
          west: lng,
          north: lat,
          east: lng,
        },
        Some(b) => Bounds {
          south: b.south.min(lat),
          west: b.west.min(lng),
          north: b.north.max(lat),
          east: b.east.max(lng),
        },
      })
    })
  }

  pub fn pad(&self, ratio: f64) -> Self {
    let dlat = (self.north - self.south) * ratio;
    let dlng = (self.east - self.west) * ratio;
    Bounds {
      south: self.south - dlat,
      west: self.west - dlng,
      north: self.north + dlat,
      east: self.east + dlng,
    }
  }

  pub fn center(&self) -> (f64, f64) {
    ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
  }

  pub fn contains(&self, lat: f64, lng: f64) -> bool {
    lat >= self.south && lat <= self.north && lng >= self.west && lng <= self.east
  }
}

/// What part of the world is on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
  pub center: (f64, f64),
  pub zoom: u8,
}

impl Viewport {
  /// Degrees of longitude visible at `zoom`. Zoom 0 is four world widths,
  /// each level halves it.
  pub fn lng_span(zoom: u8) -> f64 {
    360.0 * 4.0 / f64::from(1u32 << zoom.min(MAX_ZOOM))
  }

  pub fn lat_span(zoom: u8) -> f64 {
    Self::lng_span(zoom) / 2.0
  }

  pub fn bounds(&self) -> Bounds {
    let half_lat = Self::lat_span(self.zoom) / 2.0;
    let half_lng = Self::lng_span(self.zoom) / 2.0;
    Bounds {
      south: self.center.0 - half_lat,
      west: self.center.1 - half_lng,
      north: self.center.0 + half_lat,
      east: self.center.1 + half_lng,
    }
  }

  /// Tightest view that still shows all of `bounds`.
  fn fitting(bounds: &Bounds) -> Self {
    let height = bounds.north - bounds.south;
    let width = bounds.east - bounds.west;
    let zoom = (0..=MAX_ZOOM)
      .rev()
      .find(|z| Self::lat_span(*z) >= height && Self::lng_span(*z) >= width)
      .unwrap_or(0);
    Viewport {
      center: bounds.center(),
      zoom,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
  pub lat: f64,
  pub lng: f64,
  pub title: String,
  pub region_id: Option<RegionId>,
}

#[derive(Debug)]
struct MapState {
  viewport: Viewport,
  markers: Vec<Marker>,
}

#[derive(Debug, Default)]
pub struct MapService {
  state: Option<MapState>,
}

impl MapService {
  pub fn new() -> Self {
    Self::default()
  }

  /// (Re)create the map, dropping any previous markers.
  pub fn init_map(&mut self, center: Option<(f64, f64)>, zoom: Option<u8>) {
    self.state = Some(MapState {
      viewport: Viewport {
        center: center.unwrap_or(DEFAULT_CENTER),
        zoom: zoom.unwrap_or(DEFAULT_ZOOM).min(MAX_ZOOM),
      },
      markers: Vec::new(),
    });
    debug!("Map initialized");
  }

  fn state_mut(&mut self) -> Option<&mut MapState> {
    if self.state.is_none() {
      error!("Map not initialized");
    }
    self.state.as_mut()
  }

  pub fn add_marker(&mut self, marker: Marker) -> bool {
    match self.state_mut() {
      Some(state) => {
        state.markers.push(marker);
        true
      }
      None => false,
    }
  }

  /// One marker per region; regions without coordinates are skipped.
  pub fn add_multiple_markers(&mut self, regions: &[Region]) {
    for region in regions {
      let Some((lat, lng)) = region.coordinates() else {
        continue;
      };
      self.add_marker(Marker {
        lat,
        lng,
        title: region.name.clone(),
        region_id: Some(region.id),
      });
    }
  }

  pub fn clear_markers(&mut self) {
    if let Some(state) = self.state.as_mut() {
      state.markers.clear();
    }
  }

  pub fn set_center(&mut self, lat: f64, lng: f64, zoom: Option<u8>) {
    if let Some(state) = self.state_mut() {
      state.viewport = Viewport {
        center: (lat, lng),
        zoom: zoom.unwrap_or(FOCUS_ZOOM).min(MAX_ZOOM),
      };
    }
  }

  /// Frame all markers with some padding. No-op without markers.
  pub fn fit_bounds(&mut self) {
    let Some(state) = self.state.as_mut() else {
      return;
    };
    if let Some(bounds) = Bounds::around(state.markers.iter().map(|m| (m.lat, m.lng))) {
      state.viewport = Viewport::fitting(&bounds.pad(FIT_PADDING));
    }
  }

  pub fn zoom_by(&mut self, delta: i8) {
    if let Some(state) = self.state_mut() {
      let zoom = i16::from(state.viewport.zoom) + i16::from(delta);
      state.viewport.zoom = zoom.clamp(0, i16::from(MAX_ZOOM)) as u8;
    }
  }

  pub fn viewport(&self) -> Option<Viewport> {
    self.state.as_ref().map(|s| s.viewport)
  }

  pub fn markers(&self) -> &[Marker] {
    self
      .state
      .as_ref()
      .map(|s| s.markers.as_slice())
      .unwrap_or(&[])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn region(id: RegionId, name: &str, coords: Option<(f64, f64)>) -> Region {
    Region {
      id,
      name: name.to_string(),
      category: "Provinsi".to_string(),
      latitude: coords.map(|c| c.0),
      longitude: coords.map(|c| c.1),
      description: None,
      emoji: "📍".to_string(),
    }
  }

  #[test]
  fn test_operations_before_init_do_nothing() {
    let mut map = MapService::new();
    map.add_multiple_markers(&[region(1, "Bali", Some((-8.4, 115.2)))]);
    map.set_center(0.0, 0.0, None);
    map.fit_bounds();

    assert!(map.markers().is_empty());
    assert!(map.viewport().is_none());
  }

  #[test]
  fn test_init_uses_default_view() {
    let mut map = MapService::new();
    map.init_map(None, None);
    assert_eq!(
      map.viewport(),
      Some(Viewport {
        center: DEFAULT_CENTER,
        zoom: DEFAULT_ZOOM
      })
    );
  }

  #[test]
  fn test_reinit_drops_markers() {
    let mut map = MapService::new();
    map.init_map(None, None);
    map.add_multiple_markers(&[region(1, "Bali", Some((-8.4, 115.2)))]);
    map.init_map(None, None);
    assert!(map.markers().is_empty());
  }

  #[test]
  fn test_regions_without_coordinates_are_skipped() {
    let mut map = MapService::new();
    map.init_map(None, None);
    map.add_multiple_markers(&[
      region(1, "Bali", Some((-8.4, 115.2))),
      region(2, "Entah", None),
    ]);

    assert_eq!(map.markers().len(), 1);
    assert_eq!(map.markers()[0].region_id, Some(1));

    map.clear_markers();
    assert!(map.markers().is_empty());
  }

  #[test]
  fn test_set_center_defaults_to_focus_zoom() {
    let mut map = MapService::new();
    map.init_map(None, None);
    map.set_center(-7.25, 112.75, None);
    assert_eq!(map.viewport().unwrap().zoom, FOCUS_ZOOM);
    assert_eq!(map.viewport().unwrap().center, (-7.25, 112.75));
  }

  #[test]
  fn test_fit_bounds_frames_all_markers() {
    let mut map = MapService::new();
    map.init_map(None, Some(2));
    map.add_multiple_markers(&[
      region(1, "Aceh", Some((4.69, 96.74))),
      region(2, "Papua", Some((-4.27, 138.08))),
    ]);
    map.fit_bounds();

    let viewport = map.viewport().unwrap();
    let bounds = viewport.bounds();
    for marker in map.markers() {
      assert!(bounds.contains(marker.lat, marker.lng));
    }
    // 41 degrees wide plus padding needs the 90 degree view
    assert_eq!(viewport.zoom, 4);
  }

  #[test]
  fn test_fit_bounds_without_markers_keeps_view() {
    let mut map = MapService::new();
    map.init_map(None, None);
    map.fit_bounds();
    assert_eq!(map.viewport().unwrap().zoom, DEFAULT_ZOOM);
  }

  #[test]
  fn test_zoom_is_clamped() {
    let mut map = MapService::new();
    map.init_map(None, Some(MAX_ZOOM));
    map.zoom_by(3);
    assert_eq!(map.viewport().unwrap().zoom, MAX_ZOOM);
    map.zoom_by(-30);
    assert_eq!(map.viewport().unwrap().zoom, 0);
  }
}
