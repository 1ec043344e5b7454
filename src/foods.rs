//! In-memory filtering and ordering over the last fetched food list.
//!
//! Nothing here talks to the network: views fetch, hand the result to a
//! `FoodCatalog`, and re-filter locally as the user changes options.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::api::types::{Food, FoodId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
  /// Server order
  #[default]
  #[serde(rename = "default")]
  Default,
  #[serde(rename = "name-asc")]
  NameAsc,
  #[serde(rename = "name-desc")]
  NameDesc,
  #[serde(rename = "rating-desc")]
  RatingDesc,
  #[serde(rename = "rating-asc")]
  RatingAsc,
}

impl SortOrder {
  pub const ALL: [SortOrder; 5] = [
    SortOrder::Default,
    SortOrder::NameAsc,
    SortOrder::NameDesc,
    SortOrder::RatingDesc,
    SortOrder::RatingAsc,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      SortOrder::Default => "Relevansi",
      SortOrder::NameAsc => "Nama (A-Z)",
      SortOrder::NameDesc => "Nama (Z-A)",
      SortOrder::RatingDesc => "Rating Tertinggi",
      SortOrder::RatingAsc => "Rating Terendah",
    }
  }

  pub fn next(&self) -> Self {
    let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }
}

/// `None` means "all". Region and category match exactly, the query is a
/// case-insensitive substring of name or description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoodFilter {
  pub query: Option<String>,
  pub region: Option<String>,
  pub category: Option<String>,
}

impl FoodFilter {
  pub fn matches(&self, food: &Food) -> bool {
    let match_query = self.query.as_deref().map_or(true, |q| {
      let q = q.trim().to_lowercase();
      q.is_empty()
        || food.name.to_lowercase().contains(&q)
        || food
          .description
          .as_deref()
          .is_some_and(|d| d.to_lowercase().contains(&q))
    });
    let match_region = self.region.as_ref().map_or(true, |r| &food.region == r);
    let match_category = self
      .category
      .as_ref()
      .map_or(true, |c| food.category.as_ref() == Some(c));
    match_query && match_region && match_category
  }
}

/// Case-insensitive ordering with a case-sensitive tie break, so "soto"
/// and "Soto" sort together but deterministically.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
  a.to_lowercase()
    .cmp(&b.to_lowercase())
    .then_with(|| a.cmp(b))
}

fn compare_rating(a: &Food, b: &Food) -> Ordering {
  a.rating_or_zero()
    .partial_cmp(&b.rating_or_zero())
    .unwrap_or(Ordering::Equal)
}

/// Sort in place. Stable, so equal keys keep server order.
pub fn sort_foods(foods: &mut [Food], order: SortOrder) {
  match order {
    SortOrder::Default => {}
    SortOrder::NameAsc => foods.sort_by(|a, b| locale_compare(&a.name, &b.name)),
    SortOrder::NameDesc => foods.sort_by(|a, b| locale_compare(&b.name, &a.name)),
    SortOrder::RatingDesc => foods.sort_by(|a, b| compare_rating(b, a)),
    SortOrder::RatingAsc => foods.sort_by(compare_rating),
  }
}

#[derive(Debug, Clone, Default)]
pub struct FoodCatalog {
  foods: Vec<Food>,
}

impl FoodCatalog {
  pub fn new(foods: Vec<Food>) -> Self {
    Self { foods }
  }

  /// Swap in a freshly fetched result set.
  pub fn replace(&mut self, foods: Vec<Food>) {
    self.foods = foods;
  }

  pub fn foods(&self) -> &[Food] {
    &self.foods
  }

  pub fn len(&self) -> usize {
    self.foods.len()
  }

  pub fn is_empty(&self) -> bool {
    self.foods.is_empty()
  }

  pub fn get_food_by_id(&self, id: FoodId) -> Option<&Food> {
    self.foods.iter().find(|f| f.id == id)
  }

  /// Distinct region names in first-seen order.
  pub fn regions(&self) -> Vec<String> {
    distinct(self.foods.iter().map(|f| f.region.clone()))
  }

  /// Distinct category names in first-seen order.
  pub fn categories(&self) -> Vec<String> {
    distinct(self.foods.iter().filter_map(|f| f.category.clone()))
  }

  pub fn filter(&self, filter: &FoodFilter) -> Vec<Food> {
    self
      .foods
      .iter()
      .filter(|f| filter.matches(f))
      .cloned()
      .collect()
  }

  #[allow(dead_code)]
  pub fn sorted(&self, order: SortOrder) -> Vec<Food> {
    let mut foods = self.foods.clone();
    sort_foods(&mut foods, order);
    foods
  }

  /// Filter then sort, leaving the catalog untouched.
  pub fn view(&self, filter: &FoodFilter, order: SortOrder) -> Vec<Food> {
    let mut foods = self.filter(filter);
    sort_foods(&mut foods, order);
    foods
  }

  #[allow(dead_code)]
  pub fn sort_by_name(&self, ascending: bool) -> Vec<Food> {
    let order = if ascending {
      SortOrder::NameAsc
    } else {
      SortOrder::NameDesc
    };
    self.view(&FoodFilter::default(), order)
  }

  /// Foods with a numeric price inside `[min, max]`. Records without a
  /// parseable price never match.
  #[allow(dead_code)]
  pub fn filter_by_price(&self, min: f64, max: f64) -> Vec<Food> {
    self
      .foods
      .iter()
      .filter(|f| f.price_value().is_some_and(|p| p >= min && p <= max))
      .cloned()
      .collect()
  }

  /// Order by numeric price; records without one go last either way.
  #[allow(dead_code)]
  pub fn sort_by_price(&self, ascending: bool) -> Vec<Food> {
    let mut foods = self.foods.clone();
    foods.sort_by(|a, b| match (a.price_value(), b.price_value()) {
      (Some(pa), Some(pb)) => {
        let ord = pa.partial_cmp(&pb).unwrap_or(Ordering::Equal);
        if ascending {
          ord
        } else {
          ord.reverse()
        }
      }
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => Ordering::Equal,
    });
    foods
  }
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();
  for v in values {
    if !v.is_empty() && !out.contains(&v) {
      out.push(v);
    }
  }
  out
}

#[cfg(test)]
pub(crate) fn food(id: FoodId, name: &str, region: &str, rating: Option<f64>) -> Food {
  Food {
    id,
    name: name.to_string(),
    region: region.to_string(),
    region_id: None,
    category: None,
    description: None,
    rating,
    ingredients: Vec::new(),
    taste_profile: Vec::new(),
    image_url: None,
    preparation_time: None,
    difficulty_level: None,
    price: None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn names(foods: &[Food]) -> Vec<&str> {
    foods.iter().map(|f| f.name.as_str()).collect()
  }

  fn catalog() -> FoodCatalog {
    FoodCatalog::new(vec![
      food(1, "Soto", "Jawa Timur", Some(4.5)),
      food(2, "Rawon", "Jawa Timur", Some(4.8)),
    ])
  }

  #[test]
  fn test_sort_by_rating_desc() {
    let sorted = catalog().sorted(SortOrder::RatingDesc);
    assert_eq!(names(&sorted), vec!["Rawon", "Soto"]);
  }

  #[test]
  fn test_sort_by_name_asc() {
    let sorted = catalog().view(&FoodFilter::default(), SortOrder::NameAsc);
    assert_eq!(names(&sorted), vec!["Rawon", "Soto"]);
    assert_eq!(names(&catalog().sort_by_name(false)), vec!["Soto", "Rawon"]);
  }

  #[test]
  fn test_missing_rating_sorts_as_zero() {
    let catalog = FoodCatalog::new(vec![
      food(1, "Gudeg", "Yogyakarta", None),
      food(2, "Pempek", "Sumatera Selatan", Some(0.5)),
    ]);
    let sorted = catalog.view(&FoodFilter::default(), SortOrder::RatingAsc);
    assert_eq!(names(&sorted), vec!["Gudeg", "Pempek"]);
  }

  #[test]
  fn test_name_sort_ignores_case() {
    let catalog = FoodCatalog::new(vec![
      food(1, "soto", "A", None),
      food(2, "Rendang", "B", None),
      food(3, "ayam betutu", "C", None),
    ]);
    let sorted = catalog.view(&FoodFilter::default(), SortOrder::NameAsc);
    assert_eq!(names(&sorted), vec!["ayam betutu", "Rendang", "soto"]);
  }

  #[test]
  fn test_default_order_is_server_order() {
    let sorted = catalog().view(&FoodFilter::default(), SortOrder::Default);
    assert_eq!(names(&sorted), vec!["Soto", "Rawon"]);
  }

  #[test]
  fn test_filter_by_region_and_category() {
    let mut rendang = food(3, "Rendang", "Sumatera Barat", Some(4.9));
    rendang.category = Some("Makanan Utama".to_string());
    let mut catalog = catalog();
    catalog.replace(vec![
      food(1, "Soto", "Jawa Timur", Some(4.5)),
      rendang,
    ]);

    let by_region = catalog.view(
      &FoodFilter {
        region: Some("Jawa Timur".to_string()),
        ..Default::default()
      },
      SortOrder::Default,
    );
    assert_eq!(names(&by_region), vec!["Soto"]);

    let by_category = catalog.view(
      &FoodFilter {
        category: Some("Makanan Utama".to_string()),
        ..Default::default()
      },
      SortOrder::Default,
    );
    assert_eq!(names(&by_category), vec!["Rendang"]);

    let none = catalog.view(
      &FoodFilter {
        region: Some("Jawa Timur".to_string()),
        category: Some("Makanan Utama".to_string()),
        ..Default::default()
      },
      SortOrder::Default,
    );
    assert!(none.is_empty());
  }

  #[test]
  fn test_query_matches_name_or_description() {
    let mut gudeg = food(3, "Gudeg", "Yogyakarta", None);
    gudeg.description = Some("Nangka muda dimasak santan".to_string());
    let catalog = FoodCatalog::new(vec![food(1, "Soto Ayam", "Jawa Timur", None), gudeg]);

    let filter = |q: &str| FoodFilter {
      query: Some(q.to_string()),
      ..Default::default()
    };
    assert_eq!(names(&catalog.filter(&filter("soto"))), vec!["Soto Ayam"]);
    assert_eq!(names(&catalog.filter(&filter("SANTAN"))), vec!["Gudeg"]);
    assert_eq!(catalog.filter(&filter("  ")).len(), 2);
  }

  #[test]
  fn test_price_helpers_skip_missing_prices() {
    let mut a = food(1, "A", "X", None);
    a.price = Some(json!("20000"));
    let mut b = food(2, "B", "X", None);
    b.price = Some(json!("gratis"));
    let mut c = food(3, "C", "X", None);
    c.price = Some(json!(5000));
    let catalog = FoodCatalog::new(vec![a, b, c]);

    assert_eq!(names(&catalog.filter_by_price(0.0, 10000.0)), vec!["C"]);
    assert_eq!(names(&catalog.sort_by_price(true)), vec!["C", "A", "B"]);
    assert_eq!(names(&catalog.sort_by_price(false)), vec!["A", "C", "B"]);
  }

  #[test]
  fn test_lookup_and_distinct_values() {
    let catalog = catalog();
    assert_eq!(catalog.get_food_by_id(2).map(|f| f.name.as_str()), Some("Rawon"));
    assert!(catalog.get_food_by_id(99).is_none());
    assert_eq!(catalog.regions(), vec!["Jawa Timur"]);
    assert!(catalog.categories().is_empty());
  }

  #[test]
  fn test_sort_order_cycles_and_serializes() {
    assert_eq!(SortOrder::RatingAsc.next(), SortOrder::Default);
    assert_eq!(
      serde_json::to_value(SortOrder::RatingDesc).unwrap(),
      json!("rating-desc")
    );
  }
}
