//! Serde types matching the food/region API payloads.
//!
//! Everything the server may omit is defaulted so a sparse record still
//! decodes. Anything that fails to decode is turned into the fallback
//! payload by the client.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type FoodId = i64;
pub type RegionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "easy" => Some(Difficulty::Easy),
      "medium" => Some(Difficulty::Medium),
      "hard" => Some(Difficulty::Hard),
      _ => None,
    }
  }
}

/// Unknown difficulty strings become None instead of failing the record.
fn deserialize_difficulty<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
  D: Deserializer<'de>,
{
  let v: Option<String> = Option::deserialize(deserializer)?;
  Ok(v.as_deref().and_then(Difficulty::parse))
}

/// Explicit `null` decodes the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_emoji<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  let v: Option<String> = Option::deserialize(deserializer)?;
  Ok(v.filter(|e| !e.is_empty()).unwrap_or_else(default_emoji))
}

/// A dish as returned by list and search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
  pub id: FoodId,
  pub name: String,
  /// Region name, not id
  #[serde(default, deserialize_with = "null_as_default")]
  pub region: String,
  #[serde(default)]
  pub region_id: Option<RegionId>,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  /// 0 to 5, missing is treated as 0 when ranking
  #[serde(default)]
  pub rating: Option<f64>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub ingredients: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub taste_profile: Vec<String>,
  #[serde(default)]
  pub image_url: Option<String>,
  /// Minutes
  #[serde(default)]
  pub preparation_time: Option<u32>,
  #[serde(default, deserialize_with = "deserialize_difficulty")]
  pub difficulty_level: Option<Difficulty>,
  /// Legacy field, absent from current payloads
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price: Option<Value>,
}

impl Food {
  pub fn rating_or_zero(&self) -> f64 {
    self.rating.unwrap_or(0.0)
  }

  /// Numeric price, if the record carries a parseable one.
  pub fn price_value(&self) -> Option<f64> {
    let price = match self.price.as_ref()? {
      Value::Number(n) => n.as_f64(),
      Value::String(s) => s.trim().parse::<f64>().ok(),
      _ => None,
    }?;
    price.is_finite().then_some(price)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
  pub id: RegionId,
  pub name: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub category: String,
  #[serde(default, alias = "lat")]
  pub latitude: Option<f64>,
  #[serde(default, alias = "lng")]
  pub longitude: Option<f64>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default = "default_emoji", deserialize_with = "deserialize_emoji")]
  pub emoji: String,
}

fn default_emoji() -> String {
  "📍".to_string()
}

impl Region {
  pub fn coordinates(&self) -> Option<(f64, f64)> {
    Some((self.latitude?, self.longitude?))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub icon: Option<String>,
}

fn default_true() -> bool {
  true
}

/// Uniform response shape for read endpoints.
///
/// A failed read is not an `Err`: it arrives as a payload with
/// `success == false` and an `error` message, and empty lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiPayload {
  #[serde(default, deserialize_with = "null_as_default")]
  pub regions: Vec<Region>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub categories: Vec<Category>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub foods: Vec<Food>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub results: Vec<Food>,
  #[serde(default)]
  pub region: Option<Region>,
  #[serde(default)]
  pub category: Option<Category>,
  #[serde(default)]
  pub food: Option<Food>,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default = "default_true")]
  pub success: bool,
  #[serde(default)]
  pub error: Option<String>,
}

impl ApiPayload {
  /// The fixed shape returned for any failed GET.
  pub fn fallback(error: impl Into<String>) -> Self {
    Self {
      regions: Vec::new(),
      categories: Vec::new(),
      foods: Vec::new(),
      results: Vec::new(),
      region: None,
      category: None,
      food: None,
      message: None,
      success: false,
      error: Some(error.into()),
    }
  }

  /// JSON form of the fallback, as handed out by the raw request path.
  pub fn fallback_value(error: &str) -> Value {
    serde_json::json!({
      "regions": [],
      "categories": [],
      "foods": [],
      "results": [],
      "success": false,
      "error": error,
    })
  }

  /// Decode a raw payload; undecodable bodies become the fallback.
  pub fn from_value(value: Value) -> Self {
    serde_json::from_value(value)
      .unwrap_or_else(|e| Self::fallback(format!("Unexpected response shape: {}", e)))
  }

  pub fn is_success(&self) -> bool {
    self.success
  }
}

/// Body for creating or updating a food.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodInput {
  pub name: String,
  pub region_id: RegionId,
  pub description: String,
  pub ingredients: Vec<String>,
  pub taste_profile: Vec<String>,
  pub rating: f64,
  pub image_url: Option<String>,
  pub preparation_time: Option<u32>,
  pub difficulty_level: Difficulty,
}

/// Body for creating or updating a region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionInput {
  pub name: String,
  pub category: String,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub description: String,
  pub emoji: String,
}

/// Kind of prompt sent to the NLP endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NlpKind {
  General,
  Recommendation,
  Recipe,
  Cultural,
  FoodDescription,
}

impl NlpKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      NlpKind::General => "general",
      NlpKind::Recommendation => "recommendation",
      NlpKind::Recipe => "recipe",
      NlpKind::Cultural => "cultural",
      NlpKind::FoodDescription => "food_description",
    }
  }
}

/// Contextual fields attached to a prompt; absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NlpContext {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub food_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub region: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub taste: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NlpRequest<'a> {
  pub prompt: &'a str,
  #[serde(rename = "type")]
  pub kind: NlpKind,
  pub context: &'a NlpContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpResponse {
  pub response: String,
  #[serde(rename = "type")]
  pub kind: NlpKind,
}

/// Wire form of the NLP answer; the server may omit or rename the type.
#[derive(Debug, Deserialize)]
pub struct ApiNlpResponse {
  #[serde(default)]
  pub response: Option<String>,
  #[serde(default, rename = "type")]
  pub kind: Option<String>,
}
