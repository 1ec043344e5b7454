//! Prompt building and recommendations on top of the API client.
//!
//! Unlike the raw client, nothing here returns an error: NLP failures turn
//! into an apology message and data helpers return empty results.

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::error;

use crate::api::types::{Food, FoodId, NlpContext, NlpKind, NlpResponse, RegionId};
use crate::api::ApiService;
use crate::foods::{sort_foods, SortOrder};

pub const APOLOGY: &str = "Maaf, terjadi kesalahan saat memproses permintaan Anda.";

const MAX_RECOMMENDATIONS: usize = 5;
const MAX_SIMILAR: usize = 3;

/// Source selection for `get_recommendations`: a region wins over a
/// category, and with neither every food is considered.
#[derive(Debug, Clone, Default)]
pub struct RecommendationQuery {
  pub region_id: Option<RegionId>,
  pub category_id: Option<i64>,
  pub min_rating: f64,
}

/// Free-text preferences for an AI recommendation prompt.
#[derive(Debug, Clone, Default)]
pub struct TastePreferences {
  pub taste: Option<String>,
  pub region: Option<String>,
  pub category: Option<String>,
}

#[derive(Clone)]
pub struct AiService {
  api: ApiService,
}

impl AiService {
  pub fn new(api: ApiService) -> Self {
    Self { api }
  }

  pub async fn generate_nlp_response(
    &self,
    prompt: &str,
    kind: NlpKind,
    context: NlpContext,
  ) -> NlpResponse {
    match self.api.generate_nlp_response(prompt, kind, &context).await {
      Ok(response) => response,
      Err(e) => {
        error!("Error generating NLP response: {}", e);
        NlpResponse {
          response: APOLOGY.to_string(),
          kind,
        }
      }
    }
  }

  /// General chat, optionally scoped to the food being viewed.
  pub async fn chat_about_food(&self, message: &str, food: Option<&Food>) -> NlpResponse {
    let context = food
      .map(|f| NlpContext {
        food_name: Some(f.name.clone()),
        region: Some(f.region.clone()).filter(|r| !r.is_empty()),
        category: f.category.clone(),
        taste: None,
      })
      .unwrap_or_default();
    self
      .generate_nlp_response(message, NlpKind::General, context)
      .await
  }

  pub async fn get_food_description(&self, food_name: &str) -> NlpResponse {
    self
      .generate_nlp_response(
        &format!("Jelaskan tentang makanan {}", food_name),
        NlpKind::FoodDescription,
        food_context(food_name),
      )
      .await
  }

  pub async fn get_ai_recommendation(&self, prefs: &TastePreferences) -> NlpResponse {
    let context = NlpContext {
      food_name: None,
      region: prefs.region.clone(),
      category: prefs.category.clone(),
      taste: prefs.taste.clone(),
    };
    self
      .generate_nlp_response(
        &recommendation_prompt(prefs),
        NlpKind::Recommendation,
        context,
      )
      .await
  }

  pub async fn get_recipe(&self, food_name: &str) -> NlpResponse {
    self
      .generate_nlp_response(
        &format!("Bagaimana cara membuat {}?", food_name),
        NlpKind::Recipe,
        food_context(food_name),
      )
      .await
  }

  pub async fn get_cultural_info(&self, food_name: &str, region: &str) -> NlpResponse {
    let context = NlpContext {
      region: Some(region.to_string()),
      ..food_context(food_name)
    };
    self
      .generate_nlp_response(
        &format!("Ceritakan tentang sejarah dan budaya {} dari {}", food_name, region),
        NlpKind::Cultural,
        context,
      )
      .await
  }

  /// Best rated foods for the query, at most five.
  pub async fn get_recommendations(&self, query: &RecommendationQuery) -> Vec<Food> {
    let payload = if let Some(region_id) = query.region_id {
      self.api.get_foods_by_region(region_id).await
    } else if let Some(category_id) = query.category_id {
      self.api.get_foods_by_category(category_id).await
    } else {
      self.api.search_foods("").await
    };
    if !payload.success {
      error!(
        "Error getting recommendations: {}",
        payload.error.unwrap_or_default()
      );
      return Vec::new();
    }

    let source = if query.region_id.is_some() || query.category_id.is_some() {
      payload.foods
    } else {
      payload.results
    };
    let mut foods: Vec<Food> = source
      .into_iter()
      .filter(|f| f.rating_or_zero() >= query.min_rating)
      .collect();
    sort_foods(&mut foods, SortOrder::RatingDesc);
    foods.truncate(MAX_RECOMMENDATIONS);
    foods
  }

  /// Other foods from the same region, at most three.
  pub async fn get_similar_foods(&self, food_id: FoodId) -> Vec<Food> {
    let all = self.api.search_foods("").await.results;
    let Some(region) = all.iter().find(|f| f.id == food_id).map(|f| f.region.clone()) else {
      return Vec::new();
    };

    all
      .into_iter()
      .filter(|f| f.id != food_id && f.region == region)
      .take(MAX_SIMILAR)
      .collect()
  }

  pub async fn get_random_recommendation(&self) -> Option<Food> {
    let foods = self.api.search_foods("").await.results;
    pick_random(&foods, &mut rand::rng())
  }
}

fn food_context(food_name: &str) -> NlpContext {
  NlpContext {
    food_name: Some(food_name.to_string()),
    ..Default::default()
  }
}

fn recommendation_prompt(prefs: &TastePreferences) -> String {
  let mut prompt = String::from("Rekomendasikan makanan");
  if let Some(region) = prefs.region.as_deref().filter(|s| !s.is_empty()) {
    prompt.push_str(&format!(" dari {}", region));
  }
  if let Some(category) = prefs.category.as_deref().filter(|s| !s.is_empty()) {
    prompt.push_str(&format!(" kategori {}", category));
  }
  if let Some(taste) = prefs.taste.as_deref().filter(|s| !s.is_empty()) {
    prompt.push_str(&format!(" dengan rasa {}", taste));
  }
  prompt
}

fn pick_random<R: Rng + ?Sized>(foods: &[Food], rng: &mut R) -> Option<Food> {
  foods.choose(rng).cloned()
}
