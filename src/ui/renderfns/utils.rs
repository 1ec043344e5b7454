use crate::api::types::Difficulty;
use ratatui::prelude::Color;

/// Truncate to `max_len` characters, ending with "..." when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Five-star bar for a 0-5 rating, rounded to the nearest star.
pub fn rating_stars(rating: Option<f64>) -> String {
  let filled = rating.unwrap_or(0.0).clamp(0.0, 5.0).round() as usize;
  format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub fn difficulty_color(difficulty: Option<Difficulty>) -> Color {
  match difficulty {
    Some(Difficulty::Easy) => Color::Green,
    Some(Difficulty::Medium) => Color::Yellow,
    Some(Difficulty::Hard) => Color::Red,
    None => Color::DarkGray,
  }
}

/// `percent` of `total`, computed wide so large terminals cannot overflow.
pub fn percent_of(total: u16, percent: u16) -> u16 {
  (u32::from(total) * u32::from(percent) / 100) as u16
}
