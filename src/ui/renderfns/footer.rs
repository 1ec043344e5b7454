use chrono::Datelike;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const CONTACT_EMAIL: &str = "info@citarasa.id";
const CONTACT_PHONE: &str = "+62 123 4567 8900";

/// Breadcrumb on the left, brand and contact details on the right.
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String]) {
  let mut spans = vec![Span::raw(" ")];
  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }
    let style = if i + 1 == breadcrumb.len() {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };
    spans.push(Span::styled(part.clone(), style));
  }

  let chunks = Layout::horizontal([Constraint::Min(10), Constraint::Length(64)]).split(area);
  frame.render_widget(
    Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black)),
    chunks[0],
  );
  frame.render_widget(
    Paragraph::new(static_footer(chrono::Local::now().year()))
      .alignment(Alignment::Right)
      .style(Style::default().fg(Color::DarkGray).bg(Color::Black)),
    chunks[1],
  );
}

fn static_footer(year: i32) -> String {
  format!("© {} Cita Rasa · {} · {} ", year, CONTACT_EMAIL, CONTACT_PHONE)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_static_footer_carries_year_and_contacts() {
    let text = static_footer(2025);
    assert!(text.starts_with("© 2025 Cita Rasa"));
    assert!(text.contains("info@citarasa.id"));
    assert!(text.contains("+62 123 4567 8900"));
  }
}
