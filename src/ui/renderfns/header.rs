use crate::commands::Page;
use crate::ui::view::Shortcut;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Two rows: brand with page tabs, then the active view's shortcuts.
pub fn draw_header(frame: &mut Frame, area: Rect, active: Page, api_host: &str, shortcuts: &[Shortcut]) {
  let mut tabs = vec![
    Span::styled(" 🍜 Cita Rasa ", Style::default().fg(Color::Yellow).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
  ];
  for (i, page) in Page::ALL.iter().enumerate() {
    let style = if *page == active {
      Style::default().fg(Color::Black).bg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::White)
    };
    tabs.push(Span::raw(" "));
    tabs.push(Span::styled(format!("{}", i + 1), Style::default().fg(Color::Cyan)));
    tabs.push(Span::styled(format!(" {} ", page.label()), style));
  }
  tabs.push(Span::styled("  │ ", Style::default().fg(Color::DarkGray)));
  tabs.push(Span::styled(api_host.to_string(), Style::default().fg(Color::DarkGray)));

  let mut sorted: Vec<&Shortcut> = shortcuts.iter().collect();
  sorted.sort_by_key(|s| s.priority);
  let mut hints = vec![Span::raw(" ")];
  for shortcut in sorted {
    hints.push(Span::styled(format!("<{}>", shortcut.key), Style::default().fg(Color::Cyan)));
    hints.push(Span::styled(format!(" {}   ", shortcut.label), Style::default().fg(Color::DarkGray)));
  }

  let paragraph =
    Paragraph::new(vec![Line::from(tabs), Line::from(hints)]).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Host part of the API base URL, for display.
pub fn api_host(base_url: &str) -> &str {
  url_host(base_url).unwrap_or(base_url)
}

fn url_host(base_url: &str) -> Option<&str> {
  let rest = base_url.split_once("://").map(|(_, r)| r)?;
  rest.split('/').next().filter(|h| !h.is_empty())
}
