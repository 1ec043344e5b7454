//! Pages, `:` commands and autocomplete.

/// Top-level pages reachable from the navbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Page {
  #[default]
  Home,
  Explorer,
  Directory,
  AiChat,
  About,
  Admin,
}

impl Page {
  /// Navbar order; digit keys 1-6 map onto it.
  pub const ALL: [Page; 6] = [
    Page::Home,
    Page::Explorer,
    Page::Directory,
    Page::AiChat,
    Page::About,
    Page::Admin,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      Page::Home => "home",
      Page::Explorer => "explorer",
      Page::Directory => "directory",
      Page::AiChat => "ai-chat",
      Page::About => "about",
      Page::Admin => "admin",
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Page::Home => "Beranda",
      Page::Explorer => "Jelajahi",
      Page::Directory => "Direktori",
      Page::AiChat => "Chat AI",
      Page::About => "Tentang",
      Page::Admin => "Admin",
    }
  }

  pub fn from_name(name: &str) -> Option<Page> {
    Page::ALL.into_iter().find(|p| p.name() == name)
  }

  /// Page for a navbar digit, `'1'` being the first tab.
  pub fn from_digit(c: char) -> Option<Page> {
    let idx = c.to_digit(10)? as usize;
    idx.checked_sub(1).and_then(|i| Page::ALL.get(i).copied())
  }
}

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

pub const COMMANDS: &[Command] = &[
  Command {
    name: "home",
    aliases: &["h", "beranda"],
    description: "Landing page",
  },
  Command {
    name: "explorer",
    aliases: &["e", "map", "peta"],
    description: "Regional food map",
  },
  Command {
    name: "directory",
    aliases: &["d", "dir", "foods", "search"],
    description: "Search and filter foods",
  },
  Command {
    name: "ai-chat",
    aliases: &["ai", "chat"],
    description: "Ask about Indonesian cuisine",
  },
  Command {
    name: "about",
    aliases: &["tentang", "info"],
    description: "About Cita Rasa",
  },
  Command {
    name: "admin",
    aliases: &["a", "dashboard"],
    description: "Admin dashboard",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit citarasa",
  },
];

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.trim().to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_priority(cmd, &input_lower).map(|p| (cmd, p)))
    .collect();

  matches.sort_by_key(|(_, priority)| *priority);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Lower is better; None means no match.
fn match_priority(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if cmd.aliases.iter().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("directory");
    assert_eq!(suggestions[0].name, "directory");
  }

  #[test]
  fn test_alias_match() {
    assert_eq!(get_suggestions("map")[0].name, "explorer");
    assert_eq!(get_suggestions("chat")[0].name, "ai-chat");
  }

  #[test]
  fn test_prefix_match() {
    assert_eq!(get_suggestions("dir")[0].name, "directory");
    assert_eq!(get_suggestions("adm")[0].name, "admin");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("plor");
    assert_eq!(suggestions[0].name, "explorer");
  }

  #[test]
  fn test_no_match() {
    assert!(get_suggestions("zzz").is_empty());
  }

  #[test]
  fn test_every_page_has_a_command() {
    for page in Page::ALL {
      assert!(COMMANDS.iter().any(|c| c.name == page.name()));
      assert_eq!(Page::from_name(page.name()), Some(page));
    }
  }

  #[test]
  fn test_digits_follow_navbar_order() {
    assert_eq!(Page::from_digit('1'), Some(Page::Home));
    assert_eq!(Page::from_digit('4'), Some(Page::AiChat));
    assert_eq!(Page::from_digit('6'), Some(Page::Admin));
    assert_eq!(Page::from_digit('0'), None);
    assert_eq!(Page::from_digit('7'), None);
  }
}
