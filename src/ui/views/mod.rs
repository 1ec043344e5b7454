mod about;
mod admin;
mod ai_chat;
mod directory;
mod explorer;
mod food_detail;
mod home;

pub use about::AboutView;
pub use admin::AdminView;
pub use ai_chat::AiChatView;
pub use directory::DirectoryView;
pub use explorer::ExplorerView;
pub use food_detail::FoodDetailView;
pub use home::HomeView;

use crate::app::Services;
use crate::commands::Page;
use crate::ui::view::View;

/// Fresh root view for a navbar page.
pub fn page_view(page: Page, services: &Services) -> Box<dyn View> {
  match page {
    Page::Home => Box::new(HomeView::new(services.clone())),
    Page::Explorer => Box::new(ExplorerView::new(services.clone())),
    Page::Directory => Box::new(DirectoryView::new(services.clone())),
    Page::AiChat => Box::new(AiChatView::new(services.clone())),
    Page::About => Box::new(AboutView::new()),
    Page::Admin => Box::new(AdminView::new(services.clone())),
  }
}

/// Let spawned fetches finish and feed them to the view.
#[cfg(test)]
pub(crate) async fn settle(view: &mut dyn View) {
  for _ in 0..20 {
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    view.tick();
  }
}
