mod footer;
mod header;
mod utils;

pub use footer::draw_footer;
pub use header::{api_host, draw_header};
pub use utils::{difficulty_color, percent_of, rating_stars, truncate};
