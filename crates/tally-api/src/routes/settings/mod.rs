//! Settings routes - Password management and dark mode

pub mod api;
pub mod page;

pub use api::api_toggle_dark_mode;
pub use page::{page_settings, post_settings};
