//! Transaction routes - History list, description filter, admin editing
//!
//! Structure:
//! - api.rs: HTMX filter partials
//! - page.rs: Full page rendering and edit form handling
//! - render.rs: Shared list and form fragments

pub mod api;
pub mod page;
pub mod render;

pub use api::{htmx_edit_filter, htmx_history_filter};
pub use page::{page_edit_transaction, page_edit_user, page_history, post_edit_user};
