//! Master routes - Admin forms and data file upload

pub mod api;
pub mod page;

pub use api::api_upload_data;
pub use page::{page_master, post_master};
