//! Route modules for the server
//!
//! - auth: Landing redirect, sign in, sign out
//! - home: Balance overview
//! - transactions: History list, filter partials, admin transaction editing
//! - settings: Password forms and the dark-mode toggle
//! - master: Admin forms and data file upload
//!
//! Larger modules follow the same split:
//! - mod.rs: Module declaration and exports
//! - api.rs: Endpoints answering with fragments or status text
//! - page.rs: Full page rendering

pub mod auth;
pub mod home;
pub mod master;
pub mod settings;
pub mod transactions;
