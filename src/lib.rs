//! Library Server
//!
//! REST JSON API for a small lending library: catalog of authors and books,
//! members, loans with checkout, return and due-date extension, plus
//! background jobs for confirmation emails and overdue reminders.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod repository;
pub mod services;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
