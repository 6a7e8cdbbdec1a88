//! Local Library catalog
//!
//! Catalog core of a small lending library: authors, genres, books and the
//! physical copies of books, with form validation, delete-time referential
//! integrity and a JSON API over PostgreSQL or an in-memory store.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(services: services::Services) -> Self {
        Self {
            services: Arc::new(services),
        }
    }
}
