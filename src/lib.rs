//! Bookshelf
//!
//! A small web application where members register, search an external book
//! catalog and check books out into a personal collection.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire repositories and services around an open database pool
    pub fn new(
        config: Arc<AppConfig>,
        pool: sqlx::SqlitePool,
        catalog_client: Arc<dyn services::catalog::CatalogClient>,
    ) -> Self {
        let repository = repository::Repository::new(pool);
        let services = services::Services::new(repository, config.clone(), catalog_client);
        Self {
            config,
            services: Arc::new(services),
        }
    }
}
