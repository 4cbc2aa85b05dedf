//! Mybrary library catalog
//!
//! Server for managing a library catalog of authors and books, including
//! searching the catalog and storing book cover images.

use std::sync::Arc;

use axum::response::Response;

pub mod api;
pub mod config;
pub mod cover;
pub mod error;
pub mod forms;
pub mod models;
pub mod repository;
pub mod services;
pub mod view;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::Repository;
use view::{JsonRenderer, View, ViewRenderer};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub renderer: Arc<dyn ViewRenderer>,
}

impl AppState {
    /// Build the state around an opened store, rendering views as JSON
    pub fn new(config: AppConfig, repository: Repository) -> Self {
        Self::with_renderer(config, repository, Arc::new(JsonRenderer))
    }

    pub fn with_renderer(
        config: AppConfig,
        repository: Repository,
        renderer: Arc<dyn ViewRenderer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services::Services::new(repository)),
            renderer,
        }
    }

    pub fn respond(&self, view: View) -> Response {
        view::respond(self.renderer.as_ref(), view)
    }
}
