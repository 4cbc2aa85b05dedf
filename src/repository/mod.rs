//! Repository layer: the entity store behind the catalog

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    config::{DatabaseConfig, StoreBackend},
    error::AppResult,
    models::{
        Author, AuthorSearchCriteria, Book, BookSearchCriteria, NewAuthor, NewBook,
    },
};

/// Persistence for authors and books.
///
/// Every operation touches a single record. Lookups and writes on a missing id
/// fail with `AppError::NotFound`; broken invariants fail with
/// `AppError::Validation`. Listings come back in the store's own order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_authors(&self, criteria: &AuthorSearchCriteria) -> AppResult<Vec<Author>>;

    async fn get_author(&self, id: Uuid) -> AppResult<Author>;

    async fn create_author(&self, author: NewAuthor) -> AppResult<Author>;

    async fn update_author(&self, author: &Author) -> AppResult<Author>;

    async fn delete_author(&self, id: Uuid) -> AppResult<()>;

    async fn list_books(&self, criteria: &BookSearchCriteria) -> AppResult<Vec<Book>>;

    async fn get_book(&self, id: Uuid) -> AppResult<Book>;

    async fn create_book(&self, book: NewBook) -> AppResult<Book>;

    async fn update_book(&self, book: &Book) -> AppResult<Book>;

    async fn delete_book(&self, id: Uuid) -> AppResult<()>;

    /// Release connections; called once at shutdown
    async fn close(&self);
}

/// Shared handle to the configured store
pub type Repository = Arc<dyn CatalogStore>;

/// Open the store selected by the configuration
pub async fn connect(config: &DatabaseConfig) -> AppResult<Repository> {
    match config.backend {
        StoreBackend::Postgres => {
            let store = postgres::PgCatalogStore::connect(config).await?;
            tracing::info!("Connected to database");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory catalog store, data will not survive a restart");
            Ok(Arc::new(memory::MemoryCatalogStore::new()))
        }
    }
}
