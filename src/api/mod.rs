//! HTTP handlers for the catalog

pub mod authors;
pub mod books;
pub mod health;
pub mod index;

use axum::{extract::DefaultBodyLimit, http::StatusCode, routing::get, Router};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::{forms::WriteOutcome, AppState};

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    Router::new()
        .route("/", get(index::index))
        .route("/health", get(health::health_check))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route("/authors/new", get(authors::new_author))
        .route(
            "/authors/:id",
            get(authors::show_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        .route("/authors/:id/edit", get(authors::edit_author))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/new", get(books::new_book))
        .route(
            "/books/:id",
            get(books::show_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/edit", get(books::edit_book))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Path ids that are not UUIDs can not name a stored entity
pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Status of a form shown again after a failed write
pub(crate) fn retry_status<T, F>(outcome: &WriteOutcome<T, F>) -> StatusCode {
    match outcome {
        WriteOutcome::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
