//! Catalog home page

use axum::{extract::State, response::Response};
use serde_json::json;

use super::books::BookView;
use crate::{view::View, AppState};

pub async fn index(State(state): State<AppState>) -> Response {
    let books = match state.services.catalog.list_books().await {
        Ok(books) => books,
        Err(e) => {
            tracing::error!("Failed to load books for the home page: {}", e);
            Vec::new()
        }
    };
    let books: Vec<_> = books.iter().map(BookView::from).collect();

    state.respond(View::page("index", json!({ "books": books })))
}
