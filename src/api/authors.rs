//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use serde_json::json;

use super::{books::BookView, parse_id, retry_status};
use crate::{
    forms::{DeleteOutcome, WriteOutcome},
    models::{AuthorForm, AuthorQuery},
    view::View,
    AppState,
};

/// List authors, optionally filtered by name
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<AuthorQuery>,
) -> Response {
    let view = match state.services.catalog.search_authors(&query).await {
        Ok(authors) => View::page(
            "authors/index",
            json!({ "authors": authors, "searchOptions": query }),
        ),
        Err(e) => {
            tracing::error!("Failed to list authors: {}", e);
            View::redirect("/")
        }
    };
    state.respond(view)
}

pub async fn new_author(State(state): State<AppState>) -> Response {
    state.respond(View::page(
        "authors/new",
        json!({ "author": AuthorForm::default() }),
    ))
}

pub async fn create_author(State(state): State<AppState>, Form(form): Form<AuthorForm>) -> Response {
    let outcome = state.services.catalog.create_author(form).await;
    let status = retry_status(&outcome);

    let view = match outcome {
        WriteOutcome::Saved(_) => View::redirect("/authors"),
        WriteOutcome::ValidationFailed { draft, message }
        | WriteOutcome::PersistFailed { draft, message } => View::page_with_status(
            "authors/new",
            status,
            json!({ "author": draft, "errorMessage": message }),
        ),
        WriteOutcome::NotFound => View::redirect("/"),
    };
    state.respond(view)
}

/// Show an author with their books
pub async fn show_author(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return state.respond(View::redirect("/"));
    };

    let view = match state.services.catalog.author_details(id).await {
        Ok(details) => {
            let books: Vec<_> = details.books.iter().map(BookView::from).collect();
            View::page(
                "authors/show",
                json!({ "author": details.author, "booksByAuthor": books }),
            )
        }
        Err(e) => {
            tracing::debug!("Cannot show author {}: {}", id, e);
            View::redirect("/")
        }
    };
    state.respond(view)
}

pub async fn edit_author(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return state.respond(View::redirect("/"));
    };

    let view = match state.services.catalog.get_author(id).await {
        Ok(author) => View::page("authors/edit", json!({ "author": author })),
        Err(e) => {
            tracing::debug!("Cannot edit author {}: {}", id, e);
            View::redirect("/")
        }
    };
    state.respond(view)
}

pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<AuthorForm>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return state.respond(View::redirect("/"));
    };

    let outcome = state.services.catalog.update_author(id, form).await;
    let status = retry_status(&outcome);

    let view = match outcome {
        WriteOutcome::Saved(author) => View::redirect(format!("/authors/{}", author.id)),
        WriteOutcome::ValidationFailed { draft, message }
        | WriteOutcome::PersistFailed { draft, message } => View::page_with_status(
            "authors/edit",
            status,
            json!({ "author": draft, "errorMessage": message }),
        ),
        WriteOutcome::NotFound => View::redirect("/"),
    };
    state.respond(view)
}

/// Delete an author; books that reference it are kept
pub async fn delete_author(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return state.respond(View::redirect("/"));
    };

    let view = match state.services.catalog.delete_author(id).await {
        DeleteOutcome::Deleted => View::redirect("/authors"),
        DeleteOutcome::NotFound => View::redirect("/"),
        DeleteOutcome::Failed => View::redirect(format!("/authors/{}", id)),
    };
    state.respond(view)
}
