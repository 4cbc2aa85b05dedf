//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Form,
};
use serde::Serialize;
use serde_json::{json, Value};

use super::{parse_id, retry_status};
use crate::{
    forms::{DeleteOutcome, WriteOutcome},
    models::{Book, BookForm, BookQuery},
    view::View,
    AppState,
};

/// Book as shown in views, with the cover as a ready-to-use `data:` URL
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView<'a> {
    #[serde(flatten)]
    pub book: &'a Book,
    pub cover_image_path: Option<String>,
}

impl<'a> From<&'a Book> for BookView<'a> {
    fn from(book: &'a Book) -> Self {
        Self {
            book,
            cover_image_path: book.cover.as_ref().map(|cover| cover.data_url()),
        }
    }
}

/// List books filtered by title and publish date range
pub async fn list_books(State(state): State<AppState>, Query(query): Query<BookQuery>) -> Response {
    let view = match state.services.catalog.search_books(&query).await {
        Ok(books) => {
            let books: Vec<_> = books.iter().map(BookView::from).collect();
            View::page("books/index", json!({ "books": books, "searchOptions": query }))
        }
        Err(e) => {
            tracing::error!("Book search failed: {}", e);
            View::redirect("/")
        }
    };
    state.respond(view)
}

pub async fn new_book(State(state): State<AppState>) -> Response {
    let view = form_page(
        &state,
        "books/new",
        StatusCode::OK,
        json!(BookForm::default()),
        None,
    )
    .await;
    state.respond(view)
}

pub async fn create_book(State(state): State<AppState>, Form(form): Form<BookForm>) -> Response {
    let outcome = state.services.catalog.create_book(form).await;
    let status = retry_status(&outcome);

    let view = match outcome {
        WriteOutcome::Saved(book) => View::redirect(format!("/books/{}", book.id)),
        WriteOutcome::ValidationFailed { draft, message }
        | WriteOutcome::PersistFailed { draft, message } => {
            form_page(&state, "books/new", status, json!(draft), Some(message)).await
        }
        WriteOutcome::NotFound => View::redirect("/"),
    };
    state.respond(view)
}

/// Show a book with its author
pub async fn show_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return state.respond(View::redirect("/"));
    };

    let view = match state.services.catalog.book_details(id).await {
        Ok(details) => View::page(
            "books/show",
            json!({ "book": BookView::from(&details.book), "author": details.author }),
        ),
        Err(e) => {
            tracing::debug!("Cannot show book {}: {}", id, e);
            View::redirect("/")
        }
    };
    state.respond(view)
}

pub async fn edit_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return state.respond(View::redirect("/"));
    };

    let view = match state.services.catalog.get_book(id).await {
        Ok(book) => {
            form_page(
                &state,
                "books/edit",
                StatusCode::OK,
                json!(BookView::from(&book)),
                None,
            )
            .await
        }
        Err(e) => {
            tracing::debug!("Cannot edit book {}: {}", id, e);
            View::redirect("/")
        }
    };
    state.respond(view)
}

/// Update a book; the stored cover is kept unless a new one is submitted
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<BookForm>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return state.respond(View::redirect("/"));
    };

    let outcome = state.services.catalog.update_book(id, form).await;
    let status = retry_status(&outcome);

    let view = match outcome {
        WriteOutcome::Saved(book) => View::redirect(format!("/books/{}", book.id)),
        WriteOutcome::ValidationFailed { draft, message }
        | WriteOutcome::PersistFailed { draft, message } => {
            form_page(&state, "books/edit", status, json!(draft), Some(message)).await
        }
        WriteOutcome::NotFound => View::redirect("/"),
    };
    state.respond(view)
}

pub async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return state.respond(View::redirect("/"));
    };

    let view = match state.services.catalog.delete_book(id).await {
        DeleteOutcome::Deleted => View::redirect("/books"),
        DeleteOutcome::NotFound => View::redirect("/"),
        DeleteOutcome::Failed => View::redirect(format!("/books/{}", id)),
    };
    state.respond(view)
}

/// Book form page; the author picker needs every author, so a failed lookup
/// falls back to the book listing
async fn form_page(
    state: &AppState,
    template: &'static str,
    status: StatusCode,
    book: Value,
    error_message: Option<String>,
) -> View {
    match state.services.catalog.list_authors().await {
        Ok(authors) => {
            let mut context = json!({ "authors": authors, "book": book });
            if let Some(message) = error_message {
                context["errorMessage"] = Value::String(message);
            }
            View::page_with_status(template, status, context)
        }
        Err(e) => {
            tracing::error!("Failed to load authors for {}: {}", template, e);
            View::redirect("/books")
        }
    }
}
