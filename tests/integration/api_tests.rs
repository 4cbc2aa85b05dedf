//! HTTP tests against the router backed by the in-memory store

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use mybrary_server::{
    api, config::AppConfig, repository::memory::MemoryCatalogStore, AppState,
};

// 1x1 transparent PNG
const PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: Value,
}

fn app() -> Router {
    let state = AppState::new(AppConfig::default(), Arc::new(MemoryCatalogStore::new()));
    api::router(state)
}

async fn send(app: &Router, method: Method, uri: &str, form: Option<&[(&str, &str)]>) -> Reply {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match form {
        Some(fields) => {
            request = request.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(serde_urlencoded::to_string(fields).expect("Failed to encode form"))
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).expect("Failed to build request"))
        .await
        .expect("Failed to send request");

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|value| value.to_str().expect("Invalid location").to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };

    Reply {
        status,
        location,
        body,
    }
}

async fn get(app: &Router, uri: &str) -> Reply {
    send(app, Method::GET, uri, None).await
}

async fn create_author(app: &Router, name: &str) -> String {
    send(app, Method::POST, "/authors", Some(&[("name", name)])).await;
    let reply = get(app, "/authors").await;
    reply.body["authors"]
        .as_array()
        .expect("No authors")
        .iter()
        .find(|a| a["name"] == name)
        .and_then(|a| a["id"].as_str())
        .expect("Author not created")
        .to_string()
}

async fn create_book(app: &Router, fields: &[(&str, &str)]) -> String {
    let reply = send(app, Method::POST, "/books", Some(fields)).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER, "{}", reply.body);
    reply
        .location
        .expect("No redirect")
        .trim_start_matches("/books/")
        .to_string()
}

fn cover_json(mime: &str, data: &str) -> String {
    serde_json::json!({ "name": "cover", "type": mime, "data": data }).to_string()
}

#[tokio::test]
async fn test_health_check() {
    let reply = get(&app(), "/health").await;
    assert!(reply.status.is_success());
    assert_eq!(reply.body["status"], "healthy");
    assert_eq!(reply.body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_blank_author_is_echoed_with_error() {
    let app = app();
    let reply = send(&app, Method::POST, "/authors", Some(&[("name", "   ")])).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["template"], "authors/new");
    assert_eq!(reply.body["author"]["name"], "   ");
    assert_eq!(reply.body["errorMessage"], "Name can't be blank");

    let listing = get(&app, "/authors").await;
    assert_eq!(listing.body["authors"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_create_and_search_authors() {
    let app = app();
    let reply = send(&app, Method::POST, "/authors", Some(&[("name", "Terry Pratchett")])).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/authors"));
    assert!(reply.body.is_null());

    create_author(&app, "Neil Gaiman").await;

    let reply = get(&app, "/authors?name=PRATCH").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["template"], "authors/index");
    assert_eq!(reply.body["searchOptions"]["name"], "PRATCH");
    let names: Vec<_> = reply.body["authors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Terry Pratchett"]);

    let reply = get(&app, "/authors?name=%20%20").await;
    assert_eq!(reply.body["authors"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_update_author() {
    let app = app();
    let id = create_author(&app, "Diana Wynne Jone").await;

    let reply = send(&app, Method::PUT, &format!("/authors/{}", id), Some(&[("name", "")])).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["template"], "authors/edit");
    assert_eq!(reply.body["author"]["id"], id.as_str());
    assert_eq!(reply.body["author"]["name"], "");

    let reply = send(
        &app,
        Method::PUT,
        &format!("/authors/{}", id),
        Some(&[("name", "Diana Wynne Jones")]),
    )
    .await;
    assert_eq!(reply.location, Some(format!("/authors/{}", id)));

    let reply = get(&app, &format!("/authors/{}/edit", id)).await;
    assert_eq!(reply.body["author"]["name"], "Diana Wynne Jones");
}

#[tokio::test]
async fn test_delete_missing_author_goes_home() {
    let app = app();
    let missing = "6f1c2d2e-8a4b-4c1e-9d55-0b0e7c2f9a10";

    let reply = send(&app, Method::DELETE, &format!("/authors/{}", missing), None).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/"));

    let reply = send(&app, Method::DELETE, "/authors/not-an-id", None).await;
    assert_eq!(reply.location.as_deref(), Some("/"));

    let id = create_author(&app, "Robin Hobb").await;
    let reply = send(&app, Method::DELETE, &format!("/authors/{}", id), None).await;
    assert_eq!(reply.location.as_deref(), Some("/authors"));
}

#[tokio::test]
async fn test_book_cover_round_trip() {
    let app = app();
    let author = create_author(&app, "Antoine de Saint-Exupery").await;
    let cover = cover_json("image/png", PNG_BASE64);

    let id = create_book(
        &app,
        &[
            ("title", "The Little Prince"),
            ("author", author.as_str()),
            ("publishDate", "1943-04-06"),
            ("pageCount", "96"),
            ("description", "A pilot meets a prince"),
            ("cover", cover.as_str()),
        ],
    )
    .await;

    let reply = get(&app, &format!("/books/{}", id)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["template"], "books/show");
    assert_eq!(reply.body["book"]["title"], "The Little Prince");
    assert_eq!(reply.body["book"]["cover"]["type"], "image/png");
    assert_eq!(reply.body["book"]["cover"]["data"], PNG_BASE64);
    assert_eq!(
        reply.body["book"]["coverImagePath"],
        format!("data:image/png;charset=utf-8;base64,{}", PNG_BASE64)
    );
    assert_eq!(reply.body["author"]["name"], "Antoine de Saint-Exupery");
}

#[tokio::test]
async fn test_update_without_cover_keeps_it() {
    let app = app();
    let author = create_author(&app, "Michael Ende").await;
    let cover = cover_json("image/png", PNG_BASE64);
    let id = create_book(
        &app,
        &[
            ("title", "Momo"),
            ("author", author.as_str()),
            ("publishDate", "1973-01-01"),
            ("pageCount", "304"),
            ("cover", cover.as_str()),
        ],
    )
    .await;

    let reply = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        Some(&[
            ("title", "The Neverending Story"),
            ("author", author.as_str()),
            ("publishDate", "1979-09-01"),
            ("pageCount", "396"),
            ("cover", ""),
        ]),
    )
    .await;
    assert_eq!(reply.location, Some(format!("/books/{}", id)));

    let reply = get(&app, &format!("/books/{}", id)).await;
    assert_eq!(reply.body["book"]["title"], "The Neverending Story");
    assert_eq!(reply.body["book"]["pageCount"], 396);
    assert_eq!(reply.body["book"]["cover"]["type"], "image/png");
    assert_eq!(reply.body["book"]["cover"]["data"], PNG_BASE64);
}

#[tokio::test]
async fn test_disallowed_cover_type_is_dropped() {
    let app = app();
    let author = create_author(&app, "Italo Calvino").await;
    let cover = cover_json("image/webp", PNG_BASE64);
    let id = create_book(
        &app,
        &[
            ("title", "Invisible Cities"),
            ("author", author.as_str()),
            ("publishDate", "1972-01-01"),
            ("pageCount", "165"),
            ("cover", cover.as_str()),
        ],
    )
    .await;

    let reply = get(&app, &format!("/books/{}", id)).await;
    assert!(reply.body["book"].get("cover").is_none());
    assert!(reply.body["book"]["coverImagePath"].is_null());
}

#[tokio::test]
async fn test_invalid_book_is_echoed_with_authors() {
    let app = app();
    let author = create_author(&app, "Jorge Luis Borges").await;

    let reply = send(
        &app,
        Method::POST,
        "/books",
        Some(&[
            ("title", "Ficciones"),
            ("author", author.as_str()),
            ("publishDate", "nineteen forty-four"),
            ("pageCount", "-1"),
            ("description", "Labyrinths"),
        ]),
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["template"], "books/new");
    assert_eq!(reply.body["book"]["title"], "Ficciones");
    assert_eq!(reply.body["book"]["publishDate"], "nineteen forty-four");
    assert_eq!(reply.body["book"]["pageCount"], "-1");
    assert_eq!(reply.body["book"]["description"], "Labyrinths");
    assert_eq!(
        reply.body["errorMessage"],
        "Publish date must be a date (YYYY-MM-DD), Page count must be a whole number of at least 0"
    );
    assert_eq!(reply.body["authors"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_search_books() {
    let app = app();
    let author = create_author(&app, "Anonymous").await;
    for (title, date) in [
        ("Foobar", "2021-05-01"),
        ("Foobar", "2023-01-01"),
        ("Bar", "2021-01-01"),
    ] {
        create_book(
            &app,
            &[
                ("title", title),
                ("author", author.as_str()),
                ("publishDate", date),
                ("pageCount", "10"),
            ],
        )
        .await;
    }

    let reply = get(
        &app,
        "/books?title=foo&publishedAfter=2020-01-01&publishedBefore=2022-01-01",
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let books = reply.body["books"].as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Foobar");
    assert_eq!(books[0]["publishDate"], "2021-05-01");
    assert_eq!(reply.body["searchOptions"]["publishedAfter"], "2020-01-01");

    let reply = get(&app, "/books?publishedBefore=not-a-date").await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/"));

    let reply = get(&app, "/").await;
    assert_eq!(reply.body["template"], "index");
    assert_eq!(reply.body["books"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_missing_book_routes_go_home() {
    let app = app();
    let author = create_author(&app, "Stanislaw Lem").await;
    let missing = "0d7e3f51-5a7c-4b43-8f39-3c1f2b6f1d22";

    for uri in [format!("/books/{}", missing), format!("/books/{}/edit", missing)] {
        let reply = get(&app, &uri).await;
        assert_eq!(reply.location.as_deref(), Some("/"), "{}", uri);
    }

    let reply = send(
        &app,
        Method::PUT,
        &format!("/books/{}", missing),
        Some(&[
            ("title", "Solaris"),
            ("author", author.as_str()),
            ("publishDate", "1961-01-01"),
            ("pageCount", "204"),
        ]),
    )
    .await;
    assert_eq!(reply.location.as_deref(), Some("/"));

    let reply = send(&app, Method::DELETE, &format!("/books/{}", missing), None).await;
    assert_eq!(reply.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_book_of_deleted_author_still_shows() {
    let app = app();
    let author = create_author(&app, "Mary Shelley").await;
    let id = create_book(
        &app,
        &[
            ("title", "Frankenstein"),
            ("author", author.as_str()),
            ("publishDate", "1818-01-01"),
            ("pageCount", "280"),
        ],
    )
    .await;

    let reply = get(&app, &format!("/authors/{}", author)).await;
    assert_eq!(reply.body["booksByAuthor"].as_array().map(Vec::len), Some(1));

    send(&app, Method::DELETE, &format!("/authors/{}", author), None).await;

    let reply = get(&app, &format!("/books/{}", id)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["book"]["author"], author.as_str());
    assert!(reply.body["author"].is_null());

    let reply = send(&app, Method::DELETE, &format!("/books/{}", id), None).await;
    assert_eq!(reply.location.as_deref(), Some("/books"));
}
