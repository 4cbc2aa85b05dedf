//! Book model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::author::AuthorRef;
use crate::{
    cover::Cover,
    error::{AppError, AppResult},
    forms::{self, invalid, not_blank},
};

/// Date format used by forms and search fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Persisted book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: AuthorRef,
    pub publish_date: NaiveDate,
    pub page_count: i32,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<Cover>,
}

impl Book {
    /// Invariants every stored book must satisfy
    pub fn check(&self) -> AppResult<()> {
        check_fields(&self.title, self.page_count)
    }

    /// Apply validated form values. The cover is replaced only when a new one is given.
    pub fn apply(&mut self, input: BookInput, cover: Option<Cover>) {
        self.title = input.title;
        self.author = input.author;
        self.publish_date = input.publish_date;
        self.page_count = input.page_count;
        self.description = input.description;
        if let Some(cover) = cover {
            self.cover = Some(cover);
        }
    }
}

/// Fields needed to create a book; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: AuthorRef,
    pub publish_date: NaiveDate,
    pub page_count: i32,
    pub description: Option<String>,
    pub cover: Option<Cover>,
}

impl NewBook {
    pub fn new(input: BookInput, cover: Option<Cover>) -> Self {
        Self {
            title: input.title,
            author: input.author,
            publish_date: input.publish_date,
            page_count: input.page_count,
            description: input.description,
            cover,
        }
    }

    pub fn check(&self) -> AppResult<()> {
        check_fields(&self.title, self.page_count)
    }
}

fn check_fields(title: &str, page_count: i32) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Book title cannot be empty".to_string()));
    }
    if page_count < 0 {
        return Err(AppError::Validation("Book page count cannot be negative".to_string()));
    }
    Ok(())
}

/// Book create/edit form as submitted by the client.
///
/// Every field is kept as typed so a rejected submission can be echoed back verbatim.
/// `cover` holds the client-side encoded image, see [`crate::cover`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "author_reference"))]
    pub author: String,
    #[serde(default)]
    #[validate(custom(function = "calendar_date"))]
    pub publish_date: String,
    #[serde(default)]
    #[validate(custom(function = "whole_page_count"))]
    pub page_count: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

const BOOK_FIELDS: &[(&str, &str)] = &[
    ("title", "Title"),
    ("author", "Author"),
    ("publish_date", "Publish date"),
    ("page_count", "Page count"),
];

fn parse_author(value: &str) -> Option<AuthorRef> {
    Uuid::parse_str(value.trim()).ok().map(AuthorRef::new)
}

fn parse_page_count(value: &str) -> Option<i32> {
    value.trim().parse::<i32>().ok().filter(|count| *count >= 0)
}

fn author_reference(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "can't be blank"));
    }
    parse_author(value)
        .map(|_| ())
        .ok_or_else(|| invalid("reference", "is not a known author"))
}

fn calendar_date(value: &str) -> Result<(), ValidationError> {
    parse_date(value)
        .map(|_| ())
        .ok_or_else(|| invalid("date", "must be a date (YYYY-MM-DD)"))
}

fn whole_page_count(value: &str) -> Result<(), ValidationError> {
    parse_page_count(value)
        .map(|_| ())
        .ok_or_else(|| invalid("page_count", "must be a whole number of at least 0"))
}

/// Validated book fields, cover excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInput {
    pub title: String,
    pub author: AuthorRef,
    pub publish_date: NaiveDate,
    pub page_count: i32,
    pub description: Option<String>,
}

impl BookForm {
    /// Validate the submission, returning the messages to show on failure
    pub fn to_input(&self) -> Result<BookInput, Vec<String>> {
        self.validate()
            .map_err(|errors| forms::messages(&errors, BOOK_FIELDS))?;

        let malformed = |label: &str| vec![format!("{} is invalid", label)];

        Ok(BookInput {
            title: self.title.trim().to_string(),
            author: parse_author(&self.author).ok_or_else(|| malformed("Author"))?,
            publish_date: parse_date(&self.publish_date).ok_or_else(|| malformed("Publish date"))?,
            page_count: parse_page_count(&self.page_count).ok_or_else(|| malformed("Page count"))?,
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        })
    }

    /// The submitted cover, treating a blank field as no submission
    pub fn submitted_cover(&self) -> Option<&str> {
        self.cover.as_deref().filter(|c| !c.trim().is_empty())
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.id().to_string(),
            publish_date: book.publish_date.format(DATE_FORMAT).to_string(),
            page_count: book.page_count.to_string(),
            description: book.description.clone(),
            cover: None,
        }
    }
}
