//! Search parameters for catalog listings.
//!
//! Query strings arrive as loose text (`AuthorQuery`, `BookQuery`) and are turned
//! into typed criteria before they reach a store. Blank values impose no constraint.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    author::{Author, AuthorRef},
    book::{parse_date, Book},
};
use crate::error::{AppError, AppResult};

/// Author listing query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorQuery {
    pub name: Option<String>,
}

/// Book listing query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookQuery {
    pub title: Option<String>,
    pub published_before: Option<String>,
    pub published_after: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorSearchCriteria {
    /// Case-insensitive substring of the author name
    pub name: Option<String>,
}

impl AuthorSearchCriteria {
    pub fn matches(&self, author: &Author) -> bool {
        self.name
            .as_deref()
            .map_or(true, |name| contains_ignore_case(&author.name, name))
    }
}

impl From<&AuthorQuery> for AuthorSearchCriteria {
    fn from(query: &AuthorQuery) -> Self {
        Self {
            name: non_blank(&query.name).map(str::to_string),
        }
    }
}

/// Conjunction of optional book filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookSearchCriteria {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Inclusive upper bound on the publish date
    pub published_before: Option<NaiveDate>,
    /// Inclusive lower bound on the publish date
    pub published_after: Option<NaiveDate>,
    pub author: Option<AuthorRef>,
}

impl BookSearchCriteria {
    pub fn by_author(author: AuthorRef) -> Self {
        Self {
            author: Some(author),
            ..Self::default()
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        self.title
            .as_deref()
            .map_or(true, |title| contains_ignore_case(&book.title, title))
            && self
                .published_before
                .map_or(true, |before| book.publish_date <= before)
            && self
                .published_after
                .map_or(true, |after| book.publish_date >= after)
            && self.author.map_or(true, |author| book.author == author)
    }
}

fn date_bound(value: &Option<String>, field: &str) -> AppResult<Option<NaiveDate>> {
    non_blank(value)
        .map(|raw| {
            parse_date(raw).ok_or_else(|| {
                AppError::BadRequest(format!("{} is not a valid date: {:?}", field, raw))
            })
        })
        .transpose()
}

impl TryFrom<&BookQuery> for BookSearchCriteria {
    type Error = AppError;

    /// Fails when a date bound can not be read as a date; a bad bound is never dropped silently
    fn try_from(query: &BookQuery) -> AppResult<Self> {
        Ok(Self {
            title: non_blank(&query.title).map(str::to_string),
            published_before: date_bound(&query.published_before, "publishedBefore")?,
            published_after: date_bound(&query.published_after, "publishedAfter")?,
            author: None,
        })
    }
}
