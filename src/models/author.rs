//! Author model and related types

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    forms::{self, not_blank},
    repository::CatalogStore,
};

/// Persisted author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
}

impl Author {
    /// Invariants every stored author must satisfy
    pub fn check(&self) -> AppResult<()> {
        check_name(&self.name)
    }

    pub fn reference(&self) -> AuthorRef {
        AuthorRef::new(self.id)
    }
}

/// Fields needed to create an author; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
}

impl NewAuthor {
    pub fn check(&self) -> AppResult<()> {
        check_name(&self.name)
    }
}

fn check_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Author name cannot be empty".to_string()));
    }
    Ok(())
}

/// Weak reference from a book to its author.
///
/// Only the id is stored; the author is looked up when needed and may no
/// longer exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorRef(Uuid);

impl AuthorRef {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn id(&self) -> Uuid {
        self.0
    }

    /// Look the author up; `None` when the reference dangles
    pub async fn resolve(&self, store: &dyn CatalogStore) -> AppResult<Option<Author>> {
        match store.get_author(self.0).await {
            Ok(author) => Ok(Some(author)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Author search/create/edit form as submitted by the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AuthorForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
}

const AUTHOR_FIELDS: &[(&str, &str)] = &[("name", "Name")];

impl AuthorForm {
    /// Validate the submission, returning the messages to show on failure
    pub fn to_new_author(&self) -> Result<NewAuthor, Vec<String>> {
        self.validate()
            .map_err(|errors| forms::messages(&errors, AUTHOR_FIELDS))?;

        Ok(NewAuthor {
            name: self.name.trim().to_string(),
        })
    }
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        Self {
            name: author.name.clone(),
        }
    }
}
