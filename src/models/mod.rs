//! Data models for the catalog

pub mod author;
pub mod book;
pub mod search;

// Re-export commonly used types
pub use author::{Author, AuthorForm, AuthorRef, NewAuthor};
pub use book::{Book, BookForm, BookInput, NewBook};
pub use search::{AuthorQuery, AuthorSearchCriteria, BookQuery, BookSearchCriteria};
