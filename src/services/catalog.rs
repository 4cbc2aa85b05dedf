//! Catalog management service.
//!
//! Reads return `AppResult`. Writes return a [`WriteOutcome`]: store failures are
//! logged here in full and reported to the caller only as a generic message,
//! together with the submitted form so nothing the user typed is lost.

use uuid::Uuid;

use crate::{
    cover,
    error::{AppError, AppResult},
    forms::{DeleteOutcome, Draft, WriteOutcome},
    models::{
        Author, AuthorForm, AuthorQuery, AuthorRef, AuthorSearchCriteria, Book, BookForm,
        BookQuery, BookSearchCriteria, NewBook,
    },
    repository::Repository,
};

pub const CREATE_AUTHOR_FAILED: &str = "Error creating Author";
pub const UPDATE_AUTHOR_FAILED: &str = "Error updating Author";
pub const CREATE_BOOK_FAILED: &str = "Error creating Book";
pub const UPDATE_BOOK_FAILED: &str = "Error updating Book";
pub const UNKNOWN_AUTHOR: &str = "Author does not exist";

/// A book with its author looked up
#[derive(Debug, Clone)]
pub struct BookDetails {
    pub book: Book,
    /// `None` when the author has been deleted since
    pub author: Option<Author>,
}

/// An author with the books that reference it
#[derive(Debug, Clone)]
pub struct AuthorDetails {
    pub author: Author,
    pub books: Vec<Book>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    /// Search authors by name
    pub async fn search_authors(&self, query: &AuthorQuery) -> AppResult<Vec<Author>> {
        self.repository
            .list_authors(&AuthorSearchCriteria::from(query))
            .await
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository
            .list_authors(&AuthorSearchCriteria::default())
            .await
    }

    pub async fn get_author(&self, id: Uuid) -> AppResult<Author> {
        self.repository.get_author(id).await
    }

    /// Get an author along with the books that reference it
    pub async fn author_details(&self, id: Uuid) -> AppResult<AuthorDetails> {
        let author = self.repository.get_author(id).await?;
        let books = self
            .repository
            .list_books(&BookSearchCriteria::by_author(author.reference()))
            .await?;
        Ok(AuthorDetails { author, books })
    }

    pub async fn create_author(&self, form: AuthorForm) -> WriteOutcome<Author, AuthorForm> {
        let new_author = match form.to_new_author() {
            Ok(new_author) => new_author,
            Err(messages) => return WriteOutcome::invalid(Draft::new(form), messages),
        };

        match self.repository.create_author(new_author).await {
            Ok(author) => {
                tracing::info!("Created author id={}", author.id);
                WriteOutcome::Saved(author)
            }
            Err(e) => {
                tracing::error!("Failed to create author: {}", e);
                WriteOutcome::PersistFailed {
                    draft: Draft::new(form),
                    message: CREATE_AUTHOR_FAILED.to_string(),
                }
            }
        }
    }

    /// Rename an author. The submitted values are validated before anything is merged.
    pub async fn update_author(&self, id: Uuid, form: AuthorForm) -> WriteOutcome<Author, AuthorForm> {
        let mut author = match self.repository.get_author(id).await {
            Ok(author) => author,
            Err(e) => {
                log_lookup_failure("author", id, &e);
                return WriteOutcome::NotFound;
            }
        };

        let changes = match form.to_new_author() {
            Ok(changes) => changes,
            Err(messages) => return WriteOutcome::invalid(Draft::editing(id, form), messages),
        };
        author.name = changes.name;

        match self.repository.update_author(&author).await {
            Ok(author) => WriteOutcome::Saved(author),
            Err(e) if e.is_not_found() => WriteOutcome::NotFound,
            Err(e) => {
                tracing::error!("Failed to update author id={}: {}", id, e);
                WriteOutcome::PersistFailed {
                    draft: Draft::editing(id, form),
                    message: UPDATE_AUTHOR_FAILED.to_string(),
                }
            }
        }
    }

    /// Delete an author. Books referencing it are left untouched.
    pub async fn delete_author(&self, id: Uuid) -> DeleteOutcome {
        match self.repository.delete_author(id).await {
            Ok(()) => {
                tracing::info!("Deleted author id={}", id);
                DeleteOutcome::Deleted
            }
            Err(e) if e.is_not_found() => DeleteOutcome::NotFound,
            Err(e) => {
                tracing::error!("Failed to delete author id={}: {}", id, e);
                DeleteOutcome::Failed
            }
        }
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    /// Search books by title and publish date range
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let criteria = BookSearchCriteria::try_from(query)?;
        self.repository.list_books(&criteria).await
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository
            .list_books(&BookSearchCriteria::default())
            .await
    }

    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.repository.get_book(id).await
    }

    /// Get a book with its author resolved
    pub async fn book_details(&self, id: Uuid) -> AppResult<BookDetails> {
        let book = self.repository.get_book(id).await?;
        let author = book.author.resolve(self.repository.as_ref()).await?;
        if author.is_none() {
            tracing::warn!("Book id={} references missing author id={}", id, book.author.id());
        }
        Ok(BookDetails { book, author })
    }

    pub async fn create_book(&self, form: BookForm) -> WriteOutcome<Book, BookForm> {
        let input = match form.to_input() {
            Ok(input) => input,
            Err(messages) => return WriteOutcome::invalid(Draft::new(form), messages),
        };

        match self.author_exists(input.author).await {
            Ok(true) => {}
            Ok(false) => {
                return WriteOutcome::invalid(Draft::new(form), vec![UNKNOWN_AUTHOR.to_string()])
            }
            Err(e) => {
                tracing::error!("Failed to look up author for new book: {}", e);
                return WriteOutcome::PersistFailed {
                    draft: Draft::new(form),
                    message: CREATE_BOOK_FAILED.to_string(),
                };
            }
        }

        let cover = cover::decode_or_skip(form.submitted_cover());

        match self.repository.create_book(NewBook::new(input, cover)).await {
            Ok(book) => {
                tracing::info!("Created book id={}", book.id);
                WriteOutcome::Saved(book)
            }
            Err(e) => {
                tracing::error!("Failed to create book: {}", e);
                WriteOutcome::PersistFailed {
                    draft: Draft::new(form),
                    message: CREATE_BOOK_FAILED.to_string(),
                }
            }
        }
    }

    /// Update a book. The stored cover is kept unless a new one is submitted.
    pub async fn update_book(&self, id: Uuid, form: BookForm) -> WriteOutcome<Book, BookForm> {
        let mut book = match self.repository.get_book(id).await {
            Ok(book) => book,
            Err(e) => {
                log_lookup_failure("book", id, &e);
                return WriteOutcome::NotFound;
            }
        };

        let input = match form.to_input() {
            Ok(input) => input,
            Err(messages) => return WriteOutcome::invalid(Draft::editing(id, form), messages),
        };

        match self.author_exists(input.author).await {
            Ok(true) => {}
            Ok(false) => {
                return WriteOutcome::invalid(
                    Draft::editing(id, form),
                    vec![UNKNOWN_AUTHOR.to_string()],
                )
            }
            Err(e) => {
                tracing::error!("Failed to look up author for book id={}: {}", id, e);
                return WriteOutcome::PersistFailed {
                    draft: Draft::editing(id, form),
                    message: UPDATE_BOOK_FAILED.to_string(),
                };
            }
        }

        let cover = cover::decode_or_skip(form.submitted_cover());
        book.apply(input, cover);

        match self.repository.update_book(&book).await {
            Ok(book) => WriteOutcome::Saved(book),
            Err(e) if e.is_not_found() => WriteOutcome::NotFound,
            Err(e) => {
                tracing::error!("Failed to update book id={}: {}", id, e);
                WriteOutcome::PersistFailed {
                    draft: Draft::editing(id, form),
                    message: UPDATE_BOOK_FAILED.to_string(),
                }
            }
        }
    }

    pub async fn delete_book(&self, id: Uuid) -> DeleteOutcome {
        match self.repository.delete_book(id).await {
            Ok(()) => {
                tracing::info!("Deleted book id={}", id);
                DeleteOutcome::Deleted
            }
            Err(e) if e.is_not_found() => DeleteOutcome::NotFound,
            Err(e) => {
                tracing::error!("Failed to delete book id={}: {}", id, e);
                DeleteOutcome::Failed
            }
        }
    }

    async fn author_exists(&self, author: AuthorRef) -> AppResult<bool> {
        Ok(author.resolve(self.repository.as_ref()).await?.is_some())
    }
}

fn log_lookup_failure(kind: &str, id: Uuid, error: &AppError) {
    if error.is_not_found() {
        tracing::debug!("No {} with id={} to update", kind, id);
    } else {
        tracing::error!("Failed to load {} id={}: {}", kind, id, error);
    }
}
