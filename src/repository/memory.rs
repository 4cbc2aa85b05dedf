//! In-memory catalog store.
//!
//! Records live in insertion-ordered maps, so listings come back in creation order.
//! Used by the test suite and by `database.backend = "memory"`.

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::CatalogStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        Author, AuthorSearchCriteria, Book, BookSearchCriteria, NewAuthor, NewBook,
    },
};

#[derive(Default)]
pub struct MemoryCatalogStore {
    authors: RwLock<IndexMap<Uuid, Author>>,
    books: RwLock<IndexMap<Uuid, Book>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn author_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Author {} not found", id))
}

fn book_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Book {} not found", id))
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_authors(&self, criteria: &AuthorSearchCriteria) -> AppResult<Vec<Author>> {
        let authors = self.authors.read().await;
        Ok(authors
            .values()
            .filter(|author| criteria.matches(author))
            .cloned()
            .collect())
    }

    async fn get_author(&self, id: Uuid) -> AppResult<Author> {
        self.authors
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| author_not_found(id))
    }

    async fn create_author(&self, author: NewAuthor) -> AppResult<Author> {
        author.check()?;
        let author = Author {
            id: Uuid::new_v4(),
            name: author.name,
        };
        self.authors.write().await.insert(author.id, author.clone());
        Ok(author)
    }

    async fn update_author(&self, author: &Author) -> AppResult<Author> {
        author.check()?;
        let mut authors = self.authors.write().await;
        let stored = authors
            .get_mut(&author.id)
            .ok_or_else(|| author_not_found(author.id))?;
        *stored = author.clone();
        Ok(author.clone())
    }

    async fn delete_author(&self, id: Uuid) -> AppResult<()> {
        self.authors
            .write()
            .await
            .shift_remove(&id)
            .map(|_| ())
            .ok_or_else(|| author_not_found(id))
    }

    async fn list_books(&self, criteria: &BookSearchCriteria) -> AppResult<Vec<Book>> {
        let books = self.books.read().await;
        Ok(books
            .values()
            .filter(|book| criteria.matches(book))
            .cloned()
            .collect())
    }

    async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.books
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| book_not_found(id))
    }

    async fn create_book(&self, book: NewBook) -> AppResult<Book> {
        book.check()?;
        let book = Book {
            id: Uuid::new_v4(),
            title: book.title,
            author: book.author,
            publish_date: book.publish_date,
            page_count: book.page_count,
            description: book.description,
            cover: book.cover,
        };
        self.books.write().await.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update_book(&self, book: &Book) -> AppResult<Book> {
        book.check()?;
        let mut books = self.books.write().await;
        let stored = books.get_mut(&book.id).ok_or_else(|| book_not_found(book.id))?;
        *stored = book.clone();
        Ok(book.clone())
    }

    async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        self.books
            .write()
            .await
            .shift_remove(&id)
            .map(|_| ())
            .ok_or_else(|| book_not_found(id))
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cover::{Cover, CoverMime},
        models::AuthorRef,
    };
    use chrono::NaiveDate;
    use tokio_test::{assert_err, assert_ok};

    fn new_book(title: &str, author: AuthorRef) -> NewBook {
        NewBook {
            title: title.into(),
            author,
            publish_date: NaiveDate::from_ymd_opt(2001, 9, 1).unwrap(),
            page_count: 200,
            description: None,
            cover: None,
        }
    }

    #[tokio::test]
    async fn test_author_crud() {
        let store = MemoryCatalogStore::new();

        let mut author = assert_ok!(store.create_author(NewAuthor { name: "Octavia Butler".into() }).await);
        assert_eq!(assert_ok!(store.get_author(author.id).await), author);

        author.name = "Octavia E. Butler".into();
        assert_ok!(store.update_author(&author).await);
        assert_eq!(store.get_author(author.id).await.unwrap().name, "Octavia E. Butler");

        assert_ok!(store.delete_author(author.id).await);
        assert!(store.get_author(author.id).await.unwrap_err().is_not_found());
        assert!(store.delete_author(author.id).await.unwrap_err().is_not_found());
        assert!(store.update_author(&author).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_invariants_are_enforced() {
        let store = MemoryCatalogStore::new();
        let err = assert_err!(store.create_author(NewAuthor { name: "  ".into() }).await);
        assert!(matches!(err, AppError::Validation(_)));

        let mut book = new_book("Kindred", AuthorRef::new(Uuid::new_v4()));
        book.page_count = -5;
        let err = assert_err!(store.create_book(book).await);
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_listing_keeps_insertion_order() {
        let store = MemoryCatalogStore::new();
        let author = AuthorRef::new(Uuid::new_v4());
        for title in ["Dawn", "Adulthood Rites", "Imago"] {
            store.create_book(new_book(title, author)).await.unwrap();
        }
        let first = store.list_books(&BookSearchCriteria::default()).await.unwrap();
        store.delete_book(first[0].id).await.unwrap();

        let titles: Vec<_> = store
            .list_books(&BookSearchCriteria::default())
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Adulthood Rites", "Imago"]);
    }

    #[tokio::test]
    async fn test_book_cover_round_trip() {
        let store = MemoryCatalogStore::new();
        let cover = Cover::new(CoverMime::Png, vec![0x89, 0x50, 0x4e, 0x47]);
        let mut book = new_book("Parable of the Sower", AuthorRef::new(Uuid::new_v4()));
        book.cover = Some(cover.clone());

        let created = store.create_book(book).await.unwrap();
        let loaded = store.get_book(created.id).await.unwrap();
        assert_eq!(loaded.cover, Some(cover));
        assert_eq!(loaded, created);
    }
}
