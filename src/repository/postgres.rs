//! PostgreSQL catalog store

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, FromRow, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::CatalogStore;
use crate::{
    config::DatabaseConfig,
    cover::{Cover, CoverMime},
    error::{AppError, AppResult},
    models::{
        Author, AuthorRef, AuthorSearchCriteria, Book, BookSearchCriteria, NewAuthor, NewBook,
    },
};

const BOOK_COLUMNS: &str = "id, title, author_id, publish_date, page_count, description, \
                            cover_image, cover_image_type";

/// Raw `books` row; the cover columns are merged into a [`Cover`] on conversion
#[derive(Debug, FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    author_id: Uuid,
    publish_date: NaiveDate,
    page_count: i32,
    description: Option<String>,
    cover_image: Option<Vec<u8>>,
    cover_image_type: Option<String>,
}

impl TryFrom<BookRow> for Book {
    type Error = AppError;

    fn try_from(row: BookRow) -> AppResult<Self> {
        let cover = match (row.cover_image, row.cover_image_type) {
            (Some(data), Some(mime)) => {
                let mime = mime.parse::<CoverMime>().map_err(|e| {
                    AppError::Internal(format!("Book {} has an invalid stored cover: {}", row.id, e))
                })?;
                Some(Cover::new(mime, data))
            }
            (None, None) => None,
            _ => {
                return Err(AppError::Internal(format!(
                    "Book {} has a cover image without a type",
                    row.id
                )))
            }
        };

        Ok(Book {
            id: row.id,
            title: row.title,
            author: AuthorRef::new(row.author_id),
            publish_date: row.publish_date,
            page_count: row.page_count,
            description: row.description,
            cover,
        })
    }
}

fn cover_columns(cover: &Option<Cover>) -> (Option<Vec<u8>>, Option<&'static str>) {
    match cover {
        Some(cover) => (Some(cover.data.clone()), Some(cover.mime.as_str())),
        None => (None, None),
    }
}

#[derive(Clone)]
pub struct PgCatalogStore {
    pool: Pool<Postgres>,
}

impl PgCatalogStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a connection pool and bring the schema up to date
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to run database migrations: {}", e)))?;

        tracing::info!("Database migrations completed");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_authors(&self, criteria: &AuthorSearchCriteria) -> AppResult<Vec<Author>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT id, name FROM authors WHERE TRUE");

        if let Some(name) = &criteria.name {
            query
                .push(" AND strpos(lower(name), lower(")
                .push_bind(name.clone())
                .push(")) > 0");
        }

        let authors = query
            .build_query_as::<(Uuid, String)>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|(id, name)| Author { id, name })
            .collect();

        Ok(authors)
    }

    async fn get_author(&self, id: Uuid) -> AppResult<Author> {
        sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|(id, name)| Author { id, name })
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn create_author(&self, author: NewAuthor) -> AppResult<Author> {
        author.check()?;

        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO authors (id, name) VALUES ($1, $2) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&author.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(Author {
            id,
            name: author.name,
        })
    }

    async fn update_author(&self, author: &Author) -> AppResult<Author> {
        author.check()?;

        let result = sqlx::query("UPDATE authors SET name = $1 WHERE id = $2")
            .bind(&author.name)
            .bind(author.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", author.id)));
        }
        Ok(author.clone())
    }

    async fn delete_author(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }

    async fn list_books(&self, criteria: &BookSearchCriteria) -> AppResult<Vec<Book>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT ");
        query.push(BOOK_COLUMNS).push(" FROM books WHERE TRUE");

        if let Some(title) = &criteria.title {
            query
                .push(" AND strpos(lower(title), lower(")
                .push_bind(title.clone())
                .push(")) > 0");
        }
        if let Some(before) = criteria.published_before {
            query.push(" AND publish_date <= ").push_bind(before);
        }
        if let Some(after) = criteria.published_after {
            query.push(" AND publish_date >= ").push_bind(after);
        }
        if let Some(author) = criteria.author {
            query.push(" AND author_id = ").push_bind(author.id());
        }

        query
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Book::try_from)
            .collect()
    }

    async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        Book::try_from(row)
    }

    async fn create_book(&self, book: NewBook) -> AppResult<Book> {
        book.check()?;
        let (cover_image, cover_image_type) = cover_columns(&book.cover);

        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            INSERT INTO books (
                id, title, author_id, publish_date, page_count, description,
                cover_image, cover_image_type
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&book.title)
        .bind(book.author.id())
        .bind(book.publish_date)
        .bind(book.page_count)
        .bind(&book.description)
        .bind(cover_image)
        .bind(cover_image_type)
        .fetch_one(&self.pool)
        .await?;

        Book::try_from(row)
    }

    async fn update_book(&self, book: &Book) -> AppResult<Book> {
        book.check()?;
        let (cover_image, cover_image_type) = cover_columns(&book.cover);

        // Cover columns are written together in one statement
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            UPDATE books SET
                title = $2,
                author_id = $3,
                publish_date = $4,
                page_count = $5,
                description = $6,
                cover_image = $7,
                cover_image_type = $8
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book.id)
        .bind(&book.title)
        .bind(book.author.id())
        .bind(book.publish_date)
        .bind(book.page_count)
        .bind(&book.description)
        .bind(cover_image)
        .bind(cover_image_type)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book.id)))?;

        Book::try_from(row)
    }

    async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
