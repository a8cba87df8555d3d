//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::book::{order_clause, Book, BookQuery, BookRow, CreateBook, UpdateBook},
};

/// Shared SELECT with the genre joined in
const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.author, b.description,
           b.genre_id, g.name AS genre_name,
           b.is_borrowed, b.published_at
    FROM books b
    LEFT JOIN genres g ON b.genre_id = g.id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(&format!("{} WHERE b.id = $1", BOOK_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::book_not_found(id))?;

        Ok(row.into())
    }

    /// Search books with filters, ordering and pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let order = order_clause(query.ordering.as_deref())
            .ok_or_else(|| AppError::Validation("Invalid ordering field".to_string()))?;

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref genre) = query.genre {
            params.push(genre.clone());
            conditions.push(format!("LOWER(g.name) = LOWER(${})", params.len()));
        }

        if let Some(ref author) = query.author {
            params.push(format!("%{}%", author));
            conditions.push(format!("b.author ILIKE ${}", params.len()));
        }

        if let Some(is_borrowed) = query.is_borrowed {
            conditions.push(format!(
                "b.is_borrowed = {}",
                if is_borrowed { "TRUE" } else { "FALSE" }
            ));
        }

        if let Some(ref search) = query.search {
            params.push(format!("%{}%", search));
            conditions.push(format!(
                "(b.title ILIKE ${0} OR b.author ILIKE ${0} OR b.description ILIKE ${0})",
                params.len()
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!(
            "SELECT COUNT(*) FROM books b LEFT JOIN genres g ON b.genre_id = g.id {}",
            where_clause
        );
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_builder = count_builder.bind(param);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            "{} {} ORDER BY {} LIMIT {} OFFSET {}",
            BOOK_SELECT, where_clause, order, per_page, offset
        );
        let mut select_builder = sqlx::query_as::<_, BookRow>(&select_query);
        for param in &params {
            select_builder = select_builder.bind(param);
        }
        let books = select_builder.fetch_all(&self.pool).await?;

        Ok((books.into_iter().map(Book::from).collect(), total))
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, description, genre_id, published_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.description.as_deref())
        .bind(book.genre_id)
        .bind(book.published_at.unwrap_or_else(Utc::now))
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update an existing book, leaving unset fields untouched. The
    /// `is_borrowed` projection is deliberately not writable here.
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                description = COALESCE($4, description),
                genre_id = COALESCE($5, genre_id),
                published_at = COALESCE($6, published_at)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(book.title.as_deref())
        .bind(book.author.as_deref())
        .bind(book.description.as_deref())
        .bind(book.genre_id)
        .bind(book.published_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::book_not_found(id));
        }

        self.get_by_id(id).await
    }

    /// Delete a book. Rejected while it is borrowed; closed ledger rows
    /// survive with their book reference nulled by the foreign key.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let book = self.get_by_id(id).await?;

        if book.is_borrowed {
            return Err(AppError::Domain {
                code: ErrorCode::BookCurrentlyBorrowed,
                message: "Book is currently borrowed".to_string(),
            });
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
