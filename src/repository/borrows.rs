//! Borrow ledger repository: the borrow/return protocol and history queries
//!
//! `books.is_borrowed` is a projection of "an active record exists for this
//! book". Both protocol operations update the record and the projection in
//! one transaction, and the borrow path claims the book with a conditional
//! UPDATE so concurrent borrowers serialize on the row: exactly one caller
//! observes the flag flip, the other maps to a domain conflict.

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::{
        book::{Book, BookRow},
        borrow::{BorrowRecord, BorrowRecordDetails},
        genre::Genre,
    },
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a book for a user. Fails with NotFound when the book is
    /// absent and with a domain conflict when it is already taken; the
    /// ledger is untouched in both cases.
    pub async fn borrow(&self, user_id: i32, book_id: i32) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let claimed =
            sqlx::query("UPDATE books SET is_borrowed = TRUE WHERE id = $1 AND is_borrowed = FALSE")
                .bind(book_id)
                .execute(&mut *tx)
                .await?;

        if claimed.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                    .bind(book_id)
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(if exists {
                AppError::Domain {
                    code: ErrorCode::BookAlreadyBorrowed,
                    message: "The book has already been taken".to_string(),
                }
            } else {
                AppError::book_not_found(book_id)
            });
        }

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (user_id, book_id, borrowed_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(user_id, book_id, record_id = record.id, "book borrowed");
        Ok(record)
    }

    /// Return a book previously borrowed by this user. Only the caller's
    /// own active record is eligible; a closed record stays immutable.
    pub async fn return_book(&self, user_id: i32, book_id: i32) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records
            SET returned_at = $3
            WHERE book_id = $1 AND user_id = $2 AND returned_at IS NULL
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = record else {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                    .bind(book_id)
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(if exists {
                AppError::Domain {
                    code: ErrorCode::BookNotBorrowed,
                    message: "You didn't take this book".to_string(),
                }
            } else {
                AppError::book_not_found(book_id)
            });
        };

        sqlx::query("UPDATE books SET is_borrowed = FALSE WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(user_id, book_id, record_id = record.id, "book returned");
        Ok(record)
    }

    /// Books the user currently holds (active records only)
    pub async fn active_books(&self, user_id: i32) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.id, b.title, b.author, b.description,
                   b.genre_id, g.name AS genre_name,
                   b.is_borrowed, b.published_at
            FROM borrow_records r
            JOIN books b ON r.book_id = b.id
            LEFT JOIN genres g ON b.genre_id = g.id
            WHERE r.user_id = $1 AND r.returned_at IS NULL
            ORDER BY r.borrowed_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Full borrow history for a user, oldest first, with books resolved
    pub async fn history(&self, user_id: i32) -> AppResult<Vec<BorrowRecordDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.borrowed_at, r.returned_at,
                   b.id AS book_id, b.title, b.author, b.description,
                   b.genre_id, g.name AS genre_name,
                   b.is_borrowed, b.published_at
            FROM borrow_records r
            LEFT JOIN books b ON r.book_id = b.id
            LEFT JOIN genres g ON b.genre_id = g.id
            WHERE r.user_id = $1
            ORDER BY r.borrowed_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::new();
        for row in rows {
            let book = match row.get::<Option<i32>, _>("book_id") {
                Some(book_id) => {
                    let genre = match (
                        row.get::<Option<i32>, _>("genre_id"),
                        row.get::<Option<String>, _>("genre_name"),
                    ) {
                        (Some(id), Some(name)) => Some(Genre { id, name }),
                        _ => None,
                    };
                    Some(Book {
                        id: book_id,
                        title: row.get("title"),
                        author: row.get("author"),
                        description: row.get("description"),
                        genre,
                        is_borrowed: row.get("is_borrowed"),
                        published_at: row.get("published_at"),
                    })
                }
                None => None,
            };

            result.push(BorrowRecordDetails {
                id: row.get("id"),
                book,
                borrowed_at: row.get("borrowed_at"),
                returned_at: row.get("returned_at"),
            });
        }

        Ok(result)
    }
}
