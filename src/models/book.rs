//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::genre::Genre;

/// Internal row structure for book queries with the genre joined in
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    id: i32,
    title: String,
    author: String,
    description: Option<String>,
    genre_id: Option<i32>,
    genre_name: Option<String>,
    is_borrowed: bool,
    published_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        let genre = match (row.genre_id, row.genre_name) {
            (Some(id), Some(name)) => Some(Genre { id, name }),
            _ => None,
        };
        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            description: row.description,
            genre,
            is_borrowed: row.is_borrowed,
            published_at: row.published_at,
        }
    }
}

/// Book model with its genre resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub genre: Option<Genre>,
    /// Projection of "an active borrow record exists for this book"
    pub is_borrowed: bool,
    pub published_at: DateTime<Utc>,
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Filter by genre name (exact match)
    pub genre: Option<String>,
    /// Filter by author (substring)
    pub author: Option<String>,
    /// Filter by availability
    pub is_borrowed: Option<bool>,
    /// Free-text search over title, author and description
    pub search: Option<String>,
    /// Sort key: title, author or published_at, "-" prefix for descending
    pub ordering: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "Author must be 1-100 characters"))]
    pub author: String,
    pub description: Option<String>,
    pub genre_id: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Update book request. Availability is owned by the borrow protocol and
/// cannot be set through catalog updates.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Author must be 1-100 characters"))]
    pub author: Option<String>,
    pub description: Option<String>,
    pub genre_id: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Map an ordering query value to a validated ORDER BY clause
pub fn order_clause(ordering: Option<&str>) -> Option<&'static str> {
    match ordering.unwrap_or("title") {
        "title" => Some("b.title ASC"),
        "-title" => Some("b.title DESC"),
        "author" => Some("b.author ASC"),
        "-author" => Some("b.author DESC"),
        "published_at" => Some("b.published_at ASC"),
        "-published_at" => Some("b.published_at DESC"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_default() {
        assert_eq!(order_clause(None), Some("b.title ASC"));
    }

    #[test]
    fn test_order_clause_descending() {
        assert_eq!(order_clause(Some("-published_at")), Some("b.published_at DESC"));
        assert_eq!(order_clause(Some("-author")), Some("b.author DESC"));
    }

    #[test]
    fn test_order_clause_rejects_unknown() {
        assert_eq!(order_clause(Some("id; DROP TABLE books")), None);
        assert_eq!(order_clause(Some("isbn")), None);
    }

    #[test]
    fn test_book_row_without_genre() {
        let row = BookRow {
            id: 1,
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            description: None,
            genre_id: None,
            genre_name: None,
            is_borrowed: false,
            published_at: Utc::now(),
        };
        let book = Book::from(row);
        assert!(book.genre.is_none());
        assert!(!book.is_borrowed);
    }
}
