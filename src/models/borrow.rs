//! Borrow record (ledger) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::Book;

/// Borrow record from database. A record with `returned_at` null is active;
/// once closed it is immutable history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i32,
    /// Null after the borrower's account was deleted
    pub user_id: Option<i32>,
    /// Null after the book was removed from the catalog
    pub book_id: Option<i32>,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl BorrowRecord {
    pub fn is_active(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// Borrow record with its book resolved, for history display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowRecordDetails {
    pub id: i32,
    pub book: Option<Book>,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_record() {
        let record = BorrowRecord {
            id: 1,
            user_id: Some(2),
            book_id: Some(3),
            borrowed_at: Utc::now(),
            returned_at: None,
        };
        assert!(record.is_active());

        let closed = BorrowRecord {
            returned_at: Some(Utc::now()),
            ..record
        };
        assert!(!closed.is_active());
    }
}
