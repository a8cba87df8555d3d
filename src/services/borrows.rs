//! Borrow/return service

use crate::{
    error::AppResult,
    models::{
        book::Book,
        borrow::{BorrowRecord, BorrowRecordDetails},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book for the given user
    pub async fn borrow(&self, user_id: i32, book_id: i32) -> AppResult<BorrowRecord> {
        self.repository.borrows.borrow(user_id, book_id).await
    }

    /// Return a book previously borrowed by the given user
    pub async fn return_book(&self, user_id: i32, book_id: i32) -> AppResult<BorrowRecord> {
        self.repository.borrows.return_book(user_id, book_id).await
    }

    /// Books the user currently holds
    pub async fn active_borrows(&self, user_id: i32) -> AppResult<Vec<Book>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.borrows.active_books(user_id).await
    }

    /// Full borrow history for the user
    pub async fn history(&self, user_id: i32) -> AppResult<Vec<BorrowRecordDetails>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.borrows.history(user_id).await
    }
}
