//! Catalog management service (books and genres)

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        genre::{CreateGenre, Genre, UpdateGenre},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with filters
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book, resolving its genre reference
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        self.check_genre(book.genre_id).await?;
        self.repository.books.create(&book).await
    }

    /// Update an existing book
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        self.check_genre(book.genre_id).await?;
        self.repository.books.update(id, &book).await
    }

    /// Delete a book
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    /// List all genres
    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    /// Get genre by ID
    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    /// Create a new genre
    pub async fn create_genre(&self, genre: CreateGenre) -> AppResult<Genre> {
        self.repository.genres.create(&genre).await
    }

    /// Update an existing genre
    pub async fn update_genre(&self, id: i32, genre: UpdateGenre) -> AppResult<Genre> {
        self.repository.genres.update(id, &genre).await
    }

    /// Delete a genre, nullifying book references
    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await
    }

    /// Reject unknown genre references with a serializer-style field error
    async fn check_genre(&self, genre_id: Option<i32>) -> AppResult<()> {
        if let Some(id) = genre_id {
            if !self.repository.genres.exists(id).await? {
                return Err(AppError::field("genre", "Genre not found."));
            }
        }
        Ok(())
    }
}
