//! Borrow/return endpoints and per-user borrow queries

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{book::Book, borrow::BorrowRecordDetails},
};

use super::AuthenticatedUser;

/// Outcome message body
#[derive(Serialize, ToSchema)]
pub struct DetailResponse {
    pub detail: String,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book borrowed", body = DetailResponse),
        (status = 400, description = "Book already taken"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<DetailResponse>> {
    state.services.borrows.borrow(claims.user_id, id).await?;

    Ok(Json(DetailResponse {
        detail: "The book was successfully taken".to_string(),
    }))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = DetailResponse),
        (status = 400, description = "No active borrow by this user"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<DetailResponse>> {
    state.services.borrows.return_book(claims.user_id, id).await?;

    Ok(Json(DetailResponse {
        detail: "Book successfully returned".to_string(),
    }))
}

/// Books the authenticated user currently holds
#[utoipa::path(
    get,
    path = "/users/borrowed",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Currently borrowed books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_borrowed_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.borrows.active_borrows(claims.user_id).await?;
    Ok(Json(books))
}

/// Books a specific user currently holds (owner or admin)
#[utoipa::path(
    get,
    path = "/users/{id}/borrowed",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Currently borrowed books", body = Vec<Book>),
        (status = 403, description = "Not the subject user nor an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_borrowed_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<Book>>> {
    claims.require_self_or_admin(user_id)?;

    let books = state.services.borrows.active_borrows(user_id).await?;
    Ok(Json(books))
}

/// Full borrow history of the authenticated user
#[utoipa::path(
    get,
    path = "/users/my-history",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrow history", body = Vec<BorrowRecordDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRecordDetails>>> {
    let history = state.services.borrows.history(claims.user_id).await?;
    Ok(Json(history))
}

/// Full borrow history of a specific user (owner or admin)
#[utoipa::path(
    get,
    path = "/users/{id}/history",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Borrow history", body = Vec<BorrowRecordDetails>),
        (status = 403, description = "Not the subject user nor an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<BorrowRecordDetails>>> {
    claims.require_self_or_admin(user_id)?;

    let history = state.services.borrows.history(user_id).await?;
    Ok(Json(history))
}
