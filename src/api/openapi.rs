//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, genres, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Librarium API",
        version = "1.0.0",
        description = "Library Loans REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::token,
        auth::refresh_token,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre,
        // Users
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        // Borrows
        borrows::borrow_book,
        borrows::return_book,
        borrows::my_borrowed_books,
        borrows::user_borrowed_books,
        borrows::my_history,
        borrows::user_history,
    ),
    components(
        schemas(
            // Auth
            auth::TokenRequest,
            auth::RefreshRequest,
            auth::TokenResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::BookQuery,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Genres
            crate::models::genre::Genre,
            crate::models::genre::CreateGenre,
            crate::models::genre::UpdateGenre,
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::UserQuery,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Borrows
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowRecordDetails,
            borrows::DetailResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and token endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "genres", description = "Genre management"),
        (name = "users", description = "User administration"),
        (name = "borrows", description = "Borrow/return protocol and history")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
