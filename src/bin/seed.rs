//! Populate the database with sample data for testing and development.
//!
//! Wipes all collections, then recreates the admin account, five member
//! users, five genres, five books and a mix of open and closed borrow
//! records.

use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;

use librarium_server::{
    config::AppConfig,
    models::{book::CreateBook, genre::CreateGenre, user::Role},
    repository::Repository,
    services::Services,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    tracing_subscriber::fmt()
        .with_env_filter("librarium_server=info,seed=info")
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    // Wipe everything, ledger first because of foreign keys
    sqlx::query("DELETE FROM borrow_records").execute(&pool).await?;
    sqlx::query("DELETE FROM books").execute(&pool).await?;
    sqlx::query("DELETE FROM genres").execute(&pool).await?;
    sqlx::query("DELETE FROM users").execute(&pool).await?;

    let repository = Repository::new(pool.clone());
    let services = Services::new(repository.clone(), config.auth.clone());

    let admin_hash = services.users.hash_password("adminpassword")?;
    let admin = repository
        .users
        .create("Admin", "admin@example.com", &admin_hash, Role::Admin)
        .await?;
    tracing::info!(email = %admin.email, "created admin: admin@example.com / adminpassword");

    let mut users = Vec::new();
    for i in 1..=5 {
        let hash = services.users.hash_password(&format!("password{}", i))?;
        let user = repository
            .users
            .create(
                &format!("User{}", i),
                &format!("user{}@example.com", i),
                &hash,
                Role::Member,
            )
            .await?;
        users.push(user);
    }

    let genre_names = ["Science Fiction", "Detective", "Science", "Romance", "History"];
    let mut genres = Vec::new();
    for name in genre_names {
        let genre = repository
            .genres
            .create(&CreateGenre { name: name.to_string() })
            .await?;
        genres.push(genre);
    }

    let book_data = [
        (
            "2001: A Space Odyssey",
            "Arthur C. Clarke",
            "A science fiction story about space exploration.",
        ),
        (
            "Sherlock Holmes",
            "Arthur Conan Doyle",
            "Detective stories featuring Sherlock Holmes.",
        ),
        (
            "The Feynman Lectures on Physics",
            "Richard Feynman",
            "Popular science physics lectures.",
        ),
        ("Pride and Passion", "Jane Austen", "A romantic novel."),
        ("World War II", "John Kennedy", "A historical study of the Second World War."),
    ];
    let mut books = Vec::new();
    for (i, (title, author, description)) in book_data.into_iter().enumerate() {
        let book = repository
            .books
            .create(&CreateBook {
                title: title.to_string(),
                author: author.to_string(),
                description: Some(description.to_string()),
                genre_id: Some(genres[i].id),
                published_at: None,
            })
            .await?;
        books.push(book);
    }

    // Odd-indexed records are already returned, even-indexed ones are open
    for i in 0..5 {
        let borrowed_at = Utc::now() - Duration::days(i as i64 * 2);
        let returned_at = if i % 2 == 0 {
            None
        } else {
            Some(borrowed_at + Duration::days(1))
        };

        sqlx::query(
            r#"
            INSERT INTO borrow_records (user_id, book_id, borrowed_at, returned_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(users[i].id)
        .bind(books[i].id)
        .bind(borrowed_at)
        .bind(returned_at)
        .execute(&pool)
        .await?;

        // Keep the availability projection in step with the ledger
        if returned_at.is_none() {
            sqlx::query("UPDATE books SET is_borrowed = TRUE WHERE id = $1")
                .bind(books[i].id)
                .execute(&pool)
                .await?;
        }
    }

    tracing::info!("Sample data successfully created");
    Ok(())
}
