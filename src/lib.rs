//! Librarium Library Loans Backend
//!
//! A Rust REST JSON API for a lending library: catalog and genre
//! management, user accounts with JWT authentication, and a borrow/return
//! ledger with history tracking.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
