mod categories;
mod questions;
mod quizzes;

use axum::Json;
use sqlx::{Sqlite, Transaction};

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

use super::error::ApiError;

pub type ApiResponse<T> = Result<Json<T>, ApiError>;

async fn rollback(tx: Transaction<'_, Sqlite>) {
    if let Err(err) = tx.rollback().await {
        tracing::warn!(error = %err, "Rollback failed");
    }
}
