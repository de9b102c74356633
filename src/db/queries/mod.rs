pub mod categories;
pub mod questions;

use sqlx::SqlitePool;

use categories::{import_categories, Category};
use questions::{import_questions, Question};

/// Upserts categories and questions in one transaction: either both land or neither does.
pub async fn import_all(
    pool: &SqlitePool,
    categories: &[Category],
    questions: &[Question],
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    let res = match import_categories(&mut tx, categories).await {
        Ok(()) => import_questions(&mut tx, questions).await,
        Err(err) => Err(err),
    };
    match res {
        Ok(()) => tx.commit().await,
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
