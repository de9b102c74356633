use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, type FROM categories ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn create_category(conn: &mut SqliteConnection, kind: &str) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO categories (type) VALUES (?1)
        "#,
    )
    .bind(kind)
    .execute(conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Inserts the given categories, replacing the type of any row whose id already exists.
pub async fn import_categories(
    conn: &mut SqliteConnection,
    categories: &[Category],
) -> sqlx::Result<()> {
    for category in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, type) VALUES (?1, ?2)
            ON CONFLICT (id) DO UPDATE SET type = excluded.type
            "#,
        )
        .bind(category.id)
        .bind(&category.kind)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
