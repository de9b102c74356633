use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub difficulty: i64,
}

pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    pub category: String,
}

const COLUMNS: &str = "id, question, answer, category, difficulty";

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions ORDER BY id"))
        .fetch_all(pool)
        .await
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
}

pub async fn get_questions_page(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions ORDER BY id LIMIT ?1 OFFSET ?2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: &str,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE category = ?1 ORDER BY id"
    ))
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Case-insensitive substring match on the question text. The term is taken literally.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE instr(lower(question), lower(?1)) > 0 ORDER BY id"
    ))
    .bind(term)
    .fetch_all(pool)
    .await
}

/// Picks one question uniformly at random, optionally restricted to a category,
/// skipping every id in `exclude`.
pub async fn random_question(
    pool: &SqlitePool,
    category: Option<&str>,
    exclude: &[i64],
) -> sqlx::Result<Option<Question>> {
    // one JSON parameter keeps long exclusion lists under the bind-variable limit
    let exclude = serde_json::to_string(exclude).map_err(|err| sqlx::Error::Encode(err.into()))?;
    sqlx::query_as::<_, Question>(&format!(
        r#"
        SELECT {COLUMNS} FROM questions
        WHERE (?1 IS NULL OR category = ?1)
          AND id NOT IN (SELECT value FROM json_each(?2))
        ORDER BY RANDOM() LIMIT 1
        "#
    ))
    .bind(category)
    .bind(exclude)
    .fetch_optional(pool)
    .await
}

pub async fn create_question(conn: &mut SqliteConnection, new: &NewQuestion) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, difficulty, category) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&new.question)
    .bind(&new.answer)
    .bind(new.difficulty)
    .bind(&new.category)
    .execute(conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Returns the number of deleted rows.
pub async fn delete_question(conn: &mut SqliteConnection, id: i64) -> sqlx::Result<u64> {
    let affected = sqlx::query(
        r#"
        DELETE FROM questions WHERE id = ?1
        "#,
    )
    .bind(id)
    .execute(conn)
    .await?
    .rows_affected();

    Ok(affected)
}

/// Inserts the given questions, overwriting any row whose id already exists.
pub async fn import_questions(
    conn: &mut SqliteConnection,
    questions: &[Question],
) -> sqlx::Result<()> {
    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (id, question, answer, difficulty, category)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                difficulty = excluded.difficulty,
                category = excluded.category
            "#,
        )
        .bind(question.id)
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.difficulty)
        .bind(&question.category)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
