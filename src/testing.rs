use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tower::ServiceExt;

use crate::db::{self, Category, NewQuestion};
use crate::server::app::build_router;

/// In-memory database with migrations applied. A single connection keeps
/// every query on the same in-memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

/// Categories 1 (Science) and 2 (Art), the water question in category "1",
/// then `extra` filler questions alternating between categories "2" and "1".
pub async fn seed(pool: &SqlitePool, extra: usize) {
    let mut conn = pool.acquire().await.unwrap();
    db::queries::categories::import_categories(
        &mut conn,
        &[
            Category { id: 1, kind: "Science".into() },
            Category { id: 2, kind: "Art".into() },
        ],
    )
    .await
    .unwrap();

    db::queries::questions::create_question(
        &mut conn,
        &NewQuestion {
            question: "What is the chemical symbol for water?".into(),
            answer: "H2O".into(),
            difficulty: 1,
            category: "1".into(),
        },
    )
    .await
    .unwrap();
    for n in 0..extra {
        db::queries::questions::create_question(
            &mut conn,
            &NewQuestion {
                question: format!("Filler question number {n}?"),
                answer: format!("Answer {n}"),
                difficulty: (n % 5) as i64 + 1,
                category: if n % 2 == 0 { "2".into() } else { "1".into() },
            },
        )
        .await
        .unwrap();
    }
}

pub fn test_app(pool: SqlitePool) -> Router {
    build_router(pool)
}

/// Sends one request through the router and decodes the JSON reply.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
