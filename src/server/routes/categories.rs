use std::collections::BTreeMap;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions::get_questions_for_category},
        Question,
    },
    server::{app::AppState, error::ApiError},
};

use super::ApiResponse;

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestions {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: i64,
}

/// `{id: type}` for every category, ordered by id.
pub(super) async fn category_map(pool: &SqlitePool) -> sqlx::Result<BTreeMap<i64, String>> {
    Ok(get_all_categories(pool)
        .await?
        .into_iter()
        .map(|c| (c.id, c.kind))
        .collect())
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<CategoriesResponse> {
    let categories = category_map(&pool).await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

async fn questions_for_category(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<CategoryQuestions> {
    let Path(id) = id?;
    let questions = get_questions_for_category(&pool, &id.to_string()).await?;
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(CategoryQuestions {
        success: true,
        total_questions: questions.len(),
        questions,
        current_category: id,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
        .with_state(state)
}
