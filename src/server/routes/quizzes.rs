use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions::random_question, Question},
    server::{app::AppState, deserializers::deserialize_option_int_from_string, error::ApiError},
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::ApiResponse;

/// Category id the quiz client uses for "all categories".
const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default)]
    previous_questions: Vec<i64>,
    quiz_category: Option<QuizCategory>,
}

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(default, deserialize_with = "deserialize_option_int_from_string")]
    id: Option<i64>,
}

#[derive(Serialize)]
struct QuizQuestion {
    success: bool,
    question: Option<Question>,
}

async fn next_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResponse<QuizQuestion> {
    let Json(request) = body?;
    let category_id = request
        .quiz_category
        .and_then(|c| c.id)
        .ok_or(ApiError::BadRequest)?;

    // ids arrive as numbers or category-map keys, so "0" selects everything as well
    let category = (category_id != ALL_CATEGORIES).then(|| category_id.to_string());
    let question =
        random_question(&pool, category.as_deref(), &request.previous_questions).await?;

    if question.is_some() {
        QUIZ_QUESTIONS_SERVED
            .with_label_values(&[category.as_deref().unwrap_or("all")])
            .inc();
    } else {
        tracing::debug!(
            category_id,
            seen = request.previous_questions.len(),
            "Quiz has no questions left"
        );
    }

    Ok(Json(QuizQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}
