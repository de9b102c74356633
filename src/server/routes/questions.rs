use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions, NewQuestion, Question},
    server::{app::AppState, deserializers::deserialize_option_string_from_scalar, error::ApiError},
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{categories::category_map, rollback, ApiResponse};

pub const QUESTIONS_PER_PAGE: i64 = 10;

/// Raw query pairs, so repeated or odd parameters never reject the request.
#[derive(Deserialize)]
#[serde(transparent)]
struct PageQuery(Vec<(String, String)>);

impl PageQuery {
    // the first `page` wins; anything that isn't an integer falls back to the first page
    fn page(&self) -> i64 {
        self.0
            .iter()
            .find(|(key, _)| key == "page")
            .and_then(|(_, p)| p.trim().parse().ok())
            .unwrap_or(1)
    }
}

/// Body of `POST /questions`: a search when `searchTerm` is present, a new question otherwise.
#[derive(Deserialize)]
struct QuestionsBody {
    #[serde(
        rename = "searchTerm",
        default,
        deserialize_with = "deserialize_option_string_from_scalar"
    )]
    search_term: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_string_from_scalar")]
    question: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_string_from_scalar")]
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_string_from_scalar")]
    category: Option<String>,
}

impl QuestionsBody {
    fn into_new_question(self) -> Result<NewQuestion, ApiError> {
        let non_empty = |v: Option<String>| v.filter(|v| !v.is_empty()).ok_or(ApiError::BadRequest);
        Ok(NewQuestion {
            question: non_empty(self.question)?,
            answer: non_empty(self.answer)?,
            difficulty: self
                .difficulty
                .filter(|d| *d != 0)
                .ok_or(ApiError::BadRequest)?,
            category: non_empty(self.category)?,
        })
    }
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
    current_category: Option<i64>,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<i64>,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created: i64,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted: i64,
}

async fn get_questions(
    State(pool): State<SqlitePool>,
    Query(query): Query<PageQuery>,
) -> ApiResponse<QuestionsPage> {
    let page = query.page();
    let offset = page
        .checked_sub(1)
        .filter(|p| *p >= 0)
        .and_then(|p| p.checked_mul(QUESTIONS_PER_PAGE))
        .ok_or(ApiError::NotFound)?;

    let questions = questions::get_questions_page(&pool, QUESTIONS_PER_PAGE, offset).await?;
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(QuestionsPage {
        success: true,
        questions,
        total_questions: questions::count_questions(&pool).await?,
        categories: category_map(&pool).await?,
        current_category: None,
    }))
}

async fn search_or_create(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuestionsBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;

    if let Some(term) = &body.search_term {
        let questions = questions::search_questions(&pool, term).await?;
        tracing::debug!(term = %term, found = questions.len(), "Searched questions");
        return Ok(Json(SearchResults {
            success: true,
            total_questions: questions.len(),
            questions,
            current_category: None,
        })
        .into_response());
    }

    let new_question = body.into_new_question()?;
    let mut tx = pool.begin().await.map_err(ApiError::Unprocessable)?;
    let id = match questions::create_question(&mut tx, &new_question).await {
        Ok(id) => id,
        Err(err) => {
            rollback(tx).await;
            return Err(ApiError::Unprocessable(err));
        }
    };
    tx.commit().await.map_err(ApiError::Unprocessable)?;

    QUESTIONS_CREATED.inc();
    tracing::info!(id, category = %new_question.category, "Created question");
    Ok(Json(Created {
        success: true,
        created: id,
    })
    .into_response())
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Deleted> {
    let Path(id) = id?;
    if questions::get_question_by_id(&pool, id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let mut tx = pool.begin().await.map_err(ApiError::Unprocessable)?;
    match questions::delete_question(&mut tx, id).await {
        Ok(0) => {
            // removed by someone else between the lookup and the delete
            rollback(tx).await;
            return Err(ApiError::NotFound);
        }
        Ok(_) => {}
        Err(err) => {
            rollback(tx).await;
            return Err(ApiError::Unprocessable(err));
        }
    }
    tx.commit().await.map_err(ApiError::Unprocessable)?;

    QUESTIONS_DELETED.inc();
    tracing::info!(id, "Deleted question");
    Ok(Json(Deleted {
        success: true,
        deleted: id,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(get_questions).post(search_or_create))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
