use std::any::Any;

use anyhow::Context;
use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use prometheus::{Encoder, TextEncoder};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::{error_body, ApiError};
use super::routes::{category_router, questions_router, quizzes_router};

#[derive(FromRef, Clone)]
pub struct AppState {
    pool: SqlitePool,
}

pub fn build_router(pool: SqlitePool) -> Router {
    let state = AppState { pool };

    Router::new()
        .route("/metrics", get(metrics))
        .merge(category_router(state.clone()))
        .merge(questions_router(state.clone()))
        .merge(quizzes_router(state))
        .method_not_allowed_fallback(|| async { ApiError::MethodNotAllowed })
        .fallback(|| async {
            tracing::info!("Fallback");
            ApiError::NotFound
        })
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(pool: SqlitePool, addr: &str) -> anyhow::Result<()> {
    let app = build_router(pool);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Handler panicked");
    error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}

async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let mut buf = vec![];
    if let Err(err) = encoder.encode(&prometheus::gather(), &mut buf) {
        tracing::error!(error = %err, "Failed to encode metrics");
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
    }
    let content_type = HeaderValue::from_str(encoder.format_type())
        .unwrap_or_else(|_| HeaderValue::from_static("text/plain"));
    ([(header::CONTENT_TYPE, content_type)], buf).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::testing::{seed, send, test_app, test_pool};

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let app = test_app(test_pool().await);

        let (status, body) = send(&app, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"success": false, "error": 404, "message": "resource not found"})
        );
    }

    #[tokio::test]
    async fn wrong_method_is_json_405() {
        let app = test_app(test_pool().await);

        let (status, body) = send(&app, Method::PATCH, "/categories", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], json!(405));
        assert_eq!(body["message"], json!("method not allowed"));
    }

    #[tokio::test]
    async fn responses_allow_any_origin() {
        let pool = test_pool().await;
        seed(&pool, 0).await;
        let app = test_app(pool);

        let request = Request::builder()
            .uri("/categories")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );

        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/questions")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(preflight).await.unwrap();
        let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap()
            .to_owned();
        for method in ["GET", "POST", "PATCH", "DELETE", "OPTIONS"] {
            assert!(methods.contains(method), "{methods}");
        }
        let headers = response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS]
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        assert!(headers.contains("content-type"));
        assert!(headers.contains("authorization"));
    }

    #[tokio::test]
    async fn metrics_are_exposed() {
        let app = test_app(test_pool().await);
        crate::telemetry::QUESTIONS_CREATED.inc_by(0);

        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("trivia_questions_created_total"));
    }
}
