//! HTTP JSON API.
//!
//! Exposes [`ItemService`] over axum. Handlers hold no state of their own:
//! the service (and the store behind it) is injected through axum's `State`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/api/health` | Liveness and store connectivity (always 200) |
//! | `GET`    | `/api/items` | Newest 100 items |
//! | `GET`    | `/api/items/{id}` | One item |
//! | `POST`   | `/api/items` | Create an item (201) |
//! | `PUT`    | `/api/items/{id}` | Replace title and description |
//! | `DELETE` | `/api/items/{id}` | Delete an item |
//!
//! # Error Contract
//!
//! ```json
//! { "error": "Item not found" }
//! ```
//!
//! Validation failures are 400, unknown ids are 404, and storage failures are
//! 500 with a generic message. Storage error detail is only logged.

use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use item_store_core::error::ItemError;
use item_store_core::models::{DeleteConfirmation, Item, ItemInput};
use item_store_core::service::{HealthReport, ItemService};

use crate::config::{Config, ServerConfig};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    service: ItemService,
}

/// Builds the full application router: `/api` routes plus CORS, request
/// tracing and the optional request deadline.
pub fn router(service: ItemService, server: &ServerConfig) -> Result<Router> {
    let api = Router::new()
        .route("/health", get(handle_health))
        .route("/items", get(handle_list).post(handle_create))
        .route(
            "/items/{id}",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .with_state(AppState { service });

    let mut app = Router::new()
        .nest("/api", api)
        .layer(cors_layer(server)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    if server.request_timeout_secs > 0 {
        app = app.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_secs),
        ));
    }

    Ok(app)
}

fn cors_layer(server: &ServerConfig) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ]);

    if server.allows_any_origin() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = server
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Starts the HTTP server on `0.0.0.0:{server.port}` and runs until Ctrl-C.
pub async fn run_server(config: &Config, service: ItemService) -> Result<()> {
    let app = router(service, &config.server)?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!(addr = %bind_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn not_found() -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        message: "Item not found".to_string(),
    }
}

fn internal(message: &str) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.to_string(),
    }
}

/// Maps a service error to a response. `failure` is the generic message
/// sent in place of storage error detail.
fn classify(err: ItemError, failure: &str) -> AppError {
    match err {
        ItemError::InvalidInput(message) => bad_request(message),
        ItemError::NotFound(_) => not_found(),
        ItemError::StorageUnavailable(source) => {
            tracing::error!(error = ?source, "{}", failure);
            internal(failure)
        }
    }
}

/// Ids that are not integers cannot match a row.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>().map_err(|_| not_found())
}

fn parse_body(payload: Result<Json<ItemInput>, JsonRejection>) -> Result<ItemInput, AppError> {
    match payload {
        Ok(Json(input)) => Ok(input),
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "rejected request body");
            Err(bad_request("Invalid request body"))
        }
    }
}

// ============ Handlers ============

/// Handler for `GET /api/health`. Always 200; a failed store probe shows up
/// as `"database": "disconnected"`.
async fn handle_health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.service.health().await)
}

async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<Item>>, AppError> {
    let items = state
        .service
        .list()
        .await
        .map_err(|e| classify(e, "Failed to fetch items"))?;
    Ok(Json(items))
}

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Item>, AppError> {
    let id = parse_id(&id)?;
    let item = state
        .service
        .get(id)
        .await
        .map_err(|e| classify(e, "Failed to fetch item"))?;
    Ok(Json(item))
}

async fn handle_create(
    State(state): State<AppState>,
    payload: Result<Json<ItemInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    let input = parse_body(payload)?;
    let item = state
        .service
        .create(input)
        .await
        .map_err(|e| classify(e, "Failed to create item"))?;

    tracing::info!(id = item.id, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ItemInput>, JsonRejection>,
) -> Result<Json<Item>, AppError> {
    let id = parse_id(&id)?;
    let input = parse_body(payload)?;
    let item = state
        .service
        .update(id, input)
        .await
        .map_err(|e| classify(e, "Failed to update item"))?;
    Ok(Json(item))
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>, AppError> {
    let id = parse_id(&id)?;
    let confirmation = state
        .service
        .delete(id)
        .await
        .map_err(|e| classify(e, "Failed to delete item"))?;

    tracing::info!(id, "item deleted");
    Ok(Json(confirmation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("abc").unwrap_err().status, StatusCode::NOT_FOUND);
        assert_eq!(parse_id("").unwrap_err().status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_classify_hides_storage_detail() {
        let err = ItemError::storage(anyhow::anyhow!("password authentication failed"));
        let app_err = classify(err, "Failed to fetch items");
        assert_eq!(app_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app_err.message, "Failed to fetch items");
    }

    #[test]
    fn test_classify_client_errors() {
        let app_err = classify(ItemError::invalid("Title is required"), "unused");
        assert_eq!(app_err.status, StatusCode::BAD_REQUEST);
        assert_eq!(app_err.message, "Title is required");

        let app_err = classify(ItemError::NotFound(3), "unused");
        assert_eq!(app_err.status, StatusCode::NOT_FOUND);
        assert_eq!(app_err.message, "Item not found");
    }

    #[test]
    fn test_cors_rejects_bad_origin() {
        let server = ServerConfig {
            cors_origins: vec!["bad\norigin".to_string()],
            ..ServerConfig::default()
        };
        assert!(cors_layer(&server).is_err());
    }
}
