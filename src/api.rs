use crate::backend::{EngineError, SearchBackend};
use crate::document::{
    Book, BookDocument, BookHit, FieldError, HealthResponse, UpsertResponse,
};
use crate::query::{MultiMatchQuery, DEFAULT_SIZE};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

// ========== State ==========

/// Shared handler state: one engine client for the whole process
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn SearchBackend>,
    index: Arc<str>,
}

impl AppState {
    pub fn new(backend: Arc<dyn SearchBackend>, index: &str) -> Self {
        Self {
            backend,
            index: Arc::from(index),
        }
    }
}

// ========== Request Types ==========

#[derive(Debug, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub size: Option<String>,
}

impl SearchParams {
    /// Collect raw query pairs; a repeated parameter keeps its last value
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "q" => params.q = Some(value),
                "size" => params.size = Some(value),
                _ => {}
            }
        }
        params
    }

    fn validate(self) -> Result<MultiMatchQuery, ApiError> {
        let mut errors = Vec::new();

        let q = self.q;
        if q.is_none() {
            errors.push(FieldError::missing(&["query", "q"]));
        }

        let size = match self.size.as_deref().map(str::trim) {
            None => Some(DEFAULT_SIZE),
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n < 0 => {
                    errors.push(FieldError::new(
                        &["query", "size"],
                        "Input should be greater than or equal to 0",
                        "greater_than_equal",
                    ));
                    None
                }
                Ok(n) => usize::try_from(n).ok(),
                Err(_) => {
                    errors.push(FieldError::new(
                        &["query", "size"],
                        "Input should be a valid integer, unable to parse string as an integer",
                        "int_parsing",
                    ));
                    None
                }
            },
        };

        match (q, size) {
            (Some(q), Some(size)) if errors.is_empty() => Ok(MultiMatchQuery::books(q, size)),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

// ========== Error Handling ==========

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation(Vec<FieldError>),

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": errors })),
            )
                .into_response(),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "not found" })),
            )
                .into_response(),
            ApiError::Engine(err) => {
                tracing::error!("API error: {}", err);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::Validation(vec![FieldError::missing(&["body"])]));
    }

    serde_json::from_slice(body).map_err(|e| {
        ApiError::Validation(vec![FieldError::new(
            &["body", e.column().to_string().as_str()],
            format!("JSON decode error: {e}"),
            "json_invalid",
        )])
    })
}

fn decode_error(err: serde_json::Error) -> ApiError {
    ApiError::Engine(EngineError::Decode(err.to_string()))
}

// ========== Handlers ==========

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let info = state.backend.cluster_info().await?;

    Ok(Json(HealthResponse {
        ok: true,
        cluster: info.cluster_name,
    }))
}

async fn upsert_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<UpsertResponse>, ApiError> {
    let book = Book::from_request(&parse_body(&body)?).map_err(ApiError::Validation)?;

    let result = state
        .backend
        .index_document(&state.index, &id, &book.to_source())
        .await?;
    tracing::debug!(id = %id, ?result, "indexed book");

    Ok(Json(UpsertResponse { result, id }))
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookDocument>, ApiError> {
    let stored = state
        .backend
        .get_document(&state.index, &id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let document = BookDocument::try_from(stored).map_err(decode_error)?;
    Ok(Json(document))
}

async fn search_books(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<BookHit>>, ApiError> {
    let Query(pairs) = params.map_err(|rejection| {
        ApiError::Validation(vec![FieldError::new(
            &["query"],
            rejection.body_text(),
            "query_invalid",
        )])
    })?;
    let query = SearchParams::from_pairs(pairs).validate()?;

    let hits = state.backend.search(&state.index, &query).await?;
    let books = hits
        .into_iter()
        .map(BookHit::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(decode_error)?;

    Ok(Json(books))
}

// ========== Router ==========

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/books/:id", get(get_book).post(upsert_book))
        .route("/search", get(search_books))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
