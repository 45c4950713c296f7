use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lookup::{LookupService, LookupSource};
use crate::render::{RenderedEntry, render};

/// Longest query text accepted; only the leading script run matters, so
/// callers should not need anywhere near this much.
pub const MAX_TEXT_LEN: usize = 256;

#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<LookupService>,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub text: String,
}

#[derive(Serialize)]
pub struct LookupResponse {
    text: String,
    source: &'static str,
    entries: Vec<RenderedEntry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/robots.txt", get(robots))
        .route("/v1/lookup", get(lookup))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn robots(State(state): State<AppState>) -> Response {
    let body = "User-agent: *\nDisallow: /\n";
    if state.disable_cache {
        return body.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=86400, immutable"),
        )],
        body,
    )
        .into_response()
}

async fn lookup(
    State(state): State<AppState>,
    axum::extract::Query(params): axum::extract::Query<LookupQuery>,
) -> Result<Response, ApiError> {
    if params.text.is_empty() {
        return Err(ApiError::bad_request("text is required"));
    }
    if params.text.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::bad_request(format!(
            "text must be at most {MAX_TEXT_LEN} characters"
        )));
    }

    let result = state.lookup.lookup(&params.text);
    let response = LookupResponse {
        text: params.text,
        source: match result.source {
            LookupSource::Words => "words",
            LookupSource::Names => "names",
        },
        entries: render(&result),
    };

    if state.disable_cache {
        Ok(Json(response).into_response())
    } else {
        Ok((
            [(
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=300"),
            )],
            Json(response),
        )
            .into_response())
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}
