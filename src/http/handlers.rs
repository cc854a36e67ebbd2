//! Request handlers.
//!
//! Handlers stay thin: extract, call the dispatcher or appender, log, map
//! the result to a response.

use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::documents::{RangeQuery, SubscribeRequest};
use crate::error::ApiError;
use crate::http::request::request_id;
use crate::http::response::Ack;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::Route;

/// `GET /{*path}`
pub async fn get_document(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Response {
    match path {
        Ok(Path(path)) => serve_document(&state, &method, &headers, &path, query).await,
        Err(rejection) => ApiError::bad_request(rejection.body_text()).into_response(),
    }
}

/// `GET /`
pub async fn get_root(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Response {
    serve_document(&state, &method, &headers, "/", query).await
}

async fn serve_document(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
    path: &str,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(headers);
    let route = Route::parse(path);

    tracing::debug!(
        request_id = %request_id,
        path = %path,
        route = route.kind(),
        "Dispatching request"
    );

    let result = match query {
        Ok(Query(query)) => state.dispatcher.dispatch(&route, &query).await,
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    };

    let response = match result {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(e) => {
            log_error(&request_id, path, &e);
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), route.kind(), response.status().as_u16(), start_time);
    response
}

/// `POST /subscribe`
pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);

    let result = match body {
        Ok(Json(request)) => state
            .subscriptions
            .subscribe(request)
            .await
            .map_err(ApiError::from),
        Err(rejection) => Err(ApiError::bad_request(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    };

    let response = match result {
        Ok(_) => (StatusCode::OK, Json(Ack::new("Subscription successful"))).into_response(),
        Err(e) => {
            log_error(&request_id, "/subscribe", &e);
            e.into_response()
        }
    };

    metrics::record_request("POST", "subscribe", response.status().as_u16(), start_time);
    response
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// `GET /healthz`
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn log_error(request_id: &str, path: &str, error: &ApiError) {
    match error {
        ApiError::NotAvailable { .. } | ApiError::Malformed { .. } => tracing::error!(
            request_id = %request_id,
            path = %path,
            kind = error.kind(),
            error = %error,
            "Request failed"
        ),
        _ => tracing::info!(
            request_id = %request_id,
            path = %path,
            kind = error.kind(),
            error = %error,
            "Request rejected"
        ),
    }
}
